//! BlueZ transport for Linux, built on the `bluer` crate.
//!
//! Requires a running `bluetoothd` and a Tokio runtime.

mod error;
mod transport;

pub use transport::BluezTransport;
