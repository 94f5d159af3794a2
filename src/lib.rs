#![warn(missing_docs)]

//! Broadcaster is a [Bluetooth Low Energy] (BLE) peripheral for [Rust]: it publishes one GATT service, advertises it
//! and reacts to centrals subscribing to, reading and writing its characteristics.
//!
//! The platform Bluetooth stack is reached through the [`PeripheralTransport`] trait and reports back through
//! [`PeripheralEvent`]s. The crate ships a BlueZ transport for Linux behind the `bluez` feature; any other stack, or a
//! test double, can be plugged in by implementing the trait.
//!
//! [Rust]: https://www.rust-lang.org/
//! [Bluetooth Low Energy]: https://www.bluetooth.com/specifications/specs/
//!
//! # Usage
//!
//! ```rust,no_run
//!# #[cfg(all(target_os = "linux", feature = "bluez"))]
//!# #[tokio::main]
//!# async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!use broadcaster::bluer::BluezTransport;
//!use broadcaster::{Advertiser, Profile};
//!
//!let (transport, events) = BluezTransport::new().await?;
//!let profile = Profile::Transfer;
//!let mut advertiser = Advertiser::new(transport, profile.service(), profile.config());
//!advertiser.start();
//!advertiser.run(events).await;
//!#
//!#    Ok(())
//!# }
//!# #[cfg(not(all(target_os = "linux", feature = "bluez")))]
//!# fn main() {}
//! ```
//!
//! # Overview
//!
//! - [`Advertiser`] owns the [`AdvertiserState`] machine. [`start`][Advertiser::start] may be called before or
//!   after the radio reports itself ready; the service is registered once both have happened, and advertising is
//!   requested only after registration succeeded.
//! - Failures tear the service down and are retried within the bounds of a [`RetryPolicy`].
//! - [`Profile`]s provide ready-made services: a generic read/write service, the accessory transfer service which
//!   pushes a [`FramedMessage`] on subscribe, and a mocked heart rate service.
//! - An [`Observer`] is told when advertising starts and when centrals read or write, to drive a user interface.
//!
//! # Feature flags
//!
//! - `bluez`: the Linux [`bluer::BluezTransport`].
//! - `serde`: serializing/deserializing configuration, profiles and messages.

pub mod btuuid;
pub mod error;
pub mod message;
pub mod profile;

mod advertiser;
mod config;
mod event;
mod observer;
mod service;
mod transport;

#[cfg(all(target_os = "linux", feature = "bluez"))]
pub mod bluer;
#[cfg(all(target_os = "linux", feature = "bluez"))]
mod util;

pub use advertiser::{Advertiser, AdvertiserState};
pub use config::{AdvertiserConfig, RetryPolicy, SubscribePolicy};
pub use error::Error;
pub use event::{DataHandler, GattHandler, PeripheralEvent, RadioHandler, ReadReply};
pub use message::{FramedMessage, MessageId};
pub use observer::Observer;
pub use profile::Profile;
pub use service::{CharacteristicDescriptor, CharacteristicProperties, ServiceBuilder, ServiceDescriptor};
pub use transport::PeripheralTransport;
pub use uuid::Uuid;

/// Convenience alias for a result with [`Error`]
pub type Result<T, E = Error> = core::result::Result<T, E>;
