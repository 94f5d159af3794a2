//! Advertises one of the built-in profiles through BlueZ and logs what centrals do with it.
//!
//! Usage: `cargo run --example broadcast --features bluez -- [read-write|transfer|heart-rate]`

use std::error::Error;
use std::sync::Arc;

use broadcaster::bluer::BluezTransport;
use broadcaster::{Advertiser, FramedMessage, Observer, Profile};
use tracing::{info, metadata::LevelFilter, warn};

struct StatusLog;

impl Observer for StatusLog {
    fn advertising_started(&self) {
        info!("Advertising Data");
    }

    fn read_value(&self, value: &str) {
        info!("Data getting Read: {}", value);
    }

    fn write_value(&self, value: &str) {
        info!("Writing Data: {}", value);
    }

    fn advertising_failed(&self, error: &broadcaster::Error) {
        warn!("Advertising failed: {}", error);
    }

    fn message_received(&self, message: &FramedMessage) {
        info!("Received {} with {} byte payload", message.id(), message.payload().len());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let profile = match std::env::args().nth(1).as_deref() {
        None | Some("read-write") => Profile::ReadWrite,
        Some("transfer") => Profile::Transfer,
        Some("heart-rate") => Profile::HeartRate,
        Some(other) => return Err(format!("unknown profile {:?}", other).into()),
    };

    let (transport, events) = BluezTransport::new().await?;
    let service = profile.service();
    info!("advertising {:?} service {}", profile, service.uuid());

    let mut advertiser = Advertiser::new(transport, service, profile.config()).with_observer(Arc::new(StatusLog));
    advertiser.start();
    advertiser.run(events).await;

    Ok(())
}
