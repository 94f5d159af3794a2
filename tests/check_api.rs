#![allow(clippy::let_unit_value)]

use broadcaster::*;

fn assert_send<T: Send>(t: T) -> T {
    t
}

struct NullTransport;

impl PeripheralTransport for NullTransport {
    fn add_service(&mut self, _service: &ServiceDescriptor) {}

    fn start_advertising(&mut self, _local_name: &str, _services: &[Uuid]) {}

    fn stop_advertising(&mut self) {}

    fn update_value(&mut self, _characteristic: Uuid, _value: &[u8]) -> bool {
        false
    }

    fn remove_all_services(&mut self) {}
}

#[allow(unused)]
async fn check_advertiser_apis(events: Vec<PeripheralEvent>) -> Result<()> {
    let profile = Profile::Transfer;
    let transport: Box<dyn PeripheralTransport + Send> = Box::new(NullTransport);
    let mut advertiser = assert_send(Advertiser::new(transport, profile.service(), profile.config()));

    advertiser.start();
    let _: () = assert_send(advertiser.run(futures_lite::stream::iter(events))).await;
    let _state: AdvertiserState = advertiser.state();
    advertiser.send_message(
        btuuid::transfer::TX_CHARACTERISTIC,
        &FramedMessage::new(MessageId::Stop, Vec::new()),
    )?;
    advertiser.stop();

    Ok(())
}

#[cfg(all(target_os = "linux", feature = "bluez"))]
#[allow(unused)]
async fn check_bluez_apis() -> Result<()> {
    let (transport, events) = assert_send(broadcaster::bluer::BluezTransport::new()).await?;
    let mut advertiser = assert_send(Advertiser::new(
        transport,
        Profile::HeartRate.service(),
        Profile::HeartRate.config(),
    ));
    advertiser.start();
    assert_send(advertiser.run(events)).await;

    Ok(())
}

#[test]
fn events_and_errors_cross_threads() {
    let event = assert_send(PeripheralEvent::AdvertisingStarted {
        result: Err(error::ErrorKind::AdvertisingFailed.into()),
    });
    std::thread::spawn(move || drop(event)).join().unwrap();

    fn assert_sync<T: Send + Sync>() {}
    assert_sync::<Error>();
    assert_sync::<ServiceDescriptor>();
    assert_sync::<AdvertiserConfig>();
}
