//! Ready-made services.

use uuid::Uuid;

use crate::btuuid::{characteristics, services, transfer};
use crate::{
    AdvertiserConfig, CharacteristicDescriptor, CharacteristicProperties, FramedMessage, MessageId, ServiceDescriptor,
    SubscribePolicy,
};

/// Payload of the [`MessageId::ConfigureAndStart`] message pushed by [`Profile::Transfer`].
pub const INITIAL_VALUE: &[u8] = b"Initial value";

/// Heart rate measurement pushed by [`Profile::HeartRate`]: sensor contact detected, 72 bpm as a `u8`.
pub const MOCK_HEART_RATE_MEASUREMENT: [u8; 2] = [0x06, 72];

/// Body sensor location "chest".
const BODY_SENSOR_LOCATION_CHEST: u8 = 0x01;

/// The services this crate knows how to advertise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Profile {
    /// A service with freshly generated identifiers, one read/write/notify characteristic and one static read-only
    /// characteristic.
    #[default]
    ReadWrite,
    /// The accessory transfer service. Pushes a [`MessageId::ConfigureAndStart`] message on subscribe and decodes
    /// framed messages written to its RX characteristic.
    Transfer,
    /// A heart rate service that pushes a mocked measurement on subscribe.
    HeartRate,
}

impl Profile {
    /// Builds the service for this profile.
    ///
    /// [`Profile::ReadWrite`] generates new identifiers on every call.
    pub fn service(self) -> ServiceDescriptor {
        match self {
            Profile::ReadWrite => {
                let dynamic = CharacteristicProperties::NOTIFY
                    .union(CharacteristicProperties::WRITE)
                    .union(CharacteristicProperties::READ);
                ServiceDescriptor::builder(Uuid::new_v4())
                    .characteristic(CharacteristicDescriptor::new(Uuid::new_v4(), dynamic))
                    .characteristic(CharacteristicDescriptor::with_value(
                        Uuid::new_v4(),
                        CharacteristicProperties::READ,
                        AdvertiserConfig::default().read_value.into_bytes(),
                    ))
                    .build()
            }
            Profile::Transfer => ServiceDescriptor::builder(transfer::SERVICE)
                .characteristic(CharacteristicDescriptor::new(
                    transfer::RX_CHARACTERISTIC,
                    CharacteristicProperties::WRITE.union(CharacteristicProperties {
                        write_without_response: true,
                        ..Default::default()
                    }),
                ))
                .characteristic(CharacteristicDescriptor::new(
                    transfer::TX_CHARACTERISTIC,
                    CharacteristicProperties::READ.union(CharacteristicProperties::NOTIFY),
                ))
                .build(),
            Profile::HeartRate => ServiceDescriptor::builder(services::HEART_RATE)
                .characteristic(CharacteristicDescriptor::new(
                    characteristics::HEART_RATE_MEASUREMENT,
                    CharacteristicProperties::NOTIFY,
                ))
                .characteristic(CharacteristicDescriptor::with_value(
                    characteristics::BODY_SENSOR_LOCATION,
                    CharacteristicProperties::READ,
                    [BODY_SENSOR_LOCATION_CHEST],
                ))
                .build(),
        }
    }

    /// The default configuration for this profile.
    pub fn config(self) -> AdvertiserConfig {
        let config = AdvertiserConfig::default();
        match self {
            Profile::ReadWrite => config,
            Profile::Transfer => config
                .with_subscribe_policy(SubscribePolicy::framed(&FramedMessage::new(
                    MessageId::ConfigureAndStart,
                    INITIAL_VALUE,
                )))
                .with_message_characteristic(transfer::RX_CHARACTERISTIC),
            Profile::HeartRate => {
                config.with_subscribe_policy(SubscribePolicy::Push(MOCK_HEART_RATE_MEASUREMENT.to_vec()))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::btuuid::BluetoothUuidExt;

    #[test]
    fn read_write_generates_fresh_ids() {
        let a = Profile::ReadWrite.service();
        let b = Profile::ReadWrite.service();
        assert_ne!(a.uuid(), b.uuid());
        assert_eq!(a.characteristics().len(), 2);

        let dynamic = &a.characteristics()[0];
        assert!(dynamic.properties().notify && dynamic.properties().write && dynamic.properties().read);
        assert_eq!(dynamic.value(), None);
        assert_eq!(a.characteristics()[1].value(), Some(&b"AD34E"[..]));
    }

    #[test]
    fn transfer_pushes_configure_and_start() {
        let config = Profile::Transfer.config();
        let payload = config.subscribe.payload().unwrap();
        assert_eq!(payload[0], 0x0B);
        assert_eq!(&payload[1..], INITIAL_VALUE);
        assert_eq!(config.message_characteristic, Some(transfer::RX_CHARACTERISTIC));

        let service = Profile::Transfer.service();
        assert!(service.characteristic(transfer::TX_CHARACTERISTIC).unwrap().properties().notify);
        assert!(service.characteristic(transfer::RX_CHARACTERISTIC).unwrap().properties().is_writable());
    }

    #[test]
    fn heart_rate_uses_assigned_numbers() {
        let service = Profile::HeartRate.service();
        assert_eq!(service.uuid().try_to_u16(), Some(0x180D));
        assert_eq!(service.characteristics()[0].uuid().try_to_u16(), Some(0x2A37));
        assert_eq!(
            Profile::HeartRate.config().subscribe,
            SubscribePolicy::Push(vec![0x06, 72])
        );
    }
}
