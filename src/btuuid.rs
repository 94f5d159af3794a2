//! `Uuid` extensions for Bluetooth UUIDs and the identifiers used by the built-in profiles

use uuid::Uuid;

/// This is the Bluetooth Base UUID. It is used with 16-bit UUIDs
/// [defined](https://www.bluetooth.com/specifications/assigned-numbers/) by the Bluetooth SIG.
pub const BLUETOOTH_BASE_UUID: u128 = 0x00000000_0000_1000_8000_00805f9b34fb;

/// Const function to create a 16-bit Bluetooth UUID
pub const fn bluetooth_uuid_from_u16(uuid: u16) -> Uuid {
    Uuid::from_u128(((uuid as u128) << 96) | BLUETOOTH_BASE_UUID)
}

/// Extension trait for [uuid::Uuid] with helper methods for dealing with Bluetooth 16-bit UUIDs
pub trait BluetoothUuidExt: private::Sealed {
    /// Creates a 16-bit Bluetooth UUID
    fn from_u16(uuid: u16) -> Self;

    /// Returns `true` if self is a valid 16-bit Bluetooth UUID
    fn is_u16_uuid(&self) -> bool;

    /// Tries to convert self into a 16-bit Bluetooth UUID
    fn try_to_u16(&self) -> Option<u16>;
}

impl BluetoothUuidExt for Uuid {
    fn from_u16(uuid: u16) -> Self {
        bluetooth_uuid_from_u16(uuid)
    }

    fn is_u16_uuid(&self) -> bool {
        let u = self.as_u128();
        (u & ((1 << 96) - 1)) == BLUETOOTH_BASE_UUID && (((u >> 96) as u32) & 0xffff0000) == 0
    }

    fn try_to_u16(&self) -> Option<u16> {
        let u = self.as_u128();
        self.is_u16_uuid().then(|| (u >> 96) as u16)
    }
}

mod private {
    use uuid::Uuid;

    pub trait Sealed {}

    impl Sealed for Uuid {}
}

/// Bluetooth GATT Service 16-bit UUIDs
pub mod services {
    #![allow(missing_docs)]

    use uuid::Uuid;

    use super::bluetooth_uuid_from_u16;

    pub const HEART_RATE: Uuid = bluetooth_uuid_from_u16(0x180D);
}

/// Bluetooth GATT Characteristic 16-bit UUIDs
pub mod characteristics {
    #![allow(missing_docs)]

    use uuid::Uuid;

    use super::bluetooth_uuid_from_u16;

    pub const HEART_RATE_MEASUREMENT: Uuid = bluetooth_uuid_from_u16(0x2A37);
    pub const BODY_SENSOR_LOCATION: Uuid = bluetooth_uuid_from_u16(0x2A38);
}

/// Vendor UUIDs of the accessory transfer service.
///
/// Naming follows the accessory's point of view: the accessory receives on RX and transmits
/// (notifies) on TX.
pub mod transfer {
    use uuid::Uuid;

    /// The transfer service
    pub const SERVICE: Uuid = Uuid::from_u128(0x2E938FD0_6A61_11ED_A1EB_0242AC120002);
    /// Written by the central
    pub const RX_CHARACTERISTIC: Uuid = Uuid::from_u128(0x2E939AF2_6A61_11ED_A1EB_0242AC120002);
    /// Read and subscribed to by the central
    pub const TX_CHARACTERISTIC: Uuid = Uuid::from_u128(0x2E93998A_6A61_11ED_A1EB_0242AC120002);
}
