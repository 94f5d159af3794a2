use uuid::Uuid;

/// GATT characteristic properties supported by a local characteristic. A subset of the Bluetooth Core
/// Specification, Vol 3, Part G, §3.3.1.1.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacteristicProperties {
    pub read: bool,
    pub write_without_response: bool,
    pub write: bool,
    pub notify: bool,
}

impl CharacteristicProperties {
    /// Read only.
    pub const READ: Self = CharacteristicProperties {
        read: true,
        write_without_response: false,
        write: false,
        notify: false,
    };

    /// Write (with response) only.
    pub const WRITE: Self = CharacteristicProperties {
        read: false,
        write_without_response: false,
        write: true,
        notify: false,
    };

    /// Notify only.
    pub const NOTIFY: Self = CharacteristicProperties {
        read: false,
        write_without_response: false,
        write: false,
        notify: true,
    };

    /// Returns the union of `self` and `other`.
    pub const fn union(self, other: Self) -> Self {
        CharacteristicProperties {
            read: self.read || other.read,
            write_without_response: self.write_without_response || other.write_without_response,
            write: self.write || other.write,
            notify: self.notify || other.notify,
        }
    }

    /// Returns `true` if a central can write to the characteristic in any way.
    pub fn is_writable(&self) -> bool {
        self.write || self.write_without_response
    }
}

/// A characteristic registered as part of a [`ServiceDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacteristicDescriptor {
    uuid: Uuid,
    properties: CharacteristicProperties,
    value: Option<Vec<u8>>,
}

impl CharacteristicDescriptor {
    /// A characteristic whose reads and writes are forwarded to the advertiser.
    pub fn new(uuid: Uuid, properties: CharacteristicProperties) -> Self {
        CharacteristicDescriptor {
            uuid,
            properties,
            value: None,
        }
    }

    /// A characteristic with a static value.
    ///
    /// The platform answers reads of static characteristics itself; they never reach the advertiser.
    pub fn with_value(uuid: Uuid, properties: CharacteristicProperties, value: impl Into<Vec<u8>>) -> Self {
        CharacteristicDescriptor {
            uuid,
            properties,
            value: Some(value.into()),
        }
    }

    /// The [`Uuid`] identifying the type of this characteristic
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The properties of this characteristic
    pub fn properties(&self) -> CharacteristicProperties {
        self.properties
    }

    /// The static value of this characteristic, if it has one
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }
}

/// A primary GATT service and its characteristics.
///
/// Built once with [`ServiceDescriptor::builder`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceDescriptor {
    uuid: Uuid,
    primary: bool,
    characteristics: Vec<CharacteristicDescriptor>,
}

impl ServiceDescriptor {
    /// Starts building a primary service with the given identifier.
    pub fn builder(uuid: Uuid) -> ServiceBuilder {
        ServiceBuilder {
            service: ServiceDescriptor {
                uuid,
                primary: true,
                characteristics: Vec::new(),
            },
        }
    }

    /// The [`Uuid`] identifying the type of this service
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns true if this service is a primary service
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// The characteristics of this service, in registration order
    pub fn characteristics(&self) -> &[CharacteristicDescriptor] {
        &self.characteristics
    }

    /// Finds the characteristic identified by `uuid`
    pub fn characteristic(&self, uuid: Uuid) -> Option<&CharacteristicDescriptor> {
        self.characteristics.iter().find(|c| c.uuid == uuid)
    }
}

/// Builder for [`ServiceDescriptor`].
#[derive(Debug)]
pub struct ServiceBuilder {
    service: ServiceDescriptor,
}

impl ServiceBuilder {
    /// Marks the service as secondary.
    pub fn secondary(mut self) -> Self {
        self.service.primary = false;
        self
    }

    /// Appends a characteristic. A later characteristic with the same [`Uuid`] replaces the earlier one in place.
    pub fn characteristic(mut self, characteristic: CharacteristicDescriptor) -> Self {
        match self
            .service
            .characteristics
            .iter_mut()
            .find(|c| c.uuid == characteristic.uuid)
        {
            Some(existing) => *existing = characteristic,
            None => self.service.characteristics.push(characteristic),
        }
        self
    }

    /// Finishes the service.
    pub fn build(self) -> ServiceDescriptor {
        self.service
    }
}
