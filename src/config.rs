//! Advertiser configuration

use uuid::Uuid;

use crate::FramedMessage;

/// What to do when a central subscribes to a characteristic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubscribePolicy {
    /// Only log the subscription.
    #[default]
    Observe,
    /// Send these bytes to the subscribed characteristic.
    Push(Vec<u8>),
}

impl SubscribePolicy {
    /// Pushes the encoded `message` on subscribe.
    pub fn framed(message: &FramedMessage) -> Self {
        SubscribePolicy::Push(message.encode())
    }

    /// The bytes to push, if any.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            SubscribePolicy::Observe => None,
            SubscribePolicy::Push(payload) => Some(payload),
        }
    }
}

/// How registration and advertising failures are retried.
///
/// A retry tears the service down and registers it again. The budget is shared by both kinds of failure and is
/// restored once advertising succeeds or [`Advertiser::start`][crate::Advertiser::start] is called explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Number of retries before giving up. Zero disables retrying.
    pub max_attempts: u32,
    /// Retry when advertising fails, not only when registration fails.
    pub retry_advertising_failures: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_advertising_failures: true,
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn never() -> Self {
        Self {
            max_attempts: 0,
            retry_advertising_failures: false,
        }
    }
}

/// Configuration for [`Advertiser`][crate::Advertiser]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdvertiserConfig {
    /// Local name included in advertisements
    pub local_name: String,
    /// Value returned for every read of a characteristic without a static value
    pub read_value: String,
    /// Behavior on subscribe
    pub subscribe: SubscribePolicy,
    /// Characteristic whose writes carry framed messages
    pub message_characteristic: Option<Uuid>,
    /// Failure handling
    pub retry: RetryPolicy,
}

impl Default for AdvertiserConfig {
    fn default() -> Self {
        Self {
            local_name: "BLEPeripheralApp".to_string(),
            read_value: "AD34E".to_string(),
            subscribe: SubscribePolicy::Observe,
            message_characteristic: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl AdvertiserConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the advertised local name
    pub fn with_local_name(mut self, name: impl Into<String>) -> Self {
        self.local_name = name.into();
        self
    }

    /// Set the value returned for reads
    pub fn with_read_value(mut self, value: impl Into<String>) -> Self {
        self.read_value = value.into();
        self
    }

    /// Set the behavior on subscribe
    pub fn with_subscribe_policy(mut self, policy: SubscribePolicy) -> Self {
        self.subscribe = policy;
        self
    }

    /// Decode writes to `characteristic` as framed messages
    pub fn with_message_characteristic(mut self, characteristic: Uuid) -> Self {
        self.message_characteristic = Some(characteristic);
        self
    }

    /// Set the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
