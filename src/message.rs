//! Framed messages exchanged with an accessory over a GATT characteristic.
//!
//! A message is a single [`MessageId`] byte followed by an opaque payload. There is no length prefix: the message
//! ends where the characteristic value ends, and any size limit is imposed by the transport's MTU.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::ErrorKind;
use crate::{Error, Result};

/// Message kinds understood by the accessory protocol.
#[repr(u8)]
#[derive(Debug, displaydoc::Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageId {
    /// accessory configuration data
    AccessoryConfigurationData = 0x1,
    /// accessory UWB did start
    AccessoryUwbDidStart = 0x2,
    /// accessory UWB did stop
    AccessoryUwbDidStop = 0x3,
    /// initialize
    Initialize = 0xA,
    /// configure and start
    ConfigureAndStart = 0xB,
    /// stop
    Stop = 0xC,
}

impl MessageId {
    /// Returns `true` for messages sent by the accessory, `false` for messages sent to it.
    pub fn is_from_accessory(self) -> bool {
        matches!(
            self,
            MessageId::AccessoryConfigurationData | MessageId::AccessoryUwbDidStart | MessageId::AccessoryUwbDidStop
        )
    }
}

/// A message tag together with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FramedMessage {
    id: MessageId,
    payload: Vec<u8>,
}

impl FramedMessage {
    /// Creates a message with the given tag and payload.
    pub fn new(id: MessageId, payload: impl Into<Vec<u8>>) -> Self {
        FramedMessage {
            id,
            payload: payload.into(),
        }
    }

    /// The message tag.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// The message payload, without the tag byte.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the message and returns its payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Encodes the message into its wire representation.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.payload.len());
        buf.push(self.id.into());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Decodes a message from its wire representation.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (&tag, payload) = bytes
            .split_first()
            .ok_or_else(|| Error::with_message(ErrorKind::InvalidMessage, "empty message"))?;
        let id = MessageId::try_from(tag).map_err(|err| {
            Error::with_message(ErrorKind::InvalidMessage, format!("unknown message id {:#04x}", err.number))
        })?;
        Ok(FramedMessage::new(id, payload))
    }
}

impl TryFrom<&[u8]> for FramedMessage {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        FramedMessage::decode(bytes)
    }
}
