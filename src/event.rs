use futures_channel::oneshot;
use uuid::Uuid;

use crate::Result;

/// Events produced by a platform transport.
///
/// Every outcome of a [`PeripheralTransport`][crate::PeripheralTransport] request, and every request made by a
/// remote central, arrives as one of these. They are meant to be consumed in order from a single queue, see
/// [`Advertiser::run`][crate::Advertiser::run].
#[allow(missing_docs)]
#[derive(Debug)]
#[non_exhaustive]
pub enum PeripheralEvent {
    /// The radio became usable (`ready == true`) or unusable.
    RadioStateChanged {
        ready: bool,
    },

    ServiceAdded {
        service: Uuid,
        result: Result<()>,
    },

    AdvertisingStarted {
        result: Result<()>,
    },

    /// A central subscribed to notifications on `characteristic`.
    Subscribed {
        characteristic: Uuid,
    },

    Unsubscribed {
        characteristic: Uuid,
    },

    /// A central read a characteristic without a static value. If `reply` is present the value must be sent
    /// through it.
    ReadRequested {
        characteristic: Uuid,
        reply: Option<ReadReply>,
    },

    WriteRequested {
        characteristic: Uuid,
        value: Vec<u8>,
    },
}

/// The pending response to a [`PeripheralEvent::ReadRequested`].
#[derive(Debug)]
pub struct ReadReply(oneshot::Sender<Vec<u8>>);

impl ReadReply {
    /// Creates a reply and the receiver on which the value will arrive.
    pub fn channel() -> (Self, oneshot::Receiver<Vec<u8>>) {
        let (sender, receiver) = oneshot::channel();
        (ReadReply(sender), receiver)
    }

    /// Answers the read. Returns `false` if the requester has gone away.
    pub fn send(self, value: Vec<u8>) -> bool {
        self.0.send(value).is_ok()
    }
}

/// Radio lifecycle callbacks.
pub trait RadioHandler {
    /// The radio became usable (`true`) or unusable (`false`).
    fn on_radio_ready(&mut self, ready: bool);
}

/// GATT lifecycle callbacks.
pub trait GattHandler {
    /// Outcome of a [`add_service`][crate::PeripheralTransport::add_service] request.
    fn on_service_registered(&mut self, result: Result<()>);

    /// Outcome of a [`start_advertising`][crate::PeripheralTransport::start_advertising] request.
    fn on_advertising_started(&mut self, result: Result<()>);
}

/// Data exchange callbacks.
pub trait DataHandler {
    /// A central subscribed to `characteristic`.
    fn on_subscribe(&mut self, characteristic: Uuid);

    /// A central unsubscribed from `characteristic`.
    fn on_unsubscribe(&mut self, characteristic: Uuid);

    /// Returns the value to answer the read with.
    fn on_read_request(&mut self, characteristic: Uuid) -> Vec<u8>;

    /// A central wrote `value` to `characteristic`.
    fn on_write_request(&mut self, characteristic: Uuid, value: &[u8]);
}

impl PeripheralEvent {
    /// Delivers this event to the handler responsible for it.
    pub fn dispatch<H>(self, handler: &mut H)
    where
        H: RadioHandler + GattHandler + DataHandler + ?Sized,
    {
        match self {
            PeripheralEvent::RadioStateChanged { ready } => handler.on_radio_ready(ready),
            PeripheralEvent::ServiceAdded { result, .. } => handler.on_service_registered(result),
            PeripheralEvent::AdvertisingStarted { result } => handler.on_advertising_started(result),
            PeripheralEvent::Subscribed { characteristic } => handler.on_subscribe(characteristic),
            PeripheralEvent::Unsubscribed { characteristic } => handler.on_unsubscribe(characteristic),
            PeripheralEvent::ReadRequested { characteristic, reply } => {
                let value = handler.on_read_request(characteristic);
                if let Some(reply) = reply {
                    if !reply.send(value) {
                        tracing::debug!("read of {} was abandoned before it was answered", characteristic);
                    }
                }
            }
            PeripheralEvent::WriteRequested { characteristic, value } => {
                handler.on_write_request(characteristic, &value)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl RadioHandler for Recorder {
        fn on_radio_ready(&mut self, ready: bool) {
            self.calls.push(format!("radio {ready}"));
        }
    }

    impl GattHandler for Recorder {
        fn on_service_registered(&mut self, result: Result<()>) {
            self.calls.push(format!("registered {}", result.is_ok()));
        }

        fn on_advertising_started(&mut self, result: Result<()>) {
            self.calls.push(format!("advertising {}", result.is_ok()));
        }
    }

    impl DataHandler for Recorder {
        fn on_subscribe(&mut self, _characteristic: Uuid) {
            self.calls.push("subscribe".into());
        }

        fn on_unsubscribe(&mut self, _characteristic: Uuid) {
            self.calls.push("unsubscribe".into());
        }

        fn on_read_request(&mut self, _characteristic: Uuid) -> Vec<u8> {
            self.calls.push("read".into());
            b"value".to_vec()
        }

        fn on_write_request(&mut self, _characteristic: Uuid, value: &[u8]) {
            self.calls.push(format!("write {}", value.len()));
        }
    }

    #[test]
    fn dispatch_routes_to_handlers() {
        let mut recorder = Recorder::default();
        let characteristic = Uuid::from_u128(7);

        PeripheralEvent::RadioStateChanged { ready: true }.dispatch(&mut recorder);
        PeripheralEvent::ServiceAdded {
            service: Uuid::from_u128(1),
            result: Ok(()),
        }
        .dispatch(&mut recorder);
        PeripheralEvent::AdvertisingStarted {
            result: Err(crate::error::ErrorKind::AdvertisingFailed.into()),
        }
        .dispatch(&mut recorder);
        PeripheralEvent::Subscribed { characteristic }.dispatch(&mut recorder);
        PeripheralEvent::WriteRequested {
            characteristic,
            value: vec![1, 2],
        }
        .dispatch(&mut recorder);
        PeripheralEvent::Unsubscribed { characteristic }.dispatch(&mut recorder);

        assert_eq!(
            recorder.calls,
            [
                "radio true",
                "registered true",
                "advertising false",
                "subscribe",
                "write 2",
                "unsubscribe"
            ]
        );
    }

    #[test]
    fn read_reply_carries_value() {
        let mut recorder = Recorder::default();
        let (reply, mut receiver) = ReadReply::channel();

        PeripheralEvent::ReadRequested {
            characteristic: Uuid::from_u128(7),
            reply: Some(reply),
        }
        .dispatch(&mut recorder);

        assert_eq!(receiver.try_recv().unwrap(), Some(b"value".to_vec()));
    }
}
