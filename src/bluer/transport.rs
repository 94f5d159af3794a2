use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use bluer::adv::{Advertisement, AdvertisementHandle, Type};
use bluer::gatt::local::{
    Application, ApplicationHandle, Characteristic, CharacteristicNotifier, CharacteristicNotify,
    CharacteristicNotifyMethod, CharacteristicRead, CharacteristicReadRequest, CharacteristicWrite,
    CharacteristicWriteMethod, CharacteristicWriteRequest, ReqError, Service,
};
use bluer::{AdapterEvent, AdapterProperty, Session};
use futures_channel::mpsc;
use futures_lite::StreamExt;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::error::operation_failed;
use crate::error::ErrorKind;
use crate::util::{defer, lock};
use crate::{
    CharacteristicDescriptor, Error, PeripheralEvent, PeripheralTransport, ReadReply, Result, ServiceDescriptor, Uuid,
};

/// Notifications queued per subscribed characteristic before [`PeripheralTransport::update_value`] reports failure.
const NOTIFY_QUEUE_LEN: usize = 16;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type Notifiers = Arc<Mutex<HashMap<Uuid, tokio::sync::mpsc::Sender<Vec<u8>>>>>;

/// Holds the handle of an in-flight or completed registration. Clearing the slot invalidates registrations that
/// have not completed yet.
struct Slot<H> {
    inner: Mutex<(u64, Option<H>)>,
}

impl<H> Slot<H> {
    fn new() -> Arc<Self> {
        Arc::new(Slot {
            inner: Mutex::new((0, None)),
        })
    }

    fn generation(&self) -> u64 {
        lock(&self.inner).0
    }

    /// Stores `handle` unless the slot was cleared after `generation` was read. A rejected handle is dropped, which
    /// unregisters it.
    fn fill(&self, generation: u64, handle: H) -> bool {
        let mut inner = lock(&self.inner);
        if inner.0 == generation {
            inner.1 = Some(handle);
            true
        } else {
            false
        }
    }

    fn clear(&self) -> Option<H> {
        let mut inner = lock(&self.inner);
        inner.0 += 1;
        inner.1.take()
    }

    /// Records the outcome of a request made at `generation`. Returns `None` if the slot was cleared since, whether
    /// the request succeeded or failed; such outcomes belong to a registration nobody is waiting for.
    fn settle<E>(&self, generation: u64, outcome: Result<H, E>) -> Option<Result<(), E>> {
        match outcome {
            Ok(handle) => self.fill(generation, handle).then_some(Ok(())),
            Err(err) => (self.generation() == generation).then_some(Err(err)),
        }
    }
}

/// A [`PeripheralTransport`] backed by the BlueZ daemon.
///
/// Created together with the stream of [`PeripheralEvent`]s it produces; hand both to an
/// [`Advertiser`][crate::Advertiser]. The stream starts with the current power state of the default adapter.
pub struct BluezTransport {
    _session: Session,
    adapter: bluer::Adapter,
    runtime: Handle,
    events: mpsc::UnboundedSender<PeripheralEvent>,
    application: Arc<Slot<ApplicationHandle>>,
    advertisement: Arc<Slot<AdvertisementHandle>>,
    notifiers: Notifiers,
}

impl BluezTransport {
    /// Connects to BlueZ and watches the power state of the default adapter.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn new() -> Result<(Self, mpsc::UnboundedReceiver<PeripheralEvent>)> {
        let runtime = Handle::try_current()
            .map_err(|err| Error::with_source(ErrorKind::TransportUnavailable, err))?;
        let session = Session::new().await?;
        let adapter = session.default_adapter().await?;
        info!("using Bluetooth adapter {}", adapter.name());

        let (events, receiver) = mpsc::unbounded();
        runtime.spawn(watch_radio(adapter.clone(), events.clone()));

        let transport = BluezTransport {
            _session: session,
            adapter,
            runtime,
            events,
            application: Slot::new(),
            advertisement: Slot::new(),
            notifiers: Arc::new(Mutex::new(HashMap::new())),
        };
        Ok((transport, receiver))
    }

    fn application(&self, service: &ServiceDescriptor) -> Application {
        Application {
            services: vec![Service {
                uuid: service.uuid(),
                primary: service.is_primary(),
                characteristics: service
                    .characteristics()
                    .iter()
                    .map(|characteristic| self.characteristic(characteristic))
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn characteristic(&self, descriptor: &CharacteristicDescriptor) -> Characteristic {
        let uuid = descriptor.uuid();
        let properties = descriptor.properties();

        let read = properties.read.then(|| {
            let events = self.events.clone();
            let value = descriptor.value().map(<[u8]>::to_vec);
            CharacteristicRead {
                read: true,
                fun: Box::new(
                    move |request: CharacteristicReadRequest| -> BoxFuture<Result<Vec<u8>, ReqError>> {
                        let offset = request.offset;
                        if let Some(value) = value.clone() {
                            return Box::pin(async move { value_from(value, offset) });
                        }
                        let (reply, receiver) = ReadReply::channel();
                        let sent = events.unbounded_send(PeripheralEvent::ReadRequested {
                            characteristic: uuid,
                            reply: Some(reply),
                        });
                        Box::pin(async move {
                            sent.map_err(|_| ReqError::Failed)?;
                            let value = receiver.await.map_err(|_| ReqError::Failed)?;
                            value_from(value, offset)
                        })
                    },
                ),
                ..Default::default()
            }
        });

        let write = properties.is_writable().then(|| {
            let events = self.events.clone();
            CharacteristicWrite {
                write: properties.write,
                write_without_response: properties.write_without_response,
                method: CharacteristicWriteMethod::Fun(Box::new(
                    move |value: Vec<u8>, _request: CharacteristicWriteRequest| -> BoxFuture<Result<(), ReqError>> {
                        let result = events
                            .unbounded_send(PeripheralEvent::WriteRequested {
                                characteristic: uuid,
                                value,
                            })
                            .map_err(|_| ReqError::Failed);
                        Box::pin(async move { result })
                    },
                )),
                ..Default::default()
            }
        });

        let notify = properties.notify.then(|| {
            let events = self.events.clone();
            let notifiers = self.notifiers.clone();
            CharacteristicNotify {
                notify: true,
                method: CharacteristicNotifyMethod::Fun(Box::new(
                    move |notifier: CharacteristicNotifier| -> BoxFuture<()> {
                        Box::pin(forward_notifications(uuid, notifier, events.clone(), notifiers.clone()))
                    },
                )),
                ..Default::default()
            }
        });

        Characteristic {
            uuid,
            read,
            write,
            notify,
            ..Default::default()
        }
    }
}

impl PeripheralTransport for BluezTransport {
    fn add_service(&mut self, service: &ServiceDescriptor) {
        let application = self.application(service);
        let adapter = self.adapter.clone();
        let events = self.events.clone();
        let slot = self.application.clone();
        let generation = slot.generation();
        let uuid = service.uuid();

        self.runtime.spawn(async move {
            let outcome = adapter
                .serve_gatt_application(application)
                .await
                .map_err(|err| operation_failed(ErrorKind::RegistrationFailed, err));
            match slot.settle(generation, outcome) {
                Some(result) => {
                    let _ = events.unbounded_send(PeripheralEvent::ServiceAdded { service: uuid, result });
                }
                None => debug!("discarding stale registration outcome of {}", uuid),
            }
        });
    }

    fn start_advertising(&mut self, local_name: &str, services: &[Uuid]) {
        let advertisement = Advertisement {
            advertisement_type: Type::Peripheral,
            service_uuids: services.iter().copied().collect(),
            local_name: Some(local_name.to_string()),
            discoverable: Some(true),
            ..Default::default()
        };
        let adapter = self.adapter.clone();
        let events = self.events.clone();
        let slot = self.advertisement.clone();
        let generation = slot.generation();

        self.runtime.spawn(async move {
            let outcome = adapter
                .advertise(advertisement)
                .await
                .map_err(|err| operation_failed(ErrorKind::AdvertisingFailed, err));
            match slot.settle(generation, outcome) {
                Some(result) => {
                    let _ = events.unbounded_send(PeripheralEvent::AdvertisingStarted { result });
                }
                None => debug!("discarding stale advertising outcome"),
            }
        });
    }

    fn stop_advertising(&mut self) {
        if self.advertisement.clear().is_some() {
            debug!("advertisement released");
        }
    }

    fn update_value(&mut self, characteristic: Uuid, value: &[u8]) -> bool {
        match lock(&self.notifiers).get(&characteristic) {
            Some(sender) => sender.try_send(value.to_vec()).is_ok(),
            None => {
                debug!("no central subscribed to {}", characteristic);
                false
            }
        }
    }

    fn remove_all_services(&mut self) {
        lock(&self.notifiers).clear();
        if self.application.clear().is_some() {
            debug!("GATT application released");
        }
    }
}

/// The part of a characteristic value a (possibly blob) read starting at `offset` asks for.
fn value_from(mut value: Vec<u8>, offset: u16) -> Result<Vec<u8>, ReqError> {
    let offset = usize::from(offset);
    if offset > value.len() {
        return Err(ReqError::InvalidOffset);
    }
    Ok(value.split_off(offset))
}

async fn watch_radio(adapter: bluer::Adapter, events: mpsc::UnboundedSender<PeripheralEvent>) {
    let stream = match adapter.events().await {
        Ok(stream) => stream,
        Err(err) => {
            warn!("cannot watch adapter {}: {}", adapter.name(), err);
            return;
        }
    };
    let mut stream = Box::pin(stream);

    let powered = match adapter.is_powered().await {
        Ok(powered) => powered,
        Err(err) => {
            warn!("cannot read power state of {}: {}", adapter.name(), err);
            false
        }
    };
    if events
        .unbounded_send(PeripheralEvent::RadioStateChanged { ready: powered })
        .is_err()
    {
        return;
    }

    while let Some(event) = stream.next().await {
        if let AdapterEvent::PropertyChanged(AdapterProperty::Powered(ready)) = event {
            debug!("adapter {} powered: {}", adapter.name(), ready);
            if events.unbounded_send(PeripheralEvent::RadioStateChanged { ready }).is_err() {
                break;
            }
        }
    }
}

async fn forward_notifications(
    characteristic: Uuid,
    mut notifier: CharacteristicNotifier,
    events: mpsc::UnboundedSender<PeripheralEvent>,
    notifiers: Notifiers,
) {
    let (sender, mut receiver) = tokio::sync::mpsc::channel(NOTIFY_QUEUE_LEN);
    lock(&notifiers).insert(characteristic, sender.clone());
    let _unregister = defer(|| {
        let mut notifiers = lock(&notifiers);
        if notifiers
            .get(&characteristic)
            .map_or(false, |current| current.same_channel(&sender))
        {
            notifiers.remove(&characteristic);
        }
    });
    let _ = events.unbounded_send(PeripheralEvent::Subscribed { characteristic });

    loop {
        let value = tokio::select! {
            value = receiver.recv() => value,
            _ = notifier.stopped() => None,
        };
        let value = match value {
            Some(value) => value,
            None => break,
        };
        if let Err(err) = notifier.notify(value).await {
            warn!("notification on {} failed: {}", characteristic, err);
            break;
        }
    }

    let _ = events.unbounded_send(PeripheralEvent::Unsubscribed { characteristic });
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cleared_slot_rejects_late_handles() {
        let slot = Slot::new();
        let generation = slot.generation();
        assert!(slot.fill(generation, "first"));
        assert_eq!(slot.clear(), Some("first"));

        assert!(!slot.fill(generation, "late"));
        assert_eq!(slot.clear(), None);

        let generation = slot.generation();
        assert!(slot.fill(generation, "second"));
        assert_eq!(slot.clear(), Some("second"));
    }

    #[test]
    fn stale_outcomes_are_not_reported() {
        let slot = Slot::<&str>::new();
        let stale = slot.generation();
        slot.clear();

        assert_eq!(slot.settle(stale, Err("registration failed")), None);
        assert_eq!(slot.settle::<&str>(stale, Ok("old handle")), None);
        assert_eq!(slot.clear(), None);

        let current = slot.generation();
        assert_eq!(slot.settle(current, Err("registration failed")), Some(Err("registration failed")));
        assert_eq!(slot.settle::<&str>(current, Ok("handle")), Some(Ok(())));
        assert_eq!(slot.clear(), Some("handle"));
    }

    #[test]
    fn reads_honor_the_offset() {
        let value = b"AD34E".to_vec();
        assert_eq!(value_from(value.clone(), 0).unwrap(), b"AD34E");
        assert_eq!(value_from(value.clone(), 2).unwrap(), b"34E");
        assert_eq!(value_from(value.clone(), 5).unwrap(), b"");
        assert!(matches!(value_from(value, 6), Err(ReqError::InvalidOffset)));
    }
}
