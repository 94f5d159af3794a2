use std::sync::Arc;

use futures_core::Stream;
use futures_lite::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ErrorKind;
use crate::{
    AdvertiserConfig, DataHandler, Error, FramedMessage, GattHandler, Observer, PeripheralEvent, PeripheralTransport,
    RadioHandler, Result, ServiceDescriptor,
};

/// The lifecycle of an [`Advertiser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdvertiserState {
    /// Nothing is registered. Either the radio is not ready or [`Advertiser::start`] has not been called.
    NotReady,
    /// The service has been handed to the transport and its registration outcome is pending.
    ReadyPendingStart,
    /// The service is registered and advertising has been requested.
    ServiceRegistered,
    /// The service is being advertised.
    Advertising,
    /// Registration or advertising failed. Left automatically if a retry is attempted.
    Failed,
}

/// Publishes one GATT service and advertises it once the radio is ready.
///
/// Radio readiness is asynchronous and may be reported before or after [`start`][Self::start] is called. The
/// advertiser records the intent to start and only registers the service once both have happened, exactly once per
/// attempt. Failed attempts are torn down and retried according to the configured
/// [`RetryPolicy`][crate::RetryPolicy].
///
/// All methods take `&mut self`: events must be fed from a single task, in the order the transport produced them,
/// either one by one with [`handle_event`][Self::handle_event] or with [`run`][Self::run].
pub struct Advertiser<T> {
    transport: T,
    service: ServiceDescriptor,
    config: AdvertiserConfig,
    observer: Option<Arc<dyn Observer>>,
    state: AdvertiserState,
    radio_ready: bool,
    start_requested: bool,
    retries: u32,
}

impl<T: PeripheralTransport> Advertiser<T> {
    /// Creates an advertiser publishing `service` through `transport`.
    pub fn new(transport: T, service: ServiceDescriptor, config: AdvertiserConfig) -> Self {
        Advertiser {
            transport,
            service,
            config,
            observer: None,
            state: AdvertiserState::NotReady,
            radio_ready: false,
            start_requested: false,
            retries: 0,
        }
    }

    /// Sets the observer notified of advertising, reads and writes, replacing any previous one.
    pub fn set_observer(&mut self, observer: Arc<dyn Observer>) {
        self.observer = Some(observer);
    }

    /// Builder-style variant of [`set_observer`][Self::set_observer].
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.set_observer(observer);
        self
    }

    /// The current state
    pub fn state(&self) -> AdvertiserState {
        self.state
    }

    /// The published service
    pub fn service(&self) -> &ServiceDescriptor {
        &self.service
    }

    /// The configuration
    pub fn config(&self) -> &AdvertiserConfig {
        &self.config
    }

    /// The transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns `true` if the radio last reported itself usable.
    pub fn is_radio_ready(&self) -> bool {
        self.radio_ready
    }

    /// Returns `true` while the service is being advertised.
    pub fn is_advertising(&self) -> bool {
        self.state == AdvertiserState::Advertising
    }

    /// Number of retries made since the last success or explicit [`start`][Self::start].
    pub fn retry_count(&self) -> u32 {
        self.retries
    }

    /// Registers the service and starts advertising, as soon as the radio is ready.
    ///
    /// Does nothing if a registration is already pending or the service is registered or advertised. Calling it after
    /// a failure restores the retry budget and registers again.
    pub fn start(&mut self) {
        match self.state {
            AdvertiserState::ReadyPendingStart | AdvertiserState::ServiceRegistered | AdvertiserState::Advertising => {
                debug!("start ignored in state {:?}", self.state);
                return;
            }
            AdvertiserState::Failed => self.retries = 0,
            AdvertiserState::NotReady => {}
        }

        self.start_requested = true;
        if self.radio_ready {
            self.register();
        } else {
            debug!("radio not ready, deferring registration of {}", self.service.uuid());
        }
    }

    /// Stops advertising and removes the service. The advertiser stays idle until [`start`][Self::start] is called
    /// again.
    pub fn stop(&mut self) {
        self.start_requested = false;
        self.retries = 0;
        if self.state != AdvertiserState::NotReady {
            self.transport.stop_advertising();
            self.transport.remove_all_services();
            self.set_state(AdvertiserState::NotReady);
            info!("stopped advertising {}", self.service.uuid());
        }
    }

    /// Sends `value` to the centrals subscribed to `characteristic`.
    ///
    /// Fails with [`ErrorKind::TransportUnavailable`] if the service is not currently published,
    /// [`ErrorKind::NotFound`] if `characteristic` is not part of it and [`ErrorKind::WriteDeliveryFailed`] if the
    /// transport refused the update.
    pub fn send(&mut self, characteristic: Uuid, value: &[u8]) -> Result<()> {
        if !self.radio_ready
            || !matches!(
                self.state,
                AdvertiserState::ServiceRegistered | AdvertiserState::Advertising
            )
        {
            return Err(Error::with_message(
                ErrorKind::TransportUnavailable,
                format!("service not published (state {:?})", self.state),
            ));
        }

        let descriptor = self.service.characteristic(characteristic).ok_or_else(|| {
            Error::with_message(
                ErrorKind::NotFound,
                format!("characteristic {} is not part of service {}", characteristic, self.service.uuid()),
            )
        })?;
        if !descriptor.properties().notify {
            return Err(Error::with_message(
                ErrorKind::WriteDeliveryFailed,
                format!("characteristic {} does not support notifications", characteristic),
            ));
        }

        if self.transport.update_value(characteristic, value) {
            Ok(())
        } else {
            Err(ErrorKind::WriteDeliveryFailed.into())
        }
    }

    /// Encodes `message` and [`send`][Self::send]s it.
    pub fn send_message(&mut self, characteristic: Uuid, message: &FramedMessage) -> Result<()> {
        self.send(characteristic, &message.encode())
    }

    /// Processes one event from the transport.
    pub fn handle_event(&mut self, event: PeripheralEvent) {
        event.dispatch(self)
    }

    /// Processes `events` in order until the stream ends.
    pub async fn run<S>(&mut self, mut events: S)
    where
        S: Stream<Item = PeripheralEvent> + Unpin,
    {
        while let Some(event) = events.next().await {
            self.handle_event(event);
        }
        debug!("event stream closed");
    }

    fn set_state(&mut self, state: AdvertiserState) {
        if self.state != state {
            debug!("advertiser state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn register(&mut self) {
        debug!("registering service {}", self.service.uuid());
        self.set_state(AdvertiserState::ReadyPendingStart);
        self.transport.add_service(&self.service);
    }

    fn fail(&mut self, error: Error, retry: bool) {
        self.set_state(AdvertiserState::Failed);
        self.transport.remove_all_services();

        if !retry {
            self.notify_failure(&error);
            return;
        }

        if self.retries < self.config.retry.max_attempts {
            self.retries += 1;
            info!(
                "retrying registration of {} ({}/{})",
                self.service.uuid(),
                self.retries,
                self.config.retry.max_attempts
            );
            self.register();
        } else {
            let error = Error::new(
                ErrorKind::RetriesExhausted,
                Some(Box::new(error)),
                format!("gave up after {} retries", self.retries),
            );
            self.notify_failure(&error);
        }
    }

    fn notify_failure(&self, error: &Error) {
        error!("advertising {} failed: {}", self.service.uuid(), error);
        if let Some(observer) = &self.observer {
            observer.advertising_failed(error);
        }
    }
}

impl<T: PeripheralTransport> RadioHandler for Advertiser<T> {
    fn on_radio_ready(&mut self, ready: bool) {
        if !ready {
            self.radio_ready = false;
            if self.state != AdvertiserState::NotReady {
                warn!("radio became unavailable while {:?}", self.state);
                self.transport.stop_advertising();
                self.transport.remove_all_services();
                self.retries = 0;
                self.set_state(AdvertiserState::NotReady);
            }
            return;
        }

        self.radio_ready = true;
        if self.start_requested && self.state == AdvertiserState::NotReady {
            self.register();
        }
    }
}

impl<T: PeripheralTransport> GattHandler for Advertiser<T> {
    fn on_service_registered(&mut self, result: Result<()>) {
        if self.state != AdvertiserState::ReadyPendingStart {
            debug!("ignoring registration outcome in state {:?}", self.state);
            return;
        }

        match result {
            Ok(()) => {
                self.set_state(AdvertiserState::ServiceRegistered);
                self.transport
                    .start_advertising(&self.config.local_name, &[self.service.uuid()]);
            }
            Err(err) => {
                warn!("add service failed: {}", err);
                self.fail(err, true);
            }
        }
    }

    fn on_advertising_started(&mut self, result: Result<()>) {
        if self.state != AdvertiserState::ServiceRegistered {
            debug!("ignoring advertising outcome in state {:?}", self.state);
            return;
        }

        match result {
            Ok(()) => {
                self.retries = 0;
                self.set_state(AdvertiserState::Advertising);
                info!("advertising {} as {:?}", self.service.uuid(), self.config.local_name);
                if let Some(observer) = &self.observer {
                    observer.advertising_started();
                }
            }
            Err(err) => {
                warn!("advertising failed: {}", err);
                let retry = self.config.retry.retry_advertising_failures;
                self.fail(err, retry);
            }
        }
    }
}

impl<T: PeripheralTransport> DataHandler for Advertiser<T> {
    fn on_subscribe(&mut self, characteristic: Uuid) {
        info!("characteristic {} subscribed", characteristic);

        let payload = match self.config.subscribe.payload() {
            Some(payload) => payload.to_vec(),
            None => return,
        };
        match self.send(characteristic, &payload) {
            Ok(()) => debug!("sent {} bytes to {}", payload.len(), characteristic),
            Err(err) => warn!("failed to send data to {}: {}", characteristic, err),
        }
    }

    fn on_unsubscribe(&mut self, characteristic: Uuid) {
        info!("characteristic {} unsubscribed", characteristic);
    }

    fn on_read_request(&mut self, characteristic: Uuid) -> Vec<u8> {
        debug!("read request for {}", characteristic);
        if let Some(observer) = &self.observer {
            observer.read_value(&self.config.read_value);
        }
        self.config.read_value.as_bytes().to_vec()
    }

    fn on_write_request(&mut self, characteristic: Uuid, value: &[u8]) {
        if value.is_empty() {
            debug!("ignoring empty write to {}", characteristic);
            return;
        }

        let text = hex::encode(value);
        debug!("write to {}: {}", characteristic, text);
        if let Some(observer) = &self.observer {
            observer.write_value(&text);
        }

        if self.config.message_characteristic == Some(characteristic) {
            match FramedMessage::decode(value) {
                Ok(message) => {
                    debug!("received {} ({} byte payload)", message.id(), message.payload().len());
                    if let Some(observer) = &self.observer {
                        observer.message_received(&message);
                    }
                }
                Err(err) => warn!("undecodable message on {}: {}", characteristic, err),
            }
        }
    }
}
