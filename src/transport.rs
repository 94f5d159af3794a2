use uuid::Uuid;

use crate::ServiceDescriptor;

/// The operations an [`Advertiser`][crate::Advertiser] needs from the platform Bluetooth stack.
///
/// Requests are fire-and-forget: an implementation must not block, and reports the outcome of
/// [`add_service`][Self::add_service] and [`start_advertising`][Self::start_advertising] later as a
/// [`PeripheralEvent`][crate::PeripheralEvent]. There is no way to cancel a request once it is made.
pub trait PeripheralTransport {
    /// Publishes `service` in the local GATT database.
    ///
    /// Answered by [`PeripheralEvent::ServiceAdded`][crate::PeripheralEvent::ServiceAdded].
    fn add_service(&mut self, service: &ServiceDescriptor);

    /// Starts advertising `local_name` and the given service identifiers.
    ///
    /// Answered by [`PeripheralEvent::AdvertisingStarted`][crate::PeripheralEvent::AdvertisingStarted].
    fn start_advertising(&mut self, local_name: &str, services: &[Uuid]);

    /// Stops advertising. Does nothing if not advertising.
    fn stop_advertising(&mut self);

    /// Sends `value` to every central subscribed to `characteristic`.
    ///
    /// Returns `false` if the update could not be queued, for example because the transmit queue is full or
    /// nobody is subscribed.
    fn update_value(&mut self, characteristic: Uuid, value: &[u8]) -> bool;

    /// Removes every service published by this transport.
    fn remove_all_services(&mut self);
}

impl<T: PeripheralTransport + ?Sized> PeripheralTransport for Box<T> {
    fn add_service(&mut self, service: &ServiceDescriptor) {
        (**self).add_service(service)
    }

    fn start_advertising(&mut self, local_name: &str, services: &[Uuid]) {
        (**self).start_advertising(local_name, services)
    }

    fn stop_advertising(&mut self) {
        (**self).stop_advertising()
    }

    fn update_value(&mut self, characteristic: Uuid, value: &[u8]) -> bool {
        (**self).update_value(characteristic, value)
    }

    fn remove_all_services(&mut self) {
        (**self).remove_all_services()
    }
}
