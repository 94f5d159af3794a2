use crate::{Error, FramedMessage};

/// Receives notifications about what the [`Advertiser`][crate::Advertiser] is doing, typically to drive a user
/// interface.
///
/// Callbacks are made from whichever task drives the advertiser and must return quickly. They have no way to affect
/// the advertiser.
pub trait Observer: Send + Sync {
    /// Advertising has started.
    fn advertising_started(&self);

    /// A central read the value `value`.
    fn read_value(&self, value: &str);

    /// A central wrote a value, rendered as lower-case hex.
    fn write_value(&self, value: &str);

    /// Advertising stopped because of `error` and will not be retried.
    fn advertising_failed(&self, error: &Error) {
        let _ = error;
    }

    /// A central wrote a well-formed message to the message characteristic.
    fn message_received(&self, message: &FramedMessage) {
        let _ = message;
    }
}
