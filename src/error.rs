//! Broadcaster errors

/// The error type for peripheral operations
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    message: String,
}

impl Error {
    pub(crate) fn new(
        kind: ErrorKind,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
        message: String,
    ) -> Self {
        Error { kind, source, message }
    }

    /// Creates an error of the given `kind` with a descriptive message.
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error::new(kind, None, message.into())
    }

    /// Creates an error of the given `kind` wrapping a platform-specific `source` error.
    pub fn with_source(kind: ErrorKind, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::new(kind, Some(Box::new(source)), String::new())
    }

    /// Returns the corresponding [ErrorKind] for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message for this error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.message.is_empty(), &self.source) {
            (true, None) => write!(f, "{}", &self.kind),
            (false, None) => write!(f, "{}: {}", &self.kind, &self.message),
            (true, Some(err)) => write!(f, "{}: {}", &self.kind, err),
            (false, Some(err)) => write!(f, "{}: {} ({})", &self.kind, &self.message, err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|x| {
            let x: &(dyn std::error::Error + 'static) = &**x;
            x
        })
    }
}

/// A list of general categories of peripheral error.
#[non_exhaustive]
#[derive(Debug, displaydoc::Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// the GATT service could not be registered
    RegistrationFailed,
    /// advertising could not be started
    AdvertisingFailed,
    /// the Bluetooth transport is not available
    TransportUnavailable,
    /// the value could not be delivered to subscribed centrals
    WriteDeliveryFailed,
    /// gave up after repeated failures
    RetriesExhausted,
    /// invalid message
    InvalidMessage,
    /// not found
    NotFound,
    /// error
    Other,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error {
            kind,
            source: None,
            message: String::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Error::from(ErrorKind::TransportUnavailable).to_string(),
            "the Bluetooth transport is not available"
        );
        assert_eq!(
            Error::with_message(ErrorKind::InvalidMessage, "unknown message id 0x7f").to_string(),
            "invalid message: unknown message id 0x7f"
        );

        let io = std::io::Error::new(std::io::ErrorKind::Other, "radio off");
        let err = Error::with_source(ErrorKind::AdvertisingFailed, io);
        assert_eq!(err.to_string(), "advertising could not be started: radio off");
        assert!(std::error::Error::source(&err).is_some());
    }
}
