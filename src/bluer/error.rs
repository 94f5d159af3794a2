use crate::error::ErrorKind;

impl From<bluer::Error> for crate::Error {
    fn from(err: bluer::Error) -> Self {
        crate::Error::new(kind_from_bluer(&err), Some(Box::new(err)), String::new())
    }
}

/// Wraps `err` as the failure of an operation of the given `kind`.
pub(super) fn operation_failed(kind: ErrorKind, err: bluer::Error) -> crate::Error {
    crate::Error::new(kind, Some(Box::new(err)), String::new())
}

fn kind_from_bluer(err: &bluer::Error) -> ErrorKind {
    match err.kind {
        bluer::ErrorKind::NotReady => ErrorKind::TransportUnavailable,
        bluer::ErrorKind::NotAuthorized => ErrorKind::TransportUnavailable,
        bluer::ErrorKind::NotPermitted => ErrorKind::TransportUnavailable,
        bluer::ErrorKind::NotSupported => ErrorKind::TransportUnavailable,
        bluer::ErrorKind::NotFound => ErrorKind::NotFound,
        _ => ErrorKind::Other,
    }
}
