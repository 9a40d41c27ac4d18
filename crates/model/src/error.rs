use std::fmt::{self, Display, Formatter};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request was rejected as malformed, e.g. a context was passed
    /// to a model that doesn't accept one.
    InvalidRequest,
    /// The credentials are missing, expired or lack permissions.
    Unauthenticated,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidRequest => write!(f, "invalid request"),
            ErrorKind::Unauthenticated => write!(f, "unauthenticated"),
            ErrorKind::RateLimitExceeded => write!(f, "rate limit exceeded"),
            ErrorKind::Other => write!(f, "other"),
        }
    }
}
