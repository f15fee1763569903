use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request never reached the provider, or the connection broke.
    Transport,
    /// The provider rejected the credentials.
    Authentication,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The content is moderated.
    Moderated,
    /// The provider answered with something that cannot be decoded.
    InvalidResponse,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "Transport error"),
            ErrorKind::Authentication => write!(f, "Authentication failed"),
            ErrorKind::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            ErrorKind::Moderated => write!(f, "Content moderated"),
            ErrorKind::InvalidResponse => write!(f, "Invalid response"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}
