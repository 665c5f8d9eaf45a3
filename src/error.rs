use std::fmt;

use thiserror::Error;

use crate::fleet::PlacementError;

/// Normalized shape of every failure the server or network produces.
///
/// `message` is always present; `status` is absent for transport-level
/// failures where no response reached the client; `code` is whatever
/// machine-readable tag the server attached, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
    pub code: Option<String>,
}

impl ApiError {
    /// A failure with no HTTP response at all (DNS, refused, timeout...).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            code: None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Api(ApiError),

    /// Refresh token absent or renewal rejected. Credentials have already
    /// been purged when this surfaces; the caller must treat the session as
    /// logged out.
    #[error("session expired")]
    SessionExpired,

    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Local gate: the cached view does not say it is our turn.
    #[error("not your turn")]
    OutOfTurn,

    /// Local gate: the match has finished; only navigation away remains.
    #[error("match is already finished")]
    MatchOver,

    /// The server answered successfully but the body did not match the
    /// expected shape (including unrecognized phase values).
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
