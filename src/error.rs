//! Error types shared by the fetcher, the resource modules and the
//! credential store.
//!
//! Every failure a backend call can produce is folded into [`ApiError`]; the
//! `Display` impl is the message shown to the operator.

use thiserror::Error;

/// Message used when the backend rejects a request without a usable
/// `message` field in its JSON body.
pub const GENERIC_REQUEST_ERROR: &str = "The request could not be completed";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("{0}")]
    Network(String),

    /// 401 with no stored token, or a stored token past its `exp` claim.
    /// The session has already been cleared when this is returned.
    #[error("Your session has expired, please sign in again")]
    SessionExpired,

    /// 401 while a seemingly valid token is stored.
    #[error("You are not authorized to perform this action")]
    Authorization,

    /// Any other non-success status. `message` is the backend's own text
    /// when it sent one, otherwise [`GENERIC_REQUEST_ERROR`].
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The backend answered 2xx but the body was not the expected JSON.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The request could not be built (bad URL, bad method, unserializable body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The session could not be persisted after a successful login.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A resource module replaced the underlying error with a message
    /// specific to the operation.
    #[error("{message}")]
    Domain {
        message: String,
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    /// Wrap `self` behind an operation-specific message.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        ApiError::Domain {
            message: message.into(),
            source: Box::new(self),
        }
    }

    /// HTTP status of the originating response, looking through
    /// [`ApiError::Domain`] wrappers.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::SessionExpired | ApiError::Authorization => Some(401),
            ApiError::Domain { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        match self {
            ApiError::SessionExpired => true,
            ApiError::Domain { source, .. } => source.is_session_expired(),
            _ => false,
        }
    }

    pub fn is_network(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Domain { source, .. } => source.is_network(),
            _ => false,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Failures of the persisted credential store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to write credential `{key}`: {reason}")]
    Write { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_wrapper_keeps_status_and_kind() {
        let err = ApiError::Server {
            status: 422,
            message: "stock cannot be negative".into(),
        }
        .with_message("Could not register the adjustment, try again.");

        assert_eq!(
            err.to_string(),
            "Could not register the adjustment, try again."
        );
        assert_eq!(err.status(), Some(422));
        assert!(!err.is_session_expired());
    }

    #[test]
    fn session_expired_is_visible_through_wrapper() {
        let err = ApiError::SessionExpired.with_message("Could not load employees");
        assert!(err.is_session_expired());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn server_error_displays_backend_message_verbatim() {
        let err = ApiError::Server {
            status: 409,
            message: "El cliente ya existe".into(),
        };
        assert_eq!(err.to_string(), "El cliente ya existe");
    }
}
