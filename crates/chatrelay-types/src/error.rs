use thiserror::Error;

/// Errors raised while unpacking an inbound webhook notification.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed event: {0}")]
    Malformed(String),

    #[error("signature verification failed: {0}")]
    BadSignature(String),
}

/// Errors produced by user commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid model selection: '{0}'")]
    InvalidModelSelection(String),
}

/// Errors from a text-generation backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("backend returned an empty response")]
    EmptyResponse,

    #[error("backend timed out after {0}s")]
    Timeout(u64),

    #[error("backend '{0}' is not configured")]
    NotConfigured(String),

    #[error("session store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Errors from sending a message back to the platform.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery request failed: {0}")]
    Request(String),

    #[error("platform rejected message with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Errors from session store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage unavailable")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Top-level error for handling one inbound message.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display() {
        let err = CommandError::InvalidModelSelection("bogus".to_string());
        assert_eq!(err.to_string(), "invalid model selection: 'bogus'");
    }

    #[test]
    fn test_backend_status_display() {
        let err = BackendError::Status {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }

    #[test]
    fn test_relay_error_is_transparent() {
        let err: RelayError = DeliveryError::Request("connection reset".to_string()).into();
        assert_eq!(err.to_string(), "delivery request failed: connection reset");
    }
}
