use thiserror::Error;

/// Error produced by table operations, key construction or expression
/// compilation.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema rejected a candidate entity. Never retried; carries the
    /// name of the offending table.
    #[error("validation failed on {table}: {message}")]
    Validation {
        /// Table the rejected entity was destined for.
        table: String,
        /// What the schema objected to.
        message: String,
    },

    /// A key source was malformed or missing the hash value required by the
    /// targeted index. Fatal to the call, never retried.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The schema configuration itself is unusable.
    #[error("schema configuration: {0}")]
    Schema(String),

    /// A failure surfaced by the transport collaborator, passed through
    /// unchanged. This crate does not retry; the flag is informational for
    /// callers.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    /// Whether the underlying transport marked this failure retryable.
    ///
    /// Always `false` for locally-originated errors.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(e) if e.retryable)
    }

    /// Whether this is a schema-validation rejection.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Whether this is a malformed-key rejection.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Error::InvalidKey(_))
    }
}

/// Failure reported by the request/response collaborator that executes
/// physical calls.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed: {message}")]
pub struct TransportError {
    /// Operation kind that failed (`get`, `query`, `batchGet`, ...).
    pub operation: &'static str,
    /// Upstream error description.
    pub message: String,
    /// Whether the upstream marked the failure as retryable.
    pub retryable: bool,
}

impl TransportError {
    /// Non-retryable failure for `operation`.
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
            retryable: false,
        }
    }

    /// Mark this failure retryable.
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::new("query", "throughput exceeded");
        assert_eq!(err.to_string(), "query failed: throughput exceeded");
    }

    #[test]
    fn test_retryable_flag_propagates() {
        let err: Error = TransportError::new("scan", "timeout").retryable().into();
        assert!(err.is_retryable());

        let err: Error = TransportError::new("scan", "access denied").into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_local_errors_never_retryable() {
        let err = Error::InvalidKey("missing hash".into());
        assert!(!err.is_retryable());
        assert!(err.is_invalid_key());

        let err = Error::Validation {
            table: "users".into(),
            message: "missing email".into(),
        };
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "validation failed on users: missing email");
    }
}
