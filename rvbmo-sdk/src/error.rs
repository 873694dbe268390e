//! Errors raised by platform backends.

/// A platform request failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The request was sent and rejected, or never completed.
    #[error("{op} failed: {message}")]
    Call { op: &'static str, message: String },
    /// The request referenced a resource the platform does not know.
    #[error("unknown {kind} {id}")]
    Missing { kind: &'static str, id: u64 },
}

impl PlatformError {
    pub fn call(op: &'static str, err: impl std::fmt::Display) -> Self {
        PlatformError::Call {
            op,
            message: err.to_string(),
        }
    }
}
