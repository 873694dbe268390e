//! Error taxonomy of the provisioning core.

use rvbmo_sdk::PlatformError;

use crate::workspace::PartialWorkspace;

#[derive(Debug, thiserror::Error)]
pub enum PodError {
    /// A workspace or one of its resources could not be resolved by name.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("platform call failed: {0}")]
    PlatformCallFailed(#[from] PlatformError),

    /// A create step failed after the role existed; `created` is left behind.
    #[error("{source}; left behind {created}")]
    Incomplete {
        created: PartialWorkspace,
        source: PlatformError,
    },

    /// Fatal at startup.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Best-effort deletion finished with some deletions failing.
    #[error("{} deletion(s) failed: {}", .failures.len(), .failures.join("; "))]
    Partial { failures: Vec<String> },
}

impl PodError {
    pub fn not_found(kind: &'static str, name: &str) -> Self {
        PodError::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}
