//! Error taxonomy shared by collaborator traits.

use std::time::Duration;

use thiserror::Error;

/// Failure of an external collaborator (embedding service, language model,
/// human hand-off, feedback sink).
///
/// None of these are fatal to a turn: every call site defines a safe default
/// and degrades to it. `RateLimited` is retried with exponential backoff up
/// to a fixed attempt cap before degrading to `Unavailable` handling.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The collaborator could not be reached or returned a server error.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator returned HTTP 429 or an equivalent throttle signal.
    #[error("collaborator rate limited")]
    RateLimited,

    /// The collaborator answered but the payload could not be interpreted.
    #[error("malformed collaborator response: {0}")]
    InvalidResponse(String),

    /// The call exceeded its deadline. Treated as a failed call, never as a
    /// cancellation of the surrounding turn.
    #[error("collaborator call timed out after {0:?}")]
    Timeout(Duration),
}

impl CollaboratorError {
    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CollaboratorError::RateLimited | CollaboratorError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(CollaboratorError::RateLimited.is_retryable());
        assert!(CollaboratorError::Timeout(Duration::from_secs(5)).is_retryable());
        assert!(!CollaboratorError::Unavailable("down".into()).is_retryable());
        assert!(!CollaboratorError::InvalidResponse("garbage".into()).is_retryable());
    }
}
