//! Custom error types for embedding operations.

use std::fmt;
use std::time::Duration;

use text_tree::CostError;

/// Errors that can occur while embedding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedError {
    /// The provider failed or is unreachable.
    Unavailable {
        /// Provider-reported reason
        reason: String,
    },
    /// The provider did not answer in time.
    Timeout {
        /// How long the call waited
        after: Duration,
    },
    /// The provider returned a vector of the wrong length.
    DimensionMismatch {
        /// Dimension declared by the provider
        expected: usize,
        /// Dimension actually returned
        found: usize,
    },
    /// The provider returned NaN or infinite components.
    NonFinite {
        /// The text whose embedding was invalid
        text: String,
    },
    /// A batch call returned a different number of vectors than texts.
    BatchLength {
        /// Number of texts sent
        expected: usize,
        /// Number of vectors returned
        found: usize,
    },
}

impl EmbedError {
    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }

    /// Converts into the cost-model error for a failure on `text`.
    #[must_use]
    pub fn into_cost_error(self, text: &str) -> CostError {
        CostError::EmbeddingUnavailable {
            text: text.to_string(),
            reason: self.to_string(),
        }
    }
}

impl fmt::Display for EmbedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "embedding provider unavailable: {reason}"),
            Self::Timeout { after } => {
                write!(f, "embedding provider timed out after {}ms", after.as_millis())
            }
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "embedding has dimension {found}, expected {expected}; the provider is misconfigured"
            ),
            Self::NonFinite { text } => {
                write!(f, "embedding for '{text}' contains non-finite components")
            }
            Self::BatchLength { expected, found } => {
                write!(f, "batch embedding returned {found} vectors for {expected} texts")
            }
        }
    }
}

impl std::error::Error for EmbedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_failures_are_retryable() {
        assert!(EmbedError::Timeout {
            after: Duration::from_millis(10)
        }
        .is_retryable());
        assert!(EmbedError::Unavailable {
            reason: "503".into()
        }
        .is_retryable());
        assert!(!EmbedError::DimensionMismatch {
            expected: 4,
            found: 3
        }
        .is_retryable());
        assert!(!EmbedError::NonFinite { text: "x".into() }.is_retryable());
        assert!(!EmbedError::BatchLength {
            expected: 2,
            found: 1
        }
        .is_retryable());
    }

    #[test]
    fn cost_error_keeps_text_and_reason() {
        let err = EmbedError::Unavailable {
            reason: "connection reset".into(),
        }
        .into_cost_error("methods");
        match err {
            CostError::EmbeddingUnavailable { text, reason } => {
                assert_eq!(text, "methods");
                assert!(reason.contains("connection reset"));
            }
            CostError::InvalidCost { .. } => panic!("wrong variant"),
        }
    }
}
