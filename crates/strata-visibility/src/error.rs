//! Error types for the visibility-expression engine.
//!
//! All failures here are local, synchronous, and non-retryable: a malformed
//! input fails the single call and leaves every other value untouched.

use thiserror::Error;

/// Error type for visibility-expression operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisibilityError {
    /// A term span does not decode as valid UTF-8.
    #[error("term at byte range {start}..{end} is not valid UTF-8")]
    Encoding {
        /// Start offset of the offending span in the source buffer.
        start: usize,
        /// End offset (exclusive) of the offending span.
        end: usize,
    },

    /// The expression text is malformed.
    #[error("malformed visibility expression at offset {offset}: {reason}")]
    Parse {
        /// Byte offset in the source where parsing failed.
        offset: usize,
        /// What the parser expected or rejected.
        reason: String,
    },

    /// A caller supplied an argument with no defined semantics.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for visibility-expression operations.
pub type Result<T> = std::result::Result<T, VisibilityError>;
