//! Error types for scan-side visibility filtering.

use strata_visibility::VisibilityError;
use thiserror::Error;

/// Error type for filter-chain and scan operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// A caller supplied an argument with no defined semantics.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An external caller attempted to remove, rename, or mutate a
    /// system-owned filter directive, or to spoof one under the reserved
    /// namespace. Surfaced rather than silently ignored: swallowing the
    /// attempt would leave the caller with a false sense of continued
    /// protection.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    /// A visibility expression failed to parse or render.
    #[error(transparent)]
    Visibility(#[from] VisibilityError),
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
