//! Lens-level error type.
//!
//! Precondition failures are raised before any boundary work starts.
//! Provider failures are passed through unchanged.

use llens_core::{ConfigError, PreconditionError};
use llens_geometry::ProviderError;
use thiserror::Error;

/// Errors returned by [`LogicalLens`](crate::LogicalLens) operations.
#[derive(Error, Debug)]
pub enum LensError {
    /// A caller-side precondition was violated.
    #[error("precondition violated: {0}")]
    Precondition(#[from] PreconditionError),

    /// The geometry provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The lens configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl LensError {
    /// Whether this error is a precondition violation.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// The provider error, if this is one.
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) => Some(e),
            _ => None,
        }
    }
}
