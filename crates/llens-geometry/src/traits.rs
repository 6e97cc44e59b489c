//! # Geometry Provider Traits
//!
//! The interface the lens layer consumes. Implementations own the boundary
//! representation entirely; callers hold boundaries as opaque values.
//!
//! ## Monotonicity
//!
//! Every oracle handed to [`GeometryProvider::build_boundary`] must be
//! monotone: raising any coordinate never flips the predicate from true to
//! false. Providers may detect a violation and report
//! [`ProviderError::NonMonotone`], but are not required to.

use llens_core::{AxisOrder, Dimension, PreconditionError, ThresholdPoint, Tolerance};
use thiserror::Error;

/// Error surfaced by a geometry provider.
///
/// The lens layer propagates these unchanged. Boundary computations are
/// deterministic, so none of them is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Two boundaries of different dimensionality were combined.
    #[error("boundary dimension mismatch: {left} vs {right}")]
    DimensionMismatch {
        /// Dimension of the receiver.
        left: usize,
        /// Dimension of the argument.
        right: usize,
    },

    /// The oracle is true at `below` but false at `above`, although
    /// `below <= above` componentwise.
    #[error("oracle is not monotone: true at {below:?}, false at {above:?}")]
    NonMonotone {
        /// The smaller point, where the oracle holds.
        below: Vec<f64>,
        /// The larger point, where it does not.
        above: Vec<f64>,
    },

    /// Refinement did not reach the requested tolerance.
    #[error("boundary refinement did not converge after {iterations} iterations")]
    NoConvergence {
        /// Refinement steps taken before giving up.
        iterations: usize,
    },

    /// A point produced during refinement is invalid.
    #[error("invalid boundary point: {0}")]
    InvalidPoint(#[from] PreconditionError),

    /// Any other provider-specific failure.
    #[error("geometry provider failure: {0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// ProjectionTarget
// ---------------------------------------------------------------------------

/// What a boundary is projected onto.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionTarget {
    /// Where the boundary crosses the segment from the origin to this point.
    Ray(ThresholdPoint),
    /// The boundary point reached by minimising axes in priority order:
    /// the first axis as far as the predicate allows, then the next, and
    /// so on.
    Lexicographic(AxisOrder),
}

impl ProjectionTarget {
    /// Whether this is a lexicographic projection.
    pub fn is_lexicographic(&self) -> bool {
        matches!(self, Self::Lexicographic(_))
    }

    /// Dimensionality of the target.
    pub fn dim(&self) -> usize {
        match self {
            Self::Ray(point) => point.dim(),
            Self::Lexicographic(order) => order.dim(),
        }
    }
}

// ---------------------------------------------------------------------------
// Boundary / GeometryProvider
// ---------------------------------------------------------------------------

/// A monotone boundary owned by a geometry provider.
///
/// Boundaries are immutable values. `Send + Sync` lets the lens layer
/// compare and project them from a worker pool.
pub trait Boundary: Send + Sync + Sized {
    /// Dimensionality of the threshold space this boundary lives in.
    fn dimension(&self) -> Dimension;

    /// An approximation of this boundary accurate to `tol`.
    fn approximate(&self, tol: Tolerance) -> Result<Self, ProviderError>;

    /// Symmetric distance to `other`, evaluated to `tol`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::DimensionMismatch`] if the two boundaries live in
    /// spaces of different dimension.
    fn distance(&self, other: &Self, tol: Tolerance) -> Result<f64, ProviderError>;

    /// Project this boundary onto `target`, to `tol`.
    fn project(
        &self,
        target: &ProjectionTarget,
        tol: Tolerance,
    ) -> Result<ThresholdPoint, ProviderError>;
}

/// Builds monotone boundaries from boolean oracles.
pub trait GeometryProvider: Send + Sync {
    /// The boundary representation produced by this provider.
    type Boundary: Boundary;

    /// Construct the exact boundary of `oracle` over a `dim`-dimensional
    /// threshold space.
    ///
    /// The oracle is moved into the provider, which may evaluate it lazily
    /// for as long as the boundary lives.
    fn build_boundary<P>(&self, oracle: P, dim: Dimension) -> Result<Self::Boundary, ProviderError>
    where
        P: Fn(&[f64]) -> bool + Send + Sync + 'static;
}
