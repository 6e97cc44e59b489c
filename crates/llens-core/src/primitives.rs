//! # Scalar Primitives
//!
//! [`Dimension`] is the `n` of an n-dimensional threshold space.
//! [`Tolerance`] bounds the numerical error of a boundary computation.
//!
//! Both deserialize through their validating constructors, so a config
//! file cannot smuggle in `n = 0` or a negative tolerance.

use serde::{Deserialize, Serialize};

use crate::error::PreconditionError;

// ---------------------------------------------------------------------------
// Dimension
// ---------------------------------------------------------------------------

/// Dimensionality of a threshold space. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Dimension(usize);

impl Dimension {
    /// Create a dimension, rejecting `n < 1`.
    pub fn new(n: usize) -> Result<Self, PreconditionError> {
        if n == 0 {
            return Err(PreconditionError::ZeroDimension);
        }
        Ok(Self(n))
    }

    /// The number of axes.
    pub fn get(self) -> usize {
        self.0
    }

    /// Check that `len` matches this dimension.
    pub fn check(self, len: usize) -> Result<(), PreconditionError> {
        if len != self.0 {
            return Err(PreconditionError::DimensionMismatch {
                expected: self.0,
                actual: len,
            });
        }
        Ok(())
    }
}

impl TryFrom<usize> for Dimension {
    type Error = PreconditionError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Dimension> for usize {
    fn from(dim: Dimension) -> usize {
        dim.0
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

/// A finite, strictly positive numeric tolerance.
///
/// Smaller tolerances cost more boundary refinement in the geometry
/// provider.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tolerance(f64);

impl Tolerance {
    /// Create a tolerance, rejecting zero, negative, and non-finite values.
    pub fn new(tol: f64) -> Result<Self, PreconditionError> {
        if !tol.is_finite() || tol <= 0.0 {
            return Err(PreconditionError::InvalidTolerance(tol));
        }
        Ok(Self(tol))
    }

    /// The raw tolerance value.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Whether this tolerance is at least as fine as `other`.
    pub fn is_finer_or_equal(self, other: Tolerance) -> bool {
        self.0 <= other.0
    }
}

impl TryFrom<f64> for Tolerance {
    type Error = PreconditionError;

    fn try_from(tol: f64) -> Result<Self, Self::Error> {
        Self::new(tol)
    }
}

impl From<Tolerance> for f64 {
    fn from(tol: Tolerance) -> f64 {
        tol.0
    }
}

impl std::fmt::Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
