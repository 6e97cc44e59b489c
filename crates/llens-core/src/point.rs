//! # Threshold Points and Axis Orders
//!
//! A [`ThresholdPoint`] is a vector of finite reals in threshold space.
//! An [`AxisOrder`] is a priority ordering over the axes, used by
//! lexicographic projection.

use serde::{Deserialize, Serialize};

use crate::error::PreconditionError;
use crate::primitives::Dimension;

// ---------------------------------------------------------------------------
// ThresholdPoint
// ---------------------------------------------------------------------------

/// A point in threshold space. Every coordinate is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ThresholdPoint(Vec<f64>);

impl ThresholdPoint {
    /// Create a point, rejecting NaN and infinite coordinates.
    pub fn new(coords: Vec<f64>) -> Result<Self, PreconditionError> {
        if let Some((index, &value)) = coords.iter().enumerate().find(|(_, c)| !c.is_finite()) {
            return Err(PreconditionError::NonFiniteCoordinate { index, value });
        }
        Ok(Self(coords))
    }

    /// Create a point that must live in a space of dimension `dim`.
    pub fn for_dimension(coords: Vec<f64>, dim: Dimension) -> Result<Self, PreconditionError> {
        dim.check(coords.len())?;
        Self::new(coords)
    }

    /// Number of coordinates.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Borrow the coordinates.
    pub fn coords(&self) -> &[f64] {
        &self.0
    }

    /// Consume the point, returning its coordinates.
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Whether every coordinate lies in `[0, 1]`.
    pub fn is_in_unit_cube(&self) -> bool {
        self.0.iter().all(|c| (0.0..=1.0).contains(c))
    }

    /// Euclidean distance to another point of the same length.
    pub fn euclidean(&self, other: &ThresholdPoint) -> f64 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

impl TryFrom<Vec<f64>> for ThresholdPoint {
    type Error = PreconditionError;

    fn try_from(coords: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(coords)
    }
}

impl From<ThresholdPoint> for Vec<f64> {
    fn from(point: ThresholdPoint) -> Vec<f64> {
        point.0
    }
}

impl AsRef<[f64]> for ThresholdPoint {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// AxisOrder
// ---------------------------------------------------------------------------

/// A total priority order over the axes of an n-dimensional space.
///
/// Always a permutation of `0..n`: the first axis has the highest priority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AxisOrder(Vec<usize>);

impl AxisOrder {
    /// Create an order for a space of dimension `dim`.
    ///
    /// # Errors
    ///
    /// [`PreconditionError::DimensionMismatch`] if `axes.len() != n`;
    /// [`PreconditionError::InvalidAxisOrder`] if an axis is out of range
    /// or repeated.
    pub fn for_dimension(axes: Vec<usize>, dim: Dimension) -> Result<Self, PreconditionError> {
        dim.check(axes.len())?;
        match permutation_defect(&axes, dim.get()) {
            Some(reason) => Err(PreconditionError::InvalidAxisOrder {
                order: axes,
                reason,
            }),
            None => Ok(Self(axes)),
        }
    }

    /// The identity order `0, 1, ..., n-1`.
    pub fn identity(dim: Dimension) -> Self {
        Self((0..dim.get()).collect())
    }

    /// Number of axes.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Axes from highest to lowest priority.
    pub fn axes(&self) -> &[usize] {
        &self.0
    }
}

/// Describe why `axes` is not a permutation of `0..n`, if it isn't.
fn permutation_defect(axes: &[usize], n: usize) -> Option<String> {
    let mut seen = vec![false; n];
    for &axis in axes {
        if axis >= n {
            return Some(format!("axis {axis} out of range for dimension {n}"));
        }
        if seen[axis] {
            return Some(format!("axis {axis} repeated"));
        }
        seen[axis] = true;
    }
    None
}
