//! # Adjacency Matrix
//!
//! The pairwise boundary-distance matrix over a data collection: `k × k`,
//! symmetric, zero on the diagonal. Stored row-major; serialized as a list
//! of rows.

use serde::{Deserialize, Serialize};

use llens_core::PreconditionError;
use llens_geometry::ProviderError;

// ---------------------------------------------------------------------------
// AdjacencyMatrix
// ---------------------------------------------------------------------------

/// A symmetric matrix of pairwise boundary distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct AdjacencyMatrix {
    size: usize,
    entries: Vec<f64>,
}

impl AdjacencyMatrix {
    /// A `size × size` matrix of zeros.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            entries: vec![0.0; size * size],
        }
    }

    /// Number of rows (and columns).
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the matrix covers no data at all.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Entry `(i, j)`, or `None` when out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.size || j >= self.size {
            return None;
        }
        Some(self.entries[i * self.size + j])
    }

    /// Row `i`, or `None` when out of range.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.size {
            return None;
        }
        Some(&self.entries[i * self.size..(i + 1) * self.size])
    }

    /// All entries, row-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.entries
    }

    /// The matrix as a list of rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.entries
            .chunks(self.size.max(1))
            .take(self.size)
            .map(<[f64]>::to_vec)
            .collect()
    }

    /// Whether `(i, j)` and `(j, i)` agree within `eps` for every pair.
    ///
    /// `NaN` entries compare equal to each other.
    pub fn is_symmetric(&self, eps: f64) -> bool {
        (0..self.size).all(|i| {
            (i + 1..self.size).all(|j| {
                let a = self.entries[i * self.size + j];
                let b = self.entries[j * self.size + i];
                (a.is_nan() && b.is_nan()) || (a - b).abs() <= eps
            })
        })
    }

    /// The largest finite entry, or `None` for an empty matrix.
    pub fn max_distance(&self) -> Option<f64> {
        self.entries
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .reduce(f64::max)
    }

    /// Zero diagonal, and `(i, j)` equal to `(j, i)` with `NaN` matching `NaN`.
    fn check_invariants(&self) -> Result<(), PreconditionError> {
        for i in 0..self.size {
            let value = self.entries[i * self.size + i];
            if value != 0.0 {
                return Err(PreconditionError::NonZeroDiagonal { index: i, value });
            }
            for j in i + 1..self.size {
                let upper = self.entries[i * self.size + j];
                let lower = self.entries[j * self.size + i];
                if !(upper == lower || (upper.is_nan() && lower.is_nan())) {
                    return Err(PreconditionError::AsymmetricEntries {
                        row: i,
                        col: j,
                        upper,
                        lower,
                    });
                }
            }
        }
        Ok(())
    }

    /// Write `d` at `(i, j)` and its mirror `(j, i)`.
    pub(crate) fn set_symmetric(&mut self, i: usize, j: usize, d: f64) {
        self.entries[i * self.size + j] = d;
        self.entries[j * self.size + i] = d;
    }
}

impl TryFrom<Vec<Vec<f64>>> for AdjacencyMatrix {
    type Error = PreconditionError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        let size = rows.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != size) {
            return Err(PreconditionError::DimensionMismatch {
                expected: size,
                actual: bad.len(),
            });
        }
        let matrix = Self {
            size,
            entries: rows.into_iter().flatten().collect(),
        };
        matrix.check_invariants()?;
        Ok(matrix)
    }
}

impl From<AdjacencyMatrix> for Vec<Vec<f64>> {
    fn from(matrix: AdjacencyMatrix) -> Self {
        matrix.to_rows()
    }
}

// ---------------------------------------------------------------------------
// PartialAdjacency
// ---------------------------------------------------------------------------

/// A pair whose distance could not be computed.
#[derive(Debug, Clone, PartialEq)]
pub struct PairFailure {
    /// Row index (`row < col`).
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// The provider failure for this pair.
    pub error: ProviderError,
}

/// An item whose boundary could not be built.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildFailure {
    /// Position of the item in the input collection.
    pub index: usize,
    /// The provider failure for this item.
    pub error: ProviderError,
}

/// An adjacency matrix computed without aborting on failures.
///
/// Entries of failed pairs are `NaN`; each failure is listed once, with
/// `row < col`. An item whose boundary failed to build is listed in
/// `build_failures` even when it takes part in no pair, and every pair
/// touching it is failed as well.
#[derive(Debug, Clone)]
pub struct PartialAdjacency {
    /// The matrix, `NaN` where a pair failed.
    pub matrix: AdjacencyMatrix,
    /// Items whose boundary could not be built, in input order.
    pub build_failures: Vec<BuildFailure>,
    /// Failed pairs in row-major order.
    pub failures: Vec<PairFailure>,
}

impl PartialAdjacency {
    /// Whether every boundary was built and every pair computed.
    pub fn is_complete(&self) -> bool {
        self.build_failures.is_empty() && self.failures.is_empty()
    }
}
