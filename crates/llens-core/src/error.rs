//! # Error Hierarchy
//!
//! Structured error types for the core primitives, built with `thiserror`.
//!
//! Precondition violations are deterministic caller mistakes: they are
//! detected before any boundary work starts and are never retried.

use std::path::PathBuf;

use thiserror::Error;

/// A violated precondition on a lens operation or primitive constructor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreconditionError {
    /// The threshold space must have at least one dimension.
    #[error("threshold space dimension must be at least 1")]
    ZeroDimension,

    /// A point or order does not match the lens dimensionality.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The lens dimensionality `n`.
        expected: usize,
        /// The length that was supplied.
        actual: usize,
    },

    /// An approximated boundary was requested without a tolerance.
    #[error("approximation requested without a tolerance")]
    MissingTolerance,

    /// A tolerance must be finite and strictly positive.
    #[error("tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),

    /// Threshold coordinates must be finite.
    #[error("coordinate {index} is not finite: {value}")]
    NonFiniteCoordinate {
        /// Position of the offending coordinate.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// An axis order is not a permutation of `0..n`.
    #[error("invalid axis order {order:?}: {reason}")]
    InvalidAxisOrder {
        /// The order as supplied.
        order: Vec<usize>,
        /// Why it was rejected.
        reason: String,
    },

    /// A distance matrix has a non-zero entry on its diagonal.
    #[error("diagonal entry {index} must be zero, got {value}")]
    NonZeroDiagonal {
        /// Row (and column) of the entry.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// A distance matrix differs from its transpose.
    #[error("entries ({row}, {col}) and ({col}, {row}) differ: {upper} vs {lower}")]
    AsymmetricEntries {
        /// Row of the upper-triangle entry.
        row: usize,
        /// Column of the upper-triangle entry.
        col: usize,
        /// Value at `(row, col)`.
        upper: f64,
        /// Value at `(col, row)`.
        lower: f64,
    },
}

/// Errors raised while loading a [`LensConfig`](crate::LensConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// YAML parsing failed for a file.
    #[error("failed to parse YAML at {path}: {source}")]
    YamlParse {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying parser error.
        source: serde_yaml::Error,
    },

    /// YAML parsing failed for an in-memory document.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config parsed but holds invalid values.
    #[error("invalid config: {0}")]
    Invalid(#[from] PreconditionError),
}
