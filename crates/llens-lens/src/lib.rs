//! # llens-lens — Logical Lenses over Threshold Space
//!
//! A *lens* maps a data instance to a monotone boolean predicate over
//! n-dimensional threshold vectors. The frontier between the predicate's
//! true and false regions is a monotone boundary: an implicit geometric
//! object that can be compared, combined, and projected.
//!
//! - **LogicalLens** (`logical.rs`): the immutable value object holding `n`,
//!   the lens, and a geometry provider. Builds boundaries, measures
//!   distances, and assembles pairwise adjacency matrices.
//!
//! - **Projector** (`projector.rs`): point, random, and lexicographic
//!   projections of a data instance's boundary, juxtaposed into one
//!   [`Projection`] per instance.
//!
//! - **AdjacencyMatrix** (`adjacency.rs`): the symmetric, zero-diagonal
//!   pairwise distance matrix over a data collection.
//!
//! ## Example
//!
//! ```rust
//! use llens_geometry::GridProbeProvider;
//! use llens_lens::LogicalLens;
//!
//! // Each threshold t becomes the half-plane x + y >= t.
//! let lens = LogicalLens::new(
//!     2,
//!     |t: &f64| {
//!         let t = *t;
//!         move |x: &[f64]| x[0] + x[1] >= t
//!     },
//!     GridProbeProvider::new(),
//! )
//! .unwrap();
//!
//! let d = lens.dist(&1.0, &1.5).unwrap();
//! assert!(d > 0.0);
//!
//! let matrix = lens.adj_matrix(&[1.0, 1.0, 1.5]).unwrap();
//! assert_eq!(matrix.get(0, 1), Some(0.0));
//! ```
//!
//! ## Concurrency
//!
//! Every operation is a pure, synchronous computation. Batch work (the
//! upper triangle of an adjacency matrix, the targets of a projector, the
//! items of a projected batch) fans out on the rayon pool when
//! [`LensConfig::parallel`](llens_core::LensConfig) is set and the batch is
//! large enough. A `LogicalLens` is shared read-only between threads.

mod batch;

pub mod adjacency;
pub mod error;
pub mod lens;
pub mod logical;
pub mod projector;

pub use adjacency::{AdjacencyMatrix, BuildFailure, PairFailure, PartialAdjacency};
pub use error::LensError;
pub use lens::Lens;
pub use logical::{BoundaryOptions, LogicalLens};
pub use projector::{Projection, Projector};
