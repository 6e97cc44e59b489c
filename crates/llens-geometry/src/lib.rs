//! # llens-geometry — Boundary Geometry Contract
//!
//! The monotone boundary of a boolean predicate over threshold space is
//! built, approximated, compared, and projected by a geometry provider.
//! The lens layer never looks inside a boundary; it only calls the four
//! operations of the [`GeometryProvider`] / [`Boundary`] contract.
//!
//! ## Architecture
//!
//! ```text
//! llens-lens (orchestration)  -->  GeometryProvider::build_boundary
//!   LogicalLens                       Boundary::approximate
//!   Projector                         Boundary::distance
//!                                     Boundary::project
//! ```
//!
//! The contract is deliberately not sealed: a real boundary-refinement
//! engine lives outside this workspace and plugs in by implementing the
//! traits.
//!
//! ## Stub Provider
//!
//! With the default `stub` feature, [`GridProbeProvider`] answers the
//! contract by bisection along a fixed grid of rays in the unit cube.
//! It is deterministic and cheap for small `n`, which makes it the test
//! double for everything above this crate.

pub mod traits;

#[cfg(feature = "stub")]
pub mod stub;

// Re-export primary types.
pub use traits::{Boundary, GeometryProvider, ProjectionTarget, ProviderError};

#[cfg(feature = "stub")]
pub use stub::{GridProbeProvider, ProbeBoundary};
