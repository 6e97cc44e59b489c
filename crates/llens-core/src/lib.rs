#![deny(missing_docs)]

//! # llens-core — Foundational Types for Logical Lenses
//!
//! This crate is the leaf of the workspace. It defines the validated
//! primitives every other crate speaks in, and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for threshold-space primitives.** [`Dimension`],
//!    [`Tolerance`], [`ThresholdPoint`], [`AxisOrder`]: each has a validated
//!    constructor. A bare `usize` or `Vec<f64>` never crosses a crate
//!    boundary where one of these is meant.
//!
//! 2. **Preconditions fail eagerly.** A dimensionality mismatch, a missing
//!    tolerance, or `n < 1` is a [`PreconditionError`] at the call that
//!    violates it, never silently corrected.
//!
//! 3. **One config type.** [`LensConfig`] carries every tunable default
//!    (tolerances, parallel fan-out, random seed) and can be loaded from YAML.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `llens-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod point;
pub mod primitives;

// Re-export primary types for ergonomic imports.
pub use config::LensConfig;
pub use error::{ConfigError, PreconditionError};
pub use point::{AxisOrder, ThresholdPoint};
pub use primitives::{Dimension, Tolerance};
