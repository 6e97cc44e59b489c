//! # Projectors
//!
//! A projector reduces a data instance's boundary to a fixed-length tuple:
//! one boundary point per configured target, in target order. Targets are
//! either rays (plain point projection, including randomly drawn points)
//! or axis orders (lexicographic projection).
//!
//! Projectors are built by [`LogicalLens::projector`],
//! [`LogicalLens::random_projector`], and [`LogicalLens::lex_projectors`].
//! Once built they are stateless and can be applied to any number of data
//! instances.

use serde::{Deserialize, Serialize};

use llens_core::{ThresholdPoint, Tolerance};
use llens_geometry::{Boundary, GeometryProvider, ProjectionTarget};

use crate::batch::try_map_batch;
use crate::error::LensError;
use crate::lens::Lens;
use crate::logical::{BoundaryOptions, LogicalLens};

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// The projected values of one data instance, one point per target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projection {
    points: Vec<ThresholdPoint>,
}

impl Projection {
    /// Wrap projected points.
    pub fn new(points: Vec<ThresholdPoint>) -> Self {
        Self { points }
    }

    /// Projected points in target order.
    pub fn points(&self) -> &[ThresholdPoint] {
        &self.points
    }

    /// The point for target `i`.
    pub fn get(&self, i: usize) -> Option<&ThresholdPoint> {
        self.points.get(i)
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the projector had no targets.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All coordinates concatenated, e.g. as a feature vector.
    pub fn flatten(&self) -> Vec<f64> {
        self.points
            .iter()
            .flat_map(|p| p.coords().iter().copied())
            .collect()
    }

    /// Consume the projection, returning its points.
    pub fn into_points(self) -> Vec<ThresholdPoint> {
        self.points
    }
}

// ---------------------------------------------------------------------------
// Projector
// ---------------------------------------------------------------------------

/// A juxtaposition of independent projections, applied together.
pub struct Projector<'a, D: ?Sized, L, G> {
    lens: &'a LogicalLens<D, L, G>,
    targets: Vec<ProjectionTarget>,
    tol: Tolerance,
}

impl<D: ?Sized, L, G> std::fmt::Debug for Projector<'_, D, L, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projector")
            .field("targets", &self.targets)
            .field("tol", &self.tol)
            .finish_non_exhaustive()
    }
}

impl<'a, D, L, G> Projector<'a, D, L, G>
where
    D: ?Sized,
    L: Lens<D>,
    G: GeometryProvider,
{
    /// Targets must already be validated against the lens dimension.
    pub(crate) fn new(
        lens: &'a LogicalLens<D, L, G>,
        targets: Vec<ProjectionTarget>,
        tol: Tolerance,
    ) -> Self {
        Self { lens, targets, tol }
    }

    /// Targets in output order.
    pub fn targets(&self) -> &[ProjectionTarget] {
        &self.targets
    }

    /// Number of targets (the length of every [`Projection`]).
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether there are no targets.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Projection tolerance.
    pub fn tolerance(&self) -> Tolerance {
        self.tol
    }

    /// Project `data`'s exact boundary onto every target.
    ///
    /// The boundary is built once and shared by all targets. The first
    /// failing target aborts the whole projection.
    pub fn apply(&self, data: &D) -> Result<Projection, LensError> {
        let boundary = self.lens.boundary(data, BoundaryOptions::exact())?;
        let points = try_map_batch(self.lens.config(), &self.targets, |target| {
            boundary.project(target, self.tol)
        })?;
        Ok(Projection::new(points))
    }
}

impl<D, L, G> Projector<'_, D, L, G>
where
    D: Sync,
    L: Lens<D>,
    G: GeometryProvider,
{
    /// Project every item of `data`, in order. Fail-fast.
    pub fn apply_all(&self, data: &[D]) -> Result<Vec<Projection>, LensError> {
        tracing::debug!(items = data.len(), targets = self.targets.len(), "projecting batch");
        try_map_batch(self.lens.config(), data, |d| self.apply(d))
    }
}
