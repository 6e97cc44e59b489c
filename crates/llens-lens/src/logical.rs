//! # Logical Lens
//!
//! The value object at the heart of the workspace: a dimensionality `n`,
//! a [`Lens`], and the [`GeometryProvider`] that turns the lens's
//! predicates into boundaries.
//!
//! ## Operations
//!
//! - [`boundary`](LogicalLens::boundary): the exact (or approximated)
//!   boundary of one data instance.
//! - [`dist`](LogicalLens::dist): distance between two instances'
//!   boundaries.
//! - [`adj_matrix`](LogicalLens::adj_matrix): every pairwise distance over
//!   a collection.
//! - [`projector`](LogicalLens::projector),
//!   [`random_projector`](LogicalLens::random_projector),
//!   [`lex_projectors`](LogicalLens::lex_projectors): see
//!   [`Projector`].
//!
//! ## Failure Policy
//!
//! Preconditions are checked before the provider is touched. Batch
//! operations are fail-fast: the first failing item (in index order)
//! aborts the batch. [`adj_matrix_collecting`](LogicalLens::adj_matrix_collecting)
//! is the resilient alternative.

use std::marker::PhantomData;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use llens_core::{AxisOrder, Dimension, LensConfig, PreconditionError, ThresholdPoint, Tolerance};
use llens_geometry::{Boundary, GeometryProvider, ProjectionTarget, ProviderError};

use crate::adjacency::{AdjacencyMatrix, BuildFailure, PairFailure, PartialAdjacency};
use crate::batch::{map_batch, try_map_batch};
use crate::error::LensError;
use crate::lens::Lens;
use crate::projector::Projector;

// ---------------------------------------------------------------------------
// BoundaryOptions
// ---------------------------------------------------------------------------

/// How [`LogicalLens::boundary`] should build a boundary.
///
/// `tol` is required when `approx` is set and ignored otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundaryOptions {
    /// Return an approximation instead of the exact boundary.
    pub approx: bool,
    /// Accuracy of the approximation.
    pub tol: Option<f64>,
}

impl BoundaryOptions {
    /// The exact boundary.
    pub fn exact() -> Self {
        Self::default()
    }

    /// An approximation accurate to `tol`.
    pub fn approx(tol: f64) -> Self {
        Self {
            approx: true,
            tol: Some(tol),
        }
    }

    /// The validated approximation tolerance, `None` for an exact build.
    fn approximation(&self) -> Result<Option<Tolerance>, LensError> {
        if !self.approx {
            return Ok(None);
        }
        let tol = self.tol.ok_or(PreconditionError::MissingTolerance)?;
        Ok(Some(Tolerance::new(tol)?))
    }
}

// ---------------------------------------------------------------------------
// LogicalLens
// ---------------------------------------------------------------------------

/// An immutable lens over an n-dimensional threshold space.
///
/// Generic over the data type `D`, the lens `L`, and the geometry
/// provider `G`. Cheap to share: every operation takes `&self`.
pub struct LogicalLens<D: ?Sized, L, G> {
    dim: Dimension,
    lens: L,
    provider: G,
    config: LensConfig,
    _data: PhantomData<fn(&D)>,
}

impl<D: ?Sized, L: Clone, G: Clone> Clone for LogicalLens<D, L, G> {
    fn clone(&self) -> Self {
        Self {
            dim: self.dim,
            lens: self.lens.clone(),
            provider: self.provider.clone(),
            config: self.config.clone(),
            _data: PhantomData,
        }
    }
}

impl<D: ?Sized, L, G> std::fmt::Debug for LogicalLens<D, L, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicalLens")
            .field("dim", &self.dim)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<D, L, G> LogicalLens<D, L, G>
where
    D: ?Sized,
    L: Lens<D>,
    G: GeometryProvider,
{
    /// Create a lens over an `n`-dimensional threshold space with the
    /// default [`LensConfig`].
    ///
    /// # Errors
    ///
    /// [`PreconditionError::ZeroDimension`]
    /// if `n < 1`.
    pub fn new(n: usize, lens: L, provider: G) -> Result<Self, LensError> {
        Ok(Self {
            dim: Dimension::new(n)?,
            lens,
            provider,
            config: LensConfig::default(),
            _data: PhantomData,
        })
    }

    /// Replace the configuration, validating its tolerances.
    pub fn with_config(mut self, config: LensConfig) -> Result<Self, LensError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replace the configuration with one loaded from a YAML file.
    pub fn with_config_file(self, path: &Path) -> Result<Self, LensError> {
        let config = LensConfig::load(path)?;
        self.with_config(config)
    }

    /// Dimensionality of the threshold space.
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// The active configuration.
    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    /// The geometry provider.
    pub fn provider(&self) -> &G {
        &self.provider
    }

    /// The lens.
    pub fn lens(&self) -> &L {
        &self.lens
    }

    // -- Boundaries ---------------------------------------------------------

    /// Build the boundary of `data`'s predicate.
    ///
    /// # Errors
    ///
    /// [`PreconditionError::MissingTolerance`]
    /// when `options.approx` is set without a tolerance, raised before the
    /// provider is invoked. Provider failures are returned unchanged.
    pub fn boundary(&self, data: &D, options: BoundaryOptions) -> Result<G::Boundary, LensError> {
        let approximation = options.approximation()?;
        let boundary = self.build(data)?;
        match approximation {
            None => Ok(boundary),
            Some(tol) => Ok(boundary.approximate(tol)?),
        }
    }

    /// Distance between the exact boundaries of `a` and `b`, evaluated to
    /// the configured `dist_tol`.
    pub fn dist(&self, a: &D, b: &D) -> Result<f64, LensError> {
        self.dist_with_tol(a, b, self.config.dist_tol)
    }

    /// Distance between the exact boundaries of `a` and `b`, evaluated to
    /// `tol`. Smaller tolerances cost more refinement.
    pub fn dist_with_tol(&self, a: &D, b: &D, tol: f64) -> Result<f64, LensError> {
        let tol = Tolerance::new(tol)?;
        let first = self.build(a)?;
        let second = self.build(b)?;
        Ok(first.distance(&second, tol)?)
    }

    fn build(&self, data: &D) -> Result<G::Boundary, ProviderError> {
        self.provider
            .build_boundary(self.lens.predicate(data), self.dim)
    }

    // -- Projectors ---------------------------------------------------------

    /// A projector onto the rays through `points`, at the configured
    /// `project_tol`.
    ///
    /// Every point is validated (length `n`, finite coordinates) before the
    /// projector is returned, so a bad point never costs a boundary build.
    pub fn projector<I>(&self, points: I) -> Result<Projector<'_, D, L, G>, LensError>
    where
        I: IntoIterator<Item = Vec<f64>>,
    {
        self.projector_with_tol(points, self.config.project_tol)
    }

    /// A projector onto the rays through `points`, at `tol`.
    pub fn projector_with_tol<I>(
        &self,
        points: I,
        tol: f64,
    ) -> Result<Projector<'_, D, L, G>, LensError>
    where
        I: IntoIterator<Item = Vec<f64>>,
    {
        let tol = Tolerance::new(tol)?;
        let targets = points
            .into_iter()
            .map(|coords| ThresholdPoint::for_dimension(coords, self.dim).map(ProjectionTarget::Ray))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(dim = self.dim.get(), targets = targets.len(), "built point projector");
        Ok(Projector::new(self, targets, tol))
    }

    /// A projector onto `count` rays through points drawn uniformly from
    /// `[0,1]^n`.
    ///
    /// Draws from `StdRng::seed_from_u64(seed)` when the config carries a
    /// `random_seed` (so repeated calls return the same projector), and from
    /// the thread RNG otherwise.
    pub fn random_projector(&self, count: usize) -> Result<Projector<'_, D, L, G>, LensError> {
        match self.config.random_seed {
            Some(seed) => self.random_projector_with_rng(count, &mut StdRng::seed_from_u64(seed)),
            None => self.random_projector_with_rng(count, &mut rand::thread_rng()),
        }
    }

    /// A projector onto `count` random rays, drawn from `rng`.
    pub fn random_projector_with_rng<R>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Projector<'_, D, L, G>, LensError>
    where
        R: Rng,
    {
        let n = self.dim.get();
        let points: Vec<Vec<f64>> = (0..count)
            .map(|_| (0..n).map(|_| rng.gen_range(0.0..=1.0)).collect())
            .collect();
        self.projector(points)
    }

    /// A projector whose components are lexicographic projections, one per
    /// axis order, at the configured `project_tol`.
    ///
    /// Each order must be a permutation of `0..n`.
    pub fn lex_projectors<I>(&self, orders: I) -> Result<Projector<'_, D, L, G>, LensError>
    where
        I: IntoIterator<Item = Vec<usize>>,
    {
        let tol = self.config.project_tolerance()?;
        let targets = orders
            .into_iter()
            .map(|axes| AxisOrder::for_dimension(axes, self.dim).map(ProjectionTarget::Lexicographic))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(dim = self.dim.get(), targets = targets.len(), "built lexicographic projector");
        Ok(Projector::new(self, targets, tol))
    }
}

impl<D, L, G> LogicalLens<D, L, G>
where
    D: Sync,
    L: Lens<D>,
    G: GeometryProvider,
{
    /// The symmetric `k × k` matrix of pairwise distances over `data`.
    ///
    /// Each boundary is built once; the `k·(k-1)/2` upper-triangle
    /// distances are mirrored and the diagonal is zero. Fail-fast: the
    /// first failing build or pair aborts the whole matrix.
    pub fn adj_matrix(&self, data: &[D]) -> Result<AdjacencyMatrix, LensError> {
        let tol = self.config.dist_tolerance()?;
        let boundaries = try_map_batch(&self.config, data, |d| self.build(d))?;

        let pairs = upper_triangle(data.len());
        tracing::debug!(
            items = data.len(),
            pairs = pairs.len(),
            parallel = self.config.should_parallelize(pairs.len()),
            "computing adjacency matrix"
        );
        let distances = try_map_batch(&self.config, &pairs, |&(i, j)| {
            boundaries[i].distance(&boundaries[j], tol)
        })?;

        let mut matrix = AdjacencyMatrix::zeros(data.len());
        for (&(i, j), distance) in pairs.iter().zip(distances) {
            matrix.set_symmetric(i, j, distance);
        }
        Ok(matrix)
    }

    /// Like [`adj_matrix`](Self::adj_matrix), but a failing build or pair
    /// only poisons its own entries (set to `NaN`). Builds are reported in
    /// [`PartialAdjacency::build_failures`] and pairs in
    /// [`PartialAdjacency::failures`].
    ///
    /// # Errors
    ///
    /// Only an invalid configured tolerance aborts the call.
    pub fn adj_matrix_collecting(&self, data: &[D]) -> Result<PartialAdjacency, LensError> {
        let tol = self.config.dist_tolerance()?;
        let boundaries = map_batch(&self.config, data, |d| self.build(d));
        let build_failures: Vec<BuildFailure> = boundaries
            .iter()
            .enumerate()
            .filter_map(|(index, built)| {
                let error = built.as_ref().err()?.clone();
                tracing::warn!(index, error = %error, "boundary build failed");
                Some(BuildFailure { index, error })
            })
            .collect();

        let pairs = upper_triangle(data.len());
        let distances = map_batch(&self.config, &pairs, |&(i, j)| {
            match (&boundaries[i], &boundaries[j]) {
                (Ok(a), Ok(b)) => a.distance(b, tol),
                (Err(e), _) | (_, Err(e)) => Err(e.clone()),
            }
        });

        let mut matrix = AdjacencyMatrix::zeros(data.len());
        let mut failures = Vec::new();
        for (&(row, col), distance) in pairs.iter().zip(distances) {
            match distance {
                Ok(d) => matrix.set_symmetric(row, col, d),
                Err(error) => {
                    tracing::warn!(row, col, error = %error, "pairwise distance failed");
                    matrix.set_symmetric(row, col, f64::NAN);
                    failures.push(PairFailure { row, col, error });
                }
            }
        }
        Ok(PartialAdjacency {
            matrix,
            build_failures,
            failures,
        })
    }
}

/// Index pairs `(i, j)` with `i < j < k`, row-major.
fn upper_triangle(k: usize) -> Vec<(usize, usize)> {
    (0..k)
        .flat_map(|i| (i + 1..k).map(move |j| (i, j)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use llens_geometry::{GridProbeProvider, ProbeBoundary};

    type Predicate = Box<dyn Fn(&[f64]) -> bool + Send + Sync>;
    type TestLens = LogicalLens<f64, fn(&f64) -> Predicate, CountingProvider>;

    /// Counts boundary builds on top of the grid-probe provider.
    #[derive(Clone, Default)]
    struct CountingProvider {
        inner: GridProbeProvider,
        builds: Arc<AtomicUsize>,
    }

    impl CountingProvider {
        fn builds(&self) -> usize {
            self.builds.load(Ordering::SeqCst)
        }
    }

    impl GeometryProvider for CountingProvider {
        type Boundary = ProbeBoundary;

        fn build_boundary<P>(&self, oracle: P, dim: Dimension) -> Result<ProbeBoundary, ProviderError>
        where
            P: Fn(&[f64]) -> bool + Send + Sync + 'static,
        {
            self.builds.fetch_add(1, Ordering::SeqCst);
            self.inner.build_boundary(oracle, dim)
        }
    }

    fn half_plane(t: &f64) -> impl Fn(&[f64]) -> bool + Send + Sync + 'static {
        let t = *t;
        move |x: &[f64]| x[0] + x[1] >= t
    }

    fn lens_2d() -> TestLens {
        fn boxed(t: &f64) -> Predicate {
            Box::new(half_plane(t))
        }
        LogicalLens::new(2, boxed as fn(&f64) -> Predicate, CountingProvider::default()).unwrap()
    }

    #[test]
    fn zero_dimension_rejected() {
        let err = LogicalLens::<f64, _, _>::new(0, half_plane, GridProbeProvider::new()).unwrap_err();
        assert!(matches!(
            err,
            LensError::Precondition(PreconditionError::ZeroDimension)
        ));
    }

    #[test]
    fn approx_without_tolerance_never_reaches_provider() {
        let lens = lens_2d();
        let options = BoundaryOptions {
            approx: true,
            tol: None,
        };
        let err = lens.boundary(&1.0, options).unwrap_err();
        assert!(matches!(
            err,
            LensError::Precondition(PreconditionError::MissingTolerance)
        ));
        assert_eq!(lens.provider().builds(), 0);
    }

    #[test]
    fn approx_with_invalid_tolerance_rejected() {
        let lens = lens_2d();
        let err = lens.boundary(&1.0, BoundaryOptions::approx(-0.1)).unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(lens.provider().builds(), 0);
    }

    #[test]
    fn exact_and_approximate_boundaries() {
        let lens = lens_2d();
        let exact = lens.boundary(&1.0, BoundaryOptions::exact()).unwrap();
        assert!(!exact.is_approximated());
        let approx = lens.boundary(&1.0, BoundaryOptions::approx(1e-3)).unwrap();
        assert!(approx.is_approximated());
        assert_eq!(approx.dimension().get(), 2);
    }

    #[test]
    fn exact_boundary_ignores_tolerance() {
        let lens = lens_2d();
        let options = BoundaryOptions {
            approx: false,
            tol: Some(-1.0),
        };
        assert!(lens.boundary(&1.0, options).is_ok());
    }

    #[test]
    fn dist_to_self_is_zero() {
        let lens = lens_2d();
        assert_eq!(lens.dist(&1.2, &1.2).unwrap(), 0.0);
    }

    #[test]
    fn dist_is_symmetric() {
        let lens = lens_2d();
        let ab = lens.dist(&1.0, &1.5).unwrap();
        let ba = lens.dist(&1.5, &1.0).unwrap();
        assert!(ab > 0.0);
        assert_eq!(ab, ba);
    }

    #[test]
    fn dist_rejects_bad_tolerance_before_building() {
        let lens = lens_2d();
        assert!(lens.dist_with_tol(&1.0, &1.5, 0.0).unwrap_err().is_precondition());
        assert_eq!(lens.provider().builds(), 0);
    }

    #[test]
    fn adj_matrix_builds_each_boundary_once() {
        let lens = lens_2d();
        let data = [1.0, 1.1, 1.2, 1.3];
        let matrix = lens.adj_matrix(&data).unwrap();
        assert_eq!(lens.provider().builds(), data.len());
        assert_eq!(matrix.len(), 4);
        assert!(matrix.is_symmetric(0.0));
        for i in 0..4 {
            assert_eq!(matrix.get(i, i), Some(0.0));
        }
    }

    #[test]
    fn adj_matrix_matches_dist() {
        let lens = lens_2d();
        let data = [1.0, 1.25, 1.5];
        let matrix = lens.adj_matrix(&data).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    let expected = lens.dist(&data[i], &data[j]).unwrap();
                    assert_eq!(matrix.get(i, j), Some(expected));
                }
            }
        }
    }

    #[test]
    fn adj_matrix_parallel_matches_sequential() {
        let data: Vec<f64> = (0..12).map(|i| 0.8 + 0.05 * i as f64).collect();
        let parallel = lens_2d()
            .with_config(LensConfig {
                min_parallel_batch: 2,
                ..LensConfig::default()
            })
            .unwrap();
        let sequential = lens_2d()
            .with_config(LensConfig {
                parallel: false,
                ..LensConfig::default()
            })
            .unwrap();
        assert_eq!(
            parallel.adj_matrix(&data).unwrap(),
            sequential.adj_matrix(&data).unwrap()
        );
    }

    #[test]
    fn adj_matrix_of_empty_and_singleton() {
        let lens = lens_2d();
        assert!(lens.adj_matrix(&[]).unwrap().is_empty());
        let single = lens.adj_matrix(&[1.0]).unwrap();
        assert_eq!(single.to_rows(), vec![vec![0.0]]);
    }

    /// Thresholds above 10 produce an oracle that is true at the origin and
    /// false at the top corner.
    fn flaky(t: &f64) -> Predicate {
        if *t > 10.0 {
            Box::new(|x: &[f64]| x[0] < 0.5)
        } else {
            Box::new(half_plane(t))
        }
    }

    #[test]
    fn adj_matrix_fails_fast_on_provider_error() {
        let lens = LogicalLens::new(2, flaky, GridProbeProvider::new()).unwrap();
        let err = lens.adj_matrix(&[1.0, 11.0, 1.5]).unwrap_err();
        assert!(matches!(
            err.as_provider(),
            Some(ProviderError::NonMonotone { .. })
        ));
    }

    #[test]
    fn adj_matrix_collecting_reports_failed_pairs() {
        let lens = LogicalLens::new(2, flaky, GridProbeProvider::new()).unwrap();
        let partial = lens.adj_matrix_collecting(&[1.0, 11.0, 1.5]).unwrap();
        assert!(!partial.is_complete());
        let failed: Vec<(usize, usize)> = partial.failures.iter().map(|f| (f.row, f.col)).collect();
        assert_eq!(failed, vec![(0, 1), (1, 2)]);
        assert!(partial.matrix.get(0, 1).unwrap().is_nan());
        assert!(partial.matrix.get(2, 1).unwrap().is_nan());
        let ok = partial.matrix.get(0, 2).unwrap();
        assert!(ok > 0.0);
        assert_eq!(partial.matrix.get(1, 1), Some(0.0));
    }

    /// A provider whose every build fails.
    struct BrokenProvider;

    impl GeometryProvider for BrokenProvider {
        type Boundary = ProbeBoundary;

        fn build_boundary<P>(&self, _oracle: P, _dim: Dimension) -> Result<ProbeBoundary, ProviderError>
        where
            P: Fn(&[f64]) -> bool + Send + Sync + 'static,
        {
            Err(ProviderError::Other("refinement engine unavailable".into()))
        }
    }

    #[test]
    fn adj_matrix_collecting_reports_lone_build_failure() {
        let lens = LogicalLens::new(2, half_plane, BrokenProvider).unwrap();
        let partial = lens.adj_matrix_collecting(&[1.0]).unwrap();
        assert!(!partial.is_complete());
        assert!(partial.failures.is_empty());
        assert_eq!(partial.build_failures.len(), 1);
        assert_eq!(partial.build_failures[0].index, 0);
        assert_eq!(partial.matrix.to_rows(), vec![vec![0.0]]);
    }

    #[test]
    fn adj_matrix_collecting_reports_builds_and_pairs() {
        let lens = LogicalLens::new(2, half_plane, BrokenProvider).unwrap();
        let partial = lens.adj_matrix_collecting(&[1.0, 1.5]).unwrap();
        let indices: Vec<usize> = partial.build_failures.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(partial.failures.len(), 1);
        assert!(partial.matrix.get(0, 1).unwrap().is_nan());
    }

    #[test]
    fn adj_matrix_collecting_complete_when_nothing_fails() {
        let lens = lens_2d();
        let partial = lens.adj_matrix_collecting(&[1.0, 1.5]).unwrap();
        assert!(partial.is_complete());
        assert!(partial.build_failures.is_empty());
    }

    #[test]
    fn upper_triangle_pairs() {
        assert_eq!(upper_triangle(3), vec![(0, 1), (0, 2), (1, 2)]);
        assert!(upper_triangle(1).is_empty());
        assert_eq!(upper_triangle(10).len(), 45);
    }

    #[test]
    fn with_config_rejects_invalid_tolerance() {
        let err = lens_2d()
            .with_config(LensConfig {
                dist_tol: f64::NAN,
                ..LensConfig::default()
            })
            .unwrap_err();
        assert!(err.is_precondition());
    }
}
