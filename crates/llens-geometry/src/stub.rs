//! # Grid-Probe Stub Provider
//!
//! A deterministic stand-in for a real boundary-refinement engine. Every
//! query is answered by bisection on the stored oracle:
//!
//! - **Ray projection** of `p`: the point `t·p`, `t ∈ [0,1]`, where the
//!   oracle flips, taken on the side where it holds. Clamped to the origin
//!   when the whole segment holds and to `p` when none of it does. Points
//!   outside the cube are allowed; for `p >= 0` this is the smallest `t`
//!   with `oracle(t·p)` true.
//! - **Lexicographic projection**: each axis in priority order is pushed
//!   down as far as the predicate allows, with lower-priority axes held
//!   at 1.
//! - **Distance**: the largest Euclidean gap between the two boundaries'
//!   crossings along a fixed probe grid, the grid points of resolution `r`
//!   on the upper faces of the cube (max coordinate 1).
//!
//! The probe grid has `(r+1)^n - r^n` rays, so this provider is meant for
//! small `n`.

use std::sync::Arc;

use llens_core::{AxisOrder, Dimension, ThresholdPoint, Tolerance};

use crate::traits::{Boundary, GeometryProvider, ProjectionTarget, ProviderError};

/// Bisection steps allowed before reporting [`ProviderError::NoConvergence`].
pub const MAX_BISECTIONS: usize = 64;

type Oracle = dyn Fn(&[f64]) -> bool + Send + Sync;

// ---------------------------------------------------------------------------
// GridProbeProvider
// ---------------------------------------------------------------------------

/// Builds [`ProbeBoundary`] values over a probe grid of fixed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridProbeProvider {
    resolution: usize,
}

impl GridProbeProvider {
    /// Probe grid resolution used by [`GridProbeProvider::new`].
    pub const DEFAULT_RESOLUTION: usize = 8;

    /// A provider with the default probe resolution.
    pub fn new() -> Self {
        Self::with_resolution(Self::DEFAULT_RESOLUTION)
    }

    /// A provider with `resolution` grid steps per axis (at least 1).
    pub fn with_resolution(resolution: usize) -> Self {
        Self {
            resolution: resolution.max(1),
        }
    }

    /// Grid steps per axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }
}

impl Default for GridProbeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryProvider for GridProbeProvider {
    type Boundary = ProbeBoundary;

    fn build_boundary<P>(&self, oracle: P, dim: Dimension) -> Result<ProbeBoundary, ProviderError>
    where
        P: Fn(&[f64]) -> bool + Send + Sync + 'static,
    {
        tracing::debug!(dim = dim.get(), resolution = self.resolution, "built probe boundary");
        Ok(ProbeBoundary {
            oracle: Arc::new(oracle),
            dim,
            resolution: self.resolution,
            cache: None,
        })
    }
}

// ---------------------------------------------------------------------------
// ProbeBoundary
// ---------------------------------------------------------------------------

/// Probe crossings computed once by [`Boundary::approximate`].
#[derive(Debug, Clone)]
struct ProbeCache {
    tol: Tolerance,
    crossings: Arc<Vec<ThresholdPoint>>,
}

/// A lazily evaluated monotone boundary.
///
/// Holds the oracle itself; an approximated boundary additionally caches
/// its probe crossings.
#[derive(Clone)]
pub struct ProbeBoundary {
    oracle: Arc<Oracle>,
    dim: Dimension,
    resolution: usize,
    cache: Option<ProbeCache>,
}

impl std::fmt::Debug for ProbeBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeBoundary")
            .field("dim", &self.dim)
            .field("resolution", &self.resolution)
            .field("cached_tol", &self.cache.as_ref().map(|c| c.tol))
            .finish()
    }
}

impl ProbeBoundary {
    /// Whether this boundary carries pre-computed probe crossings.
    pub fn is_approximated(&self) -> bool {
        self.cache.is_some()
    }

    /// Tolerance of the cached crossings, if approximated.
    pub fn cached_tolerance(&self) -> Option<Tolerance> {
        self.cache.as_ref().map(|c| c.tol)
    }

    /// Number of probe rays used by [`Boundary::distance`].
    pub fn probe_count(&self) -> usize {
        probe_grid(self.dim, self.resolution).len()
    }

    /// Evaluate the underlying predicate at `point`.
    pub fn contains(&self, point: &[f64]) -> bool {
        (self.oracle)(point)
    }

    /// Crossings along the probe grid of `resolution`, reusing the cache
    /// when it matches and is fine enough.
    fn crossings(
        &self,
        resolution: usize,
        tol: Tolerance,
    ) -> Result<Arc<Vec<ThresholdPoint>>, ProviderError> {
        if let Some(cache) = &self.cache {
            if resolution == self.resolution && cache.tol.is_finer_or_equal(tol) {
                return Ok(Arc::clone(&cache.crossings));
            }
        }
        let crossings = probe_grid(self.dim, resolution)
            .iter()
            .map(|probe| ray_crossing(self.oracle.as_ref(), probe, tol))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(crossings))
    }
}

impl Boundary for ProbeBoundary {
    fn dimension(&self) -> Dimension {
        self.dim
    }

    fn approximate(&self, tol: Tolerance) -> Result<Self, ProviderError> {
        let crossings = self.crossings(self.resolution, tol)?;
        tracing::debug!(
            dim = self.dim.get(),
            probes = crossings.len(),
            tol = tol.get(),
            "cached probe crossings"
        );
        Ok(Self {
            cache: Some(ProbeCache { tol, crossings }),
            ..self.clone()
        })
    }

    fn distance(&self, other: &Self, tol: Tolerance) -> Result<f64, ProviderError> {
        if self.dim != other.dim {
            return Err(ProviderError::DimensionMismatch {
                left: self.dim.get(),
                right: other.dim.get(),
            });
        }
        let resolution = self.resolution.min(other.resolution);
        let mine = self.crossings(resolution, tol)?;
        let theirs = other.crossings(resolution, tol)?;
        Ok(mine
            .iter()
            .zip(theirs.iter())
            .map(|(a, b)| a.euclidean(b))
            .fold(0.0, f64::max))
    }

    fn project(
        &self,
        target: &ProjectionTarget,
        tol: Tolerance,
    ) -> Result<ThresholdPoint, ProviderError> {
        if target.dim() != self.dim.get() {
            return Err(ProviderError::DimensionMismatch {
                left: self.dim.get(),
                right: target.dim(),
            });
        }
        match target {
            ProjectionTarget::Ray(point) => ray_crossing(self.oracle.as_ref(), point.coords(), tol),
            ProjectionTarget::Lexicographic(order) => {
                lex_crossing(self.oracle.as_ref(), order, tol)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bisection
// ---------------------------------------------------------------------------

/// Where the boundary crosses the segment from the origin to `p`.
///
/// Returns the crossing on the side where the oracle holds. A flip is
/// only reported as [`ProviderError::NonMonotone`] when the segment is
/// ordered componentwise (`p >= 0` or `p <= 0`); otherwise either
/// direction of flip is legitimate and is bisected.
fn ray_crossing(oracle: &Oracle, p: &[f64], tol: Tolerance) -> Result<ThresholdPoint, ProviderError> {
    let at = |t: f64| -> Vec<f64> { p.iter().map(|c| c * t).collect() };

    let origin_holds = oracle(&at(0.0));
    let end_holds = oracle(p);
    match (origin_holds, end_holds) {
        (true, true) => return Ok(ThresholdPoint::new(at(0.0))?),
        (false, false) => return Ok(ThresholdPoint::new(p.to_vec())?),
        (true, false) if p.iter().all(|&c| c >= 0.0) => {
            return Err(ProviderError::NonMonotone {
                below: at(0.0),
                above: p.to_vec(),
            })
        }
        (false, true) if p.iter().all(|&c| c <= 0.0) => {
            return Err(ProviderError::NonMonotone {
                below: p.to_vec(),
                above: at(0.0),
            })
        }
        _ => {}
    }

    // Scale so the crossing error is bounded in threshold-space units.
    // Invariant: the oracle agrees with the origin at `lo` and with `p` at `hi`.
    let length = p.iter().map(|c| c * c).sum::<f64>().sqrt();
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    let mut iterations = 0;
    while (hi - lo) * length > tol.get() {
        if iterations == MAX_BISECTIONS {
            return Err(ProviderError::NoConvergence { iterations });
        }
        let mid = 0.5 * (lo + hi);
        if oracle(&at(mid)) == origin_holds {
            lo = mid;
        } else {
            hi = mid;
        }
        iterations += 1;
    }
    let t = if end_holds { hi } else { lo };
    Ok(ThresholdPoint::new(at(t))?)
}

/// The boundary point reached by minimising axes in `order`'s priority.
fn lex_crossing(
    oracle: &Oracle,
    order: &AxisOrder,
    tol: Tolerance,
) -> Result<ThresholdPoint, ProviderError> {
    let mut x = vec![1.0; order.dim()];
    if !oracle(&x) {
        return Ok(ThresholdPoint::new(x)?);
    }

    // Invariant: oracle(&x) holds at the top of every iteration.
    for &axis in order.axes() {
        x[axis] = 0.0;
        if oracle(&x) {
            continue;
        }
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut iterations = 0;
        while hi - lo > tol.get() {
            if iterations == MAX_BISECTIONS {
                return Err(ProviderError::NoConvergence { iterations });
            }
            let mid = 0.5 * (lo + hi);
            x[axis] = mid;
            if oracle(&x) {
                hi = mid;
            } else {
                lo = mid;
            }
            iterations += 1;
        }
        x[axis] = hi;
    }
    Ok(ThresholdPoint::new(x)?)
}

/// Grid points of `resolution` steps per axis whose largest coordinate is 1.
fn probe_grid(dim: Dimension, resolution: usize) -> Vec<Vec<f64>> {
    let n = dim.get();
    let steps = resolution + 1;
    let mut probes = Vec::new();
    let mut index = vec![0usize; n];
    loop {
        if index.iter().any(|&i| i == resolution) {
            probes.push(index.iter().map(|&i| i as f64 / resolution as f64).collect());
        }
        // Mixed-radix increment; stop after the last grid point.
        let mut axis = 0;
        while axis < n {
            index[axis] += 1;
            if index[axis] < steps {
                break;
            }
            index[axis] = 0;
            axis += 1;
        }
        if axis == n {
            return probes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(n: usize) -> Dimension {
        Dimension::new(n).unwrap()
    }

    fn tol(t: f64) -> Tolerance {
        Tolerance::new(t).unwrap()
    }

    fn half_plane(c: f64) -> ProbeBoundary {
        GridProbeProvider::new()
            .build_boundary(move |x: &[f64]| x[0] + x[1] >= c, dim(2))
            .unwrap()
    }

    fn ray(coords: &[f64]) -> ProjectionTarget {
        ProjectionTarget::Ray(ThresholdPoint::new(coords.to_vec()).unwrap())
    }

    fn lex(axes: &[usize]) -> ProjectionTarget {
        ProjectionTarget::Lexicographic(AxisOrder::for_dimension(axes.to_vec(), dim(axes.len())).unwrap())
    }

    #[test]
    fn probe_grid_covers_upper_faces() {
        let grid = probe_grid(dim(2), 2);
        // (r+1)^n - r^n = 9 - 4
        assert_eq!(grid.len(), 5);
        assert!(grid.iter().all(|p| p.iter().any(|&c| c == 1.0)));
        assert!(grid.contains(&vec![1.0, 1.0]));
        assert!(grid.contains(&vec![0.0, 1.0]));
        assert!(grid.contains(&vec![1.0, 0.5]));
    }

    #[test]
    fn probe_count_matches_formula() {
        let boundary = GridProbeProvider::with_resolution(3)
            .build_boundary(|x: &[f64]| x.iter().sum::<f64>() >= 1.0, dim(3))
            .unwrap();
        assert_eq!(boundary.probe_count(), 64 - 27);
    }

    #[test]
    fn diagonal_ray_crosses_half_plane_at_half() {
        let b = half_plane(1.0);
        let p = b.project(&ray(&[1.0, 1.0]), tol(1e-6)).unwrap();
        assert!((p.coords()[0] - 0.5).abs() < 1e-5);
        assert!((p.coords()[1] - 0.5).abs() < 1e-5);
        assert!(b.contains(p.coords()));
    }

    #[test]
    fn ray_clamps_at_endpoints() {
        let always = GridProbeProvider::new()
            .build_boundary(|_: &[f64]| true, dim(2))
            .unwrap();
        let never = GridProbeProvider::new()
            .build_boundary(|_: &[f64]| false, dim(2))
            .unwrap();
        let target = ray(&[0.4, 0.8]);
        assert_eq!(always.project(&target, tol(1e-4)).unwrap().coords(), &[0.0, 0.0]);
        assert_eq!(never.project(&target, tol(1e-4)).unwrap().coords(), &[0.4, 0.8]);
    }

    #[test]
    fn non_monotone_oracle_detected() {
        let b = GridProbeProvider::new()
            .build_boundary(|x: &[f64]| x[0] < 0.5, dim(1))
            .unwrap();
        let err = b.project(&ray(&[1.0]), tol(1e-3)).unwrap_err();
        assert!(matches!(err, ProviderError::NonMonotone { .. }));
    }

    #[test]
    fn ray_toward_negative_orthant_bisects_monotone_oracle() {
        let b = GridProbeProvider::new()
            .build_boundary(|x: &[f64]| x[0] + x[1] >= -1.0, dim(2))
            .unwrap();
        let p = b.project(&ray(&[-1.0, -1.0]), tol(1e-6)).unwrap();
        assert!((p.coords()[0] + 0.5).abs() < 1e-5);
        assert!((p.coords()[1] + 0.5).abs() < 1e-5);
        assert!(b.contains(p.coords()));
    }

    #[test]
    fn ray_toward_negative_orthant_crossing_at_origin() {
        let b = GridProbeProvider::new()
            .build_boundary(|x: &[f64]| x[0] + x[1] >= 0.0, dim(2))
            .unwrap();
        let p = b.project(&ray(&[-1.0, -1.0]), tol(1e-4)).unwrap();
        assert!(p.coords().iter().all(|c| c.abs() < 1e-4));
    }

    #[test]
    fn ray_with_mixed_signs_bisects_either_flip() {
        // Along (1, -1) the sum stays 0 while x grows: the flip direction
        // depends only on the oracle, never a monotonicity violation.
        let b = GridProbeProvider::new()
            .build_boundary(|x: &[f64]| x[0] >= 0.5, dim(2))
            .unwrap();
        let p = b.project(&ray(&[1.0, -1.0]), tol(1e-6)).unwrap();
        assert!((p.coords()[0] - 0.5).abs() < 1e-5);

        let b = GridProbeProvider::new()
            .build_boundary(|x: &[f64]| x[1] >= -0.5, dim(2))
            .unwrap();
        let p = b.project(&ray(&[1.0, -1.0]), tol(1e-6)).unwrap();
        assert!((p.coords()[1] + 0.5).abs() < 1e-5);
        assert!(b.contains(p.coords()));
    }

    #[test]
    fn non_monotone_oracle_detected_toward_negative_orthant() {
        let b = GridProbeProvider::new()
            .build_boundary(|x: &[f64]| x[0] <= -0.5, dim(1))
            .unwrap();
        let err = b.project(&ray(&[-1.0]), tol(1e-3)).unwrap_err();
        assert_eq!(
            err,
            ProviderError::NonMonotone {
                below: vec![-1.0],
                above: vec![-0.0],
            }
        );
    }

    #[test]
    fn lexicographic_half_plane_mirrors() {
        let b = half_plane(1.0);
        let xy = b.project(&lex(&[0, 1]), tol(1e-6)).unwrap();
        let yx = b.project(&lex(&[1, 0]), tol(1e-6)).unwrap();
        assert!(xy.coords()[0].abs() < 1e-5);
        assert!((xy.coords()[1] - 1.0).abs() < 1e-5);
        assert!((yx.coords()[0] - 1.0).abs() < 1e-5);
        assert!(yx.coords()[1].abs() < 1e-5);
    }

    #[test]
    fn lexicographic_of_empty_region_is_top_corner() {
        let never = GridProbeProvider::new()
            .build_boundary(|_: &[f64]| false, dim(3))
            .unwrap();
        let p = never.project(&lex(&[2, 0, 1]), tol(1e-3)).unwrap();
        assert_eq!(p.coords(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn distance_is_zero_for_identical_predicates() {
        let a = half_plane(1.0);
        let b = half_plane(1.0);
        assert_eq!(a.distance(&b, tol(1e-3)).unwrap(), 0.0);
    }

    #[test]
    fn distance_is_symmetric_and_positive() {
        let a = half_plane(1.0);
        let b = half_plane(1.5);
        let ab = a.distance(&b, tol(1e-3)).unwrap();
        let ba = b.distance(&a, tol(1e-3)).unwrap();
        assert!(ab > 0.0);
        assert_eq!(ab, ba);
        // At least the diagonal gap: crossings at (0.5, 0.5) and (0.75, 0.75).
        assert!(ab >= 0.25 * 2f64.sqrt() - 2e-3);
    }

    #[test]
    fn distance_rejects_dimension_mismatch() {
        let a = half_plane(1.0);
        let b = GridProbeProvider::new()
            .build_boundary(|x: &[f64]| x[0] >= 0.5, dim(1))
            .unwrap();
        assert_eq!(
            a.distance(&b, tol(1e-3)),
            Err(ProviderError::DimensionMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn approximation_caches_crossings() {
        let exact = half_plane(1.2);
        assert!(!exact.is_approximated());
        let approx = exact.approximate(tol(1e-4)).unwrap();
        assert!(approx.is_approximated());
        assert_eq!(approx.cached_tolerance(), Some(tol(1e-4)));

        let other = half_plane(1.0);
        let from_cache = approx.distance(&other, tol(1e-3)).unwrap();
        let fresh = exact.distance(&other, tol(1e-3)).unwrap();
        assert!((from_cache - fresh).abs() < 2e-3);
    }

    #[test]
    fn project_rejects_wrong_dimension() {
        let b = half_plane(1.0);
        let err = b.project(&ray(&[0.5, 0.5, 0.5]), tol(1e-3)).unwrap_err();
        assert_eq!(err, ProviderError::DimensionMismatch { left: 2, right: 3 });
    }

    #[test]
    fn unreachable_tolerance_reports_no_convergence() {
        let b = half_plane(1.0);
        let err = b
            .project(&ray(&[1.0, 1.0]), Tolerance::new(f64::MIN_POSITIVE).unwrap())
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoConvergence { .. }));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Ray crossings of a half-plane land on the boundary within tolerance.
            #[test]
            fn ray_crossing_lies_on_boundary(
                c in 0.1f64..1.9,
                px in 0.05f64..1.0,
                py in 0.05f64..1.0,
            ) {
                let b = half_plane(c);
                let p = b.project(&ray(&[px, py]), tol(1e-6)).unwrap();
                let sum = p.coords()[0] + p.coords()[1];
                if px + py >= c {
                    prop_assert!((sum - c).abs() < 1e-5 || sum < 1e-12);
                } else {
                    prop_assert_eq!(p.coords(), &[px, py]);
                }
            }

            /// Below the cube's upper faces, distance grows with the threshold gap.
            #[test]
            fn distance_monotone_in_threshold_gap(c in 0.2f64..0.5, d1 in 0.05f64..0.45, d2 in 0.05f64..0.45) {
                let (near, far) = if d1 < d2 { (d1, d2) } else { (d2, d1) };
                prop_assume!(far - near > 0.02);
                let base = half_plane(c);
                let t = tol(1e-4);
                let dn = base.distance(&half_plane(c + near), t).unwrap();
                let df = base.distance(&half_plane(c + far), t).unwrap();
                prop_assert!(dn < df);
            }
        }
    }
}
