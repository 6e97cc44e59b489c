//! Batch fan-out shared by every multi-item operation.

use llens_core::LensConfig;
use rayon::prelude::*;

/// Apply `f` to every item, on the rayon pool when `config` allows it.
///
/// Output order always matches input order; the parallel path joins
/// before returning.
pub(crate) fn map_batch<T, R, F>(config: &LensConfig, items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Send + Sync,
{
    if config.should_parallelize(items.len()) {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

/// Fallible [`map_batch`]: stops at the first `Err`.
///
/// Sequentially nothing after the failing item is evaluated. On the rayon
/// pool, workers stop picking up new items once any item has failed.
pub(crate) fn try_map_batch<T, R, E, F>(config: &LensConfig, items: &[T], f: F) -> Result<Vec<R>, E>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Send + Sync,
{
    if config.should_parallelize(items.len()) {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}
