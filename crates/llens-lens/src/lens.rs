//! # Lens
//!
//! A lens turns one data instance into a boolean predicate over threshold
//! vectors. Any `Fn(&D) -> P` closure whose output `P` is such a predicate
//! is a lens; named types can implement [`Lens`] directly.
//!
//! ## Monotonicity
//!
//! The predicate must be monotone in every coordinate: raising a threshold
//! never turns true into false. The geometry provider relies on this; the
//! lens layer does not check it.

/// A mapping from data instances to monotone threshold predicates.
pub trait Lens<D: ?Sized>: Send + Sync {
    /// The predicate produced for one data instance.
    type Predicate: Fn(&[f64]) -> bool + Send + Sync + 'static;

    /// The predicate induced by `data`.
    fn predicate(&self, data: &D) -> Self::Predicate;
}

impl<D, F, P> Lens<D> for F
where
    D: ?Sized,
    F: Fn(&D) -> P + Send + Sync,
    P: Fn(&[f64]) -> bool + Send + Sync + 'static,
{
    type Predicate = P;

    fn predicate(&self, data: &D) -> P {
        self(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Component-wise dominance of a stored corner.
    struct Dominates;

    impl Lens<[f64]> for Dominates {
        type Predicate = Box<dyn Fn(&[f64]) -> bool + Send + Sync>;

        fn predicate(&self, corner: &[f64]) -> Self::Predicate {
            let corner = corner.to_vec();
            Box::new(move |x: &[f64]| x.iter().zip(&corner).all(|(a, c)| a >= c))
        }
    }

    #[test]
    fn closures_are_lenses() {
        let lens = |t: &f64| {
            let t = *t;
            move |x: &[f64]| x[0] >= t
        };
        let p = Lens::<f64>::predicate(&lens, &0.5);
        assert!(p(&[0.7]));
        assert!(!p(&[0.3]));
    }

    #[test]
    fn named_types_are_lenses() {
        let p = Dominates.predicate(&[0.2, 0.4]);
        assert!(p(&[0.2, 0.4]));
        assert!(p(&[0.9, 0.9]));
        assert!(!p(&[0.1, 0.9]));
    }
}
