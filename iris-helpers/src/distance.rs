use crate::Float;
use ndarray::{ArrayView1, Zip};

/// A distance metric between two feature vectors.
///
/// `rdistance` is a "reduced" distance: cheaper to compute and monotone in the
/// true distance, so it can be used for ranking neighbours.
pub trait Distance<F: Float>: Clone + Send + Sync {
    /// The true distance between `a` and `b`.
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F;

    /// The reduced distance between `a` and `b`. Defaults to `distance`.
    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.distance(a, b)
    }
}

/// Euclidean distance. The reduced distance is the squared Euclidean distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2Dist;

impl<F: Float> Distance<F> for L2Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.rdistance(a, b).sqrt()
    }

    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        Zip::from(&a).and(&b).fold(F::zero(), |acc, &x, &y| {
            let d = x - y;
            acc + d * d
        })
    }
}
