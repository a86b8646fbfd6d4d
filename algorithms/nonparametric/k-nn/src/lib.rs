use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
// These are the core components from our shared library.
use iris_helpers::{DataPoint, Distance, Float};

use ndarray::ArrayView1;

/// Errors that can occur when using the k-NN classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum KnnError {
    /// k cannot be zero for a k-NN classifier
    InvalidK,
    /// Cannot predict with an empty training set
    EmptyTrainingSet,
    /// k is larger than the number of training samples
    KTooLarge { k: usize, n_samples: usize },
    /// The query point does not have as many features as the training data
    DimensionMismatch { expected: usize, found: usize },
    /// Invalid distance comparison (likely due to NaN values in data)
    InvalidDistance,
}

impl Display for KnnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KnnError::InvalidK => write!(f, "k cannot be zero for a k-NN classifier"),
            KnnError::EmptyTrainingSet => write!(f, "Cannot predict with an empty training set"),
            KnnError::KTooLarge { k, n_samples } => write!(
                f,
                "k = {} exceeds the number of training samples ({})",
                k, n_samples
            ),
            KnnError::DimensionMismatch { expected, found } => write!(
                f,
                "expected {} features per point, found {}",
                expected, found
            ),
            KnnError::InvalidDistance => write!(
                f,
                "Invalid distance comparison (likely due to NaN values in data)"
            ),
        }
    }
}

impl Error for KnnError {}

/// A k-Nearest Neighbors (k-NN) classifier.
///
/// The classifier borrows its training set, so "fitting" one is as cheap as
/// constructing it. It predicts the label of a new data point by finding the
/// `k` closest points in the training set and taking a majority vote among
/// their labels.
///
/// Predictions are deterministic:
/// - neighbours at equal distance are ranked by their position in the training set;
/// - a tied vote goes to the smallest label.
///
/// # Type Parameters
///
/// * `L`: The type of the label (e.g., a class index or a species name).
/// * `F`: The float type for the features (e.g., `f32`, `f64`).
/// * `D`: The distance metric, which must implement the `Distance` trait.
#[derive(Debug, Clone)]
pub struct KnnClassifier<'a, L, F, D>
where
    L: Clone + Ord + Debug,
    F: Float,
    D: Distance<F>,
{
    k: usize,
    training_data: &'a [DataPoint<L, F>],
    distance: D,
}

impl<'a, L, F, D> KnnClassifier<'a, L, F, D>
where
    L: Clone + Ord + Debug,
    F: Float,
    D: Distance<F>,
{
    /// Creates a new k-NN classifier over `training_data`.
    ///
    /// # Errors
    ///
    /// Returns `KnnError::InvalidK` if `k` is 0.
    pub fn new(
        k: usize,
        training_data: &'a [DataPoint<L, F>],
        distance: D,
    ) -> Result<Self, KnnError> {
        if k == 0 {
            return Err(KnnError::InvalidK);
        }
        Ok(Self {
            k,
            training_data,
            distance,
        })
    }

    /// Returns the `k` nearest training points as `(index, reduced distance)`,
    /// closest first.
    ///
    /// # Errors
    ///
    /// Returns `KnnError::EmptyTrainingSet` if the training data is empty.
    /// Returns `KnnError::KTooLarge` if `k` exceeds the training set size.
    /// Returns `KnnError::DimensionMismatch` if `features` has the wrong length.
    /// Returns `KnnError::InvalidDistance` if a distance is NaN.
    pub fn neighbors(&self, features: ArrayView1<F>) -> Result<Vec<(usize, F)>, KnnError> {
        let Some(first) = self.training_data.first() else {
            return Err(KnnError::EmptyTrainingSet);
        };
        if self.k > self.training_data.len() {
            return Err(KnnError::KTooLarge {
                k: self.k,
                n_samples: self.training_data.len(),
            });
        }
        if features.len() != first.dim() {
            return Err(KnnError::DimensionMismatch {
                expected: first.dim(),
                found: features.len(),
            });
        }

        // Reduced distance is enough to rank neighbours.
        let mut distances = Vec::with_capacity(self.training_data.len());
        for (idx, dp) in self.training_data.iter().enumerate() {
            if dp.dim() != features.len() {
                return Err(KnnError::DimensionMismatch {
                    expected: features.len(),
                    found: dp.dim(),
                });
            }
            let dist = self.distance.rdistance(dp.features.view(), features);
            if dist.is_nan() {
                return Err(KnnError::InvalidDistance);
            }
            distances.push((idx, dist));
        }

        // Stable sort: equal distances keep training order.
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        distances.truncate(self.k);
        Ok(distances)
    }

    /// Predicts the label for a new, unseen data point.
    ///
    /// # Errors
    ///
    /// Same as [`KnnClassifier::neighbors`].
    pub fn predict(&self, features: ArrayView1<F>) -> Result<L, KnnError> {
        let neighbors = self.neighbors(features)?;

        let mut votes: BTreeMap<&L, usize> = BTreeMap::new();
        for (idx, _) in &neighbors {
            *votes.entry(&self.training_data[*idx].label).or_insert(0) += 1;
        }

        // BTreeMap iterates labels in ascending order, so keeping the first
        // strict maximum resolves ties towards the smallest label.
        let mut winner: Option<(&L, usize)> = None;
        for (label, count) in votes {
            match winner {
                Some((_, best)) if count <= best => {}
                _ => winner = Some((label, count)),
            }
        }

        winner
            .map(|(label, _)| label.clone())
            .ok_or(KnnError::EmptyTrainingSet)
    }
}
