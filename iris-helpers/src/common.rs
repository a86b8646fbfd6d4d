use crate::Float;
use ndarray::Array1;
use std::fmt::Debug;

/// A single labelled sample.
///
/// L: The type of the label (e.g. a class index or a species name).
/// F: The float type for the features (e.g., f32, f64).
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint<L, F>
where
    L: Clone + Debug,
    F: Float,
{
    pub features: Array1<F>,
    pub label: L,
}

impl<L, F> DataPoint<L, F>
where
    L: Clone + Debug,
    F: Float,
{
    pub fn new(features: Array1<F>, label: L) -> Self {
        DataPoint { features, label }
    }

    /// Number of features carried by this sample.
    pub fn dim(&self) -> usize {
        self.features.len()
    }
}
