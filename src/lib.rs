//! Iris species classification with k-nearest neighbours.
//!
//! [`Dataset`] holds the fixed reference data and [`predict`] fits a fresh
//! k-NN classifier on it for every query.

mod dataset;
mod error;
mod predictor;

pub use dataset::Dataset;
pub use error::{DatasetError, PredictError};
pub use predictor::{
    Measurements, PredictionResult, RawQuery, capitalize, parse_measurement, parse_neighbors,
    predict, predict_raw, predict_species,
};

// Re-export the building blocks so callers need only this crate.
pub use iris_helpers::{DataPoint, Distance, Float, L2Dist};
pub use k_nn::{KnnClassifier, KnnError};
