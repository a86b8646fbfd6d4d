use iris_helpers::L2Dist;
use k_nn::KnnClassifier;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::PredictError;

/// The four measurements of one flower, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl Measurements {
    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
        }
    }

    /// Values in dataset feature order.
    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(vec![
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ])
    }

    fn validate(&self) -> Result<(), PredictError> {
        let fields = [
            ("sepal_length", self.sepal_length),
            ("sepal_width", self.sepal_width),
            ("petal_length", self.petal_length),
            ("petal_width", self.petal_width),
        ];
        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(PredictError::invalid(format!(
                "{} must be a finite number, got {}",
                name, value
            ))),
            None => Ok(()),
        }
    }
}

/// The echoed inputs together with the predicted species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
    pub n_neighbors: usize,
    pub prediction: String,
}

/// Unparsed inputs as they arrive from a query string or form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuery {
    #[serde(default)]
    pub sepal_length: String,
    #[serde(default)]
    pub sepal_width: String,
    #[serde(default)]
    pub petal_length: String,
    #[serde(default)]
    pub petal_width: String,
    #[serde(default, alias = "n_neighb")]
    pub n_neighbors: String,
}

impl RawQuery {
    /// Coerces the measurements to real numbers and the neighbour count to a
    /// positive integer.
    pub fn parse(&self) -> Result<(Measurements, usize), PredictError> {
        let measurements = Measurements::new(
            parse_measurement("sepal_length", &self.sepal_length)?,
            parse_measurement("sepal_width", &self.sepal_width)?,
            parse_measurement("petal_length", &self.petal_length)?,
            parse_measurement("petal_width", &self.petal_width)?,
        );
        let k = parse_neighbors(&self.n_neighbors)?;
        Ok((measurements, k))
    }
}

pub fn parse_measurement(name: &str, raw: &str) -> Result<f64, PredictError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PredictError::invalid(format!("{} is required", name)));
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| PredictError::invalid(format!("{} is not a number: {:?}", name, raw)))?;
    if !value.is_finite() {
        return Err(PredictError::invalid(format!("{} must be finite", name)));
    }
    Ok(value)
}

pub fn parse_neighbors(raw: &str) -> Result<usize, PredictError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PredictError::invalid("n_neighbors is required"));
    }
    match raw.parse::<usize>() {
        Ok(0) | Err(_) => Err(PredictError::invalid(format!(
            "n_neighbors must be a positive integer, got {:?}",
            raw
        ))),
        Ok(k) => Ok(k),
    }
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Classifies `measurements` with a k-NN classifier freshly fitted on `dataset`.
///
/// Fails with [`PredictError::InvalidInput`] before doing any work if a
/// measurement is not finite or `k` is outside `1..=dataset.len()`.
pub fn predict(
    dataset: &Dataset,
    measurements: Measurements,
    k: usize,
) -> Result<PredictionResult, PredictError> {
    let prediction = predict_species(dataset, measurements, k)?;
    Ok(PredictionResult {
        sepal_length: measurements.sepal_length,
        sepal_width: measurements.sepal_width,
        petal_length: measurements.petal_length,
        petal_width: measurements.petal_width,
        n_neighbors: k,
        prediction,
    })
}

/// Same as [`predict`] but returns only the capitalized species name.
pub fn predict_species(
    dataset: &Dataset,
    measurements: Measurements,
    k: usize,
) -> Result<String, PredictError> {
    measurements.validate()?;
    if k == 0 || k > dataset.len() {
        return Err(PredictError::invalid(format!(
            "n_neighbors must be between 1 and {}, got {}",
            dataset.len(),
            k
        )));
    }

    let knn = KnnClassifier::new(k, dataset.samples(), L2Dist)?;
    let label = knn.predict(measurements.to_array().view())?;
    let name = dataset
        .target_name(label)
        .ok_or(PredictError::UnknownLabel(label))?;

    tracing::trace!(k, label, "predicted {}", name);
    Ok(capitalize(name))
}

/// Parses `raw` and runs [`predict`].
pub fn predict_raw(dataset: &Dataset, raw: &RawQuery) -> Result<PredictionResult, PredictError> {
    let (measurements, k) = raw.parse()?;
    predict(dataset, measurements, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::collections::HashSet;

    const SPECIES: [&str; 3] = ["Setosa", "Versicolor", "Virginica"];

    fn dataset() -> Dataset {
        Dataset::load().unwrap()
    }

    fn raw(values: [&str; 5]) -> RawQuery {
        RawQuery {
            sepal_length: values[0].to_string(),
            sepal_width: values[1].to_string(),
            petal_length: values[2].to_string(),
            petal_width: values[3].to_string(),
            n_neighbors: values[4].to_string(),
        }
    }

    #[test]
    fn test_setosa_sample_with_three_neighbors() {
        let dataset = dataset();
        let result = predict(&dataset, Measurements::new(5.1, 3.5, 1.4, 0.2), 3).unwrap();
        assert_eq!(result.prediction, "Setosa");
    }

    #[test]
    fn test_each_class_is_reachable() {
        let dataset = dataset();
        let versicolor = Measurements::new(6.4, 3.2, 4.5, 1.5);
        let virginica = Measurements::new(7.7, 3.0, 6.1, 2.3);
        assert_eq!(predict_species(&dataset, versicolor, 5).unwrap(), "Versicolor");
        assert_eq!(predict_species(&dataset, virginica, 5).unwrap(), "Virginica");
    }

    #[test]
    fn test_result_echoes_inputs() {
        let dataset = dataset();
        let measurements = Measurements::new(6.05, 2.75, 4.95, 1.65);
        let result = predict(&dataset, measurements, 4).unwrap();
        assert_eq!(result.sepal_width, 2.75);
        assert_eq!(result.petal_length, 4.95);
        assert_eq!(result.n_neighbors, 4);
        assert_eq!(result.sepal_length, 6.05);
        assert_eq!(result.petal_width, 1.65);
    }

    #[test]
    fn test_k_equal_to_dataset_size() {
        let dataset = dataset();
        // Every class gets 50 votes; the tie goes to the first label.
        let species =
            predict_species(&dataset, Measurements::new(7.0, 3.0, 6.0, 2.0), dataset.len())
                .unwrap();
        assert_eq!(species, "Setosa");
    }

    #[test]
    fn test_k_out_of_range() {
        let dataset = dataset();
        let m = Measurements::new(5.1, 3.5, 1.4, 0.2);
        assert!(predict(&dataset, m, 0).unwrap_err().is_invalid_input());
        assert!(predict(&dataset, m, dataset.len() + 1)
            .unwrap_err()
            .is_invalid_input());
    }

    #[test]
    fn test_non_finite_measurement() {
        let dataset = dataset();
        let m = Measurements::new(f64::NAN, 3.5, 1.4, 0.2);
        assert!(predict(&dataset, m, 3).unwrap_err().is_invalid_input());
        let m = Measurements::new(5.1, 3.5, f64::INFINITY, 0.2);
        assert!(predict(&dataset, m, 3).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_raw_query_parsing() {
        let (m, k) = raw([" 5.1", "3.5 ", "1.4", "0.2", "3"]).parse().unwrap();
        assert_eq!(m, Measurements::new(5.1, 3.5, 1.4, 0.2));
        assert_eq!(k, 3);

        // Integers are accepted as real numbers.
        let (m, _) = raw(["2", "2", "2", "2", "2"]).parse().unwrap();
        assert_eq!(m, Measurements::new(2.0, 2.0, 2.0, 2.0));
    }

    #[test]
    fn test_non_numeric_measurement_is_rejected() {
        let dataset = dataset();
        let err = predict_raw(&dataset, &raw(["abc", "3.5", "1.4", "0.2", "3"])).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("sepal_length"));
    }

    #[test]
    fn test_invalid_neighbor_counts_are_rejected() {
        for k in ["", "0", "-1", "2.5", "three"] {
            let err = raw(["5.1", "3.5", "1.4", "0.2", k]).parse().unwrap_err();
            assert!(err.is_invalid_input(), "{:?}", k);
        }
    }

    #[test]
    fn test_missing_and_non_finite_fields_are_rejected() {
        for values in [
            ["", "3.5", "1.4", "0.2", "3"],
            ["5.1", "   ", "1.4", "0.2", "3"],
            ["5.1", "3.5", "inf", "0.2", "3"],
            ["5.1", "3.5", "1.4", "NaN", "3"],
        ] {
            assert!(raw(values).parse().unwrap_err().is_invalid_input(), "{:?}", values);
        }
    }

    #[test]
    fn test_raw_query_accepts_form_field_name() {
        let query: RawQuery = serde_json::from_str(
            r#"{"sepal_length":"1","sepal_width":"1","petal_length":"1","petal_width":"1","n_neighb":"6"}"#,
        )
        .unwrap();
        assert_eq!(query.n_neighbors, "6");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("setosa"), "Setosa");
        assert_eq!(capitalize("Virginica"), "Virginica");
        assert_eq!(capitalize("éclair"), "Éclair");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_predictions_are_deterministic_and_named() {
        let dataset = dataset();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut seen = HashSet::new();

        for _ in 0..200 {
            let m = Measurements::new(
                rng.random_range(4.0..8.0),
                rng.random_range(2.0..4.5),
                rng.random_range(1.0..7.0),
                rng.random_range(0.1..2.5),
            );
            let k = rng.random_range(1..=dataset.len());
            let first = predict(&dataset, m, k).unwrap();
            let second = predict(&dataset, m, k).unwrap();
            assert_eq!(first, second);
            assert!(SPECIES.contains(&first.prediction.as_str()));
            seen.insert(first.prediction);
        }
        assert!(seen.contains("Setosa"));
    }

    #[test]
    fn test_concurrent_predictions_do_not_interfere() {
        let dataset = dataset();
        // Near the versicolor/virginica boundary the answer depends on k.
        let m = Measurements::new(6.0, 2.7, 5.1, 1.6);
        let expected: Vec<String> = (1..=10)
            .map(|k| predict_species(&dataset, m, k).unwrap())
            .collect();

        std::thread::scope(|s| {
            let handles: Vec<_> = (1..=10)
                .map(|k| {
                    let dataset = &dataset;
                    s.spawn(move || (k, predict_species(dataset, m, k).unwrap()))
                })
                .collect();
            for handle in handles {
                let (k, species) = handle.join().unwrap();
                assert_eq!(species, expected[k - 1], "k = {}", k);
            }
        });
    }

    #[test]
    fn test_dataset_is_unchanged_by_predictions() {
        let dataset = dataset();
        let before = dataset.samples().to_vec();
        for k in 1..=6 {
            predict(&dataset, Measurements::new(5.0, 3.0, 4.0, 1.0), k).unwrap();
        }
        assert_eq!(dataset.samples(), before.as_slice());
    }
}
