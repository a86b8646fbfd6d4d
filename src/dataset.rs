//! The bundled Iris reference dataset.
//!
//! The data is stored in the scikit-learn layout: a first record
//! `n_samples,n_features,name_0,name_1,...` followed by `n_samples` records of
//! `n_features` measurements and an integer class label.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use iris_helpers::DataPoint;
use ndarray::Array1;

use crate::error::DatasetError;

const IRIS_CSV: &str = include_str!("../data/iris.csv");

/// An immutable labelled dataset plus the label → name mapping.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Vec<DataPoint<usize, f64>>,
    target_names: Vec<String>,
    n_features: usize,
}

impl Dataset {
    /// Loads the 150-sample Iris dataset compiled into the binary.
    pub fn load() -> Result<Self, DatasetError> {
        let dataset = Self::from_reader(IRIS_CSV.as_bytes())?;
        tracing::debug!(
            samples = dataset.len(),
            classes = dataset.target_names.len(),
            "loaded iris dataset"
        );
        Ok(dataset)
    }

    /// Parses a dataset in the scikit-learn CSV layout.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = reader.records();

        let header = records.next().ok_or(DatasetError::MissingHeader)??;
        let (n_samples, n_features, target_names) = parse_header(&header)?;

        let mut samples = Vec::with_capacity(n_samples);
        for (idx, record) in records.enumerate() {
            let record = record?;
            samples.push(parse_record(idx + 1, &record, n_features, target_names.len())?);
        }

        if samples.len() != n_samples {
            return Err(DatasetError::SampleCountMismatch {
                expected: n_samples,
                found: samples.len(),
            });
        }
        if samples.is_empty() {
            return Err(DatasetError::Empty);
        }

        Ok(Self {
            samples,
            target_names,
            n_features,
        })
    }

    pub fn samples(&self) -> &[DataPoint<usize, f64>] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }

    /// The species name for a class label, if the label exists.
    pub fn target_name(&self, label: usize) -> Option<&str> {
        self.target_names.get(label).map(String::as_str)
    }
}

fn parse_header(header: &StringRecord) -> Result<(usize, usize, Vec<String>), DatasetError> {
    let field = |idx: usize, what: &str| -> Result<usize, DatasetError> {
        header
            .get(idx)
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| DatasetError::InvalidHeader(format!("{} is not a count", what)))
    };
    let n_samples = field(0, "n_samples")?;
    let n_features = field(1, "n_features")?;
    if n_features == 0 {
        return Err(DatasetError::InvalidHeader("n_features is zero".to_string()));
    }

    let target_names: Vec<String> = header.iter().skip(2).map(str::to_string).collect();
    if target_names.is_empty() || target_names.iter().any(|name| name.is_empty()) {
        return Err(DatasetError::InvalidHeader(
            "missing target names".to_string(),
        ));
    }
    Ok((n_samples, n_features, target_names))
}

fn parse_record(
    record_idx: usize,
    record: &StringRecord,
    n_features: usize,
    n_classes: usize,
) -> Result<DataPoint<usize, f64>, DatasetError> {
    let invalid = |reason: String| DatasetError::InvalidRecord {
        record: record_idx,
        reason,
    };

    if record.len() != n_features + 1 {
        return Err(invalid(format!(
            "expected {} fields, found {}",
            n_features + 1,
            record.len()
        )));
    }

    let mut features = Vec::with_capacity(n_features);
    for (col, raw) in record.iter().take(n_features).enumerate() {
        let value: f64 = raw
            .parse()
            .map_err(|_| invalid(format!("column {} is not a number: {:?}", col, raw)))?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(format!("column {} out of range: {}", col, value)));
        }
        features.push(value);
    }

    let raw_label = &record[n_features];
    let label: usize = raw_label
        .parse()
        .map_err(|_| invalid(format!("label is not a class index: {:?}", raw_label)))?;
    if label >= n_classes {
        return Err(invalid(format!(
            "label {} has no target name ({} classes)",
            label, n_classes
        )));
    }

    Ok(DataPoint::new(Array1::from(features), label))
}
