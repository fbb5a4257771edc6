//! The model-ready numeric encoding of a record.

use nalgebra::DVector;

/// Fixed-length ordered feature values.
///
/// The model has no notion of column names, so position `i` must mean the same
/// column the model was trained with at position `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(DVector<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(DVector::from_vec(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    pub fn as_vector(&self) -> &DVector<f64> {
        &self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}
