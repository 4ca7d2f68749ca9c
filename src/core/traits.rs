//! Core traits for the regression pipeline

use crate::core::Sample;

/// Dataset abstraction for efficient data access
pub trait Dataset {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize;

    /// Get a single sample by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn get_sample(&self, i: usize) -> Sample;

    /// Get all samples in dataset order
    fn samples(&self) -> Vec<Sample> {
        (0..self.len()).map(|i| self.get_sample(i)).collect()
    }

    /// Get all regression targets
    fn get_targets(&self) -> Vec<f64>;

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trained regression model
pub trait RegressionModel {
    /// Predict the target of a single sample
    fn predict(&self, sample: &Sample) -> f64;

    /// Predict multiple samples
    fn predict_batch(&self, samples: &[Sample]) -> Vec<f64> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    /// Get the number of support vectors
    fn n_support_vectors(&self) -> usize;

    /// Get the intercept term
    fn intercept(&self) -> f64;
}
