//! High-level API for support vector regression
//!
//! ```rust,no_run
//! use repohealth::api::SVR;
//! use repohealth::data::HealthDataset;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = HealthDataset::embedded();
//! let model = SVR::new().with_c(1.0).with_epsilon(0.1).train(&dataset)?;
//! println!("support vectors: {}", model.info().n_support_vectors);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Dataset, OptimizerConfig, RegressionModel, Result, Sample, SparseVector, WorkingSetStrategy,
};
use crate::kernel::{Gamma, Kernel, LinearKernel, RBFKernel};
use crate::metrics::RegressionMetrics;
use crate::optimizer::{SVROptimizer, TrainedSVR};
use serde::Serialize;

/// Kernel requested for training; gamma is resolved against the data
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum KernelSpec {
    Rbf(Gamma),
    Linear,
}

impl Default for KernelSpec {
    fn default() -> Self {
        KernelSpec::Rbf(Gamma::Scale)
    }
}

impl KernelSpec {
    fn fit(&self, samples: &[Sample], n_features: usize) -> Result<FittedKernel> {
        match self {
            KernelSpec::Rbf(gamma) => {
                let gamma = gamma.resolve(samples, n_features)?;
                Ok(FittedKernel::Rbf(RBFKernel::new(gamma)))
            }
            KernelSpec::Linear => Ok(FittedKernel::Linear(LinearKernel::new())),
        }
    }
}

/// Kernel with every parameter fixed
#[derive(Debug, Clone, Copy)]
pub enum FittedKernel {
    Rbf(RBFKernel),
    Linear(LinearKernel),
}

impl FittedKernel {
    pub fn gamma(&self) -> Option<f64> {
        match self {
            FittedKernel::Rbf(k) => Some(k.gamma()),
            FittedKernel::Linear(_) => None,
        }
    }
}

impl Kernel for FittedKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        match self {
            FittedKernel::Rbf(k) => k.compute(x, y),
            FittedKernel::Linear(k) => k.compute(x, y),
        }
    }

    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        match self {
            FittedKernel::Rbf(k) => k.compute_with_norms(x, y, x_norm_sq, y_norm_sq),
            FittedKernel::Linear(k) => k.compute_with_norms(x, y, x_norm_sq, y_norm_sq),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FittedKernel::Rbf(k) => k.name(),
            FittedKernel::Linear(k) => k.name(),
        }
    }
}

/// SVR builder; defaults are RBF with gamma = scale, C = 1.0, epsilon = 0.1
#[derive(Debug, Clone, Default)]
pub struct SVR {
    kernel: KernelSpec,
    config: OptimizerConfig,
}

impl SVR {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kernel(mut self, kernel: KernelSpec) -> Self {
        self.kernel = kernel;
        self
    }

    /// Use an RBF kernel with the given gamma policy
    pub fn with_gamma(self, gamma: Gamma) -> Self {
        self.with_kernel(KernelSpec::Rbf(gamma))
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set the half-width of the insensitive tube
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Set the solver stopping tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set kernel cache size in bytes
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.config.cache_size = cache_size;
        self
    }

    pub fn with_working_set_strategy(mut self, strategy: WorkingSetStrategy) -> Self {
        self.config.working_set_strategy = strategy;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Train on every sample of a dataset
    pub fn train<D: Dataset>(self, dataset: &D) -> Result<TrainedModel> {
        self.train_samples(&dataset.samples(), dataset.dim())
    }

    /// Train on samples with `n_features` columns
    pub fn train_samples(self, samples: &[Sample], n_features: usize) -> Result<TrainedModel> {
        let kernel = self.kernel.fit(samples, n_features)?;
        let model = SVROptimizer::new(kernel, self.config).train_samples(samples)?;
        Ok(TrainedModel { model })
    }
}

/// Trained SVR with a high-level prediction interface
pub struct TrainedModel {
    model: TrainedSVR<FittedKernel>,
}

impl TrainedModel {
    pub fn predict(&self, sample: &Sample) -> f64 {
        self.model.predict(sample)
    }

    pub fn predict_batch(&self, samples: &[Sample]) -> Vec<f64> {
        self.model.predict_batch(samples)
    }

    pub fn predict_dataset<D: Dataset>(&self, dataset: &D) -> Vec<f64> {
        self.predict_batch(&dataset.samples())
    }

    /// Predict `samples` and score against their targets
    pub fn evaluate(&self, samples: &[Sample]) -> Result<RegressionMetrics> {
        let predictions = self.predict_batch(samples);
        let targets: Vec<f64> = samples.iter().map(|s| s.target).collect();
        RegressionMetrics::compute(&targets, &predictions)
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            kernel: self.model.kernel().name().to_string(),
            gamma: self.model.kernel().gamma(),
            n_support_vectors: self.model.n_support_vectors(),
            intercept: self.model.intercept(),
            support_vector_indices: self.model.support_vector_indices().to_vec(),
            dual_coef: self.model.dual_coef().to_vec(),
            iterations: self.model.iterations(),
        }
    }
}

/// Model information
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub kernel: String,
    pub gamma: Option<f64>,
    pub n_support_vectors: usize,
    pub intercept: f64,
    pub support_vector_indices: Vec<usize>,
    pub dual_coef: Vec<f64>,
    pub iterations: usize,
}
