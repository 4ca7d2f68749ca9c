//! Optimization entry points for SVR
//!
//! Binds a kernel to the SMO solver and turns the dual solution into a
//! model that can make predictions.

use crate::core::{Dataset, OptimizationResult, OptimizerConfig, RegressionModel, Result, Sample};
use crate::kernel::Kernel;
use crate::solver::SMOSolver;
use std::sync::Arc;

/// High-level SVR optimizer that integrates a kernel with the solver
pub struct SVROptimizer<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> SVROptimizer<K> {
    pub fn new(kernel: K, config: OptimizerConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    /// Create an optimizer with the default configuration
    pub fn with_kernel(kernel: K) -> Self {
        Self::new(kernel, OptimizerConfig::default())
    }

    /// Train on every sample of a dataset
    pub fn train<D: Dataset>(&self, dataset: &D) -> Result<TrainedSVR<K>> {
        self.train_samples(&dataset.samples())
    }

    /// Train on a slice of samples
    pub fn train_samples(&self, samples: &[Sample]) -> Result<TrainedSVR<K>> {
        let solver = SMOSolver::new(Arc::clone(&self.kernel), self.config.clone());
        let result = solver.solve(samples)?;

        Ok(TrainedSVR::new(Arc::clone(&self.kernel), samples, result))
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

/// A trained SVR model
pub struct TrainedSVR<K: Kernel> {
    kernel: Arc<K>,
    support_vectors: Vec<Sample>,
    dual_coef: Vec<f64>,
    intercept: f64,
    support_indices: Vec<usize>,
    iterations: usize,
}

impl<K: Kernel> TrainedSVR<K> {
    pub(crate) fn new(kernel: Arc<K>, training_samples: &[Sample], result: OptimizationResult) -> Self {
        let support_vectors = result
            .support_vectors
            .iter()
            .map(|&i| training_samples[i].clone())
            .collect();
        let dual_coef = result
            .support_vectors
            .iter()
            .map(|&i| result.coef[i])
            .collect();

        Self {
            kernel,
            support_vectors,
            dual_coef,
            intercept: result.b,
            support_indices: result.support_vectors,
            iterations: result.iterations,
        }
    }

    /// f(x) = Σ coef_i K(sv_i, x) + b
    pub fn decision_function(&self, sample: &Sample) -> f64 {
        let sum: f64 = self
            .support_vectors
            .iter()
            .zip(self.dual_coef.iter())
            .map(|(sv, &coef)| coef * self.kernel.compute(&sv.features, &sample.features))
            .sum();

        sum + self.intercept
    }

    pub fn support_vectors(&self) -> &[Sample] {
        &self.support_vectors
    }

    /// `alpha_i - alpha_i*` for each support vector
    pub fn dual_coef(&self) -> &[f64] {
        &self.dual_coef
    }

    /// Indices of the support vectors in the training slice
    pub fn support_vector_indices(&self) -> &[usize] {
        &self.support_indices
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

impl<K: Kernel> RegressionModel for TrainedSVR<K> {
    fn predict(&self, sample: &Sample) -> f64 {
        self.decision_function(sample)
    }

    fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    fn intercept(&self) -> f64 {
        self.intercept
    }
}
