//! End-to-end health regression: split, scale, fit, predict, evaluate

use crate::api::{KernelSpec, ModelInfo, SVR};
use crate::core::{Dataset, Result, WorkingSetStrategy};
use crate::metrics::RegressionMetrics;
use crate::utils::{train_test_split, FeatureStats, StandardScaler};
use log::info;
use serde::Serialize;
use std::fmt::Write as _;

/// Knobs for one pipeline run; the defaults reproduce the reference setup
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Fraction of rows held out for testing
    pub test_size: f64,
    /// Seed for the train/test shuffle
    pub seed: u32,
    pub c: f64,
    pub epsilon: f64,
    pub kernel: KernelSpec,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub working_set_strategy: WorkingSetStrategy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            c: 1.0,
            epsilon: 0.1,
            kernel: KernelSpec::default(),
            tolerance: 1e-3,
            max_iterations: 100_000,
            working_set_strategy: WorkingSetStrategy::default(),
        }
    }
}

/// Everything a run produces
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub predictions: Vec<f64>,
    pub actual: Vec<f64>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub metrics: RegressionMetrics,
    pub scaler: Vec<FeatureStats>,
    pub model: ModelInfo,
}

impl HealthReport {
    /// Plain-text summary: predictions, then one line per metric
    pub fn render_text(&self) -> String {
        let predictions: Vec<String> = self.predictions.iter().map(|p| p.to_string()).collect();

        let mut out = String::new();
        // writing into a String cannot fail
        let _ = writeln!(out, "Predictions: [{}]", predictions.join(", "));
        let _ = writeln!(out, "Mean Absolute Error: {}", self.metrics.mean_absolute_error);
        let _ = writeln!(out, "Mean Squared Error: {}", self.metrics.mean_squared_error);
        let _ = writeln!(out, "R-squared: {}", self.metrics.r2);
        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run the five pipeline steps over `dataset`
pub fn run<D: Dataset>(dataset: &D, config: &PipelineConfig) -> Result<HealthReport> {
    let samples = dataset.samples();
    let n_features = dataset.dim();
    info!("Loaded {} samples with {} features", samples.len(), n_features);

    let split = train_test_split(&samples, config.test_size, config.seed)?;
    info!(
        "Split into {} train / {} test rows (seed {})",
        split.train.len(),
        split.test.len(),
        config.seed
    );

    let (scaler, train_scaled) = StandardScaler::fit_transform(&split.train, n_features)?;
    let test_scaled = scaler.transform(&split.test)?;

    let model = SVR::new()
        .with_kernel(config.kernel)
        .with_c(config.c)
        .with_epsilon(config.epsilon)
        .with_tolerance(config.tolerance)
        .with_max_iterations(config.max_iterations)
        .with_working_set_strategy(config.working_set_strategy)
        .train_samples(&train_scaled, n_features)?;

    let model_info = model.info();
    info!(
        "Trained {} SVR: {} support vectors, intercept {:.6}",
        model_info.kernel, model_info.n_support_vectors, model_info.intercept
    );

    let predictions = model.predict_batch(&test_scaled);
    let actual: Vec<f64> = split.test.iter().map(|s| s.target).collect();
    let metrics = RegressionMetrics::compute(&actual, &predictions)?;

    Ok(HealthReport {
        predictions,
        actual,
        train_indices: split.train_indices,
        test_indices: split.test_indices,
        metrics,
        scaler: scaler.feature_stats().to_vec(),
        model: model_info,
    })
}
