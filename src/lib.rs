//! Support vector regression over repository health metrics
//!
//! Standardizes a small table of repository activity metrics, fits an
//! epsilon-SVR solved with SMO, and scores held-out predictions.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod metrics;
pub mod optimizer;
pub mod pipeline;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{KernelSpec, ModelInfo, TrainedModel, SVR};
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{HealthError, Result};
pub use crate::data::{HealthDataset, RepoMetrics};
pub use crate::kernel::{Gamma, Kernel, LinearKernel, RBFKernel};
pub use crate::metrics::RegressionMetrics;
pub use crate::optimizer::{SVROptimizer, TrainedSVR};
pub use crate::pipeline::{HealthReport, PipelineConfig};
pub use crate::utils::StandardScaler;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
