//! Dataset implementations

pub mod health;

pub use self::health::{HealthDataset, RepoMetrics, FEATURE_NAMES, HEALTH_RECORDS};
