//! Repository health observations
//!
//! Each record is one repository: four activity metrics used as features and
//! the `health_ratio` score used as the regression target.

use crate::core::{Dataset, Sample};
use serde::Serialize;

/// Feature columns in the order they appear in every feature vector
pub const FEATURE_NAMES: [&str; 4] = [
    "issue_resolution_time",
    "pr_merge_frequency",
    "star_growth_rate",
    "contributor_retention",
];

/// One repository observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RepoMetrics {
    /// Days to resolve an issue
    pub issue_resolution_time: f64,
    /// Pull requests merged in the last month
    pub pr_merge_frequency: u32,
    /// Stars added in the last month
    pub star_growth_rate: u32,
    /// Percentage of contributors still active
    pub contributor_retention: f64,
    /// Health score (target)
    pub health_ratio: f64,
}

impl RepoMetrics {
    pub const fn new(
        issue_resolution_time: f64,
        pr_merge_frequency: u32,
        star_growth_rate: u32,
        contributor_retention: f64,
        health_ratio: f64,
    ) -> Self {
        Self {
            issue_resolution_time,
            pr_merge_frequency,
            star_growth_rate,
            contributor_retention,
            health_ratio,
        }
    }

    /// Feature vector in [`FEATURE_NAMES`] order
    pub fn features(&self) -> [f64; 4] {
        [
            self.issue_resolution_time,
            f64::from(self.pr_merge_frequency),
            f64::from(self.star_growth_rate),
            self.contributor_retention,
        ]
    }

    pub fn to_sample(&self) -> Sample {
        Sample::from_dense(&self.features(), self.health_ratio)
    }
}

/// The built-in sample of repository metrics
pub const HEALTH_RECORDS: [RepoMetrics; 5] = [
    RepoMetrics::new(5.0, 15, 2, 80.0, 75.0),
    RepoMetrics::new(10.0, 20, 5, 60.0, 60.0),
    RepoMetrics::new(3.0, 10, 1, 90.0, 85.0),
    RepoMetrics::new(8.0, 25, 3, 70.0, 70.0),
    RepoMetrics::new(6.0, 30, 4, 50.0, 65.0),
];

/// Ordered collection of repository observations
#[derive(Debug, Clone)]
pub struct HealthDataset {
    records: Vec<RepoMetrics>,
}

impl HealthDataset {
    /// The five built-in records, in fixed order
    pub fn embedded() -> Self {
        Self::from_records(HEALTH_RECORDS.to_vec())
    }

    pub fn from_records(records: Vec<RepoMetrics>) -> Self {
        Self { records }
    }
}

impl Dataset for HealthDataset {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn dim(&self) -> usize {
        FEATURE_NAMES.len()
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.records[i].to_sample()
    }

    fn get_targets(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.health_ratio).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_shape() {
        let dataset = HealthDataset::embedded();
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.dim(), 4);
        assert!(!dataset.is_empty());
        assert_eq!(dataset.get_targets(), vec![75.0, 60.0, 85.0, 70.0, 65.0]);
    }

    #[test]
    fn test_sample_columns_follow_feature_names() {
        let sample = HealthDataset::embedded().get_sample(1);
        assert_eq!(sample.features.to_dense(4), vec![10.0, 20.0, 5.0, 60.0]);
        assert_eq!(sample.target, 60.0);
    }

    #[test]
    fn test_samples_preserve_order() {
        let dataset = HealthDataset::embedded();
        let targets: Vec<f64> = dataset.samples().iter().map(|s| s.target).collect();
        assert_eq!(targets, dataset.get_targets());
    }
}
