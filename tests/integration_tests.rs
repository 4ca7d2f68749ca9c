//! Library-level workflow tests: data -> split -> scale -> fit -> evaluate

use approx::assert_relative_eq;
use repohealth::pipeline::{self, PipelineConfig};
use repohealth::utils::{train_test_split, StandardScaler};
use repohealth::{Dataset, HealthDataset, KernelSpec, WorkingSetStrategy, SVR};
use std::collections::HashSet;

#[test]
fn test_complete_workflow_by_hand_matches_pipeline() {
    let dataset = HealthDataset::embedded();
    let config = PipelineConfig::default();

    let split = train_test_split(&dataset.samples(), config.test_size, config.seed)
        .expect("Split should succeed");
    let (scaler, train_scaled) =
        StandardScaler::fit_transform(&split.train, dataset.dim()).expect("Scaling should succeed");
    let test_scaled = scaler.transform(&split.test).expect("Scaling should succeed");

    let model = SVR::new()
        .with_c(1.0)
        .with_epsilon(0.1)
        .train_samples(&train_scaled, dataset.dim())
        .expect("Training should succeed");
    let predictions = model.predict_batch(&test_scaled);

    let report = pipeline::run(&dataset, &config).expect("Pipeline should succeed");

    assert_eq!(report.test_indices, split.test_indices);
    assert_eq!(report.predictions.len(), predictions.len());
    for (a, b) in report.predictions.iter().zip(&predictions) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let dataset = HealthDataset::embedded();
    let config = PipelineConfig::default();

    let first = pipeline::run(&dataset, &config).unwrap();
    let second = pipeline::run(&dataset, &config).unwrap();

    assert_eq!(first.predictions, second.predictions);
    assert_eq!(first.test_indices, second.test_indices);
    assert_eq!(
        first.metrics.mean_squared_error,
        second.metrics.mean_squared_error
    );
    assert_eq!(first.render_text(), second.render_text());
}

#[test]
fn test_split_covers_every_row_once() {
    let report = pipeline::run(&HealthDataset::embedded(), &PipelineConfig::default()).unwrap();

    let train: HashSet<usize> = report.train_indices.iter().copied().collect();
    let test: HashSet<usize> = report.test_indices.iter().copied().collect();

    assert_eq!(test.len(), 1);
    assert_eq!(train.len(), 4);
    assert!(train.is_disjoint(&test));
    assert_eq!(
        train.union(&test).copied().collect::<HashSet<usize>>(),
        (0..5).collect::<HashSet<usize>>()
    );
}

#[test]
fn test_default_split_matches_reference_rows() {
    let dataset = HealthDataset::embedded();
    let split = train_test_split(&dataset.samples(), 0.2, 42).unwrap();

    assert_eq!(split.test_indices, vec![1]);
    assert_eq!(split.train_indices, vec![4, 2, 0, 3]);
    assert_eq!(split.test[0].target, 60.0);
    let train_targets: Vec<f64> = split.train.iter().map(|s| s.target).collect();
    assert_eq!(train_targets, vec![65.0, 85.0, 75.0, 70.0]);
}

#[test]
fn test_scaling_round_trip_on_training_rows() {
    let dataset = HealthDataset::embedded();
    let split = train_test_split(&dataset.samples(), 0.2, 42).unwrap();
    let (scaler, scaled) = StandardScaler::fit_transform(&split.train, 4).unwrap();
    let restored = scaler.inverse_transform(&scaled).unwrap();

    for (original, back) in split.train.iter().zip(&restored) {
        let a = original.features.to_dense(4);
        let b = back.features.to_dense(4);
        for (x, y) in a.iter().zip(&b) {
            assert_relative_eq!(*x, *y, epsilon = 1e-9);
        }
        assert_eq!(original.target, back.target);
    }
}

#[test]
fn test_scaler_ignores_test_rows() {
    let dataset = HealthDataset::embedded();
    let split = train_test_split(&dataset.samples(), 0.2, 42).unwrap();

    let from_train = StandardScaler::fit(&split.train, 4).unwrap();
    let report = pipeline::run(&dataset, &PipelineConfig::default()).unwrap();

    assert_eq!(report.scaler, from_train.feature_stats());
}

#[test]
fn test_metric_relations_on_held_out_rows() {
    let config = PipelineConfig {
        test_size: 0.4,
        ..PipelineConfig::default()
    };
    let report = pipeline::run(&HealthDataset::embedded(), &config).unwrap();

    assert_eq!(report.predictions.len(), 2);
    let squared: f64 = report
        .actual
        .iter()
        .zip(&report.predictions)
        .map(|(y, p)| (y - p).powi(2))
        .sum::<f64>()
        / 2.0;

    assert_relative_eq!(report.metrics.mean_squared_error, squared, epsilon = 1e-9);
    assert!(report.metrics.mean_absolute_error >= 0.0);
    assert!(report.metrics.r2 <= 1.0);
}

#[test]
fn test_alternative_solver_settings_agree() {
    let dataset = HealthDataset::embedded();
    let base = PipelineConfig {
        tolerance: 1e-6,
        ..PipelineConfig::default()
    };
    let other = PipelineConfig {
        working_set_strategy: WorkingSetStrategy::MaximalViolatingPair,
        ..base.clone()
    };

    let a = pipeline::run(&dataset, &base).unwrap();
    let b = pipeline::run(&dataset, &other).unwrap();

    assert_relative_eq!(a.predictions[0], b.predictions[0], epsilon = 1e-3);
}

#[test]
fn test_linear_kernel_pipeline() {
    let config = PipelineConfig {
        kernel: KernelSpec::Linear,
        ..PipelineConfig::default()
    };
    let report = pipeline::run(&HealthDataset::embedded(), &config).unwrap();

    assert_eq!(report.model.kernel, "linear");
    assert!(report.predictions[0].is_finite());
}
