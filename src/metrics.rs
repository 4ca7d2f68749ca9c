//! Regression error metrics

use crate::core::{HealthError, Result};
use log::warn;
use serde::Serialize;

/// Error metrics between true and predicted targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    pub mean_absolute_error: f64,
    pub mean_squared_error: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        Ok(Self {
            mean_absolute_error: mean_absolute_error(y_true, y_pred)?,
            mean_squared_error: mean_squared_error(y_true, y_pred)?,
            r2: r2_score(y_true, y_pred)?,
        })
    }

    pub fn root_mean_squared_error(&self) -> f64 {
        self.mean_squared_error.sqrt()
    }
}

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.is_empty() {
        return Err(HealthError::EmptyDataset);
    }
    if y_true.len() != y_pred.len() {
        return Err(HealthError::DimensionMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    Ok(())
}

/// mean |y - p|
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let total: f64 = y_true.iter().zip(y_pred).map(|(y, p)| (y - p).abs()).sum();
    Ok(total / y_true.len() as f64)
}

/// mean (y - p)²
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let total: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| {
            let d = y - p;
            d * d
        })
        .sum();
    Ok(total / y_true.len() as f64)
}

/// Coefficient of determination, `1 - SS_res / SS_tot`
///
/// Undefined for a single sample, which yields NaN. With constant targets the
/// score is 1.0 for a perfect fit and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    if y_true.len() < 2 {
        warn!("R² score is not well-defined with less than two samples");
        return Ok(f64::NAN);
    }

    let n = y_true.len() as f64;
    let mean = y_true.iter().sum::<f64>() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(y, p)| (y - p).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}
