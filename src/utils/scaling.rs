//! Feature standardization
//!
//! Statistics are taken from the training rows only and then applied to
//! every split, so nothing about the test rows leaks into the scaling.

use crate::core::{HealthError, Result, Sample};
use serde::Serialize;

/// Per-feature statistics learned by [`StandardScaler::fit`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureStats {
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std: f64,
    /// Divisor actually applied; 1.0 for a constant feature
    pub scale: f64,
}

/// Standard (Z-score) scaler: `(x - mean) / std`
#[derive(Debug, Clone, Serialize)]
pub struct StandardScaler {
    features: Vec<FeatureStats>,
}

impl StandardScaler {
    /// Learn per-feature mean and standard deviation from `samples`
    pub fn fit(samples: &[Sample], n_features: usize) -> Result<Self> {
        if samples.is_empty() {
            return Err(HealthError::EmptyDataset);
        }

        let rows = samples
            .iter()
            .map(|s| dense_row(s, n_features))
            .collect::<Result<Vec<_>>>()?;
        let n = rows.len() as f64;

        let features = (0..n_features)
            .map(|j| {
                let mean = rows.iter().map(|r| r[j]).sum::<f64>() / n;
                let variance = rows.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n;
                let std = variance.sqrt();
                let scale = if std == 0.0 { 1.0 } else { std };
                FeatureStats { mean, std, scale }
            })
            .collect();

        Ok(Self { features })
    }

    /// Fit on `samples` and return them scaled
    pub fn fit_transform(samples: &[Sample], n_features: usize) -> Result<(Self, Vec<Sample>)> {
        let scaler = Self::fit(samples, n_features)?;
        let scaled = scaler.transform(samples)?;
        Ok((scaler, scaled))
    }

    pub fn transform_sample(&self, sample: &Sample) -> Result<Sample> {
        let row: Vec<f64> = dense_row(sample, self.n_features())?
            .iter()
            .zip(&self.features)
            .map(|(x, stats)| (x - stats.mean) / stats.scale)
            .collect();
        Ok(Sample::from_dense(&row, sample.target))
    }

    pub fn transform(&self, samples: &[Sample]) -> Result<Vec<Sample>> {
        samples.iter().map(|s| self.transform_sample(s)).collect()
    }

    /// Map a scaled sample back to the original feature units
    pub fn inverse_transform_sample(&self, sample: &Sample) -> Result<Sample> {
        let row: Vec<f64> = dense_row(sample, self.n_features())?
            .iter()
            .zip(&self.features)
            .map(|(z, stats)| z * stats.scale + stats.mean)
            .collect();
        Ok(Sample::from_dense(&row, sample.target))
    }

    pub fn inverse_transform(&self, samples: &[Sample]) -> Result<Vec<Sample>> {
        samples
            .iter()
            .map(|s| self.inverse_transform_sample(s))
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn feature_stats(&self) -> &[FeatureStats] {
        &self.features
    }
}

fn dense_row(sample: &Sample, n_features: usize) -> Result<Vec<f64>> {
    if let Some(&max_idx) = sample.features.indices.last() {
        if max_idx >= n_features {
            return Err(HealthError::DimensionMismatch {
                expected: n_features,
                actual: max_idx + 1,
            });
        }
    }
    Ok(sample.features.to_dense(n_features))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn samples() -> Vec<Sample> {
        vec![
            Sample::from_dense(&[1.0, 10.0, 3.0], 0.0),
            Sample::from_dense(&[2.0, 20.0, 3.0], 1.0),
            Sample::from_dense(&[3.0, 30.0, 3.0], 2.0),
            Sample::from_dense(&[6.0, 0.0, 3.0], 3.0),
        ]
    }

    #[test]
    fn test_fit_uses_population_std() {
        let scaler = StandardScaler::fit(&samples(), 3).unwrap();
        let stats = scaler.feature_stats();

        assert_relative_eq!(stats[0].mean, 3.0);
        // deviations -2, -1, 0, 3 -> variance 14 / 4
        assert_relative_eq!(stats[0].std, 3.5_f64.sqrt());
        assert_relative_eq!(stats[1].mean, 15.0);
    }

    #[test]
    fn test_transformed_columns_are_standardized() {
        let (scaler, scaled) = StandardScaler::fit_transform(&samples(), 3).unwrap();
        assert_eq!(scaler.n_features(), 3);

        for j in 0..2 {
            let column: Vec<f64> = scaled.iter().map(|s| s.features.get(j)).collect();
            let mean = column.iter().sum::<f64>() / 4.0;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
            assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
            assert_relative_eq!(var, 1.0, epsilon = 1e-12);
        }
        // targets pass through untouched
        assert_eq!(scaled[3].target, 3.0);
    }

    #[test]
    fn test_constant_feature_maps_to_zero() {
        let scaler = StandardScaler::fit(&samples(), 3).unwrap();
        assert_eq!(scaler.feature_stats()[2].std, 0.0);
        assert_eq!(scaler.feature_stats()[2].scale, 1.0);

        let scaled = scaler.transform_sample(&samples()[0]).unwrap();
        assert_eq!(scaled.features.get(2), 0.0);
    }

    #[test]
    fn test_inverse_transform_round_trip() {
        let original = samples();
        let (scaler, scaled) = StandardScaler::fit_transform(&original, 3).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();

        for (a, b) in original.iter().zip(&restored) {
            for j in 0..3 {
                assert_relative_eq!(a.features.get(j), b.features.get(j), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            StandardScaler::fit(&[], 3),
            Err(HealthError::EmptyDataset)
        ));

        let scaler = StandardScaler::fit(&samples(), 3).unwrap();
        let wide = Sample::from_dense(&[1.0, 1.0, 1.0, 1.0], 0.0);
        assert!(matches!(
            scaler.transform_sample(&wide),
            Err(HealthError::DimensionMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }
}
