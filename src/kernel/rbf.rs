//! RBF (Radial Basis Function) kernel implementation
//!
//! The RBF kernel is defined as: K(x, y) = exp(-γ * ||x - y||²)
//! where γ (gamma) controls the kernel width.

use crate::core::{HealthError, Result, Sample, SparseVector};
use crate::kernel::Kernel;
use serde::Serialize;

/// How gamma is chosen when the model is fit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum Gamma {
    /// `1 / (n_features * Var(X))`, where the variance runs over every
    /// entry of the training matrix. Falls back to 1.0 when that variance is 0.
    #[default]
    Scale,
    /// `1 / n_features`
    Auto,
    /// Fixed positive value
    Value(f64),
}

impl Gamma {
    /// Resolve the policy against the training samples
    pub fn resolve(&self, samples: &[Sample], n_features: usize) -> Result<f64> {
        if n_features == 0 {
            return Err(HealthError::InvalidParameter(
                "Number of features must be positive".to_string(),
            ));
        }

        match *self {
            Gamma::Value(g) if g > 0.0 && g.is_finite() => Ok(g),
            Gamma::Value(g) => Err(HealthError::InvalidParameter(format!(
                "Gamma must be positive, got: {g}"
            ))),
            Gamma::Auto => Ok(1.0 / n_features as f64),
            Gamma::Scale => {
                if samples.is_empty() {
                    return Err(HealthError::EmptyDataset);
                }
                let values: Vec<f64> = samples
                    .iter()
                    .flat_map(|s| s.features.to_dense(n_features))
                    .collect();
                let count = values.len() as f64;
                let mean = values.iter().sum::<f64>() / count;
                let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

                if variance == 0.0 {
                    Ok(1.0)
                } else {
                    Ok(1.0 / (n_features as f64 * variance))
                }
            }
        }
    }
}

impl std::str::FromStr for Gamma {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "scale" => Ok(Gamma::Scale),
            "auto" => Ok(Gamma::Auto),
            other => other
                .parse::<f64>()
                .map(Gamma::Value)
                .map_err(|_| format!("expected 'scale', 'auto' or a number, got '{other}'")),
        }
    }
}

/// RBF (Radial Basis Function) kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// - High gamma: close points have high influence (potential overfitting)
/// - Low gamma: distant points have influence (potential underfitting)
#[derive(Debug, Clone, Copy)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RBFKernel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        let squared_distance = compute_squared_euclidean_distance(x, y);
        (-self.gamma * squared_distance).exp()
    }

    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        // ||x - y||² = ||x||² + ||y||² - 2*x^T*y, clamped against rounding
        let squared_distance = (x_norm_sq + y_norm_sq - 2.0 * x.dot(y)).max(0.0);
        (-self.gamma * squared_distance).exp()
    }

    fn name(&self) -> &'static str {
        "rbf"
    }
}

/// Squared Euclidean distance between two sparse vectors
///
/// Indices present in only one vector contribute their squared value.
fn compute_squared_euclidean_distance(x: &SparseVector, y: &SparseVector) -> f64 {
    let mut distance_sq = 0.0;
    let mut i = 0;
    let mut j = 0;

    while i < x.indices.len() && j < y.indices.len() {
        let x_idx = x.indices[i];
        let y_idx = y.indices[j];

        if x_idx == y_idx {
            let diff = x.values[i] - y.values[j];
            distance_sq += diff * diff;
            i += 1;
            j += 1;
        } else if x_idx < y_idx {
            distance_sq += x.values[i] * x.values[i];
            i += 1;
        } else {
            distance_sq += y.values[j] * y.values[j];
            j += 1;
        }
    }

    distance_sq += x.values[i..].iter().map(|v| v * v).sum::<f64>();
    distance_sq += y.values[j..].iter().map(|v| v * v).sum::<f64>();

    distance_sq
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rbf_kernel_creation() {
        assert_eq!(RBFKernel::new(0.5).gamma(), 0.5);
        assert_eq!(RBFKernel::default().gamma(), 1.0);
    }

    #[test]
    #[should_panic(expected = "Gamma must be positive")]
    fn test_rbf_kernel_zero_gamma() {
        RBFKernel::new(0.0);
    }

    #[test]
    fn test_rbf_kernel_identical_vectors() {
        let kernel = RBFKernel::new(1.0);
        let x = SparseVector::new(vec![0, 1, 2], vec![1.0, 2.0, 3.0]);

        assert_relative_eq!(kernel.compute(&x, &x), 1.0);
    }

    #[test]
    fn test_rbf_kernel_orthogonal_vectors() {
        let kernel = RBFKernel::new(1.0);
        let x = SparseVector::new(vec![0, 2], vec![1.0, 1.0]);
        let y = SparseVector::new(vec![1, 3], vec![1.0, 1.0]);

        // no overlap, ||x - y||² = 4
        assert_relative_eq!(kernel.compute(&x, &y), (-4.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_rbf_kernel_symmetry() {
        let kernel = RBFKernel::new(0.5);
        let x = SparseVector::new(vec![0, 2, 4], vec![1.0, 2.0, 3.0]);
        let y = SparseVector::new(vec![1, 2, 3], vec![1.0, 2.0, 3.0]);

        assert_eq!(kernel.compute(&x, &y), kernel.compute(&y, &x));
    }

    #[test]
    fn test_rbf_kernel_with_norms() {
        let kernel = RBFKernel::new(2.0);
        let x = SparseVector::new(vec![0, 1], vec![3.0, 4.0]);
        let y = SparseVector::new(vec![0, 1], vec![1.0, 2.0]);

        let direct = kernel.compute(&x, &y);
        let via_norms = kernel.compute_with_norms(&x, &y, x.norm_squared(), y.norm_squared());

        assert_relative_eq!(direct, via_norms, epsilon = 1e-12);
    }

    #[test]
    fn test_squared_euclidean_distance() {
        let x = SparseVector::new(vec![0, 2, 5], vec![1.0, 3.0, 2.0]);
        let y = SparseVector::new(vec![2, 3, 5], vec![2.0, 1.0, 4.0]);

        // 1 + 1 + 1 + 4
        assert_eq!(compute_squared_euclidean_distance(&x, &y), 7.0);
        assert_eq!(compute_squared_euclidean_distance(&x, &x), 0.0);
        assert_eq!(
            compute_squared_euclidean_distance(&SparseVector::empty(), &y),
            21.0
        );
    }

    #[test]
    fn test_rbf_kernel_decreases_with_distance() {
        let kernel = RBFKernel::new(1.0);
        let origin = SparseVector::empty();
        let values: Vec<f64> = (1..4)
            .map(|d| kernel.compute(&origin, &SparseVector::from_dense(&[d as f64])))
            .collect();

        assert!(values[0] > values[1] && values[1] > values[2]);
        assert!(values.iter().all(|&k| (0.0..=1.0).contains(&k)));
    }

    #[test]
    fn test_gamma_auto_and_value() {
        assert_eq!(Gamma::Auto.resolve(&[], 4).unwrap(), 0.25);
        assert_eq!(Gamma::Value(0.3).resolve(&[], 4).unwrap(), 0.3);
        assert!(Gamma::Value(-1.0).resolve(&[], 4).is_err());
        assert!(Gamma::Auto.resolve(&[], 0).is_err());
    }

    #[test]
    fn test_gamma_scale_uses_matrix_variance() {
        // entries: 1, -1, -1, 1 -> mean 0, variance 1
        let samples = vec![
            Sample::from_dense(&[1.0, -1.0], 0.0),
            Sample::from_dense(&[-1.0, 1.0], 0.0),
        ];
        assert_relative_eq!(Gamma::Scale.resolve(&samples, 2).unwrap(), 0.5);

        let constant = vec![Sample::from_dense(&[2.0, 2.0], 0.0)];
        assert_eq!(Gamma::Scale.resolve(&constant, 2).unwrap(), 1.0);
    }

    #[test]
    fn test_gamma_scale_with_large_offset() {
        // population variance of {1, 2, 3} is 2/3 regardless of the shift
        let samples: Vec<Sample> = [1.0, 2.0, 3.0]
            .iter()
            .map(|v| Sample::from_dense(&[1e9 + v], 0.0))
            .collect();

        let gamma = Gamma::Scale.resolve(&samples, 1).unwrap();
        assert_relative_eq!(gamma, 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_gamma_from_str() {
        assert_eq!("scale".parse::<Gamma>().unwrap(), Gamma::Scale);
        assert_eq!("auto".parse::<Gamma>().unwrap(), Gamma::Auto);
        assert_eq!("0.5".parse::<Gamma>().unwrap(), Gamma::Value(0.5));
        assert!("wide".parse::<Gamma>().is_err());
    }
}
