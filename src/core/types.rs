//! Core type definitions for support vector regression

use serde::Serialize;

/// Sparse vector representation with sorted indices
#[derive(Clone, Debug, PartialEq)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<usize>,
    /// Values corresponding to indices
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a new sparse vector, ensuring indices are sorted
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Build from a dense row, dropping exact zeros
    pub fn from_dense(row: &[f64]) -> Self {
        let mut indices = Vec::new();
        let mut values = Vec::new();
        for (i, &v) in row.iter().enumerate() {
            if v != 0.0 {
                indices.push(i);
                values.push(v);
            }
        }
        Self { indices, values }
    }

    /// Expand into a dense row of length `dim`
    ///
    /// Indices at or beyond `dim` are ignored.
    pub fn to_dense(&self, dim: usize) -> Vec<f64> {
        let mut row = vec![0.0; dim];
        for (&i, &v) in self.indices.iter().zip(self.values.iter()) {
            if i < dim {
                row[i] = v;
            }
        }
        row
    }

    /// Create an empty sparse vector
    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Get the value at a specific index (0 if not present)
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Dot product with another sparse vector
    ///
    /// Both index lists are sorted, so this is a single merge pass.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let mut result = 0.0;
        let mut i = 0;
        let mut j = 0;

        while i < self.indices.len() && j < other.indices.len() {
            let a = self.indices[i];
            let b = other.indices[j];

            if a == b {
                result += self.values[i] * other.values[j];
                i += 1;
                j += 1;
            } else if a < b {
                i += 1;
            } else {
                j += 1;
            }
        }

        result
    }

    /// Compute squared L2 norm
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Check if vector is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Regression sample: feature vector plus continuous target
#[derive(Clone, Debug)]
pub struct Sample {
    pub features: SparseVector,
    pub target: f64,
}

impl Sample {
    pub fn new(features: SparseVector, target: f64) -> Self {
        Self { features, target }
    }

    /// Build a sample from a dense feature row
    pub fn from_dense(row: &[f64], target: f64) -> Self {
        Self::new(SparseVector::from_dense(row), target)
    }
}

/// Strategy for picking the pair of dual variables updated in one SMO step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WorkingSetStrategy {
    /// First-order: the pair that violates the KKT conditions the most
    MaximalViolatingPair,
    /// Second-order: fix the most violating variable, pick its partner by
    /// the largest guaranteed decrease of the objective
    #[default]
    SecondOrder,
}

/// Result of the dual optimization
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Dual variables, length 2l: `alpha` in the first half, `alpha*` in the second
    pub alpha: Vec<f64>,
    /// Per-sample coefficients `alpha_i - alpha_i*`, length l
    pub coef: Vec<f64>,
    /// Intercept (b) of the decision function
    pub b: f64,
    /// Indices of samples with a non-zero coefficient
    pub support_vectors: Vec<usize>,
    /// Number of SMO iterations performed
    pub iterations: usize,
    /// Final dual objective value (minimization form)
    pub objective_value: f64,
}

/// Configuration for the SVR optimizer
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Regularization parameter (upper bound for each dual variable)
    pub c: f64,
    /// Half-width of the insensitive tube around the targets
    pub epsilon: f64,
    /// Stopping tolerance on the maximal KKT violation
    pub tolerance: f64,
    /// Maximum number of SMO iterations
    pub max_iterations: usize,
    /// Kernel cache size in bytes
    pub cache_size: usize,
    /// Working set selection
    pub working_set_strategy: WorkingSetStrategy,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.1,
            tolerance: 1e-3,
            max_iterations: 100_000,
            cache_size: 100_000_000, // 100MB
            working_set_strategy: WorkingSetStrategy::SecondOrder,
        }
    }
}
