//! Kernel trait definition

use crate::core::SparseVector;

/// Kernel function trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition so that the
/// SVR dual stays convex.
pub trait Kernel {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64;

    /// Compute kernel value using precomputed squared norms
    ///
    /// Kernels that depend on distances (RBF) can skip a merge pass.
    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        let _ = (x_norm_sq, y_norm_sq);
        self.compute(x, y)
    }

    /// Short identifier used in reports
    fn name(&self) -> &'static str;
}
