//! Sequential Minimal Optimization (SMO) for epsilon-SVR
//!
//! The epsilon-SVR dual over l samples is written as a single problem in 2l
//! variables. Index `t < l` is `alpha_t` with sign +1 and linear term
//! `epsilon - z_t`; index `t + l` is `alpha*_t` with sign -1 and linear term
//! `epsilon + z_t`:
//!
//! ```text
//! min  1/2 aᵀ Q a + pᵀ a
//! s.t. yᵀ a = 0,  0 <= a_t <= C,   Q_ts = y_t y_s K(x_{t mod l}, x_{s mod l})
//! ```
//!
//! Each step picks two variables and solves the two-variable subproblem in
//! closed form.

use crate::cache::{CacheStats, KernelCache};
use crate::core::{
    HealthError, OptimizationResult, OptimizerConfig, Result, Sample, WorkingSetStrategy,
};
use crate::kernel::Kernel;
use log::{debug, warn};
use std::sync::Arc;

/// Stand-in curvature for a non positive-definite pair
const TAU: f64 = 1e-12;

/// SMO solver for the epsilon-SVR dual
pub struct SMOSolver<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> SMOSolver<K> {
    /// Create a new SMO solver with the given kernel and configuration
    pub fn new(kernel: Arc<K>, config: OptimizerConfig) -> Self {
        Self { kernel, config }
    }

    /// Solve the dual for the given training samples
    pub fn solve(&self, samples: &[Sample]) -> Result<OptimizationResult> {
        let mut cache = KernelCache::with_memory_limit(self.config.cache_size);
        let result = self.solve_with_cache(samples, &mut cache)?;
        log_cache_stats(&cache.stats());
        Ok(result)
    }

    /// Solve the dual reusing an externally owned kernel cache
    ///
    /// The cache is keyed by sample index, so it must only be shared between
    /// calls on the same sample slice.
    pub fn solve_with_cache(
        &self,
        samples: &[Sample],
        cache: &mut KernelCache,
    ) -> Result<OptimizationResult> {
        self.validate(samples)?;

        let l = samples.len();
        let mut dual = Dual::new(self.kernel.as_ref(), samples, cache, &self.config);

        let mut alpha = vec![0.0; 2 * l];
        let mut grad = dual.linear_term.clone();
        let mut iterations = 0;

        loop {
            let Some((i, j)) = dual.select_working_set(&alpha, &grad) else {
                debug!("SMO converged after {iterations} iterations");
                break;
            };

            if iterations >= self.config.max_iterations {
                warn!(
                    "SMO reached the iteration cap ({}) before converging",
                    self.config.max_iterations
                );
                break;
            }

            dual.take_step(i, j, &mut alpha, &mut grad);
            iterations += 1;
        }

        let b = -dual.compute_rho(&alpha, &grad);
        let coef: Vec<f64> = (0..l).map(|i| alpha[i] - alpha[i + l]).collect();
        let support_vectors: Vec<usize> = coef
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| if c != 0.0 { Some(i) } else { None })
            .collect();

        // At the optimum f(a) = 1/2 aᵀ(G + p)
        let objective_value = alpha
            .iter()
            .zip(grad.iter().zip(dual.linear_term.iter()))
            .map(|(a, (g, p))| a * (g + p))
            .sum::<f64>()
            / 2.0;

        debug!(
            "SVR dual solved: {} support vectors, b = {b:.6}, objective = {objective_value:.6}",
            support_vectors.len()
        );

        Ok(OptimizationResult {
            alpha,
            coef,
            b,
            support_vectors,
            iterations,
            objective_value,
        })
    }

    fn validate(&self, samples: &[Sample]) -> Result<()> {
        if samples.is_empty() {
            return Err(HealthError::EmptyDataset);
        }
        if !(self.config.c > 0.0 && self.config.c.is_finite()) {
            return Err(HealthError::InvalidParameter(format!(
                "C must be positive, got: {}",
                self.config.c
            )));
        }
        if !(self.config.epsilon >= 0.0 && self.config.epsilon.is_finite()) {
            return Err(HealthError::InvalidParameter(format!(
                "Epsilon must be non-negative, got: {}",
                self.config.epsilon
            )));
        }
        if !(self.config.tolerance > 0.0) {
            return Err(HealthError::InvalidParameter(format!(
                "Tolerance must be positive, got: {}",
                self.config.tolerance
            )));
        }

        for (i, sample) in samples.iter().enumerate() {
            if !sample.target.is_finite() || sample.features.values.iter().any(|v| !v.is_finite())
            {
                return Err(HealthError::InvalidDataset(format!(
                    "Sample {i} contains a non-finite value"
                )));
            }
        }

        Ok(())
    }
}

fn log_cache_stats(stats: &CacheStats) {
    debug!(
        "Kernel cache: {} hits, {} misses, {}/{} entries",
        stats.hits, stats.misses, stats.size, stats.capacity
    );
}

/// Working state of one dual solve
struct Dual<'a, K: Kernel> {
    kernel: &'a K,
    samples: &'a [Sample],
    cache: &'a mut KernelCache,
    norms: Vec<f64>,
    /// p in the objective, length 2l
    linear_term: Vec<f64>,
    /// Diagonal of Q, length 2l
    diagonal: Vec<f64>,
    c: f64,
    tolerance: f64,
    strategy: WorkingSetStrategy,
}

impl<'a, K: Kernel> Dual<'a, K> {
    fn new(
        kernel: &'a K,
        samples: &'a [Sample],
        cache: &'a mut KernelCache,
        config: &OptimizerConfig,
    ) -> Self {
        let norms: Vec<f64> = samples.iter().map(|s| s.features.norm_squared()).collect();

        let linear_term = samples
            .iter()
            .map(|s| config.epsilon - s.target)
            .chain(samples.iter().map(|s| config.epsilon + s.target))
            .collect();

        let mut dual = Self {
            kernel,
            samples,
            cache,
            norms,
            linear_term,
            diagonal: Vec::new(),
            c: config.c,
            tolerance: config.tolerance,
            strategy: config.working_set_strategy,
        };

        let l = samples.len();
        let diagonal: Vec<f64> = (0..l).map(|i| dual.kernel_value(i, i)).collect();
        dual.diagonal = diagonal.iter().chain(diagonal.iter()).copied().collect();
        dual
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn sign(&self, t: usize) -> f64 {
        if t < self.len() {
            1.0
        } else {
            -1.0
        }
    }

    /// K between the samples behind dual variables `t` and `s`
    fn kernel_value(&mut self, t: usize, s: usize) -> f64 {
        let l = self.len();
        let (a, b) = (t % l, s % l);
        let (kernel, samples, norms) = (self.kernel, self.samples, &self.norms);
        self.cache.get_or_compute(a, b, || {
            kernel.compute_with_norms(&samples[a].features, &samples[b].features, norms[a], norms[b])
        })
    }

    fn q(&mut self, t: usize, s: usize) -> f64 {
        self.sign(t) * self.sign(s) * self.kernel_value(t, s)
    }

    fn is_upper_bound(&self, alpha: &[f64], t: usize) -> bool {
        alpha[t] >= self.c
    }

    fn is_lower_bound(&self, alpha: &[f64], t: usize) -> bool {
        alpha[t] <= 0.0
    }

    /// Pick the next pair, or `None` once the maximal KKT violation drops
    /// below the tolerance
    fn select_working_set(&mut self, alpha: &[f64], grad: &[f64]) -> Option<(usize, usize)> {
        let n = alpha.len();
        let strategy = self.strategy;

        // i: the most violating variable that may move up along y
        let mut g_max = f64::NEG_INFINITY;
        let mut i = None;
        for t in 0..n {
            let movable = if self.sign(t) > 0.0 {
                !self.is_upper_bound(alpha, t)
            } else {
                !self.is_lower_bound(alpha, t)
            };
            if movable {
                let value = -self.sign(t) * grad[t];
                if value >= g_max {
                    g_max = value;
                    i = Some(t);
                }
            }
        }
        let i = i?;

        let mut g_max2 = f64::NEG_INFINITY;
        let mut best_obj = f64::INFINITY;
        let mut j = None;
        for t in 0..n {
            let movable = if self.sign(t) > 0.0 {
                !self.is_lower_bound(alpha, t)
            } else {
                !self.is_upper_bound(alpha, t)
            };
            if !movable {
                continue;
            }

            let value = self.sign(t) * grad[t];
            match strategy {
                WorkingSetStrategy::MaximalViolatingPair => {
                    if value >= g_max2 {
                        j = Some(t);
                    }
                }
                WorkingSetStrategy::SecondOrder => {
                    let grad_diff = g_max + value;
                    if grad_diff > 0.0 {
                        let mut quad = self.diagonal[i] + self.diagonal[t]
                            - 2.0 * self.kernel_value(i, t);
                        if quad <= 0.0 {
                            quad = TAU;
                        }
                        let obj_diff = -(grad_diff * grad_diff) / quad;
                        if obj_diff <= best_obj {
                            best_obj = obj_diff;
                            j = Some(t);
                        }
                    }
                }
            }
            g_max2 = g_max2.max(value);
        }

        if g_max + g_max2 < self.tolerance {
            return None;
        }
        j.filter(|&j| j != i).map(|j| (i, j))
    }

    /// Solve the two-variable subproblem and update the gradient
    fn take_step(&mut self, i: usize, j: usize, alpha: &mut [f64], grad: &mut [f64]) {
        let c = self.c;
        let old_i = alpha[i];
        let old_j = alpha[j];
        let q_ij = self.q(i, j);

        if self.sign(i) != self.sign(j) {
            let mut quad = self.diagonal[i] + self.diagonal[j] + 2.0 * q_ij;
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (-grad[i] - grad[j]) / quad;
            let diff = alpha[i] - alpha[j];
            alpha[i] += delta;
            alpha[j] += delta;

            if diff > 0.0 {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = diff;
                }
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = c - diff;
                }
            } else {
                if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = -diff;
                }
                if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = c + diff;
                }
            }
        } else {
            let mut quad = self.diagonal[i] + self.diagonal[j] - 2.0 * q_ij;
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (grad[i] - grad[j]) / quad;
            let sum = alpha[i] + alpha[j];
            alpha[i] -= delta;
            alpha[j] += delta;

            if sum > c {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = sum - c;
                }
                if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = sum - c;
                }
            } else {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = sum;
                }
                if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = sum;
                }
            }
        }

        let delta_i = alpha[i] - old_i;
        let delta_j = alpha[j] - old_j;
        for (k, g) in grad.iter_mut().enumerate() {
            *g += self.q(i, k) * delta_i + self.q(j, k) * delta_j;
        }
    }

    /// Threshold rho of the decision function `f(x) = Σ coef K - rho`
    ///
    /// Averages over free variables; with none free, takes the midpoint of
    /// the feasible interval implied by the bounded ones.
    fn compute_rho(&self, alpha: &[f64], grad: &[f64]) -> f64 {
        let mut upper = f64::INFINITY;
        let mut lower = f64::NEG_INFINITY;
        let mut free_sum = 0.0;
        let mut free_count = 0usize;

        for t in 0..alpha.len() {
            let y = self.sign(t);
            let yg = y * grad[t];

            if self.is_upper_bound(alpha, t) {
                if y < 0.0 {
                    upper = upper.min(yg);
                } else {
                    lower = lower.max(yg);
                }
            } else if self.is_lower_bound(alpha, t) {
                if y > 0.0 {
                    upper = upper.min(yg);
                } else {
                    lower = lower.max(yg);
                }
            } else {
                free_sum += yg;
                free_count += 1;
            }
        }

        if free_count > 0 {
            free_sum / free_count as f64
        } else {
            (upper + lower) / 2.0
        }
    }
}
