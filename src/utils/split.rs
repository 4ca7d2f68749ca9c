//! Seeded train/test split

use crate::core::{HealthError, Result, Sample};
use crate::utils::mt19937::{self, Mt19937};

/// Result of [`train_test_split`]
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
    /// Row indices into the input, in the order the rows were taken
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Number of test rows for `n` rows: `ceil(test_size * n)`
pub fn test_count(n: usize, test_size: f64) -> usize {
    (test_size * n as f64).ceil() as usize
}

/// Shuffle row indices with a seeded Mersenne Twister and hold out the first
/// `ceil(test_size * n)` of them as the test set.
///
/// For a given seed the permutation is the one scikit-learn's
/// `train_test_split(..., random_state=seed)` draws, so the same rows are
/// held out.
pub fn train_test_split(samples: &[Sample], test_size: f64, seed: u32) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HealthError::InvalidParameter(format!(
            "Test size must be between 0 and 1, got: {test_size}"
        )));
    }

    let n = samples.len();
    let n_test = test_count(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(HealthError::InvalidParameter(format!(
            "Test size {test_size} leaves an empty split for {n} samples"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    mt19937::shuffle(&mut order, &mut Mt19937::new(seed));

    let (test_indices, train_indices) = order.split_at(n_test);
    let take = |indices: &[usize]| -> Vec<Sample> {
        indices.iter().map(|&i| samples[i].clone()).collect()
    };

    Ok(TrainTestSplit {
        train: take(train_indices),
        test: take(test_indices),
        train_indices: train_indices.to_vec(),
        test_indices: test_indices.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rows(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::from_dense(&[i as f64 + 1.0], i as f64))
            .collect()
    }

    #[test]
    fn test_sizes_round_test_up() {
        assert_eq!(test_count(5, 0.2), 1);
        assert_eq!(test_count(10, 0.25), 3);

        let split = train_test_split(&rows(5), 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.train.len(), 4);
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let split = train_test_split(&rows(20), 0.3, 7).unwrap();

        let train: HashSet<usize> = split.train_indices.iter().copied().collect();
        let test: HashSet<usize> = split.test_indices.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 20);
        assert_eq!(train.union(&test).count(), 20);

        // rows follow their indices
        for (&i, sample) in split.test_indices.iter().zip(&split.test) {
            assert_eq!(sample.target, i as f64);
        }
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = train_test_split(&rows(10), 0.2, 42).unwrap();
        let b = train_test_split(&rows(10), 0.2, 42).unwrap();
        assert_eq!(a.test_indices, b.test_indices);
        assert_eq!(a.train_indices, b.train_indices);
    }

    #[test]
    fn test_seed_42_holds_out_second_row() {
        let split = train_test_split(&rows(5), 0.2, 42).unwrap();
        assert_eq!(split.test_indices, vec![1]);
        assert_eq!(split.train_indices, vec![4, 2, 0, 3]);
        assert_eq!(split.test[0].target, 1.0);
    }

    #[test]
    fn test_larger_test_share_takes_permutation_prefix() {
        let split = train_test_split(&rows(10), 0.2, 42).unwrap();
        assert_eq!(split.test_indices, vec![8, 1]);
        assert_eq!(split.train_indices, vec![5, 0, 7, 2, 9, 4, 3, 6]);
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(train_test_split(&rows(5), 0.0, 42).is_err());
        assert!(train_test_split(&rows(5), 1.0, 42).is_err());
        assert!(train_test_split(&rows(1), 0.5, 42).is_err());
        assert!(train_test_split(&[], 0.2, 42).is_err());
    }
}
