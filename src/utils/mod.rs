//! Preprocessing utilities: feature scaling and train/test splitting

pub mod mt19937;
pub mod scaling;
pub mod split;

pub use self::scaling::{FeatureStats, StandardScaler};
pub use self::split::{train_test_split, TrainTestSplit};
