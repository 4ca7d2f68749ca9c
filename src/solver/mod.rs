//! SVR solver implementations
//!
//! Sequential Minimal Optimization over the epsilon-SVR dual, with
//! first-order or second-order working set selection.

pub mod smo;

pub use self::smo::*;
