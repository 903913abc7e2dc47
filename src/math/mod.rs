//! Statistical utilities: moments, z-scores, and single-regressor OLS.

pub mod moments;
pub mod regression;

pub use moments::*;
pub use regression::*;
