//! Curve fitting and fit quality.
//!
//! Responsibilities:
//!
//! - pick starting values and run the nonlinear solver (`fitter`)
//! - covariance-based standard errors and the propagated kcat/km error
//! - coefficient of determination (`quality`)

pub mod fitter;
pub mod quality;

pub use fitter::*;
pub use quality::*;
