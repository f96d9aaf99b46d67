//! Input/output helpers.
//!
//! - result JSON read/write (`document`)
//! - per-run export bundles and the tidy CSV (`export`)

pub mod document;
pub mod export;

pub use document::*;
pub use export::*;
