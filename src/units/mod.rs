//! Unit conversion from plate-reader signal to reaction velocity.
//!
//! - raw text -> slopes in A/s (`assay`)
//! - reaction setup -> enzyme concentration and path length (`enzyme`)

pub mod assay;
pub mod enzyme;

pub use assay::*;
pub use enzyme::*;
