//! Reporting utilities: result packaging and formatted terminal output.

pub mod format;

pub use format::*;
