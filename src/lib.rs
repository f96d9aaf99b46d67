//! `mm-kinetics` library crate.
//!
//! The binary (`mmk`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the numeric pipeline can be embedded behind other front-ends
//!
//! Pipeline: `units` -> `fit` (over `models` and `math`) -> `plot` / `report` / `io`.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod units;
