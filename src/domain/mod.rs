//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the model selector (`KineticModel`)
//! - assay observations (`SlopeReading`, `TidyMeasurement`)
//! - reaction setup (`ReactionInputs`, `EnzymeParameters`)
//! - fit outputs (`FitResult`, `ResultDocument`)

pub mod types;

pub use types::*;
