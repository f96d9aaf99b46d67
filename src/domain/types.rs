//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which kinetic model to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KineticModel {
    /// Full Michaelis-Menten: free parameters `kcat`, `km`.
    Hyperbolic,
    /// First-order limit (`km >> [S]`): single free parameter `kcat/km`.
    Linear,
}

impl KineticModel {
    /// Human-readable label for terminal output and plot legends.
    pub fn display_name(self) -> &'static str {
        match self {
            KineticModel::Hyperbolic => "Michaelis Menten",
            KineticModel::Linear => "Linear Michaelis Menten",
        }
    }

    /// Number of free parameters in the regression.
    pub fn param_count(self) -> usize {
        match self {
            KineticModel::Hyperbolic => 2,
            KineticModel::Linear => 1,
        }
    }

    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            KineticModel::Hyperbolic => &["kcat", "km"],
            KineticModel::Linear => &["cat_eff"],
        }
    }
}

/// One parsed slope before velocity conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeReading {
    pub cofa_conc_mm: f64,
    pub trial: String,
    /// Absorbance per second.
    pub slope_a_s: f64,
}

/// One (substrate concentration, trial) observation with its derived velocity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyMeasurement {
    pub trial: String,
    #[serde(rename = "cofa_conc_mM")]
    pub cofa_conc_mm: f64,
    pub slope_a_s: f64,
    #[serde(rename = "v0_mM_s")]
    pub v0_mm_s: f64,
}

/// Derived optical and enzyme quantities for one reaction setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnzymeParameters {
    /// Extinction coefficient, mM^-1 cm^-1.
    pub ext: f64,
    /// Optical path length, cm.
    pub pathlen_cm: f64,
    /// Enzyme concentration in the reaction, mM.
    pub enz_rxn_mm: f64,
}

/// The six scalar reaction inputs as supplied by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactionInputs {
    pub total_rxn_vol_ul: u32,
    pub enz_rxn_vol_ul: u32,
    pub stock_conc_mg_ml: f64,
    pub enz_mol_wt_g_mol: f64,
    pub dilution: f64,
    pub ext: f64,
}

/// Default NADH extinction coefficient at 340 nm.
pub const DEFAULT_EXTINCTION: f64 = 6.22;

/// Final kinetic parameters and fit quality for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    #[serde(rename = "fit")]
    pub model: KineticModel,
    pub kcat: Option<f64>,
    pub kcat_err: Option<f64>,
    pub km: Option<f64>,
    pub km_err: Option<f64>,
    pub cat_eff: f64,
    pub cat_eff_err: f64,
    pub r_sq: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub inputs: ReactionInputs,
    pub model: KineticModel,
    pub title: Option<String>,
    pub assay_text: String,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    /// Parent directory for per-run export bundles.
    pub out_dir: Option<PathBuf>,
}

/// A saved run (JSON).
///
/// Carries everything needed to rebuild the curve specification later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDocument {
    pub tool: String,
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub title: Option<String>,
    pub inputs: ReactionInputs,
    pub enzyme: EnzymeParameters,
    pub result: FitResult,
    pub table: Vec<TidyMeasurement>,
}

impl ResultDocument {
    pub fn new(
        title: Option<String>,
        inputs: ReactionInputs,
        enzyme: EnzymeParameters,
        result: FitResult,
        table: Vec<TidyMeasurement>,
    ) -> Self {
        Self {
            tool: "mmk".to_string(),
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            title,
            inputs,
            enzyme,
            result,
            table,
        }
    }
}
