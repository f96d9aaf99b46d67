//! Command-line parsing for the Michaelis-Menten fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::{DEFAULT_EXTINCTION, KineticModel};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mmk", version, about = "Enzyme kinetics from plate-reader slopes")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Overrides MMK_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit an assay, print parameters and a plot, and optionally export a run bundle.
    Fit(FitArgs),
    /// Plot a previously exported result JSON.
    Plot(PlotArgs),
    /// Print a synthetic assay block (mA/min) generated from known parameters.
    Simulate(SimulateArgs),
}

/// Reaction setup and fit options.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Total reaction volume (µL).
    #[arg(long = "rxn-vol")]
    pub total_rxn_vol: u32,

    /// Enzyme volume in the reaction (µL).
    #[arg(long = "enz-vol")]
    pub enz_rxn_vol: u32,

    /// Enzyme stock concentration (mg/mL).
    #[arg(long)]
    pub stock_conc: f64,

    /// Enzyme molecular weight (g/mol).
    #[arg(long)]
    pub mol_wt: f64,

    /// Dilution factor of the enzyme stock.
    #[arg(long)]
    pub dilution: f64,

    /// Extinction coefficient (mM^-1 cm^-1).
    #[arg(long, default_value_t = DEFAULT_EXTINCTION)]
    pub ext: f64,

    /// Kinetic model to fit.
    #[arg(long, value_enum, default_value_t = KineticModel::Hyperbolic)]
    pub model: KineticModel,

    /// Run title (shown on the plot and stored in exports).
    #[arg(long)]
    pub title: Option<String>,

    /// Assay text file; `-` or omitted reads stdin.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write a per-run bundle (result.json, assay.csv, plot.txt) under this directory.
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Print the derived measurement table.
    #[arg(long)]
    pub table: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for plotting a saved run.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Result JSON file produced by `mmk fit --out-dir`.
    #[arg(long, value_name = "JSON")]
    pub result: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Synthetic assay parameters.
#[derive(Debug, Parser)]
pub struct SimulateArgs {
    #[arg(long, value_enum, default_value_t = KineticModel::Hyperbolic)]
    pub model: KineticModel,

    /// Turnover number (s^-1), hyperbolic model.
    #[arg(long, default_value_t = 5.0)]
    pub kcat: f64,

    /// Michaelis constant (mM), hyperbolic model.
    #[arg(long, default_value_t = 2.0)]
    pub km: f64,

    /// Catalytic efficiency (s^-1 mM^-1), linear model.
    #[arg(long, default_value_t = 3.0)]
    pub cat_eff: f64,

    /// Enzyme concentration in the reaction (mM).
    #[arg(long, default_value_t = 1e-3)]
    pub enz_mm: f64,

    /// Extinction coefficient (mM^-1 cm^-1).
    #[arg(long, default_value_t = DEFAULT_EXTINCTION)]
    pub ext: f64,

    /// Optical path length (cm).
    #[arg(long, default_value_t = 0.5)]
    pub pathlen: f64,

    /// Substrate concentrations (mM), comma separated.
    #[arg(long, value_delimiter = ',', default_values_t = vec![0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0])]
    pub concs: Vec<f64>,

    /// Replicate trials per concentration.
    #[arg(long, default_value_t = 3)]
    pub trials: usize,

    /// Relative standard deviation of multiplicative noise.
    #[arg(long, default_value_t = 0.03)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
