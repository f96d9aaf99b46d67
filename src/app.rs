//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - reads the assay text
//! - runs the fit pipeline
//! - prints reports/plots
//! - writes an optional per-run export bundle

use std::io::Read;
use std::path::Path;

use clap::Parser;
use log::{LevelFilter, debug};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::cli::{Command, FitArgs, PlotArgs, SimulateArgs};
use crate::data::{SimulationSpec, simulate_assay};
use crate::domain::{ReactionInputs, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Environment variable read for the default log level.
pub const LOG_ENV: &str = "MMK_LOG";

/// Entry point for the `mmk` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => std::env::var(LOG_ENV)
            .ok()
            .and_then(|v| v.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // A logger may already be installed when embedded; keep the existing one.
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let assay_text = read_assay_text(args.input.as_deref())?;
    let config = run_config_from_args(&args, assay_text);

    let run = pipeline::run_fit(
        &config.inputs,
        &config.assay_text,
        config.model,
        config.title.as_deref(),
    )?;

    println!(
        "{}",
        crate::report::format_run_summary(config.title.as_deref(), &run.enzyme, &run.table, &run.result)
    );
    if args.table {
        println!("{}", crate::report::format_table(&run.table));
    }

    let plot = crate::plot::render_ascii_plot(&run.curve, config.plot_width, config.plot_height);
    if config.plot {
        println!("{plot}");
    }

    if let Some(dir) = &config.out_dir {
        let doc = run.to_document();
        let run_dir = crate::io::write_run_bundle(dir, &doc, Some(&plot))?;
        println!("Saved run {} to {}", doc.run_id, run_dir.display());
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let doc = crate::io::read_result_json(&args.result)?;
    let spec = crate::plot::curve_spec(&doc.result, &doc.table, doc.enzyme.enz_rxn_mm, doc.title.as_deref());
    println!("{}", crate::plot::render_ascii_plot(&spec, args.width, args.height));
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let spec = SimulationSpec {
        model: args.model,
        kcat: args.kcat,
        km: args.km,
        cat_eff: args.cat_eff,
        enz_rxn_mm: args.enz_mm,
        ext: args.ext,
        pathlen_cm: args.pathlen,
        concentrations: args.concs,
        trials: args.trials,
        rel_noise: args.noise,
        seed: args.seed,
    };
    print!("{}", simulate_assay(&spec)?);
    Ok(())
}

pub fn run_config_from_args(args: &FitArgs, assay_text: String) -> RunConfig {
    RunConfig {
        inputs: ReactionInputs {
            total_rxn_vol_ul: args.total_rxn_vol,
            enz_rxn_vol_ul: args.enz_rxn_vol,
            stock_conc_mg_ml: args.stock_conc,
            enz_mol_wt_g_mol: args.mol_wt,
            dilution: args.dilution,
            ext: args.ext,
        },
        model: args.model,
        title: args.title.clone().filter(|t| !t.trim().is_empty()),
        assay_text,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        out_dir: args.out_dir.clone(),
    }
}

fn read_assay_text(path: Option<&Path>) -> Result<String, AppError> {
    match path {
        Some(p) if p != Path::new("-") => {
            debug!("reading assay from {}", p.display());
            std::fs::read_to_string(p).map_err(|e| AppError::io(format!("read assay '{}'", p.display()), e))
        }
        _ => {
            debug!("reading assay from stdin");
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| AppError::io("read assay from stdin", e))?;
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KineticModel;

    fn parse(argv: &[&str]) -> crate::cli::Cli {
        crate::cli::Cli::try_parse_from(argv.iter().copied()).unwrap()
    }

    #[test]
    fn fit_args_map_to_run_config() {
        let cli = parse(&[
            "mmk", "fit", "--rxn-vol", "200", "--enz-vol", "10", "--stock-conc", "1.5", "--mol-wt", "42000",
            "--dilution", "20", "--model", "linear", "--title", "  ", "--no-plot",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        let config = run_config_from_args(&args, "1 2".to_string());
        assert_eq!(config.inputs.total_rxn_vol_ul, 200);
        assert_eq!(config.inputs.ext, 6.22);
        assert_eq!(config.model, KineticModel::Linear);
        assert!(config.title.is_none());
        assert!(!config.plot);
    }

    #[test]
    fn reaction_volume_must_be_an_integer() {
        let res = crate::cli::Cli::try_parse_from([
            "mmk", "fit", "--rxn-vol", "200.5", "--enz-vol", "10", "--stock-conc", "1", "--mol-wt", "1",
            "--dilution", "1",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn simulate_defaults_parse() {
        let cli = parse(&["mmk", "-vv", "simulate", "--concs", "1,2,4"]);
        assert_eq!(cli.verbose, 2);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate subcommand");
        };
        assert_eq!(args.concs, vec![1.0, 2.0, 4.0]);
        assert_eq!(args.trials, 3);
    }
}
