//! Shared "fit pipeline" logic used by the CLI front-end and tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! reaction inputs -> enzyme parameters -> tidy table -> fit -> R² -> curve spec
//!
//! Every call owns its data; nothing is written to disk here.

use log::info;

use crate::domain::{EnzymeParameters, FitResult, KineticModel, ReactionInputs, ResultDocument, TidyMeasurement};
use crate::error::AppError;
use crate::fit::{FitParameters, fit, r_squared};
use crate::plot::{CurveSpec, curve_spec};
use crate::units::{enzyme_params_from_inputs, parse_measurements};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub title: Option<String>,
    pub inputs: ReactionInputs,
    pub enzyme: EnzymeParameters,
    pub table: Vec<TidyMeasurement>,
    pub fit: FitParameters,
    pub result: FitResult,
    pub curve: CurveSpec,
}

impl RunOutput {
    /// Package for export.
    pub fn to_document(&self) -> ResultDocument {
        ResultDocument::new(
            self.title.clone(),
            self.inputs,
            self.enzyme,
            self.result.clone(),
            self.table.clone(),
        )
    }
}

/// Execute the full computation and return the outputs.
pub fn run_fit(
    inputs: &ReactionInputs,
    assay_text: &str,
    model: KineticModel,
    title: Option<&str>,
) -> Result<RunOutput, AppError> {
    // 1) Reaction setup -> fixed enzyme concentration and optics.
    let enzyme = enzyme_params_from_inputs(inputs)?;
    info!(
        "enzyme in reaction: {:.6e} mM, path length {:.3} cm",
        enzyme.enz_rxn_mm, enzyme.pathlen_cm
    );

    // 2) Raw text -> tidy table with velocities.
    let table = parse_measurements(assay_text, &enzyme)?;
    info!("parsed {} measurement(s)", table.len());

    // 3) Fit with [E] held fixed.
    let fit = fit(&table, enzyme.enz_rxn_mm, model)?;

    // 4) Score and package.
    let r_sq = r_squared(&table, enzyme.enz_rxn_mm, &fit.params, model)?;
    let result = fit.to_result(r_sq)?;
    info!(
        "{} fit: cat_eff={:.4} ± {:.4}, R²={:.4}",
        model.display_name(),
        result.cat_eff,
        result.cat_eff_err,
        result.r_sq
    );

    let curve = curve_spec(&result, &table, enzyme.enz_rxn_mm, title);

    Ok(RunOutput {
        title: title.map(str::to_string),
        inputs: *inputs,
        enzyme,
        table,
        fit,
        result,
        curve,
    })
}
