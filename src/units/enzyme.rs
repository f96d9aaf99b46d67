//! Reaction setup -> enzyme concentration and optical path length.

use log::warn;

use crate::domain::{EnzymeParameters, ReactionInputs};
use crate::error::AppError;

/// Reaction volume (µL) that fills a well to 1 cm of path length.
///
/// 200 µL -> 0.5 cm, 100 µL -> 0.25 cm.
pub const UL_PER_CM: f64 = 400.0;

/// Compute the fixed enzyme concentration and optical constants for a reaction.
///
/// The reaction volume is an integer number of microlitres, so the path length
/// is always derived from a whole-µL volume.
pub fn compute_enzyme_params(
    total_rxn_vol_ul: u32,
    enz_rxn_vol_ul: u32,
    stock_conc_mg_ml: f64,
    enz_mol_wt_g_mol: f64,
    dilution: f64,
    ext: f64,
) -> Result<EnzymeParameters, AppError> {
    if total_rxn_vol_ul == 0 {
        return Err(AppError::invalid("total reaction volume must be > 0 µL"));
    }
    if enz_rxn_vol_ul == 0 {
        return Err(AppError::invalid("enzyme volume must be > 0 µL"));
    }
    ensure_positive("stock concentration (mg/mL)", stock_conc_mg_ml)?;
    ensure_positive("molecular weight (g/mol)", enz_mol_wt_g_mol)?;
    ensure_positive("dilution factor", dilution)?;
    ensure_positive("extinction coefficient", ext)?;

    if enz_rxn_vol_ul > total_rxn_vol_ul {
        warn!(
            "enzyme volume ({enz_rxn_vol_ul} µL) exceeds total reaction volume ({total_rxn_vol_ul} µL)"
        );
    }

    let rxn_vol = f64::from(total_rxn_vol_ul);
    let enz_vol = f64::from(enz_rxn_vol_ul);

    // mg/mL == g/L
    let enz_rxn_conc_g_l = stock_conc_mg_ml * (1.0 / dilution) * (enz_vol / rxn_vol);
    let enz_rxn_um = enz_rxn_conc_g_l * (1.0 / enz_mol_wt_g_mol) * 1e6;
    let enz_rxn_mm = enz_rxn_um / 1000.0;

    let pathlen_cm = rxn_vol / UL_PER_CM;

    if !(enz_rxn_mm.is_finite() && enz_rxn_mm > 0.0) {
        return Err(AppError::invalid(format!(
            "derived enzyme concentration is not positive ({enz_rxn_mm})"
        )));
    }

    Ok(EnzymeParameters {
        ext,
        pathlen_cm,
        enz_rxn_mm,
    })
}

/// Same as [`compute_enzyme_params`], taking the bundled input record.
pub fn enzyme_params_from_inputs(inputs: &ReactionInputs) -> Result<EnzymeParameters, AppError> {
    compute_enzyme_params(
        inputs.total_rxn_vol_ul,
        inputs.enz_rxn_vol_ul,
        inputs.stock_conc_mg_ml,
        inputs.enz_mol_wt_g_mol,
        inputs.dilution,
        inputs.ext,
    )
}

fn ensure_positive(name: &str, v: f64) -> Result<(), AppError> {
    if !v.is_finite() {
        return Err(AppError::invalid(format!("{name} must be finite, got {v}")));
    }
    if v <= 0.0 {
        return Err(AppError::invalid(format!("{name} must be > 0, got {v}")));
    }
    Ok(())
}
