//! Renderable curve specification.
//!
//! `curve_spec` is pure: it samples the fitted model and collects the scatter
//! points and annotation text. Renderers (`ascii`) only consume the spec.

pub mod ascii;

pub use ascii::*;

use serde::{Deserialize, Serialize};

use crate::domain::{FitResult, KineticModel, TidyMeasurement};
use crate::models::{lin_velocity, velocity};

/// Number of samples along the fitted curve.
pub const CURVE_SAMPLES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSpec {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub x_range: (f64, f64),
    pub series_label: String,
    /// `(substrate mM, rate s^-1)` along the fitted model.
    pub curve: Vec<(f64, f64)>,
    /// `(substrate mM, observed rate s^-1)`.
    pub scatter: Vec<(f64, f64)>,
    /// Vertical marker at km (hyperbolic only).
    pub km_marker: Option<f64>,
    pub annotation: Vec<String>,
}

/// Build the curve specification for a finished fit.
///
/// Rates are velocities divided by the fixed enzyme concentration.
pub fn curve_spec(
    result: &FitResult,
    table: &[TidyMeasurement],
    enz_rxn_mm: f64,
    title: Option<&str>,
) -> CurveSpec {
    let (x_min, x_max) = substrate_range(table).unwrap_or((0.0, 1.0));

    let rate_at = |s: f64| -> f64 {
        let v = match (result.model, result.kcat, result.km) {
            (KineticModel::Hyperbolic, Some(kcat), Some(km)) => velocity(s, enz_rxn_mm, kcat, km),
            _ => lin_velocity(s, enz_rxn_mm, result.cat_eff),
        };
        v / enz_rxn_mm
    };

    let curve = linspace(x_min, x_max, CURVE_SAMPLES)
        .into_iter()
        .map(|s| (s, rate_at(s)))
        .collect();

    let scatter = table
        .iter()
        .map(|m| (m.cofa_conc_mm, m.v0_mm_s / enz_rxn_mm))
        .collect();

    let km_marker = match result.model {
        KineticModel::Hyperbolic => result.km,
        KineticModel::Linear => None,
    };

    CurveSpec {
        title: title.map(str::to_string),
        x_label: "Substrate (mM)".to_string(),
        y_label: "Rate (s^-1)".to_string(),
        x_range: (x_min, x_max),
        series_label: result.model.display_name().to_string(),
        curve,
        scatter,
        km_marker,
        annotation: annotation_lines(result),
    }
}

fn annotation_lines(result: &FitResult) -> Vec<String> {
    let mut out = Vec::new();
    match (result.model, result.kcat, result.km) {
        (KineticModel::Hyperbolic, Some(kcat), Some(km)) => {
            out.push(format!(
                "kcat = {kcat:.3} ± {:.2} s^-1",
                result.kcat_err.unwrap_or(f64::NAN)
            ));
            out.push(format!(
                "KM = {km:.3} ± {:.2} mM",
                result.km_err.unwrap_or(f64::NAN)
            ));
        }
        _ => {
            out.push(format!(
                "kcat/KM = {:.2} ± {:.1} s^-1 mM^-1",
                result.cat_eff, result.cat_eff_err
            ));
        }
    }
    out.push(format!("R^2 = {:.3}", result.r_sq));
    out
}

fn substrate_range(table: &[TidyMeasurement]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for m in table {
        min = min.min(m.cofa_conc_mm);
        max = max.max(m.cofa_conc_mm);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

/// `n` evenly spaced points on `[a, b]`, endpoints included.
pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => {
            let step = (b - a) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i == n - 1 { b } else { a + step * i as f64 })
                .collect()
        }
    }
}
