//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{EnzymeParameters, FitResult, KineticModel, TidyMeasurement};

/// Scalar result fields in export order. Absent hyperbolic-only values are `None`.
pub fn result_fields(result: &FitResult) -> Vec<(&'static str, Option<f64>)> {
    vec![
        ("kcat", result.kcat),
        ("kcat_err", result.kcat_err),
        ("km", result.km),
        ("km_err", result.km_err),
        ("cat_eff", Some(result.cat_eff)),
        ("cat_eff_err", Some(result.cat_eff_err)),
        ("r_sq", Some(result.r_sq)),
    ]
}

/// Format the full run summary (reaction setup + fitted parameters).
pub fn format_run_summary(
    title: Option<&str>,
    enzyme: &EnzymeParameters,
    table: &[TidyMeasurement],
    result: &FitResult,
) -> String {
    let mut out = String::new();

    out.push_str("=== mmk - Michaelis-Menten fit ===\n");
    if let Some(title) = title {
        out.push_str(&format!("Run: {title}\n"));
    }
    out.push_str(&format!(
        "Enzyme: [E]={:.6e} mM | ext={:.3} mM^-1 cm^-1 | path={:.3} cm\n",
        enzyme.enz_rxn_mm, enzyme.ext, enzyme.pathlen_cm
    ));
    out.push_str(&format!(
        "Points: n={} | substrate=[{}] mM\n",
        table.len(),
        fmt_range(table.iter().map(|m| m.cofa_conc_mm))
    ));

    out.push_str(&format!("\nModel: {} (fit={})\n", result.model.display_name(), model_key(result.model)));
    for (name, value) in result_fields(result) {
        if let Some(v) = value {
            out.push_str(&format!("- {name:<12}: {}\n", fmt_value(v)));
        }
    }
    out.push('\n');

    out
}

/// Format the tidy table (one row per trial).
pub fn format_table(table: &[TidyMeasurement]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<6} {:>12} {:>14} {:>14}\n",
            "trial", "cofa_mM", "slope_A_s", "v0_mM_s"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<12} {:-<14} {:-<14}\n", "", "", "", "").trim_end());
    out.push('\n');

    for m in table {
        out.push_str(
            format!(
                "{:<6} {:>12.4} {:>14.6e} {:>14.6e}\n",
                m.trial, m.cofa_conc_mm, m.slope_a_s, m.v0_mm_s
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn model_key(model: KineticModel) -> &'static str {
    match model {
        KineticModel::Hyperbolic => "hyperbolic",
        KineticModel::Linear => "linear",
    }
}

fn fmt_value(v: f64) -> String {
    if v != 0.0 && (v.abs() < 1e-3 || v.abs() >= 1e6) {
        format!("{v:.6e}")
    } else {
        format!("{v:.6}")
    }
}

fn fmt_range(values: impl Iterator<Item = f64>) -> String {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min.is_finite() {
        format!("{min:.3}, {max:.3}")
    } else {
        "-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> FitResult {
        FitResult {
            model: KineticModel::Linear,
            kcat: None,
            kcat_err: None,
            km: None,
            km_err: None,
            cat_eff: 3.0,
            cat_eff_err: 0.25,
            r_sq: 0.995,
        }
    }

    #[test]
    fn summary_omits_absent_hyperbolic_fields() {
        let enzyme = EnzymeParameters {
            ext: 6.22,
            pathlen_cm: 0.5,
            enz_rxn_mm: 1e-3,
        };
        let txt = format_run_summary(Some("demo"), &enzyme, &[], &linear());
        assert!(txt.contains("Run: demo\n"));
        assert!(txt.contains("fit=linear"));
        assert!(txt.contains("- cat_eff     : 3.000000\n"));
        assert!(!txt.contains("kcat "));
        assert!(txt.contains("substrate=[-]"));
    }

    #[test]
    fn result_fields_keep_export_order() {
        let names: Vec<&str> = result_fields(&linear()).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["kcat", "kcat_err", "km", "km_err", "cat_eff", "cat_eff_err", "r_sq"]);
    }

    #[test]
    fn table_has_header_and_rule() {
        let table = vec![TidyMeasurement {
            trial: "t1".to_string(),
            cofa_conc_mm: 1.0,
            slope_a_s: 1e-3,
            v0_mm_s: 3.2e-4,
        }];
        let txt = format_table(&table);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("trial"));
        assert!(lines[1].starts_with("------"));
        assert!(lines[2].starts_with("t1"));
    }
}
