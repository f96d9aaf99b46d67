//! Plate-reader text ingest.
//!
//! Input is a whitespace-delimited block with no header:
//!
//! ```text
//! <substrate mM>  <trial 1 mA/min>  <trial 2 mA/min> ...
//! ```
//!
//! Output is long-form: one row per (concentration, trial), row-major.

use log::debug;

use crate::domain::{EnzymeParameters, SlopeReading, TidyMeasurement};
use crate::error::AppError;

/// mA/min -> A/s.
pub const SLOPE_FACTOR: f64 = 1.0 / 60.0 * 1.0 / 1000.0;

/// Parse raw assay text into slope readings in absorbance per second.
pub fn parse_assay(text: &str) -> Result<Vec<SlopeReading>, AppError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut width: Option<usize> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }

        match width {
            None => {
                if fields.len() < 2 {
                    return Err(AppError::malformed(format!(
                        "line {line_no}: expected a concentration and at least one trial column, found {} column(s)",
                        fields.len()
                    )));
                }
                width = Some(fields.len());
            }
            Some(w) if w != fields.len() => {
                return Err(AppError::malformed(format!(
                    "line {line_no}: expected {w} columns, found {}",
                    fields.len()
                )));
            }
            Some(_) => {}
        }

        let values = fields
            .iter()
            .enumerate()
            .map(|(col, raw)| parse_field(raw, line_no, col + 1))
            .collect::<Result<Vec<f64>, AppError>>()?;

        if values[0] < 0.0 {
            return Err(AppError::malformed(format!(
                "line {line_no}: substrate concentration must be >= 0, found {}",
                values[0]
            )));
        }

        rows.push(values);
    }

    let Some(width) = width else {
        return Err(AppError::malformed("no assay rows found"));
    };

    let mut out = Vec::with_capacity(rows.len() * (width - 1));
    for values in &rows {
        let conc = values[0];
        for (trial_idx, raw) in values[1..].iter().enumerate() {
            out.push(SlopeReading {
                cofa_conc_mm: conc,
                trial: format!("t{}", trial_idx + 1),
                slope_a_s: raw * SLOPE_FACTOR,
            });
        }
    }

    debug!(
        "parsed assay: {} concentration(s) x {} trial(s)",
        rows.len(),
        width - 1
    );
    Ok(out)
}

fn parse_field(raw: &str, line: usize, col: usize) -> Result<f64, AppError> {
    let v: f64 = raw.parse().map_err(|_| {
        AppError::malformed(format!("line {line}, column {col}: '{raw}' is not a number"))
    })?;
    if !v.is_finite() {
        return Err(AppError::malformed(format!(
            "line {line}, column {col}: '{raw}' is not a finite number"
        )));
    }
    Ok(v)
}

/// Convert absorbance slopes to initial velocities (Beer-Lambert).
///
/// `v0 [mM/s] = slope [A/s] / (ext [mM^-1 cm^-1] * pathlen [cm])`
pub fn to_velocities(readings: &[SlopeReading], params: &EnzymeParameters) -> Vec<TidyMeasurement> {
    let denom = params.ext * params.pathlen_cm;
    readings
        .iter()
        .map(|r| TidyMeasurement {
            trial: r.trial.clone(),
            cofa_conc_mm: r.cofa_conc_mm,
            slope_a_s: r.slope_a_s,
            v0_mm_s: r.slope_a_s / denom,
        })
        .collect()
}

/// Parse and convert in one step.
pub fn parse_measurements(text: &str, params: &EnzymeParameters) -> Result<Vec<TidyMeasurement>, AppError> {
    let readings = parse_assay(text)?;
    Ok(to_velocities(&readings, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: &str = "1.0 60 58\n2.0 110 108\n4.0 150 152";

    #[test]
    fn produces_rows_times_trials_measurements() {
        let text = "0.5\t10 11 12\n1.0\t20 21 22\n2.0  30 31 32\n4.0 40 41 42\n";
        let readings = parse_assay(text).unwrap();
        assert_eq!(readings.len(), 4 * 3);
        assert_relative_eq!(readings[0].slope_a_s, 10.0 / 60000.0, max_relative = 1e-12);
        assert_relative_eq!(readings[11].slope_a_s, 42.0 / 60000.0, max_relative = 1e-12);
    }

    #[test]
    fn flattens_row_major_with_trial_labels() {
        let readings = parse_assay(SAMPLE).unwrap();
        let labels: Vec<(f64, &str)> = readings
            .iter()
            .map(|r| (r.cofa_conc_mm, r.trial.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![
                (1.0, "t1"),
                (1.0, "t2"),
                (2.0, "t1"),
                (2.0, "t2"),
                (4.0, "t1"),
                (4.0, "t2"),
            ]
        );
    }

    #[test]
    fn velocities_follow_beer_lambert() {
        let params = EnzymeParameters {
            ext: 6.22,
            pathlen_cm: 0.5,
            enz_rxn_mm: 0.001,
        };
        let table = parse_measurements(SAMPLE, &params).unwrap();
        assert_eq!(table.len(), 6);

        let raw = [60.0, 58.0, 110.0, 108.0, 150.0, 152.0];
        for (row, raw) in table.iter().zip(raw) {
            assert_relative_eq!(row.slope_a_s, raw / 60000.0, max_relative = 1e-12);
            assert_relative_eq!(row.v0_mm_s, row.slope_a_s / (6.22 * 0.5), max_relative = 1e-12);
        }
    }

    #[test]
    fn skips_blank_lines() {
        let text = "\n1.0 5\n\n   \n2.0 6\n";
        assert_eq!(parse_assay(text).unwrap().len(), 2);
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = parse_assay("1.0 60 58\n2.0 110\n").unwrap_err();
        assert!(matches!(err, AppError::MalformedInput(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn rejects_non_numeric_fields() {
        let err = parse_assay("conc t1\n1.0 60\n").unwrap_err();
        assert!(matches!(err, AppError::MalformedInput(_)));
    }

    #[test]
    fn rejects_single_column() {
        assert!(matches!(parse_assay("1.0\n2.0\n"), Err(AppError::MalformedInput(_))));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse_assay("  \n\n"), Err(AppError::MalformedInput(_))));
    }

    #[test]
    fn rejects_negative_concentration() {
        assert!(matches!(parse_assay("-1.0 60\n"), Err(AppError::MalformedInput(_))));
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(matches!(parse_assay("1.0 NaN\n"), Err(AppError::MalformedInput(_))));
        assert!(matches!(parse_assay("1.0 inf\n"), Err(AppError::MalformedInput(_))));
    }
}
