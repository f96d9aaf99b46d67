//! Per-run export bundles.
//!
//! Every run gets its own directory named by its run id, so two runs never
//! write to the same location:
//!
//! ```text
//! <out_dir>/<run_id>/result.json
//! <out_dir>/<run_id>/assay.csv
//! <out_dir>/<run_id>/plot.txt      (optional)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::domain::{ResultDocument, TidyMeasurement};
use crate::error::AppError;
use crate::io::document::write_result_json;

pub const RESULT_FILE: &str = "result.json";
pub const TABLE_FILE: &str = "assay.csv";
pub const PLOT_FILE: &str = "plot.txt";

/// Write the tidy table to CSV (`trial,cofa_conc_mM,slope_a_s,v0_mM_s`).
pub fn write_table_csv(path: &Path, table: &[TidyMeasurement]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::serialization(format!("create table CSV '{}'", path.display()), e))?;
    for row in table {
        writer
            .serialize(row)
            .map_err(|e| AppError::serialization("write table CSV row", e))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io("flush table CSV", e))?;
    Ok(())
}

/// Create `<out_dir>/<run_id>/` and write the run's files into it.
///
/// Fails if the run directory already exists.
pub fn write_run_bundle(
    out_dir: &Path,
    doc: &ResultDocument,
    plot_text: Option<&str>,
) -> Result<PathBuf, AppError> {
    fs::create_dir_all(out_dir)
        .map_err(|e| AppError::io(format!("create output dir '{}'", out_dir.display()), e))?;

    let run_dir = out_dir.join(doc.run_id.to_string());
    fs::create_dir(&run_dir)
        .map_err(|e| AppError::io(format!("create run dir '{}'", run_dir.display()), e))?;

    populate_run_dir(&run_dir, doc, plot_text)?;
    info!("wrote run bundle to {}", run_dir.display());
    Ok(run_dir)
}

/// Write the bundle files into `run_dir`, removing the directory if any write fails.
fn populate_run_dir(run_dir: &Path, doc: &ResultDocument, plot_text: Option<&str>) -> Result<(), AppError> {
    let written = write_bundle_files(run_dir, doc, plot_text);
    if written.is_err() {
        if let Err(e) = fs::remove_dir_all(run_dir) {
            warn!("could not remove partial run dir '{}': {e}", run_dir.display());
        }
    }
    written
}

fn write_bundle_files(run_dir: &Path, doc: &ResultDocument, plot_text: Option<&str>) -> Result<(), AppError> {
    write_result_json(&run_dir.join(RESULT_FILE), doc)?;
    write_table_csv(&run_dir.join(TABLE_FILE), &doc.table)?;
    if let Some(text) = plot_text {
        let path = run_dir.join(PLOT_FILE);
        fs::write(&path, text).map_err(|e| AppError::io(format!("write '{}'", path.display()), e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EnzymeParameters, FitResult, KineticModel, ReactionInputs};
    use crate::io::document::read_result_json;

    fn doc() -> ResultDocument {
        ResultDocument::new(
            Some("NADH oxidase".to_string()),
            ReactionInputs {
                total_rxn_vol_ul: 200,
                enz_rxn_vol_ul: 10,
                stock_conc_mg_ml: 2.0,
                enz_mol_wt_g_mol: 50_000.0,
                dilution: 10.0,
                ext: 6.22,
            },
            EnzymeParameters {
                ext: 6.22,
                pathlen_cm: 0.5,
                enz_rxn_mm: 2e-4,
            },
            FitResult {
                model: KineticModel::Hyperbolic,
                kcat: Some(5.0),
                kcat_err: Some(0.1),
                km: Some(2.0),
                km_err: Some(0.2),
                cat_eff: 2.5,
                cat_eff_err: 0.3,
                r_sq: 0.99,
            },
            vec![
                TidyMeasurement {
                    trial: "t1".to_string(),
                    cofa_conc_mm: 1.0,
                    slope_a_s: 0.001,
                    v0_mm_s: 0.001 / 3.11,
                },
                TidyMeasurement {
                    trial: "t2".to_string(),
                    cofa_conc_mm: 1.0,
                    slope_a_s: 0.002,
                    v0_mm_s: 0.002 / 3.11,
                },
            ],
        )
    }

    #[test]
    fn bundle_lands_in_run_scoped_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = doc();
        let run_dir = write_run_bundle(tmp.path(), &doc, Some("plot")).unwrap();

        assert_eq!(run_dir, tmp.path().join(doc.run_id.to_string()));
        assert!(run_dir.join(RESULT_FILE).is_file());
        assert!(run_dir.join(TABLE_FILE).is_file());
        assert_eq!(std::fs::read_to_string(run_dir.join(PLOT_FILE)).unwrap(), "plot");
    }

    #[test]
    fn separate_runs_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let a = write_run_bundle(tmp.path(), &doc(), None).unwrap();
        let b = write_run_bundle(tmp.path(), &doc(), None).unwrap();
        assert_ne!(a, b);
        assert!(!a.join(PLOT_FILE).exists());
    }

    #[test]
    fn refuses_to_overwrite_an_existing_run() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = doc();
        write_run_bundle(tmp.path(), &doc, None).unwrap();
        let err = write_run_bundle(tmp.path(), &doc, None).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }

    #[test]
    fn failed_write_leaves_no_partial_run() {
        let tmp = tempfile::tempdir().unwrap();
        let run_dir = tmp.path().join("run");
        // A directory where the plot file should go makes the last write fail.
        std::fs::create_dir_all(run_dir.join(PLOT_FILE)).unwrap();

        let err = populate_run_dir(&run_dir, &doc(), Some("plot")).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
        assert!(!run_dir.exists());
    }

    #[test]
    fn table_csv_has_expected_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("t.csv");
        write_table_csv(&path, &doc().table).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("trial,cofa_conc_mM,slope_a_s,v0_mM_s"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn result_json_round_trips_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let original = doc();
        let run_dir = write_run_bundle(tmp.path(), &original, None).unwrap();
        let loaded = read_result_json(&run_dir.join(RESULT_FILE)).unwrap();
        assert_eq!(loaded.run_id, original.run_id);
        assert_eq!(loaded.result, original.result);
        assert_eq!(loaded.table, original.table);
        assert_eq!(loaded.title.as_deref(), Some("NADH oxidase"));
    }
}
