//! Read/write result JSON files.
//!
//! Result JSON is the "portable" representation of a run:
//! - the six reaction inputs and derived enzyme parameters
//! - fitted kinetic parameters and R²
//! - the full tidy measurement table, so the curve can be rebuilt for plotting
//!
//! The schema is defined by `domain::ResultDocument`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::domain::ResultDocument;
use crate::error::AppError;

/// Write a result JSON file.
pub fn write_result_json(path: &Path, doc: &ResultDocument) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("create result JSON '{}'", path.display()), e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), doc)
        .map_err(|e| AppError::serialization("write result JSON", e))?;
    Ok(())
}

/// Read a result JSON file.
pub fn read_result_json(path: &Path) -> Result<ResultDocument, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("open result JSON '{}'", path.display()), e))?;
    let doc: ResultDocument =
        serde_json::from_reader(file).map_err(|e| AppError::serialization("invalid result JSON", e))?;
    Ok(doc)
}
