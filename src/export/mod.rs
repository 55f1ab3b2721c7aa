//! Export pipeline - crosswalk resolution, file transfer, and manifests
//!
//! Every target shares the same shape: resolve the schema's crosswalk into
//! fixed-width columns, construct rectangular manifest rows, copy the
//! referenced files into the target layout with byte-level progress, and
//! emit a delimited manifest. Per-file copy failures are logged, recorded
//! on the report, and skipped; a manifest write failure is fatal.

pub mod archive;
pub mod metadata;
pub mod repository;
pub mod streaming;
pub mod transfer;

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::core::session::ProjectSession;
use crate::mint::MintError;
use crate::project::ProjectError;

pub use transfer::Transfer;

/// Errors that abort an export run
#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("could not lay out export directory {path}: {source}")]
    Layout {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write manifest {path}: {message}")]
    ManifestWrite { path: PathBuf, message: String },

    #[error(transparent)]
    Mint(#[from] MintError),

    #[error(transparent)]
    Project(#[from] ProjectError),
}

/// Per-run outcome: what moved and what did not.
///
/// Copy failures do not abort an export and the manifest keeps its legacy
/// shape, so the report is where they become visible to the caller.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub files_copied: usize,
    pub failed: Vec<PathBuf>,
}

/// A resolved manifest column for one crosswalked schema field
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// Qualified name of the schema field
    pub name: String,

    /// Column label in the target manifest
    pub label: String,

    /// Fixed repeat width: the maximum repeat count observed across the
    /// batch, so the manifest stays rectangular
    pub count: usize,

    /// Typed-value marker from the crosswalk
    pub value_type: Option<String>,
}

/// Resolve the schema's crosswalk for one export target.
///
/// Every schema field carrying a crosswalk entry for `target` becomes a
/// column whose repeat width is the maximum number of sub-values any object
/// in the batch holds for that field, never less than one.
pub fn resolve_columns(target: &str, session: &ProjectSession) -> Vec<ColumnSpec> {
    session
        .schema
        .fields()
        .iter()
        .filter_map(|map_field| {
            let entry = map_field.crosswalk_for(target)?;
            let name = map_field.full_name();
            let count = session
                .objects
                .iter()
                .filter_map(|object| object.get_field(&name))
                .map(|field| field.values.as_ref().map(Vec::len).unwrap_or(1))
                .max()
                .unwrap_or(1)
                .max(1);
            Some(ColumnSpec {
                name,
                label: entry.label.clone(),
                count,
                value_type: entry.value_type.clone(),
            })
        })
        .collect()
}

/// Right-pad a row with empty cells to the fixed width; never truncates
pub fn pad_row(mut cells: Vec<String>, width: usize) -> Vec<String> {
    while cells.len() < width {
        cells.push(String::new());
    }
    cells
}

/// Create a directory tree, failing the export if it cannot be laid out
pub fn lay_out(path: &Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(path).map_err(|source| ExportError::Layout {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a comma-separated manifest; any failure is fatal to the export
pub fn write_csv_manifest(path: &Path, rows: &[Vec<String>]) -> Result<(), ExportError> {
    let manifest_error = |message: String| ExportError::ManifestWrite {
        path: path.to_path_buf(),
        message,
    };

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| manifest_error(e.to_string()))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| manifest_error(e.to_string()))?;
    }
    writer.flush().map_err(|e| manifest_error(e.to_string()))?;
    Ok(())
}

/// Write a tab-separated manifest in the legacy format: cells joined with
/// tabs, no quoting
pub fn write_tab_manifest(path: &Path, rows: &[Vec<String>]) -> Result<(), ExportError> {
    let content = rows
        .iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(path, content).map_err(|e| ExportError::ManifestWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// The schema labels of an object's visible fields, in schema order
pub(crate) fn visible_labels(session: &ProjectSession) -> Vec<String> {
    session
        .schema
        .fields()
        .iter()
        .filter(|field| field.visible)
        .map(|field| field.label.clone())
        .collect()
}
