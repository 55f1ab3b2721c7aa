//! Streaming-platform package export
//!
//! Writes `batch_manifest.csv` and a `content/` directory of access
//! copies. Columns come from the `streaming` crosswalk with fixed repeat
//! widths; typed fields emit a paired `<label> Type` column per value, and
//! `File` columns are paired with an `Offset` column. Identifiers are
//! minted before the manifest is built so the identifier column can mark
//! the minted value as the digital object identifier.

use std::path::{Path, PathBuf};

use futures::future::join_all;

use crate::core::config::MinterConfig;
use crate::core::progress::{ProgressId, ProgressRegistry, TransferProgress};
use crate::core::session::ProjectSession;
use crate::export::{
    lay_out, pad_row, resolve_columns, write_csv_manifest, ColumnSpec, ExportError, ExportReport,
    Transfer,
};
use crate::mint;
use crate::model::{DigitalObject, IDENTIFIER_FIELD};
use crate::project;

/// Crosswalk target name this exporter resolves columns for
pub const TARGET: &str = "streaming";

const MANIFEST_NAME: &str = "batch_manifest.csv";
const CONTENT_DIR: &str = "content";

/// Every file cell carries this fixed thumbnail offset
const FILE_OFFSET: &str = "00:00:10";

/// Identifier values equal to the minted identifier are typed as the
/// object's own identifier; all others are typed as plain identifiers
const MINTED_TYPE: &str = "digital object";
const OTHER_TYPE: &str = "other";

/// Export the session as a streaming-platform package at `location`.
///
/// `username` is the submitting operator recorded in the manifest's first
/// row, prompted for by the caller.
pub async fn export(
    session: &mut ProjectSession,
    location: &Path,
    username: &str,
    minter: Option<&MinterConfig>,
    progress: &ProgressRegistry,
) -> Result<ExportReport, ExportError> {
    mint::mint_identifiers(session, minter, progress).await?;
    if session.project_path.is_some() {
        project::save(session)?;
    }

    let bar = progress.register("Exporting streaming package");
    let result = run(session, location, username, progress, &bar).await;
    progress.clear(&bar);

    match &result {
        Ok(report) => tracing::info!(
            copied = report.files_copied,
            failed = report.failed.len(),
            "done exporting streaming package"
        ),
        Err(error) => tracing::error!(%error, "streaming export failed"),
    }
    result
}

async fn run(
    session: &ProjectSession,
    location: &Path,
    username: &str,
    progress: &ProgressRegistry,
    bar: &ProgressId,
) -> Result<ExportReport, ExportError> {
    let content_dir = location.join(CONTENT_DIR);
    lay_out(&content_dir)?;

    let columns = resolve_columns(TARGET, session);
    let file_count = session
        .objects
        .iter()
        .map(|object| object.files.len())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut report = ExportReport::default();
    let mut byte_progress = TransferProgress::new();
    for object in &session.objects {
        for file in &object.files {
            match std::fs::metadata(&file.path) {
                Ok(meta) => byte_progress.add_source(&file.path, meta.len()),
                Err(error) => {
                    tracing::error!(path = %file.path.display(), %error, "cannot stat source file");
                    report.failed.push(file.path.clone());
                }
            }
        }
    }

    let header = build_header(&columns, file_count);
    let mut rows = Vec::new();
    rows.push(pad_row(
        vec!["Batch Ingest".to_string(), username.to_string()],
        header.len(),
    ));
    rows.push(header);

    let mut jobs: Vec<(PathBuf, PathBuf)> = Vec::new();
    for object in &session.objects {
        let mut row = Vec::new();
        for column in &columns {
            row.extend(field_cells(column, object));
        }

        let mut file_cells = Vec::new();
        for file in &object.files {
            file_cells.push(format!("{}/{}", CONTENT_DIR, file.name));
            file_cells.push(FILE_OFFSET.to_string());
            if !report.failed.contains(&file.path) {
                jobs.push((file.path.clone(), content_dir.join(&file.name)));
            }
        }
        row.extend(pad_row(file_cells, file_count * 2));
        rows.push(row);
    }

    let transfer = Transfer::new(&byte_progress, progress, bar);
    let outcomes = join_all(jobs.iter().map(|(src, dest)| {
        let transfer = &transfer;
        async move { (src.clone(), transfer.copy(src, dest).await) }
    }))
    .await;
    for (source, outcome) in outcomes {
        match outcome {
            Ok(()) => report.files_copied += 1,
            Err(error) => {
                tracing::error!(path = %source.display(), %error, "copy failed; file skipped");
                report.failed.push(source);
            }
        }
    }

    write_csv_manifest(&location.join(MANIFEST_NAME), &rows)?;
    Ok(report)
}

/// Interleaved header: each column label repeated to its width, typed
/// columns paired with a `<label> Type` column, file columns paired with
/// `Offset`
fn build_header(columns: &[ColumnSpec], file_count: usize) -> Vec<String> {
    let mut header = Vec::new();
    for column in columns {
        for _ in 0..column.count {
            header.push(column.label.clone());
            if is_typed(column) {
                header.push(format!("{} Type", column.label));
            }
        }
    }
    for _ in 0..file_count {
        header.push("File".to_string());
        header.push("Offset".to_string());
    }
    header
}

/// The fixed-width cells for one column of one object's row
fn field_cells(column: &ColumnSpec, object: &DigitalObject) -> Vec<String> {
    let values = match object.get_field(&column.name) {
        Some(field) => field
            .values
            .clone()
            .unwrap_or_else(|| vec![field.value.clone()]),
        None => Vec::new(),
    };

    if !is_typed(column) {
        return pad_row(values, column.count);
    }

    let mut cells = Vec::new();
    for value in &values {
        let value_type = if value.is_empty() {
            String::new()
        } else if column.name == IDENTIFIER_FIELD {
            if object.minted_id.as_deref() == Some(value.as_str()) {
                MINTED_TYPE.to_string()
            } else {
                OTHER_TYPE.to_string()
            }
        } else {
            column.value_type.clone().unwrap_or_default()
        };
        cells.push(value.clone());
        cells.push(value_type);
    }
    pad_row(cells, column.count * 2)
}

/// Identifier columns are always typed: the marker is chosen per value
fn is_typed(column: &ColumnSpec) -> bool {
    column.value_type.is_some() || column.name == IDENTIFIER_FIELD
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::model::{CrosswalkEntry, Field, MapField, Obligation};

    fn identifier_map() -> Arc<MapField> {
        let mut crosswalk = HashMap::new();
        crosswalk.insert(
            TARGET.to_string(),
            CrosswalkEntry {
                label: "Other Identifier".to_string(),
                value_type: None,
            },
        );
        Arc::new(MapField {
            label: "Identifier".to_string(),
            namespace: "dcterms".to_string(),
            name: "identifier".to_string(),
            uri: String::new(),
            obligation: Obligation::None,
            repeatable: true,
            visible: true,
            editable: true,
            range: Vec::new(),
            crosswalk,
        })
    }

    fn object(minted: Option<&str>, value: &str) -> DigitalObject {
        DigitalObject {
            uuid: "u-1".to_string(),
            id: 1,
            title: String::new(),
            metadata: vec![Field::new(IDENTIFIER_FIELD, value, Some(identifier_map()))],
            files: Vec::new(),
            production_notes: String::new(),
            minted_id: minted.map(str::to_string),
            metadata_hash: String::new(),
            record: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_identifier_values_are_typed_per_value() {
        let object = object(Some("ark:/12345/x7"), "ark:/12345/x7; local-42");
        let column = ColumnSpec {
            name: IDENTIFIER_FIELD.to_string(),
            label: "Other Identifier".to_string(),
            count: 2,
            value_type: None,
        };

        let cells = field_cells(&column, &object);
        assert_eq!(
            cells,
            vec!["ark:/12345/x7", "digital object", "local-42", "other"]
        );
    }

    #[test]
    fn test_empty_values_get_empty_type_cells() {
        let object = object(None, "");
        let column = ColumnSpec {
            name: IDENTIFIER_FIELD.to_string(),
            label: "Other Identifier".to_string(),
            count: 2,
            value_type: None,
        };

        let cells = field_cells(&column, &object);
        assert_eq!(cells, vec!["", "", "", ""]);
    }

    #[test]
    fn test_header_pairs_typed_and_file_columns() {
        let columns = vec![
            ColumnSpec {
                name: "dcterms.title".to_string(),
                label: "Title".to_string(),
                count: 1,
                value_type: None,
            },
            ColumnSpec {
                name: "dcterms.creator".to_string(),
                label: "Creator".to_string(),
                count: 2,
                value_type: Some("person".to_string()),
            },
        ];

        let header = build_header(&columns, 2);
        assert_eq!(
            header,
            vec![
                "Title",
                "Creator",
                "Creator Type",
                "Creator",
                "Creator Type",
                "File",
                "Offset",
                "File",
                "Offset",
            ]
        );
    }
}
