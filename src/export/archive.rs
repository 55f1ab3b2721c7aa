//! Archive package export - the tab-separated legacy layout
//!
//! Multi-file objects each get a zero-padded directory and a matching
//! `NNN.txt` manifest; single-file objects share a `Singles` directory and
//! one `Singles.txt`. Date values are humanized in the metadata column
//! with the raw EDTF expression carried in its own column. This target
//! never mints.

use std::path::{Path, PathBuf};

use futures::future::join_all;

use crate::core::progress::{ProgressId, ProgressRegistry, TransferProgress};
use crate::core::session::ProjectSession;
use crate::edtf;
use crate::export::{
    lay_out, pad_row, visible_labels, write_tab_manifest, ExportError, ExportReport, Transfer,
};
use crate::model::{DigitalObject, DATE_FIELD};

const SINGLES_DIR: &str = "Singles";

/// Trailing columns appended after the visible field labels
const EXTRA_COLUMNS: [&str; 4] = ["Date (EDTF)", "Transcript", "File Name", "Object File Name"];

/// Export the session as an archive package at `location`
pub async fn export(
    session: &mut ProjectSession,
    location: &Path,
    progress: &ProgressRegistry,
) -> Result<ExportReport, ExportError> {
    let bar = progress.register("Exporting archive package");
    let result = run(session, location, progress, &bar).await;
    progress.clear(&bar);

    match &result {
        Ok(report) => tracing::info!(
            copied = report.files_copied,
            failed = report.failed.len(),
            "done exporting archive package"
        ),
        Err(error) => tracing::error!(%error, "archive export failed"),
    }
    result
}

async fn run(
    session: &ProjectSession,
    location: &Path,
    progress: &ProgressRegistry,
    bar: &ProgressId,
) -> Result<ExportReport, ExportError> {
    lay_out(location)?;

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

    let mut header = visible_labels(session);
    header.extend(EXTRA_COLUMNS.iter().map(|c| c.to_string()));

    let mut singles: Vec<Vec<String>> = Vec::new();
    let mut jobs: Vec<(PathBuf, PathBuf)> = Vec::new();
    let mut manifests: Vec<(PathBuf, Vec<Vec<String>>)> = Vec::new();

    for object in &session.objects {
        if object.files.len() > 1 {
            let object_dir = location.join(object.padded_id());
            lay_out(&object_dir)?;

            let mut rows = vec![header.clone(), compound_row(session, object, &header)];
            for (index, file) in object.files.iter().enumerate() {
                let mut row = pad_row(vec![format!("File {:03}", index + 1)], header.len());
                let width = row.len();
                row[width - 1] = file.name.clone();
                row[width - 2] = file.name.clone();
                rows.push(row);

                if !report.failed.contains(&file.path) {
                    jobs.push((file.path.clone(), object_dir.join(&file.name)));
                }
            }
            manifests.push((location.join(format!("{}.txt", object.padded_id())), rows));
        } else {
            let Some(file) = object.files.first() else {
                tracing::warn!("'{}' doesn't have any access files", object.title);
                continue;
            };
            if singles.is_empty() {
                singles.push(header.clone());
            }
            singles.push(single_row(session, object, file.name.clone()));

            let singles_dir = location.join(SINGLES_DIR);
            lay_out(&singles_dir)?;
            if !report.failed.contains(&file.path) {
                jobs.push((file.path.clone(), singles_dir.join(&file.name)));
            }
        }
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

    for (path, rows) in &manifests {
        write_tab_manifest(path, rows)?;
    }
    if !singles.is_empty() {
        write_tab_manifest(&location.join(format!("{}.txt", SINGLES_DIR)), &singles)?;
    }

    Ok(report)
}

/// Metadata row for a multi-file object: visible values then the raw date
/// and empty file columns
fn compound_row(
    session: &ProjectSession,
    object: &DigitalObject,
    header: &[String],
) -> Vec<String> {
    let mut row = visible_values(session, object);
    row.push(object.get_field_value(DATE_FIELD).unwrap_or_default());
    pad_row(row, header.len())
}

/// Row for a single-file object: visible values, raw date, and the file
/// name in both file columns
fn single_row(session: &ProjectSession, object: &DigitalObject, file_name: String) -> Vec<String> {
    let mut row = visible_values(session, object);
    row.push(object.get_field_value(DATE_FIELD).unwrap_or_default());
    row.push(String::new());
    row.push(file_name.clone());
    row.push(file_name);
    row
}

/// Visible field values in schema order, with the date field humanized
fn visible_values(session: &ProjectSession, object: &DigitalObject) -> Vec<String> {
    session
        .schema
        .fields()
        .iter()
        .filter(|map_field| map_field.visible)
        .map(|map_field| {
            let full_name = map_field.full_name();
            let value = object.get_field_value(&full_name).unwrap_or_default();
            if full_name == DATE_FIELD {
                humanize_joined(&value)
            } else {
                value
            }
        })
        .collect()
}

/// Humanize each `;`-separated date expression, preserving the joins
fn humanize_joined(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    value
        .split(';')
        .map(|date| edtf::humanize(date.trim()))
        .collect::<Vec<_>>()
        .join("; ")
}
