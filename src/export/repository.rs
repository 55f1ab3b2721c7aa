//! Repository package export
//!
//! Flat layout: every access copy and OCR sidecar lands in the target
//! directory next to a comma-separated manifest named after it. Each object
//! contributes one typed metadata row followed by `File` and `OCR` rows for
//! its transfers. Identifiers are minted before anything moves.

use std::path::{Path, PathBuf};

use futures::future::join_all;

use crate::core::config::MinterConfig;
use crate::core::progress::{ProgressId, ProgressRegistry, TransferProgress};
use crate::core::session::ProjectSession;
use crate::export::{lay_out, write_csv_manifest, ExportError, ExportReport, Transfer};
use crate::mint;
use crate::project;

const TYPE_FIELD: &str = "dcterms.type";
const RIGHTS_FIELD: &str = "dc.rights";
const DEFAULT_TYPE: &str = "Generic";

/// Export the session as a repository package at `location`.
///
/// Mints identifiers and saves the project first, then copies files and
/// writes `<location-name>.csv`. Per-file copy failures are recorded on the
/// report; only layout and manifest failures abort the run.
pub async fn export(
    session: &mut ProjectSession,
    location: &Path,
    minter: Option<&MinterConfig>,
    progress: &ProgressRegistry,
) -> Result<ExportReport, ExportError> {
    mint::mint_identifiers(session, minter, progress).await?;
    if session.project_path.is_some() {
        project::save(session)?;
    }

    let bar = progress.register("Exporting repository package");
    let result = run(session, location, progress, &bar).await;
    progress.clear(&bar);

    match &result {
        Ok(report) => tracing::info!(
            copied = report.files_copied,
            failed = report.failed.len(),
            "done exporting repository package"
        ),
        Err(error) => tracing::error!(%error, "repository export failed"),
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
    let mut jobs: Vec<(PathBuf, PathBuf)> = Vec::new();

    // Fix the progress denominator before any copy begins
    for object in &session.objects {
        for file in &object.files {
            let mut sources = vec![file.path.clone()];
            if file.has_ocr() {
                sources.push(file.ocr_path());
            }
            for source in sources {
                match std::fs::metadata(&source) {
                    Ok(meta) => byte_progress.add_source(&source, meta.len()),
                    Err(error) => {
                        tracing::error!(path = %source.display(), %error, "cannot stat source file");
                        report.failed.push(source);
                    }
                }
            }
        }
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut header = vec!["Object Type".to_string(), "Filename".to_string()];
    header.extend(session.schema.fields().iter().map(|field| field.label.clone()));
    header.push("doUuid".to_string());
    rows.push(header);

    for object in &session.objects {
        let object_type = object
            .get_field_value(TYPE_FIELD)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_TYPE.to_string());

        let mut row = vec![object_type, String::new()];
        row.extend(object.metadata.iter().map(|field| {
            if field.name == RIGHTS_FIELD {
                rights_to_uri(&field.joined_value())
            } else {
                field.joined_value()
            }
        }));
        row.push(object.uuid.clone());
        rows.push(row);

        for file in &object.files {
            // Rows always reflect the attempted files; unreadable sources
            // just never become copy jobs
            rows.push(vec!["File".to_string(), file.name.clone()]);
            if !report.failed.contains(&file.path) {
                jobs.push((file.path.clone(), location.join(&file.name)));
            }

            if file.has_ocr() {
                rows.push(vec!["OCR".to_string(), file.ocr_filename()]);
                if !report.failed.contains(&file.ocr_path()) {
                    jobs.push((file.ocr_path(), location.join(file.ocr_filename())));
                }
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

    let manifest_name = location
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manifest".to_string());
    write_csv_manifest(&location.join(format!("{}.csv", manifest_name)), &rows)?;

    Ok(report)
}

/// Canonical URI for a rights statement label; unknown statements map to
/// an empty cell
fn rights_to_uri(value: &str) -> String {
    match value {
        "In Copyright" => "http://rightsstatements.org/vocab/InC/1.0/",
        "In Copyright - Copyright Owner Unlocatable or Unidentifiable" => {
            "http://rightsstatements.org/vocab/InC-RUU/1.0/"
        }
        "In Copyright - Educational Use Permitted" => {
            "http://rightsstatements.org/vocab/InC-EDU/1.0/"
        }
        "No Copyright - United States" => "http://rightsstatements.org/vocab/NoC-US/1.0/",
        "Public Domain" => "https://creativecommons.org/publicdomain/mark/1.0/",
        "Rights Undetermined" => "http://rightsstatements.org/vocab/UND/1.0/",
        _ => "",
    }
    .to_string()
}
