//! Plain metadata export - the whole batch as one CSV, no file transfer

use std::path::Path;

use crate::core::session::ProjectSession;
use crate::export::{visible_labels, write_csv_manifest, ExportError};

/// Write the batch's visible metadata to a CSV file at `path`.
///
/// One row per object, led by the zero-padded object id.
pub fn export(session: &ProjectSession, path: &Path) -> Result<(), ExportError> {
    let mut header = vec!["ID".to_string()];
    header.extend(visible_labels(session));

    let mut rows = vec![header];
    for object in &session.objects {
        let mut row = vec![object.padded_id()];
        row.extend(
            object
                .metadata
                .iter()
                .filter(|field| field.map.as_ref().map(|m| m.visible).unwrap_or(false))
                .map(|field| field.joined_value()),
        );
        rows.push(row);
    }

    write_csv_manifest(path, &rows)?;
    tracing::info!(path = %path.display(), objects = session.objects.len(), "done exporting metadata");
    Ok(())
}
