//! Project file loading, saving, and refresh merging
//!
//! The project document is JSON: a collection title plus one record per
//! object (uuid, metadata map keyed by qualified field name, file list with
//! purpose tags, production notes). The original records are preserved
//! verbatim inside each object so saving keeps keys the toolkit does not
//! model.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use crate::core::session::ProjectSession;
use crate::model::{DigitalObject, Field, FileEntry};
use crate::schema::{DocumentKind, MetadataSchema, SchemaError, SchemaRegistry};
use crate::vocab::VocabularyIndex;

/// Purpose tag marking the derivative files exports operate on
pub const ACCESS_COPY: &str = "access-copy";

/// Record key the minted identifier is persisted under
const MINTED_KEY: &str = "do_ark";

/// Errors loading or saving a project file
#[derive(Debug, Error, Diagnostic)]
pub enum ProjectError {
    #[error("could not read project file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed project file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Shape(#[from] SchemaError),

    #[error("project has no file path to save to")]
    NoPath,
}

/// Load a project file into a new session.
///
/// The document shape is checked against the embedded project schema, so a
/// malformed file fails the load without touching any other state.
pub fn load(
    path: impl Into<PathBuf>,
    schema: MetadataSchema,
    vocabulary: Option<VocabularyIndex>,
) -> Result<ProjectSession, ProjectError> {
    let path = path.into();
    let content = std::fs::read_to_string(&path)?;
    let document: Value = serde_json::from_str(&content)?;
    SchemaRegistry::new().validate(DocumentKind::Project, &document)?;

    let mut session = ProjectSession::new(schema, vocabulary);
    session.collection_title = document
        .get("collectionTitle")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let base_path = path.parent().map(Path::to_path_buf).unwrap_or_default();
    if let Some(records) = document.get("objects").and_then(Value::as_array) {
        for (index, record) in records.iter().enumerate() {
            session
                .objects
                .push(build_object(record.clone(), index + 1, &session.schema, &base_path));
        }
    }

    session.project_path = Some(path);
    session.document = document;

    tracing::info!(objects = session.objects.len(), "project loaded");
    Ok(session)
}

/// Write the session back to its project file.
///
/// Repeatable values are rejoined first; each record's metadata map,
/// production notes, and minted identifier are refreshed while every other
/// record key is preserved as loaded.
pub fn save(session: &mut ProjectSession) -> Result<(), ProjectError> {
    let path = session.project_path.clone().ok_or(ProjectError::NoPath)?;

    let mut records = Vec::with_capacity(session.objects.len());
    for object in &mut session.objects {
        let mut metadata = serde_json::Map::new();
        for field in &mut object.metadata {
            field.join_values();
            metadata.insert(field.name.clone(), Value::String(field.value.clone()));
        }

        let mut record = object.record.clone();
        if !record.is_object() {
            record = Value::Object(serde_json::Map::new());
        }
        let entry = record.as_object_mut().expect("record is an object");
        entry.insert("uuid".to_string(), Value::String(object.uuid.clone()));
        entry.insert("metadata".to_string(), Value::Object(metadata));
        entry.insert(
            "productionNotes".to_string(),
            Value::String(object.production_notes.clone()),
        );
        match &object.minted_id {
            Some(id) => {
                entry.insert(MINTED_KEY.to_string(), Value::String(id.clone()));
            }
            None => {
                entry.remove(MINTED_KEY);
            }
        }
        object.record = record.clone();
        records.push(record);
    }

    if !session.document.is_object() {
        session.document = Value::Object(serde_json::Map::new());
    }
    let document = session.document.as_object_mut().expect("document is an object");
    document.insert(
        "collectionTitle".to_string(),
        Value::String(session.collection_title.clone()),
    );
    document.insert("objects".to_string(), Value::Array(records));

    let content = serde_json::to_string_pretty(&session.document)?;
    std::fs::write(&path, content)?;

    tracing::info!(path = %path.display(), "project saved");
    Ok(())
}

/// Merge a refreshed project document into the loaded session.
///
/// Records matched by uuid update their objects in place, unmatched
/// incoming records become new objects, and objects absent from the
/// incoming document are removed. The batch is then re-sorted and
/// re-indexed by its position in the incoming document.
pub fn merge(session: &mut ProjectSession, document: Value) -> Result<(), ProjectError> {
    SchemaRegistry::new().validate(DocumentKind::Project, &document)?;

    let base_path = session
        .project_path
        .as_ref()
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let incoming: Vec<Value> = document
        .get("objects")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    // Drop objects no longer present
    let keep: Vec<String> = incoming
        .iter()
        .filter_map(|record| record.get("uuid").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    session.objects.retain(|object| keep.contains(&object.uuid));

    for (index, record) in incoming.iter().enumerate() {
        let id = index + 1;
        let uuid = record.get("uuid").and_then(Value::as_str).unwrap_or_default();
        match session.objects.iter_mut().find(|object| object.uuid == uuid) {
            Some(object) => {
                object.id = id;
                update_object(object, record, &base_path);
            }
            None => {
                session
                    .objects
                    .push(build_object(record.clone(), id, &session.schema, &base_path));
            }
        }
    }

    session.collection_title = document
        .get("collectionTitle")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    session.document = document;
    session.reindex();
    Ok(())
}

fn build_object(
    record: Value,
    id: usize,
    schema: &MetadataSchema,
    base_path: &Path,
) -> DigitalObject {
    let mut object = DigitalObject {
        uuid: record
            .get("uuid")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        id,
        title: String::new(),
        metadata: build_metadata(&record, schema),
        files: build_files(&record, base_path),
        production_notes: record
            .get("productionNotes")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        minted_id: record
            .get(MINTED_KEY)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        metadata_hash: String::new(),
        record,
    };
    object.refresh_title();
    object.refresh_hash();
    object
}

fn update_object(object: &mut DigitalObject, record: &Value, base_path: &Path) {
    let metadata_map = record.get("metadata").and_then(Value::as_object);
    for field in &mut object.metadata {
        let value = metadata_map
            .and_then(|map| map.get(&field.name))
            .and_then(Value::as_str)
            .unwrap_or_default();
        field.set_value(value);
    }
    object.files = build_files(record, base_path);
    object.production_notes = record
        .get("productionNotes")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if let Some(id) = record
        .get(MINTED_KEY)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
    {
        object.minted_id = Some(id.to_string());
    }
    object.record = record.clone();
    object.refresh_title();
    object.refresh_hash();
}

/// One field per schema entry, in schema order, values from the record's
/// metadata map
fn build_metadata(record: &Value, schema: &MetadataSchema) -> Vec<Field> {
    let metadata_map = record.get("metadata").and_then(Value::as_object);
    schema
        .fields()
        .iter()
        .map(|map_field| {
            let full_name = map_field.full_name();
            let value = metadata_map
                .and_then(|map| map.get(&full_name))
                .and_then(Value::as_str)
                .unwrap_or_default();
            Field::new(full_name, value, Some(map_field.clone()))
        })
        .collect()
}

/// Access-copy files only, paths resolved against the project directory
fn build_files(record: &Value, base_path: &Path) -> Vec<FileEntry> {
    record
        .get("files")
        .and_then(Value::as_array)
        .map(|files| {
            files
                .iter()
                .filter(|file| {
                    file.get("purpose").and_then(Value::as_str) == Some(ACCESS_COPY)
                })
                .filter_map(|file| file.get("path").and_then(Value::as_str))
                .map(|path| FileEntry::new(base_path.join(path)))
                .collect()
        })
        .unwrap_or_default()
}
