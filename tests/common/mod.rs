//! Shared test helpers for integration tests
//!
//! Builds a representative field map and on-disk project fixtures.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use quire::core::session::ProjectSession;
use quire::project;
use quire::schema::MetadataSchema;

/// A field map close to the one production projects load: a required
/// title, repeatable subject/creator/identifier fields, and streaming
/// crosswalk entries for the manifest-driven exports.
pub const FIELD_MAP: &str = r#"[
    {
        "label": "Title",
        "namespace": "dcterms",
        "name": "title",
        "obligation": "required",
        "repeatable": false,
        "crosswalk": { "streaming": { "label": "Title" } }
    },
    {
        "label": "Creator",
        "namespace": "dcterms",
        "name": "creator",
        "obligation": "recommended",
        "repeatable": true,
        "crosswalk": { "streaming": { "label": "Creator", "type": "person" } }
    },
    {
        "label": "Date",
        "namespace": "dc",
        "name": "date",
        "obligation": "recommended",
        "repeatable": true,
        "crosswalk": { "streaming": { "label": "Date Issued" } }
    },
    {
        "label": "Subject",
        "namespace": "dc",
        "name": "subject",
        "obligation": "none",
        "repeatable": true,
        "crosswalk": { "streaming": { "label": "Topical Subject" } }
    },
    {
        "label": "Identifier",
        "namespace": "dcterms",
        "name": "identifier",
        "obligation": "none",
        "repeatable": true,
        "crosswalk": { "streaming": { "label": "Other Identifier" } }
    },
    {
        "label": "Rights",
        "namespace": "dc",
        "name": "rights",
        "obligation": "stronglyRecommended",
        "repeatable": false
    },
    {
        "label": "Type",
        "namespace": "dcterms",
        "name": "type",
        "obligation": "none",
        "repeatable": false
    }
]"#;

pub fn schema() -> MetadataSchema {
    MetadataSchema::from_json(FIELD_MAP).unwrap()
}

/// Write an access-copy file of the given size under `dir`
pub fn write_access_file(dir: &Path, name: &str, size: usize) -> PathBuf {
    let access = dir.join("access");
    std::fs::create_dir_all(&access).unwrap();
    let path = access.join(name);
    std::fs::write(&path, vec![b'q'; size]).unwrap();
    path
}

/// Write a project file referencing the given objects
pub fn write_project(dir: &Path, objects: serde_json::Value) -> PathBuf {
    let document = serde_json::json!({
        "collectionTitle": "Test Collection",
        "objects": objects
    });
    let path = dir.join("project.carp");
    std::fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
    path
}

/// Write a project file and load a session from it with the shared schema
pub fn load_project(dir: &Path, objects: serde_json::Value) -> ProjectSession {
    project::load(write_project(dir, objects), schema(), None).unwrap()
}

/// An object record pointing at already-written access files
pub fn object_record(
    uuid: &str,
    title: &str,
    metadata: &[(&str, &str)],
    files: &[&str],
) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert(
        "dcterms.title".to_string(),
        serde_json::Value::String(title.to_string()),
    );
    for (name, value) in metadata {
        map.insert(
            name.to_string(),
            serde_json::Value::String(value.to_string()),
        );
    }

    let files: Vec<serde_json::Value> = files
        .iter()
        .map(|name| {
            serde_json::json!({ "path": format!("access/{}", name), "purpose": "access-copy" })
        })
        .collect();

    serde_json::json!({
        "uuid": uuid,
        "metadata": map,
        "files": files
    })
}

/// Read a comma-separated manifest into rows
pub fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect()
}

/// Read a tab-separated manifest into rows
pub fn read_tsv(path: &Path) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}
