//! Metadata schema loading
//!
//! The field map is a JSON list of field definitions fetched once per
//! project. Its shape is checked against an embedded JSON Schema before
//! deserialization so malformed sources fail with a pointed message.

pub mod registry;

use std::path::Path;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::model::MapField;

pub use registry::{DocumentKind, SchemaRegistry};

/// Errors loading the metadata schema
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("could not read field map: {0}")]
    Io(#[from] std::io::Error),

    #[error("field map fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("malformed field map: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("document does not match the {kind} schema: {message}")]
    Shape { kind: &'static str, message: String },
}

/// The ordered field definitions for a project.
///
/// Loaded once at project open; immutable during a session. Each entry is
/// shared as `Arc<MapField>` with every field instantiated from it.
#[derive(Debug, Clone, Default)]
pub struct MetadataSchema {
    fields: Vec<Arc<MapField>>,
}

impl MetadataSchema {
    /// A schema with no fields, for sessions before a field map loads
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a schema from already-parsed field definitions
    pub fn from_fields(fields: Vec<MapField>) -> Self {
        Self {
            fields: fields.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse the field-map JSON, checking its shape first
    pub fn from_json(content: &str) -> Result<Self, SchemaError> {
        let document: serde_json::Value = serde_json::from_str(content)?;
        SchemaRegistry::new().validate(DocumentKind::FieldMap, &document)?;
        let fields: Vec<MapField> = serde_json::from_value(document)?;
        Ok(Self::from_fields(fields))
    }

    /// Load the field map from a local file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Fetch the field map from a URL
    pub async fn fetch(url: &str) -> Result<Self, SchemaError> {
        let content = reqwest::get(url).await?.error_for_status()?.text().await?;
        tracing::debug!(url = %url, bytes = content.len(), "fetched field map");
        Self::from_json(&content)
    }

    /// The field definitions in schema order
    pub fn fields(&self) -> &[Arc<MapField>] {
        &self.fields
    }

    /// Look up a field definition by namespace-qualified name
    pub fn get(&self, full_name: &str) -> Option<&Arc<MapField>> {
        self.fields.iter().find(|field| field.full_name() == full_name)
    }

    /// Number of field definitions
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema holds no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
