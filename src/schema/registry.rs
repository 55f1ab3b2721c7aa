//! Schema registry - embedded JSON Schemas for document shape validation

use rust_embed::Embed;
use std::collections::HashMap;

use crate::schema::SchemaError;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// The document shapes the toolkit loads from external sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// The field-map JSON listing every schema field
    FieldMap,
    /// A project file
    Project,
}

impl DocumentKind {
    fn filename(&self) -> &'static str {
        match self {
            DocumentKind::FieldMap => "fieldmap.schema.json",
            DocumentKind::Project => "project.schema.json",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DocumentKind::FieldMap => "field map",
            DocumentKind::Project => "project",
        }
    }
}

/// Registry of compiled JSON Schema validators for document shapes
pub struct SchemaRegistry {
    validators: HashMap<DocumentKind, jsonschema::Validator>,
}

impl SchemaRegistry {
    /// Create a registry from the embedded schemas
    pub fn new() -> Self {
        let mut validators = HashMap::new();

        for kind in [DocumentKind::FieldMap, DocumentKind::Project] {
            if let Some(file) = EmbeddedSchemas::get(kind.filename()) {
                if let Ok(schema) = serde_json::from_slice::<serde_json::Value>(&file.data) {
                    if let Ok(validator) = jsonschema::validator_for(&schema) {
                        validators.insert(kind, validator);
                    }
                }
            }
        }

        Self { validators }
    }

    /// Check a document against its shape schema, reporting the first problem
    pub fn validate(
        &self,
        kind: DocumentKind,
        document: &serde_json::Value,
    ) -> Result<(), SchemaError> {
        let Some(validator) = self.validators.get(&kind) else {
            return Ok(());
        };
        if let Some(error) = validator.iter_errors(document).next() {
            return Err(SchemaError::Shape {
                kind: kind.name(),
                message: error.to_string(),
            });
        }
        Ok(())
    }

    /// Check if a validator exists for the given document kind
    pub fn has_schema(&self, kind: DocumentKind) -> bool {
        self.validators.contains_key(&kind)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_schemas_compile() {
        let registry = SchemaRegistry::new();
        assert!(registry.has_schema(DocumentKind::FieldMap));
        assert!(registry.has_schema(DocumentKind::Project));
    }

    #[test]
    fn test_project_shape_is_enforced() {
        let registry = SchemaRegistry::new();

        let good = serde_json::json!({
            "collectionTitle": "Bayou Survey",
            "objects": [{ "uuid": "u-1", "files": [] }]
        });
        assert!(registry.validate(DocumentKind::Project, &good).is_ok());

        let bad = serde_json::json!({ "objects": [{ "files": [] }] });
        assert!(registry.validate(DocumentKind::Project, &bad).is_err());
    }

    #[test]
    fn test_fieldmap_shape_is_enforced() {
        let registry = SchemaRegistry::new();

        let good = serde_json::json!([
            { "label": "Title", "namespace": "dcterms", "name": "title" }
        ]);
        assert!(registry.validate(DocumentKind::FieldMap, &good).is_ok());

        let bad = serde_json::json!([{ "label": "Title" }]);
        assert!(registry.validate(DocumentKind::FieldMap, &bad).is_err());
    }
}
