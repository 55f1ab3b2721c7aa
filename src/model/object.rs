//! Digital objects - the unit of description, export, and minting

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::model::field::Field;
use crate::model::file::FileEntry;
use crate::model::map_field::Obligation;
use crate::model::TITLE_FIELD;

/// A described object: one metadata field per schema entry, plus the
/// access-copy files exported alongside it.
#[derive(Debug, Clone)]
pub struct DigitalObject {
    /// Stable identity across project reloads
    pub uuid: String,

    /// Sequential position in the project, starting at 1
    pub id: usize,

    /// Display title, `"NNN: <dcterms.title>"`
    pub title: String,

    /// One field per schema entry, in schema order
    pub metadata: Vec<Field>,

    /// Access-copy files only
    pub files: Vec<FileEntry>,

    /// Free-form archivist notes
    pub production_notes: String,

    /// Persistent identifier assigned by the minter, once minted
    pub minted_id: Option<String>,

    /// Change-detection hash over `metadata`, including validity state
    pub metadata_hash: String,

    /// Original project record, preserved so saves keep unknown keys
    pub(crate) record: serde_json::Value,
}

impl DigitalObject {
    /// Look up a metadata field by qualified name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.metadata.iter().find(|field| field.name == name)
    }

    /// Mutable lookup of a metadata field by qualified name
    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.metadata.iter_mut().find(|field| field.name == name)
    }

    /// Joined value of a field, or None when the schema has no such field
    pub fn get_field_value(&self, name: &str) -> Option<String> {
        self.get_field(name).map(|field| field.joined_value())
    }

    /// Set a field's value, re-deriving its repeatable sub-values.
    ///
    /// Unknown names are ignored: the schema fixes the field list.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        if let Some(field) = self.get_field_mut(name) {
            field.set_value(value);
        }
    }

    /// Zero-padded sequential id used in titles and export layouts
    pub fn padded_id(&self) -> String {
        format!("{:03}", self.id)
    }

    /// Rebuild the display title from the padded id and the title field
    pub fn refresh_title(&mut self) {
        let title = self.get_field_value(TITLE_FIELD).unwrap_or_default();
        self.title = format!("{}: {}", self.padded_id(), title);
    }

    /// Completeness: every visible required field filled in and no field
    /// carrying a validation error. Incompleteness blocks nothing, it is
    /// surfaced to the archivist.
    pub fn is_good(&self) -> bool {
        let missing_required = self.metadata.iter().any(|field| match &field.map {
            Some(map) => {
                map.visible && map.obligation >= Obligation::Required && field.value.is_empty()
            }
            None => false,
        });
        let invalid = self.metadata.iter().any(|field| !field.valid);
        !missing_required && !invalid
    }

    /// Recompute the change-detection hash over the metadata fields.
    ///
    /// The hash covers values and validity state, so a validation pass on
    /// unchanged values still refreshes dependent views.
    pub fn refresh_hash(&mut self) {
        self.metadata_hash = metadata_hash(&self.metadata);
    }
}

/// Content hash of a field list, used purely as a change-detection signal
pub fn metadata_hash(metadata: &[Field]) -> String {
    #[derive(Serialize)]
    struct HashedField<'a> {
        name: &'a str,
        value: &'a str,
        values: &'a Option<Vec<String>>,
        valid: bool,
        validation_errors: &'a [String],
    }

    let view: Vec<HashedField<'_>> = metadata
        .iter()
        .map(|field| HashedField {
            name: &field.name,
            value: &field.value,
            values: &field.values,
            valid: field.valid,
            validation_errors: &field.validation_errors,
        })
        .collect();

    let serialized = serde_json::to_vec(&view).unwrap_or_default();
    let digest = Sha256::digest(&serialized);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::map_field::MapField;

    fn map(name: &str, obligation: Obligation, visible: bool) -> Arc<MapField> {
        Arc::new(MapField {
            label: name.to_string(),
            namespace: "dcterms".to_string(),
            name: name.to_string(),
            uri: String::new(),
            obligation,
            repeatable: false,
            visible,
            editable: true,
            range: Vec::new(),
            crosswalk: Default::default(),
        })
    }

    fn object_with(metadata: Vec<Field>) -> DigitalObject {
        DigitalObject {
            uuid: "u-1".to_string(),
            id: 4,
            title: String::new(),
            metadata,
            files: Vec::new(),
            production_notes: String::new(),
            minted_id: None,
            metadata_hash: String::new(),
            record: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_is_good_requires_visible_required_fields() {
        let mut object = object_with(vec![
            Field::new("dcterms.title", "", Some(map("title", Obligation::Required, true))),
            Field::new("dcterms.note", "", Some(map("note", Obligation::Recommended, true))),
        ]);
        assert!(!object.is_good());

        object.set_field("dcterms.title", "A title");
        assert!(object.is_good());
    }

    #[test]
    fn test_is_good_ignores_hidden_required_fields() {
        let object = object_with(vec![Field::new(
            "dcterms.source",
            "",
            Some(map("source", Obligation::Required, false)),
        )]);
        assert!(object.is_good());
    }

    #[test]
    fn test_is_good_fails_on_validation_errors() {
        let mut object = object_with(vec![Field::new("dc.date", "2020", None)]);
        assert!(object.is_good());

        let field = object.get_field_mut("dc.date").unwrap();
        field.valid = false;
        field.validation_errors.push("Invalid Extended Date Time Format (EDTF)".to_string());
        assert!(!object.is_good());
    }

    #[test]
    fn test_hash_tracks_validity_state() {
        let mut object = object_with(vec![Field::new("dc.date", "2020", None)]);
        object.refresh_hash();
        let before = object.metadata_hash.clone();

        object.get_field_mut("dc.date").unwrap().valid = false;
        object.refresh_hash();
        assert_ne!(before, object.metadata_hash);
    }

    #[test]
    fn test_padded_id_and_title() {
        let mut object = object_with(vec![Field::new("dcterms.title", "Bayou Survey", None)]);
        object.refresh_title();
        assert_eq!(object.title, "004: Bayou Survey");
    }
}
