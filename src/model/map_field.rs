//! Schema field definitions shared by every object in a project

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Completeness requirement level for a schema field.
///
/// Variants are ordered so that comparisons express "at least this
/// obligated": `obligation >= Obligation::Required` selects the fields that
/// count against object completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[derive(Default)]
pub enum Obligation {
    #[default]
    None,
    Recommended,
    StronglyRecommended,
    RequiredWhenAvailable,
    Required,
}

impl std::fmt::Display for Obligation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Obligation::None => write!(f, "none"),
            Obligation::Recommended => write!(f, "recommended"),
            Obligation::StronglyRecommended => write!(f, "stronglyRecommended"),
            Obligation::RequiredWhenAvailable => write!(f, "requiredWhenAvailable"),
            Obligation::Required => write!(f, "required"),
        }
    }
}

impl std::str::FromStr for Obligation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Obligation::None),
            "recommended" => Ok(Obligation::Recommended),
            "stronglyRecommended" => Ok(Obligation::StronglyRecommended),
            "requiredWhenAvailable" => Ok(Obligation::RequiredWhenAvailable),
            "required" => Ok(Obligation::Required),
            _ => Err(format!("Unknown obligation: {}", s)),
        }
    }
}

/// Reference to a controlled-vocabulary range constraining a field's values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeRef {
    /// Range label, matched case-insensitively against vocabulary roots
    pub label: String,

    /// Vocabulary URI; ranges without one do not constrain anything
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Per-export-target column descriptor for a schema field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrosswalkEntry {
    /// Column label in the target manifest
    pub label: String,

    /// Typed-value marker; typed columns emit a paired "<label> Type" column
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

/// A schema field definition.
///
/// Loaded once per project from the field map and shared by reference
/// (`Arc<MapField>`) across every [`Field`](crate::model::Field) that
/// represents it. Immutable for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapField {
    /// Display label
    pub label: String,

    /// Namespace prefix (e.g. "dcterms")
    pub namespace: String,

    /// Local name within the namespace
    pub name: String,

    /// Term URI
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,

    /// Completeness requirement level
    #[serde(default)]
    pub obligation: Obligation,

    /// Whether the field accepts multiple `;`-separated values
    #[serde(default)]
    pub repeatable: bool,

    /// Whether the field is shown to the archivist and exported
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Whether the field accepts edits
    #[serde(default = "default_true")]
    pub editable: bool,

    /// Vocabulary ranges constraining this field's values (possibly empty)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub range: Vec<RangeRef>,

    /// Export-target name to column descriptor
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub crosswalk: HashMap<String, CrosswalkEntry>,
}

fn default_true() -> bool {
    true
}

impl MapField {
    /// Namespace-qualified name, e.g. "dcterms.title"
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Look up this field's column descriptor for an export target
    pub fn crosswalk_for(&self, target: &str) -> Option<&CrosswalkEntry> {
        self.crosswalk.get(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obligation_ordering() {
        assert!(Obligation::Required > Obligation::RequiredWhenAvailable);
        assert!(Obligation::RequiredWhenAvailable > Obligation::StronglyRecommended);
        assert!(Obligation::StronglyRecommended > Obligation::Recommended);
        assert!(Obligation::Recommended > Obligation::None);
    }

    #[test]
    fn test_obligation_serialization() {
        assert_eq!(
            serde_json::to_string(&Obligation::RequiredWhenAvailable).unwrap(),
            "\"requiredWhenAvailable\""
        );
        assert_eq!(
            serde_json::from_str::<Obligation>("\"stronglyRecommended\"").unwrap(),
            Obligation::StronglyRecommended
        );
    }

    #[test]
    fn test_obligation_from_str() {
        assert_eq!("required".parse::<Obligation>().unwrap(), Obligation::Required);
        assert!("mandatory".parse::<Obligation>().is_err());
    }

    #[test]
    fn test_map_field_deserializes_with_defaults() {
        let json = r#"{
            "label": "Title",
            "namespace": "dcterms",
            "name": "title",
            "obligation": "required",
            "repeatable": false
        }"#;
        let field: MapField = serde_json::from_str(json).unwrap();
        assert_eq!(field.full_name(), "dcterms.title");
        assert_eq!(field.obligation, Obligation::Required);
        assert!(field.visible);
        assert!(field.editable);
        assert!(field.range.is_empty());
        assert!(field.crosswalk.is_empty());
    }

    #[test]
    fn test_crosswalk_entry_type_marker() {
        let json = r#"{
            "label": "Creator",
            "namespace": "dcterms",
            "name": "creator",
            "crosswalk": {
                "streaming": { "label": "Contributor", "type": "person" }
            }
        }"#;
        let field: MapField = serde_json::from_str(json).unwrap();
        let entry = field.crosswalk_for("streaming").unwrap();
        assert_eq!(entry.label, "Contributor");
        assert_eq!(entry.value_type.as_deref(), Some("person"));
        assert!(field.crosswalk_for("archive").is_none());
    }
}
