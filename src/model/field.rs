//! A single metadata field on an object or file

use std::sync::Arc;

use serde::Serialize;

use crate::model::map_field::MapField;

/// Separator between repeatable sub-values in the joined representation
const VALUE_SEPARATOR: &str = "; ";

/// A metadata field holding the archivist-entered value for one schema entry.
///
/// `value` and `values` are kept consistent: [`Field::set_value`] re-derives
/// the sub-value list, and [`Field::join_values`] folds edits to the list
/// back into `value`. Fields without a schema mapping are never validated
/// and always report valid.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    /// Namespace-qualified field name
    pub name: String,

    /// Schema entry backing this field, if any
    #[serde(skip)]
    pub map: Option<Arc<MapField>>,

    /// Joined value as entered
    pub value: String,

    /// Trimmed `;`-separated sub-values; populated only for repeatable fields
    pub values: Option<Vec<String>>,

    /// Result of the most recent validation pass
    pub valid: bool,

    /// Human-readable problems from the most recent validation pass
    pub validation_errors: Vec<String>,
}

impl Field {
    /// Create a field for a schema entry with an initial value
    pub fn new(name: impl Into<String>, value: impl Into<String>, map: Option<Arc<MapField>>) -> Self {
        let mut field = Self {
            name: name.into(),
            map,
            value: value.into(),
            values: None,
            valid: true,
            validation_errors: Vec::new(),
        };
        field.values = field.split_values();
        field
    }

    /// Whether the backing schema entry marks this field repeatable
    pub fn is_repeatable(&self) -> bool {
        self.map.as_ref().map(|m| m.repeatable).unwrap_or(false)
    }

    /// Replace the value and re-derive the sub-value list
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.values = self.split_values();
    }

    /// Fold the sub-value list back into the joined value.
    ///
    /// No-op for non-repeatable fields.
    pub fn join_values(&mut self) {
        if let Some(values) = &self.values {
            self.value = values.join(VALUE_SEPARATOR);
        }
    }

    /// The joined value without mutating the field
    pub fn joined_value(&self) -> String {
        match &self.values {
            Some(values) => values.join(VALUE_SEPARATOR),
            None => self.value.clone(),
        }
    }

    /// The individual sub-values to validate: the trimmed `;`-segments for
    /// repeatable fields, the whole value otherwise.
    pub fn candidate_values(&self) -> Vec<String> {
        self.value.split(';').map(|v| v.trim().to_string()).collect()
    }

    fn split_values(&self) -> Option<Vec<String>> {
        if !self.is_repeatable() {
            return None;
        }
        Some(self.value.split(';').map(|v| v.trim().to_string()).collect())
    }
}
