//! Field validation against the EDTF grammar and controlled vocabularies
//!
//! Validation never blocks editing or saving: problems are recorded on the
//! field and aggregated into object completeness, nothing more.

use crate::core::session::ProjectSession;
use crate::edtf;
use crate::model::{Field, MapField, DATE_FIELD};
use crate::vocab::VocabularyIndex;

/// Error recorded when a date field fails to parse
pub const EDTF_ERROR: &str = "Invalid Extended Date Time Format (EDTF)";

/// Validate one candidate value against a field's rules.
///
/// Clears the field's previous errors, records any new problem, and sets
/// and returns the validity flag. Date fields go through the EDTF grammar;
/// everything else is checked for vocabulary membership. An empty candidate
/// is always valid (absence is a completeness concern, not a format error),
/// as is a field with no schema mapping.
pub fn validate(field: &mut Field, candidate: &str, vocabulary: Option<&VocabularyIndex>) -> bool {
    field.validation_errors.clear();
    if let Some(error) = candidate_error(&field.name, field.map.as_deref(), candidate, vocabulary) {
        field.validation_errors.push(error);
    }
    field.valid = field.validation_errors.is_empty();
    field.valid
}

/// Re-validate every repeatable sub-value of every field of every object,
/// then refresh each object's change-detection hash. Idempotent.
pub fn validate_all(session: &mut ProjectSession) {
    let vocabulary = session.vocabulary.as_ref();
    for object in &mut session.objects {
        for field in &mut object.metadata {
            field.validation_errors.clear();
            for value in field.candidate_values() {
                if let Some(error) =
                    candidate_error(&field.name, field.map.as_deref(), &value, vocabulary)
                {
                    field.validation_errors.push(error);
                }
            }
            field.valid = field.validation_errors.is_empty();
        }
        object.refresh_hash();
    }
}

fn candidate_error(
    name: &str,
    map: Option<&MapField>,
    candidate: &str,
    vocabulary: Option<&VocabularyIndex>,
) -> Option<String> {
    if name == DATE_FIELD {
        return edtf_error(candidate);
    }
    vocabulary_error(map, candidate, vocabulary)
}

fn edtf_error(candidate: &str) -> Option<String> {
    if candidate.is_empty() {
        return None;
    }
    match edtf::parse(candidate) {
        Ok(_) => None,
        Err(_) => Some(EDTF_ERROR.to_string()),
    }
}

fn vocabulary_error(
    map: Option<&MapField>,
    candidate: &str,
    vocabulary: Option<&VocabularyIndex>,
) -> Option<String> {
    if candidate.is_empty() {
        return None;
    }
    // Fields without a schema mapping are never validated
    let map = map?;
    if map.range.is_empty() {
        return None;
    }
    let vocabulary = vocabulary?;

    let mut allowed: Vec<String> = Vec::new();
    for range in map.range.iter().filter(|range| range.uri.is_some()) {
        if let Some(labels) = vocabulary.get_pref_labels_by_range(&range.label) {
            allowed.extend(labels);
        }
    }
    if allowed.is_empty() {
        return None;
    }
    if allowed.iter().any(|term| term == candidate) {
        None
    } else {
        Some(format!("Vocabulary term '{}' not found", candidate))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{Obligation, RangeRef};
    use crate::schema::MetadataSchema;

    fn vocabulary() -> VocabularyIndex {
        VocabularyIndex::parse(
            r#"
            :subjects skos:prefLabel "Subjects" ;
                skos:narrower :houses , :bayous .
            :houses skos:prefLabel "Houses" .
            :bayous skos:prefLabel "Bayous" .
            "#,
        )
        .unwrap()
    }

    fn subject_map() -> Arc<MapField> {
        Arc::new(MapField {
            label: "Subject".to_string(),
            namespace: "dc".to_string(),
            name: "subject".to_string(),
            uri: String::new(),
            obligation: Obligation::Recommended,
            repeatable: true,
            visible: true,
            editable: true,
            range: vec![RangeRef {
                label: "Subjects".to_string(),
                uri: Some("https://example.org/subjects".to_string()),
            }],
            crosswalk: Default::default(),
        })
    }

    #[test]
    fn test_empty_date_is_always_valid() {
        let mut field = Field::new(DATE_FIELD, "", None);
        assert!(validate(&mut field, "", None));
        assert!(field.validation_errors.is_empty());
    }

    #[test]
    fn test_bad_date_records_exactly_one_error() {
        let mut field = Field::new(DATE_FIELD, "not-a-date", None);
        assert!(!validate(&mut field, "not-a-date", None));
        assert_eq!(field.validation_errors, vec![EDTF_ERROR.to_string()]);

        // Re-validation clears before recording; errors never accumulate
        assert!(!validate(&mut field, "not-a-date", None));
        assert_eq!(field.validation_errors.len(), 1);
    }

    #[test]
    fn test_good_date_clears_previous_errors() {
        let mut field = Field::new(DATE_FIELD, "not-a-date", None);
        validate(&mut field, "not-a-date", None);
        assert!(validate(&mut field, "2020-05", None));
        assert!(field.validation_errors.is_empty());
        assert!(field.valid);
    }

    #[test]
    fn test_vocabulary_membership() {
        let vocab = vocabulary();
        let mut field = Field::new("dc.subject", "Houses", Some(subject_map()));
        assert!(validate(&mut field, "Houses", Some(&vocab)));

        assert!(!validate(&mut field, "Skyscrapers", Some(&vocab)));
        assert_eq!(
            field.validation_errors,
            vec!["Vocabulary term 'Skyscrapers' not found".to_string()]
        );
    }

    #[test]
    fn test_no_range_or_no_vocabulary_is_valid() {
        let mut unmapped = Field::new("uhlib.note", "anything", None);
        assert!(validate(&mut unmapped, "anything", Some(&vocabulary())));

        let mut mapped = Field::new("dc.subject", "Skyscrapers", Some(subject_map()));
        assert!(validate(&mut mapped, "Skyscrapers", None));
    }

    #[test]
    fn test_validate_all_covers_repeatable_subvalues() {
        let mut session = ProjectSession::new(MetadataSchema::empty(), Some(vocabulary()));
        session.objects.push(crate::model::DigitalObject {
            uuid: "u-1".to_string(),
            id: 1,
            title: String::new(),
            metadata: vec![Field::new("dc.subject", "Houses; Skyscrapers", Some(subject_map()))],
            files: Vec::new(),
            production_notes: String::new(),
            minted_id: None,
            metadata_hash: String::new(),
            record: serde_json::Value::Null,
        });

        validate_all(&mut session);
        let field = session.objects[0].get_field("dc.subject").unwrap();
        assert!(!field.valid);
        assert_eq!(field.validation_errors.len(), 1);
        let hash = session.objects[0].metadata_hash.clone();
        assert!(!hash.is_empty());

        // Idempotent: same flags, same errors, same hash
        validate_all(&mut session);
        let field = session.objects[0].get_field("dc.subject").unwrap();
        assert!(!field.valid);
        assert_eq!(field.validation_errors.len(), 1);
        assert_eq!(session.objects[0].metadata_hash, hash);
    }
}
