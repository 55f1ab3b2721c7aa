//! Range-keyed lookup over a parsed vocabulary

use std::collections::{HashMap, HashSet};

use crate::vocab::parser::{parse_statements, Statement};
use crate::vocab::VocabError;

/// One vocabulary concept: an identifier, its preferred label, and the
/// identifiers of its narrower children.
#[derive(Debug, Clone)]
pub struct VocabNode {
    pub identifier: String,
    pub pref_label: Option<String>,
    pub narrower: Vec<String>,
}

impl VocabNode {
    /// The label shown for this node; falls back to the identifier for the
    /// rare concept published without a `prefLabel`.
    pub fn label(&self) -> &str {
        self.pref_label.as_deref().unwrap_or(&self.identifier)
    }
}

/// Parsed vocabulary forest, keyed by lowercased identifier.
///
/// Built once when a vocabulary source loads and read-only afterwards.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    nodes: HashMap<String, VocabNode>,
}

impl VocabularyIndex {
    /// Parse vocabulary source text into an index.
    ///
    /// Statements may reference children declared later in the source;
    /// narrower links are stored by identifier and resolved at lookup time,
    /// so forward references cost nothing.
    pub fn parse(source: &str) -> Result<Self, VocabError> {
        let statements = parse_statements(source)?;
        Ok(Self::from_statements(statements))
    }

    fn from_statements(statements: Vec<Statement>) -> Self {
        let mut nodes = HashMap::new();
        for statement in statements {
            let key = statement.subject.to_lowercase();
            let node = VocabNode {
                identifier: statement.subject,
                pref_label: statement.pref_label,
                narrower: statement
                    .narrower
                    .into_iter()
                    .map(|id| id.to_lowercase())
                    .collect(),
            };
            nodes.insert(key, node);
        }
        Self { nodes }
    }

    /// Look up a node by identifier, case-insensitively
    pub fn get(&self, identifier: &str) -> Option<&VocabNode> {
        self.nodes.get(&identifier.to_lowercase())
    }

    /// Number of concepts in the index
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index holds no concepts
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every leaf preferred-label reachable under a top-level range.
    ///
    /// `None` when the range is unknown. A range node with no narrower
    /// children yields its own label as the sole result. Each node is
    /// visited exactly once, so shared subtrees introduce no duplicates and
    /// unexpected cycles cannot hang the traversal.
    pub fn get_pref_labels_by_range(&self, range_label: &str) -> Option<Vec<String>> {
        let node = self.get(range_label)?;
        let mut labels = Vec::new();
        let mut visited = HashSet::new();
        self.collect_leaf_labels(node, &mut visited, &mut labels);
        Some(labels)
    }

    fn collect_leaf_labels<'a>(
        &'a self,
        node: &'a VocabNode,
        visited: &mut HashSet<&'a str>,
        labels: &mut Vec<String>,
    ) {
        if !visited.insert(node.identifier.as_str()) {
            return;
        }
        if node.narrower.is_empty() {
            labels.push(node.label().to_string());
            return;
        }
        for child_id in &node.narrower {
            if let Some(child) = self.nodes.get(child_id) {
                self.collect_leaf_labels(child, visited, labels);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
        :subjects a skos:Concept ;
            skos:prefLabel "Subjects" ;
            skos:narrower :architecture , :nature .
        :architecture skos:prefLabel "Architecture" ;
            skos:narrower :houses , :bridges .
        :nature skos:prefLabel "Nature" ;
            skos:narrower :bayous .
        :houses skos:prefLabel "Houses" .
        :bridges skos:prefLabel "Bridges" .
        :bayous skos:prefLabel "Bayous" .
        :formats skos:prefLabel "Formats" .
    "#;

    #[test]
    fn test_leaf_node_returns_single_label() {
        let index = VocabularyIndex::parse(SOURCE).unwrap();
        assert_eq!(
            index.get_pref_labels_by_range("formats"),
            Some(vec!["Formats".to_string()])
        );
    }

    #[test]
    fn test_collects_all_leaf_descendants() {
        let index = VocabularyIndex::parse(SOURCE).unwrap();
        let labels = index.get_pref_labels_by_range("subjects").unwrap();
        assert_eq!(labels, vec!["Houses", "Bridges", "Bayous"]);
    }

    #[test]
    fn test_range_lookup_is_case_insensitive() {
        let index = VocabularyIndex::parse(SOURCE).unwrap();
        assert!(index.get_pref_labels_by_range("SUBJECTS").is_some());
        assert!(index.get_pref_labels_by_range("Formats").is_some());
    }

    #[test]
    fn test_unknown_range_is_none() {
        let index = VocabularyIndex::parse(SOURCE).unwrap();
        assert_eq!(index.get_pref_labels_by_range("colors"), None);
    }

    #[test]
    fn test_shared_subtree_yields_no_duplicates() {
        let source = r#"
            :root skos:prefLabel "Root" ;
                skos:narrower :a , :b .
            :a skos:prefLabel "A" ; skos:narrower :shared .
            :b skos:prefLabel "B" ; skos:narrower :shared .
            :shared skos:prefLabel "Shared" .
        "#;
        let index = VocabularyIndex::parse(source).unwrap();
        assert_eq!(index.get_pref_labels_by_range("root").unwrap(), vec!["Shared"]);
    }

    #[test]
    fn test_forward_reference_resolves() {
        let source = r#"
            :root skos:prefLabel "Root" ; skos:narrower :later .
            :later skos:prefLabel "Later" .
        "#;
        let index = VocabularyIndex::parse(source).unwrap();
        assert_eq!(index.get_pref_labels_by_range("root").unwrap(), vec!["Later"]);
    }
}
