//! Controlled-vocabulary parsing and range lookup
//!
//! Parses the constrained triple format vocabulary sources are published in
//! (subject, optional `prefLabel`, zero or more `narrower` relations per
//! statement) into a forest keyed by top-level range name. This is not a
//! general RDF engine: the grammar is fixed and anything outside it is a
//! parse error.

pub mod index;
pub mod parser;

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

pub use index::{VocabNode, VocabularyIndex};

/// Vocabulary sources can take minutes to serve; match the generous
/// timeout the editor has always used.
const FETCH_TIMEOUT: Duration = Duration::from_secs(600);

/// Errors raised while loading a vocabulary
#[derive(Debug, Error, Diagnostic)]
pub enum VocabError {
    /// Malformed statement in the source text
    #[error("vocabulary parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The source contained no statements at all; a malformed blob, not an
    /// empty vocabulary (no vocabulary configured is represented by `None`)
    #[error("no vocabulary statements found in source")]
    Empty,

    /// Transport failure fetching the source
    #[error("vocabulary fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// Fetch and parse a vocabulary source.
///
/// An empty URL is the valid "no vocabulary constraints" state and yields
/// `Ok(None)`.
pub async fn fetch(url: &str) -> Result<Option<VocabularyIndex>, VocabError> {
    if url.is_empty() {
        return Ok(None);
    }

    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
    let text = client.get(url).send().await?.error_for_status()?.text().await?;

    tracing::debug!(url = %url, bytes = text.len(), "fetched vocabulary source");
    Ok(Some(VocabularyIndex::parse(&text)?))
}
