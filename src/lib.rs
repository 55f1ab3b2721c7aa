//! Quire: metadata curation and export core for digital-library collections
//!
//! Loads a project describing a hierarchy of objects and access-copy files,
//! validates controlled metadata against a schema and vocabulary, mints
//! persistent identifiers, and exports the batch into downstream ingest
//! packages with generated manifests.

pub mod core;
pub mod edtf;
pub mod export;
pub mod mint;
pub mod model;
pub mod project;
pub mod schema;
pub mod validate;
pub mod vocab;
