//! Metadata object model - fields, files, and digital objects

pub mod field;
pub mod file;
pub mod map_field;
pub mod object;

pub use field::Field;
pub use file::FileEntry;
pub use map_field::{CrosswalkEntry, MapField, Obligation, RangeRef};
pub use object::DigitalObject;

/// Qualified name of the date field, the one field validated against the
/// EDTF grammar instead of a vocabulary.
pub const DATE_FIELD: &str = "dc.date";

/// Qualified name of the title field used for display titles and minting.
pub const TITLE_FIELD: &str = "dcterms.title";

/// Qualified name of the identifier field minted identifiers are stored in.
pub const IDENTIFIER_FIELD: &str = "dcterms.identifier";

/// Qualified name of the creator field used in mint descriptors.
pub const CREATOR_FIELD: &str = "dcterms.creator";
