//! Access-copy files attached to a digital object

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use crate::model::field::Field;

/// Suffix appended to a file stem to derive its OCR sidecar name
const OCR_SUFFIX: &str = "_alto.xml";

/// An access-copy file referenced by a digital object.
///
/// Identity is the resolved `path`. The OCR sidecar probe touches the file
/// system once; the result is cached for the lifetime of the entry.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Resolved path on disk
    pub path: PathBuf,

    /// Base file name
    pub name: String,

    /// Detected MIME type
    pub mime: String,

    /// Per-file metadata fields
    pub metadata: Vec<Field>,

    ocr_present: OnceCell<bool>,
}

impl FileEntry {
    /// Create an entry for a resolved path, detecting MIME from the extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_guess::from_path(&path).first_or_octet_stream().to_string();
        Self {
            path,
            name,
            mime,
            metadata: Vec::new(),
            ocr_present: OnceCell::new(),
        }
    }

    /// Look up a per-file metadata field by qualified name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.metadata.iter().find(|field| field.name == name)
    }

    /// Value of a per-file metadata field, if present
    pub fn get_field_value(&self, name: &str) -> Option<String> {
        self.get_field(name).map(|field| field.value.clone())
    }

    /// Name of the OCR sidecar derived from this file's name
    pub fn ocr_filename(&self) -> String {
        let stem = Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone());
        format!("{}{}", stem, OCR_SUFFIX)
    }

    /// Path the OCR sidecar would occupy, next to this file
    pub fn ocr_path(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) => parent.join(self.ocr_filename()),
            None => PathBuf::from(self.ocr_filename()),
        }
    }

    /// Whether the OCR sidecar exists on disk; computed once and cached
    pub fn has_ocr(&self) -> bool {
        *self.ocr_present.get_or_init(|| self.ocr_path().exists())
    }
}
