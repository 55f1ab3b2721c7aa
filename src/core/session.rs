//! Project session - the explicit batch context shared by the services
//!
//! One session holds everything a loaded project needs: the immutable
//! schema, the optional vocabulary, and the mutable object batch. Callers
//! own the session and pass it to validation, minting, and export; there is
//! no module-level shared state.

use std::path::PathBuf;

use crate::model::DigitalObject;
use crate::schema::MetadataSchema;
use crate::vocab::VocabularyIndex;

/// The loaded project: schema, vocabulary, and the object batch
#[derive(Debug)]
pub struct ProjectSession {
    /// Field definitions, loaded once per project
    pub schema: MetadataSchema,

    /// Controlled vocabulary; `None` means no vocabulary constraints
    pub vocabulary: Option<VocabularyIndex>,

    /// Collection-level title from the project file
    pub collection_title: String,

    /// The object batch, ordered by sequential id
    pub objects: Vec<DigitalObject>,

    /// Path the project was loaded from and will be saved to
    pub project_path: Option<PathBuf>,

    /// Original project document, preserved so saves keep unknown keys
    pub(crate) document: serde_json::Value,
}

impl ProjectSession {
    /// Create an empty session around a schema and optional vocabulary
    pub fn new(schema: MetadataSchema, vocabulary: Option<VocabularyIndex>) -> Self {
        Self {
            schema,
            vocabulary,
            collection_title: String::new(),
            objects: Vec::new(),
            project_path: None,
            document: serde_json::Value::Null,
        }
    }

    /// Look up an object by sequential id
    pub fn get_object(&self, id: usize) -> Option<&DigitalObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    /// Mutable lookup of an object by sequential id
    pub fn get_object_mut(&mut self, id: usize) -> Option<&mut DigitalObject> {
        self.objects.iter_mut().find(|object| object.id == id)
    }

    /// Look up an object by uuid
    pub fn get_object_by_uuid(&self, uuid: &str) -> Option<&DigitalObject> {
        self.objects.iter().find(|object| object.uuid == uuid)
    }

    /// Re-sort by id and reassign sequential ids and display titles.
    ///
    /// Called after a refresh merge adds or removes objects.
    pub fn reindex(&mut self) {
        self.objects.sort_by_key(|object| object.id);
        for (index, object) in self.objects.iter_mut().enumerate() {
            object.id = index + 1;
            object.refresh_title();
        }
    }

    /// Apply `f` to every object's field of the given name
    pub fn autofill(&mut self, field_name: &str, value: &str) {
        for object in &mut self.objects {
            object.set_field(field_name, value);
            object.refresh_hash();
        }
    }

    /// Drop the loaded batch, keeping schema and vocabulary
    pub fn clear(&mut self) {
        self.collection_title.clear();
        self.objects.clear();
        self.project_path = None;
        self.document = serde_json::Value::Null;
    }
}
