//! Unity document abstraction
//!
//! Scene, prefab and material files are all sequences of Unity objects
//! keyed by their local fileID. This trait holds the lookups the scene
//! walker and material reader need, independent of how the file was
//! parsed.

use crate::asset_ref::AssetRef;
use crate::unity_class::UnityClass;
use std::path::{Path, PathBuf};

/// Abstract trait for Unity documents
pub trait UnityDocument {
    /// Get all entries in the document
    fn entries(&self) -> &[UnityClass];

    /// Add a new Unity object to the document
    fn add_entry(&mut self, entry: UnityClass);

    /// Get the file path this document was loaded from
    fn file_path(&self) -> Option<&Path>;

    /// Get the first entry (main object) in the document
    fn entry(&self) -> Option<&UnityClass> {
        self.entries().first()
    }

    /// Filter entries by class name
    fn filter_by_class(&self, class_name: &str) -> Vec<&UnityClass> {
        self.entries()
            .iter()
            .filter(|entry| entry.class_name == class_name)
            .collect()
    }

    /// Filter entries by multiple class names
    fn filter_by_classes(&self, class_names: &[&str]) -> Vec<&UnityClass> {
        self.entries()
            .iter()
            .filter(|entry| class_names.contains(&entry.class_name.as_str()))
            .collect()
    }

    /// Find an object by its local fileID
    fn find_by_file_id(&self, file_id: i64) -> Option<&UnityClass> {
        self.entries()
            .iter()
            .find(|entry| entry.file_id() == Some(file_id))
    }

    /// Resolve a reference that points into this document
    ///
    /// External and null references resolve to `None`.
    fn resolve(&self, reference: &AssetRef) -> Option<&UnityClass> {
        if reference.is_null() || !reference.is_local() {
            return None;
        }
        self.find_by_file_id(reference.file_id)
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}

/// Document metadata
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    /// Path to the source file
    pub file_path: Option<PathBuf>,
    /// `%YAML` directive version, when present
    pub version: Option<String>,
}

impl DocumentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file_path = Some(path.as_ref().to_path_buf());
        self
    }
}
