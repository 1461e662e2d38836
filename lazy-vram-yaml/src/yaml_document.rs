//! YAML-specific Unity document implementation
//!
//! Concrete `UnityDocument` for `.prefab`, `.unity` and `.mat` files.

use crate::serde_unity_loader::SerdeUnityLoader;
use std::fs;
use std::path::Path;
use tracing::debug;
use lazy_vram_core::{
    LazyVramError, LineEnding, Result, UnityClass, UnityDocument, document::DocumentMetadata,
};

/// A Unity YAML document containing one or more Unity objects
#[derive(Debug, Default)]
pub struct YamlDocument {
    /// The Unity objects in this document
    data: Vec<UnityClass>,
    metadata: DocumentMetadata,
    /// Line ending style used in the original file
    newline: LineEnding,
}

impl YamlDocument {
    /// Create a new empty YAML document
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a Unity YAML file
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use lazy_vram_yaml::YamlDocument;
    ///
    /// let doc = YamlDocument::load_yaml("Assets/Avatar/Avatar.prefab")?;
    /// # Ok::<(), lazy_vram_core::LazyVramError>(())
    /// ```
    pub fn load_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| {
            LazyVramError::parse(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let mut doc = Self::from_yaml_str(&content).map_err(|e| match e {
            LazyVramError::Parse { message } => {
                LazyVramError::parse(format!("{}: {}", path.display(), message))
            }
            other => other,
        })?;
        doc.metadata.file_path = Some(path.to_path_buf());

        debug!(path = %path.display(), objects = doc.data.len(), "loaded document");
        Ok(doc)
    }

    /// Parse a Unity YAML document from text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let loader = SerdeUnityLoader::new();
        let unity_classes = loader.load_from_str(content)?;

        let mut doc = YamlDocument::new();
        doc.newline = LineEnding::detect(content);
        doc.metadata.version = content
            .lines()
            .find_map(|line| line.strip_prefix("%YAML "))
            .map(|v| v.trim().to_string());

        for unity_class in unity_classes {
            doc.add_entry(unity_class);
        }

        Ok(doc)
    }

    pub fn line_ending(&self) -> LineEnding {
        self.newline
    }

    /// The `%YAML` directive version
    pub fn version(&self) -> Option<&str> {
        self.metadata.version.as_deref()
    }

    /// Filter entries by class names and/or attributes
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use lazy_vram_yaml::YamlDocument;
    ///
    /// let doc = YamlDocument::load_yaml("Assets/Avatar/Avatar.prefab")?;
    ///
    /// // All skinned renderers that have material slots
    /// let renderers = doc.filter(Some(&["SkinnedMeshRenderer"]), Some(&["m_Materials"]));
    /// # Ok::<(), lazy_vram_core::LazyVramError>(())
    /// ```
    pub fn filter(
        &self,
        class_names: Option<&[&str]>,
        attributes: Option<&[&str]>,
    ) -> Vec<&UnityClass> {
        self.data
            .iter()
            .filter(|entry| {
                if let Some(names) = class_names
                    && !names.is_empty()
                    && !names.contains(&entry.class_name.as_str())
                {
                    return false;
                }

                if let Some(attrs) = attributes
                    && attrs.iter().any(|attr| !entry.has_property(attr))
                {
                    return false;
                }

                true
            })
            .collect()
    }

    /// Get the single entry matching a class name and/or attributes
    ///
    /// Errors when nothing matches or when more than one entry matches.
    pub fn get(
        &self,
        class_name: Option<&str>,
        attributes: Option<&[&str]>,
    ) -> Result<&UnityClass> {
        let class_names = class_name.map(|name| vec![name]);
        let filtered = self.filter(class_names.as_deref(), attributes);

        match filtered.len() {
            0 => Err(LazyVramError::unity_format(format!(
                "No entry found matching criteria: class_name={:?}, attributes={:?}",
                class_name, attributes
            ))),
            1 => Ok(filtered[0]),
            n => Err(LazyVramError::unity_format(format!(
                "Multiple entries ({}) found matching criteria: class_name={:?}, attributes={:?}",
                n, class_name, attributes
            ))),
        }
    }
}

impl UnityDocument for YamlDocument {
    fn entries(&self) -> &[UnityClass] {
        &self.data
    }

    fn add_entry(&mut self, entry: UnityClass) {
        self.data.push(entry);
    }

    fn file_path(&self) -> Option<&Path> {
        self.metadata.file_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATERIAL: &str = "%YAML 1.1\r\n%TAG !u! tag:unity3d.com,2011:\r\n--- !u!21 &2100000\r\nMaterial:\r\n  m_Name: Skin\r\n  m_Shader: {fileID: 46, guid: 0000000000000000f000000000000000, type: 0}\r\n";

    #[test]
    fn test_yaml_document_creation() {
        let doc = YamlDocument::new();
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
        assert_eq!(doc.line_ending(), LineEnding::Unix);
        assert!(doc.version().is_none());
    }

    #[test]
    fn test_from_yaml_str_metadata() {
        let doc = YamlDocument::from_yaml_str(MATERIAL).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.version(), Some("1.1"));
        assert_eq!(doc.line_ending(), LineEnding::Windows);
        assert_eq!(doc.entry().and_then(|e| e.name()), Some("Skin"));
    }

    #[test]
    fn test_get_single_entry() {
        let doc = YamlDocument::from_yaml_str(MATERIAL).unwrap();
        assert!(doc.get(Some("Material"), Some(&["m_Shader"])).is_ok());
        assert!(doc.get(Some("Texture2D"), None).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = YamlDocument::load_yaml("definitely/not/here.prefab");
        assert!(matches!(result, Err(LazyVramError::Parse { .. })));
    }
}
