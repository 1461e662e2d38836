//! lazy_vram YAML support
//!
//! Loads Unity YAML assets (`.prefab`, `.unity`, `.mat`) into
//! `UnityClass` objects and reads and patches `.meta` importer files.
//!
//! # Examples
//!
//! ```rust
//! use lazy_vram_yaml::serde_unity_loader::SerdeUnityLoader;
//!
//! let loader = SerdeUnityLoader::new();
//! let yaml = r#"
//! --- !u!1 &100100
//! GameObject:
//!   m_Name: Avatar
//!   m_IsActive: 1
//! "#;
//!
//! let classes = loader.load_from_str(yaml)?;
//! assert_eq!(classes[0].file_id(), Some(100100));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use lazy_vram_core::{
    AssetRef, LazyVramError, Result, UnityClass, UnityDocument, UnityValue, constants::*,
};

pub mod meta_file;
pub mod serde_unity_loader;
pub mod yaml_document;

pub use meta_file::{FieldChange, ImporterPatch, MetaFile, TextureImporterSection, scan_guid};
pub use serde_unity_loader::SerdeUnityLoader;
pub use yaml_document::YamlDocument;
