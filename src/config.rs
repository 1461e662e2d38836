//! Optimizer settings
//!
//! Settings come from an optional `lazy-vram.yaml` at the project root (or
//! a file named on the command line). Every field has a default, so an
//! empty or partial file is valid.

use crate::collector::CollectOptions;
use crate::project::DEFAULT_SKIP_DIRECTORIES;
use crate::preset::Preset;
use crate::scene::SceneOptions;
use lazy_vram_core::{
    LazyVramError, MAIN_TEXTURE_SLOT, Result, VRC_AVATAR_DESCRIPTOR_GUID, class_names,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File looked up at the project root
pub const SETTINGS_FILE_NAME: &str = "lazy-vram.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Preset used when none is given on the command line
    pub preset: Preset,
    /// Main texture size for the custom preset
    pub custom_main_size: u32,
    /// Other texture size for the custom preset
    pub custom_other_size: u32,
    /// Use high quality, uncrunched compression
    pub high_quality_compression: bool,
    /// Texture slots treated as the main texture
    pub main_texture_slots: Vec<String>,
    /// Component classes treated as renderers
    pub renderer_classes: Vec<String>,
    /// Collect renderers on inactive descendants too
    pub include_inactive: bool,
    /// Collect every material slot, not just the first
    pub all_material_slots: bool,
    /// Also patch per-platform overrides marked `overridden: 1`
    pub include_platform_overrides: bool,
    /// Script GUIDs recognized as an avatar descriptor
    pub descriptor_script_guids: Vec<String>,
    /// Directory names skipped while indexing the project
    pub skip_directories: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            custom_main_size: 2048,
            custom_other_size: 1024,
            high_quality_compression: false,
            main_texture_slots: vec![MAIN_TEXTURE_SLOT.to_string()],
            renderer_classes: vec![class_names::SKINNED_MESH_RENDERER.to_string()],
            include_inactive: false,
            all_material_slots: false,
            include_platform_overrides: false,
            descriptor_script_guids: vec![VRC_AVATAR_DESCRIPTOR_GUID.to_string()],
            skip_directories: DEFAULT_SKIP_DIRECTORIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| LazyVramError::config(format!("invalid settings: {}", e)))
    }

    /// Load settings from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LazyVramError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            LazyVramError::Config { message } => {
                LazyVramError::config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Load `lazy-vram.yaml` from the project root, or the defaults
    pub fn discover<P: AsRef<Path>>(project_root: P) -> Result<(Self, Option<PathBuf>)> {
        let candidate = project_root.as_ref().join(SETTINGS_FILE_NAME);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "loading settings");
            Ok((Self::load(&candidate)?, Some(candidate)))
        } else {
            Ok((Self::default(), None))
        }
    }

    pub fn scene_options(&self) -> SceneOptions {
        SceneOptions {
            renderer_classes: self.renderer_classes.clone(),
            include_inactive: self.include_inactive,
            descriptor_script_guids: self.descriptor_script_guids.clone(),
        }
    }

    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            all_material_slots: self.all_material_slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.preset, Preset::Standard);
        assert_eq!(settings.main_texture_slots, vec!["_MainTex"]);
        assert_eq!(settings.renderer_classes, vec!["SkinnedMeshRenderer"]);
        assert!(settings.skip_directories.iter().any(|d| d == "Library"));
        assert_eq!(Settings::from_yaml_str("").unwrap(), settings);
    }

    #[test]
    fn test_partial_file() {
        let settings = Settings::from_yaml_str(
            "preset: standard-plus\nrenderer_classes: [SkinnedMeshRenderer, MeshRenderer]\nall_material_slots: true\n",
        )
        .unwrap();
        assert_eq!(settings.preset, Preset::StandardPlus);
        assert_eq!(settings.renderer_classes.len(), 2);
        assert!(settings.collect_options().all_material_slots);
        assert_eq!(settings.custom_main_size, 2048);
        assert!(!settings.scene_options().include_inactive);
    }

    #[test]
    fn test_display_name_preset() {
        let settings = Settings::from_yaml_str("preset: Standard+\n").unwrap();
        assert_eq!(settings.preset, Preset::StandardPlus);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Settings::from_yaml_str("presett: high\n").unwrap_err();
        assert!(matches!(err, LazyVramError::Config { .. }));
    }

    #[test]
    fn test_discover() {
        let dir = TempDir::new().unwrap();
        let (settings, path) = Settings::discover(dir.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(settings, Settings::default());

        fs::write(dir.path().join(SETTINGS_FILE_NAME), "preset: high\ninclude_inactive: true\n").unwrap();
        let (settings, path) = Settings::discover(dir.path()).unwrap();
        assert_eq!(path, Some(dir.path().join(SETTINGS_FILE_NAME)));
        assert_eq!(settings.preset, Preset::High);
        assert!(settings.scene_options().include_inactive);
    }
}
