//! Material texture slots

use indexmap::IndexMap;
use lazy_vram_core::{AssetRef, LazyVramError, Result, UnityClass, UnityValue, class_names};
use lazy_vram_yaml::YamlDocument;
use std::path::{Path, PathBuf};

/// Named texture slots of a material, in file order
///
/// An empty slot (`m_Texture: {fileID: 0}`) maps to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureSlots(IndexMap<String, Option<AssetRef>>);

impl TextureSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, slot: S, texture: Option<AssetRef>) {
        self.0.insert(slot.into(), texture);
    }

    /// Texture assigned to a slot
    pub fn get(&self, slot: &str) -> Option<&AssetRef> {
        self.0.get(slot).and_then(Option::as_ref)
    }

    /// Slots with a texture assigned
    pub fn assigned(&self) -> impl Iterator<Item = (&str, &AssetRef)> {
        self.0
            .iter()
            .filter_map(|(slot, texture)| texture.as_ref().map(|t| (slot.as_str(), t)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read `m_SavedProperties.m_TexEnvs` from a Material object
    ///
    /// Accepts the current `- _MainTex: {m_Texture: ...}` entries and the
    /// older `- first: {name: _MainTex} second: {m_Texture: ...}` pairs.
    pub fn from_material(material: &UnityClass) -> Self {
        let mut slots = Self::new();
        let Some(entries) = material
            .get("m_SavedProperties")
            .and_then(|props| props.get("m_TexEnvs"))
            .and_then(UnityValue::as_array)
        else {
            return slots;
        };

        for entry in entries {
            let Some(obj) = entry.as_object() else {
                continue;
            };
            if let (Some(first), Some(second)) = (obj.get("first"), obj.get("second")) {
                if let Some(name) = first.get("name").and_then(UnityValue::as_str) {
                    slots.insert(name, Self::texture_of(second));
                }
                continue;
            }
            for (name, env) in obj {
                slots.insert(name.as_str(), Self::texture_of(env));
            }
        }
        slots
    }

    fn texture_of(env: &UnityValue) -> Option<AssetRef> {
        env.get("m_Texture")
            .and_then(AssetRef::from_value)
            .filter(|texture| !texture.is_null())
    }
}

/// A material loaded from a `.mat` file
#[derive(Debug, Clone)]
pub struct MaterialAsset {
    pub name: String,
    pub path: PathBuf,
    pub slots: TextureSlots,
}

impl MaterialAsset {
    /// Load the material object from a `.mat` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doc = YamlDocument::load_yaml(path)?;
        let material = doc
            .filter(Some(&[class_names::MATERIAL]), None)
            .into_iter()
            .next()
            .ok_or_else(|| LazyVramError::unsupported_asset(path, "no Material object"))?;

        Ok(Self {
            name: material
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| path.display().to_string()),
            path: path.to_path_buf(),
            slots: TextureSlots::from_material(material),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(yaml: &str) -> UnityClass {
        YamlDocument::from_yaml_str(yaml)
            .unwrap()
            .filter(Some(&["Material"]), None)[0]
            .clone()
    }

    #[test]
    fn test_modern_tex_envs() {
        let mat = material(
            "--- !u!21 &2100000
Material:
  m_Name: Skin
  m_SavedProperties:
    serializedVersion: 3
    m_TexEnvs:
    - _BumpMap:
        m_Texture: {fileID: 2800000, guid: b2220000b2220000b2220000b2220000, type: 3}
        m_Scale: {x: 1, y: 1}
        m_Offset: {x: 0, y: 0}
    - _EmissionMap:
        m_Texture: {fileID: 0}
        m_Scale: {x: 1, y: 1}
        m_Offset: {x: 0, y: 0}
    - _MainTex:
        m_Texture: {fileID: 2800000, guid: a1110000a1110000a1110000a1110000, type: 3}
        m_Scale: {x: 1, y: 1}
        m_Offset: {x: 0, y: 0}
    m_Floats:
    - _Cutoff: 0.5
",
        );
        let slots = TextureSlots::from_material(&mat);
        assert_eq!(slots.len(), 3);
        assert_eq!(
            slots.get("_MainTex").and_then(AssetRef::guid),
            Some("a1110000a1110000a1110000a1110000")
        );
        assert!(slots.get("_EmissionMap").is_none());
        let assigned: Vec<&str> = slots.assigned().map(|(slot, _)| slot).collect();
        assert_eq!(assigned, vec!["_BumpMap", "_MainTex"]);
    }

    #[test]
    fn test_legacy_tex_envs() {
        let mat = material(
            "--- !u!21 &2100000
Material:
  m_Name: Old
  m_SavedProperties:
    serializedVersion: 2
    m_TexEnvs:
    - first:
        name: _MainTex
      second:
        m_Texture: {fileID: 2800000, guid: c3330000c3330000c3330000c3330000, type: 3}
        m_Scale: {x: 1, y: 1}
        m_Offset: {x: 0, y: 0}
",
        );
        let slots = TextureSlots::from_material(&mat);
        assert_eq!(slots.len(), 1);
        assert!(slots.get("_MainTex").is_some());
    }

    #[test]
    fn test_material_without_textures() {
        let mat = material("--- !u!21 &2100000\nMaterial:\n  m_Name: Flat\n");
        assert!(TextureSlots::from_material(&mat).is_empty());
    }
}
