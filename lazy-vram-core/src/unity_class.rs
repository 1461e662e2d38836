//! Unity objects
//!
//! One `UnityClass` per YAML document in a Unity file: the class name,
//! the numeric class ID and anchor from the `--- !u!ID &anchor` header,
//! and the ordered property mapping.

use crate::asset_ref::AssetRef;
use crate::constants::STRIPPED_MARKER;
use crate::get_class_name;
use crate::unity_value::UnityValue;
use indexmap::IndexMap;
use std::fmt;

/// A Unity object instance
#[derive(Debug, Clone)]
pub struct UnityClass {
    /// Class ID (numeric identifier)
    pub class_id: i32,
    /// Class name (string identifier)
    pub class_name: String,
    /// YAML anchor for this object, its local fileID
    pub anchor: String,
    /// Extra data after the anchor line, e.g. `stripped`
    pub extra_anchor_data: String,
    properties: IndexMap<String, UnityValue>,
}

impl UnityClass {
    pub fn new(class_id: i32, class_name: String, anchor: String) -> Self {
        Self {
            class_id,
            class_name,
            anchor,
            extra_anchor_data: String::new(),
            properties: IndexMap::new(),
        }
    }

    /// Create an instance whose name comes from the class ID table
    pub fn from_class_id(class_id: i32, anchor: String) -> Self {
        let class_name = get_class_name(class_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("UnityClass_{}", class_id));
        Self::new(class_id, class_name, anchor)
    }

    pub fn get(&self, key: &str) -> Option<&UnityValue> {
        self.properties.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut UnityValue> {
        self.properties.get_mut(key)
    }

    pub fn set<V: Into<UnityValue>>(&mut self, key: String, value: V) {
        self.properties.insert(key, value.into());
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &String> {
        self.properties.keys()
    }

    pub fn properties(&self) -> &IndexMap<String, UnityValue> {
        &self.properties
    }

    /// The object's local fileID, parsed from its anchor
    pub fn file_id(&self) -> Option<i64> {
        self.anchor.parse().ok()
    }

    /// Prefab-stripped placeholder whose data lives in another prefab
    pub fn is_stripped(&self) -> bool {
        self.extra_anchor_data
            .split_whitespace()
            .any(|part| part == STRIPPED_MARKER)
    }

    /// The object name (m_Name property if it exists)
    pub fn name(&self) -> Option<&str> {
        self.get("m_Name").and_then(|v| v.as_str())
    }

    /// Read a single object reference property
    pub fn reference(&self, key: &str) -> Option<AssetRef> {
        self.get(key).and_then(AssetRef::from_value)
    }

    /// Read a list of object references, skipping entries that are not references
    pub fn references(&self, key: &str) -> Vec<AssetRef> {
        self.get(key)
            .and_then(UnityValue::as_array)
            .map(|items| items.iter().filter_map(AssetRef::from_value).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for UnityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} '{}' (&{})", self.class_name, name, self.anchor),
            None => write!(f, "{} (&{})", self.class_name, self.anchor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_class_creation() {
        let mut class = UnityClass::new(1, "GameObject".to_string(), "100100".to_string());
        class.set("m_Name".to_string(), "Body");

        assert_eq!(class.class_name, "GameObject");
        assert_eq!(class.name(), Some("Body"));
        assert_eq!(class.file_id(), Some(100100));
        assert_eq!(class.to_string(), "GameObject 'Body' (&100100)");
    }

    #[test]
    fn test_from_class_id() {
        let class = UnityClass::from_class_id(137, "5".to_string());
        assert_eq!(class.class_name, "SkinnedMeshRenderer");

        let unknown = UnityClass::from_class_id(4242, "6".to_string());
        assert_eq!(unknown.class_name, "UnityClass_4242");
    }

    #[test]
    fn test_stripped() {
        let mut class = UnityClass::new(1, "GameObject".to_string(), "7".to_string());
        assert!(!class.is_stripped());
        class.extra_anchor_data = "stripped".to_string();
        assert!(class.is_stripped());
    }

    #[test]
    fn test_references() {
        let mut class = UnityClass::new(137, "SkinnedMeshRenderer".to_string(), "9".to_string());
        let mut slot = IndexMap::new();
        slot.insert("fileID".to_string(), UnityValue::Integer(2100000));
        slot.insert("guid".to_string(), UnityValue::from("aa11"));
        slot.insert("type".to_string(), UnityValue::Integer(2));
        let mut empty = IndexMap::new();
        empty.insert("fileID".to_string(), UnityValue::Integer(0));
        class.set(
            "m_Materials".to_string(),
            vec![
                UnityValue::Object(slot),
                UnityValue::Object(empty),
                UnityValue::Integer(3),
            ],
        );

        let refs = class.references("m_Materials");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].guid(), Some("aa11"));
        assert!(refs[1].is_null());
        assert!(class.references("m_Missing").is_empty());
    }
}
