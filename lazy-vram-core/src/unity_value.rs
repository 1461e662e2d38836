//! Unity value types
//!
//! `UnityValue` mirrors the shapes that appear in Unity YAML: scalars,
//! sequences and mappings. Unity writes booleans as `0`/`1` and GUIDs as
//! bare hex strings, so the accessors here are lenient about both.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value stored in a Unity object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnityValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<UnityValue>),
    Object(IndexMap<String, UnityValue>),
}

impl UnityValue {
    pub fn is_null(&self) -> bool {
        matches!(self, UnityValue::Null)
    }

    /// Get as boolean, accepting Unity's `0`/`1` integer flags
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            UnityValue::Bool(b) => Some(*b),
            UnityValue::Integer(0) => Some(false),
            UnityValue::Integer(1) => Some(true),
            _ => None,
        }
    }

    /// Get as integer, accepting numeric strings
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            UnityValue::Integer(i) => Some(*i),
            UnityValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            UnityValue::Float(f) => Some(*f),
            UnityValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            UnityValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get a scalar as text
    ///
    /// GUIDs made only of digits come out of YAML as integers; this turns
    /// them back into their textual form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            UnityValue::String(s) => Some(s.clone()),
            UnityValue::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<UnityValue>> {
        match self {
            UnityValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, UnityValue>> {
        match self {
            UnityValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Look up a key when this value is a mapping
    pub fn get(&self, key: &str) -> Option<&UnityValue> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Follow a chain of mapping keys
    ///
    /// ```rust
    /// use lazy_vram_core::UnityValue;
    /// use indexmap::IndexMap;
    ///
    /// let mut inner = IndexMap::new();
    /// inner.insert("m_Floats".to_string(), UnityValue::Array(vec![]));
    /// let mut outer = IndexMap::new();
    /// outer.insert("m_SavedProperties".to_string(), UnityValue::Object(inner));
    /// let value = UnityValue::Object(outer);
    ///
    /// assert!(value.get_path(&["m_SavedProperties", "m_Floats"]).is_some());
    /// assert!(value.get_path(&["m_SavedProperties", "m_Colors"]).is_none());
    /// ```
    pub fn get_path(&self, path: &[&str]) -> Option<&UnityValue> {
        path.iter().try_fold(self, |value, key| value.get(key))
    }
}

impl fmt::Display for UnityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnityValue::Null => write!(f, "null"),
            UnityValue::Bool(b) => write!(f, "{}", b),
            UnityValue::Integer(i) => write!(f, "{}", i),
            UnityValue::Float(fl) => write!(f, "{}", fl),
            UnityValue::String(s) => write!(f, "{}", s),
            UnityValue::Array(arr) => {
                write!(f, "[")?;
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            UnityValue::Object(obj) => {
                write!(f, "{{")?;
                for (i, (key, value)) in obj.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for UnityValue {
    fn from(b: bool) -> Self {
        UnityValue::Bool(b)
    }
}

impl From<i32> for UnityValue {
    fn from(i: i32) -> Self {
        UnityValue::Integer(i as i64)
    }
}

impl From<i64> for UnityValue {
    fn from(i: i64) -> Self {
        UnityValue::Integer(i)
    }
}

impl From<f64> for UnityValue {
    fn from(f: f64) -> Self {
        UnityValue::Float(f)
    }
}

impl From<String> for UnityValue {
    fn from(s: String) -> Self {
        UnityValue::String(s)
    }
}

impl From<&str> for UnityValue {
    fn from(s: &str) -> Self {
        UnityValue::String(s.to_string())
    }
}

impl From<Vec<UnityValue>> for UnityValue {
    fn from(arr: Vec<UnityValue>) -> Self {
        UnityValue::Array(arr)
    }
}

impl From<IndexMap<String, UnityValue>> for UnityValue {
    fn from(obj: IndexMap<String, UnityValue>) -> Self {
        UnityValue::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_flags() {
        assert_eq!(UnityValue::Integer(1).as_bool(), Some(true));
        assert_eq!(UnityValue::Integer(0).as_bool(), Some(false));
        assert_eq!(UnityValue::Integer(2).as_bool(), None);
        assert_eq!(UnityValue::Bool(true).as_bool(), Some(true));
    }

    #[test]
    fn test_lenient_scalars() {
        assert_eq!(UnityValue::String("2048".into()).as_i64(), Some(2048));
        assert_eq!(UnityValue::String("abc".into()).as_i64(), None);
        assert_eq!(
            UnityValue::Integer(12345678).as_text(),
            Some("12345678".to_string())
        );
        assert_eq!(UnityValue::Float(1.5).as_text(), None);
    }

    #[test]
    fn test_get_path() {
        let mut texture = IndexMap::new();
        texture.insert("fileID".to_string(), UnityValue::Integer(2800000));
        let mut slot = IndexMap::new();
        slot.insert("m_Texture".to_string(), UnityValue::Object(texture));
        let value = UnityValue::Object(slot);

        assert_eq!(
            value
                .get_path(&["m_Texture", "fileID"])
                .and_then(UnityValue::as_i64),
            Some(2800000)
        );
        assert!(value.get_path(&["m_Texture", "guid"]).is_none());
        assert!(UnityValue::Integer(3).get("anything").is_none());
    }

    #[test]
    fn test_unity_value_display() {
        let val: UnityValue = vec![UnityValue::Integer(1), "two".into()].into();
        assert_eq!(format!("{}", val), "[1, two]");
        assert_eq!(format!("{}", UnityValue::Null), "null");
    }
}
