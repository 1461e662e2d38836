//! Object references
//!
//! Unity serializes every object reference as a flow mapping
//! `{fileID: N, guid: G, type: T}`. References inside the same file omit
//! `guid` and `type`; an empty slot is `{fileID: 0}`.

use crate::constants::is_builtin_guid;
use crate::unity_value::UnityValue;
use std::fmt;

/// A reference to a Unity object, local or in another asset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef {
    /// Object ID inside the target file
    pub file_id: i64,
    /// GUID of the target asset, `None` for references within the same file
    pub guid: Option<String>,
    /// Asset storage type (2 = native asset, 3 = imported asset)
    pub asset_type: Option<i32>,
}

impl AssetRef {
    /// Reference to an object in the same document
    pub fn local(file_id: i64) -> Self {
        Self {
            file_id,
            guid: None,
            asset_type: None,
        }
    }

    /// Reference to an object in another asset
    pub fn external<S: Into<String>>(file_id: i64, guid: S, asset_type: i32) -> Self {
        Self {
            file_id,
            guid: Some(guid.into()),
            asset_type: Some(asset_type),
        }
    }

    /// Parse a `{fileID, guid, type}` mapping
    ///
    /// Returns `None` when the value is not a reference at all.
    pub fn from_value(value: &UnityValue) -> Option<Self> {
        let file_id = value.get("fileID")?.as_i64()?;
        let guid = value
            .get("guid")
            .and_then(UnityValue::as_text)
            .filter(|g| !g.is_empty());
        let asset_type = value
            .get("type")
            .and_then(UnityValue::as_i64)
            .map(|t| t as i32);

        Some(Self {
            file_id,
            guid,
            asset_type,
        })
    }

    /// `{fileID: 0}`: an empty slot
    pub fn is_null(&self) -> bool {
        self.file_id == 0
    }

    /// Points at an object in the same file
    pub fn is_local(&self) -> bool {
        self.guid.is_none()
    }

    /// Points into Unity's built-in resources
    pub fn is_builtin(&self) -> bool {
        self.guid.as_deref().is_some_and(is_builtin_guid)
    }

    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.guid, self.asset_type) {
            (Some(guid), Some(t)) => {
                write!(f, "{{fileID: {}, guid: {}, type: {}}}", self.file_id, guid, t)
            }
            (Some(guid), None) => write!(f, "{{fileID: {}, guid: {}}}", self.file_id, guid),
            (None, _) => write!(f, "{{fileID: {}}}", self.file_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn reference(pairs: &[(&str, UnityValue)]) -> UnityValue {
        let mut map = IndexMap::new();
        for (k, v) in pairs {
            map.insert(k.to_string(), v.clone());
        }
        UnityValue::Object(map)
    }

    #[test]
    fn test_parse_external_reference() {
        let value = reference(&[
            ("fileID", 2100000.into()),
            ("guid", "b2c5e1f0a9d84c3e8f7a6b5c4d3e2f10".into()),
            ("type", 2.into()),
        ]);
        let parsed = AssetRef::from_value(&value).unwrap();
        assert_eq!(parsed.file_id, 2100000);
        assert_eq!(parsed.guid(), Some("b2c5e1f0a9d84c3e8f7a6b5c4d3e2f10"));
        assert_eq!(parsed.asset_type, Some(2));
        assert!(!parsed.is_local());
        assert!(!parsed.is_builtin());
    }

    #[test]
    fn test_parse_local_and_null() {
        let local = AssetRef::from_value(&reference(&[("fileID", 400002.into())])).unwrap();
        assert!(local.is_local());
        assert!(!local.is_null());

        let null = AssetRef::from_value(&reference(&[("fileID", 0.into())])).unwrap();
        assert!(null.is_null());
    }

    #[test]
    fn test_numeric_guid() {
        let value = reference(&[
            ("fileID", 2800000.into()),
            ("guid", UnityValue::Integer(12345678901234)),
            ("type", 3.into()),
        ]);
        let parsed = AssetRef::from_value(&value).unwrap();
        assert_eq!(parsed.guid(), Some("12345678901234"));
    }

    #[test]
    fn test_not_a_reference() {
        assert!(AssetRef::from_value(&UnityValue::Integer(5)).is_none());
        assert!(AssetRef::from_value(&reference(&[("m_Name", "Body".into())])).is_none());
    }

    #[test]
    fn test_builtin() {
        let builtin = AssetRef::external(10303, "0000000000000000f000000000000000", 0);
        assert!(builtin.is_builtin());
        assert_eq!(
            builtin.to_string(),
            "{fileID: 10303, guid: 0000000000000000f000000000000000, type: 0}"
        );
    }
}
