//! lazy_vram core
//!
//! Data structures shared by the Unity YAML loader and the texture
//! optimizer: values, objects, object references, documents and the
//! error type.

pub mod asset_ref;
pub mod constants;
pub mod document;
pub mod error;
pub mod unity_class;
pub mod unity_value;

pub use asset_ref::AssetRef;
pub use constants::*;
pub use document::{DocumentMetadata, UnityDocument};
pub use error::{LazyVramError, Result};
pub use unity_class::UnityClass;
pub use unity_value::UnityValue;

/// Get Unity class name from class ID
pub fn get_class_name(class_id: i32) -> Option<&'static str> {
    CLASS_ID_NAMES.get(&class_id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        assert_eq!(get_class_name(21), Some("Material"));
        assert_eq!(get_class_name(-1), None);
    }
}
