//! Constants and type definitions for Unity assets
//!
//! Unity class IDs, YAML conventions and texture importer values used
//! throughout loading and optimization.

use std::collections::HashMap;

/// Marker Unity appends to document headers of prefab-stripped objects
pub const STRIPPED_MARKER: &str = "stripped";

/// Texture sizes Unity accepts for `maxTextureSize`
pub const SUPPORTED_TEXTURE_SIZES: [u32; 8] = [32, 64, 128, 256, 512, 1024, 2048, 4096];

/// Texture slot that holds a material's primary color/albedo texture
pub const MAIN_TEXTURE_SLOT: &str = "_MainTex";

/// GUID Unity uses for its built-in resources
pub const BUILTIN_RESOURCES_GUID: &str = "0000000000000000f000000000000000";

/// GUID of the built-in extra resources (default materials and such)
pub const BUILTIN_EXTRA_GUID: &str = "0000000000000000e000000000000000";

/// `m_Script` GUID of the VRChat SDK3 `VRCAvatarDescriptor`
pub const VRC_AVATAR_DESCRIPTOR_GUID: &str = "67cc4cb7839cd3741b63733d5adf0442";

/// Line ending types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Unix, // \n
    Windows, // \r\n
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Unix => "\n",
            LineEnding::Windows => "\r\n",
        }
    }

    /// Detect the line ending used by existing file content
    pub fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            LineEnding::Windows
        } else {
            LineEnding::Unix
        }
    }
}

/// Texture importer compression modes as stored in `textureCompression`
pub mod texture_compression {
    pub const COMPRESSED: i64 = 1;
    pub const COMPRESSED_HQ: i64 = 2;
}

/// Build target name of the default platform entry in `platformSettings`
pub const DEFAULT_TEXTURE_PLATFORM: &str = "DefaultTexturePlatform";

/// Common Unity class IDs
pub mod class_ids {
    pub const GAME_OBJECT: i32 = 1;
    pub const TRANSFORM: i32 = 4;
    pub const MATERIAL: i32 = 21;
    pub const MESH_RENDERER: i32 = 23;
    pub const TEXTURE_2D: i32 = 28;
    pub const MONO_BEHAVIOUR: i32 = 114;
    pub const SKINNED_MESH_RENDERER: i32 = 137;
    pub const RECT_TRANSFORM: i32 = 224;
    pub const PREFAB_INSTANCE: i32 = 1001;
    pub const TEXTURE_IMPORTER: i32 = 1006;
}

/// Common Unity class names
pub mod class_names {
    pub const GAME_OBJECT: &str = "GameObject";
    pub const TRANSFORM: &str = "Transform";
    pub const RECT_TRANSFORM: &str = "RectTransform";
    pub const MATERIAL: &str = "Material";
    pub const MESH_RENDERER: &str = "MeshRenderer";
    pub const SKINNED_MESH_RENDERER: &str = "SkinnedMeshRenderer";
    pub const TEXTURE_2D: &str = "Texture2D";
    pub const MONO_BEHAVIOUR: &str = "MonoBehaviour";
    pub const PREFAB_INSTANCE: &str = "PrefabInstance";
    pub const TEXTURE_IMPORTER: &str = "TextureImporter";
}

lazy_static::lazy_static! {
    /// Class ID to name lookup for the classes this crate understands
    pub static ref CLASS_ID_NAMES: HashMap<i32, &'static str> = {
        let mut map = HashMap::new();
        map.insert(class_ids::GAME_OBJECT, class_names::GAME_OBJECT);
        map.insert(class_ids::TRANSFORM, class_names::TRANSFORM);
        map.insert(class_ids::MATERIAL, class_names::MATERIAL);
        map.insert(class_ids::MESH_RENDERER, class_names::MESH_RENDERER);
        map.insert(class_ids::TEXTURE_2D, class_names::TEXTURE_2D);
        map.insert(class_ids::MONO_BEHAVIOUR, class_names::MONO_BEHAVIOUR);
        map.insert(class_ids::SKINNED_MESH_RENDERER, class_names::SKINNED_MESH_RENDERER);
        map.insert(class_ids::RECT_TRANSFORM, class_names::RECT_TRANSFORM);
        map.insert(class_ids::PREFAB_INSTANCE, class_names::PREFAB_INSTANCE);
        map.insert(class_ids::TEXTURE_IMPORTER, class_names::TEXTURE_IMPORTER);
        map
    };
}

/// Whether a size is one Unity accepts for `maxTextureSize`
pub fn is_supported_texture_size(size: u32) -> bool {
    SUPPORTED_TEXTURE_SIZES.contains(&size)
}

/// Whether a GUID points into Unity's built-in resources
pub fn is_builtin_guid(guid: &str) -> bool {
    guid == BUILTIN_RESOURCES_GUID || guid == BUILTIN_EXTRA_GUID || guid.chars().all(|c| c == '0')
}
