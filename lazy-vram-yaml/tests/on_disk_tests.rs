//! Loading and patching Unity files written to disk

use anyhow::Result;
use lazy_vram_core::{AssetRef, UnityDocument};
use lazy_vram_yaml::{ImporterPatch, MetaFile, YamlDocument};
use std::fs;
use tempfile::TempDir;

const NESTED_PREFAB: &str = "%YAML 1.1\r
%TAG !u! tag:unity3d.com,2011:\r
--- !u!1 &100100\r
GameObject:\r
  m_Component:\r
  - component: {fileID: 400400}\r
  m_Name: Avatar\r
  m_IsActive: 1\r
--- !u!4 &400400\r
Transform:\r
  m_GameObject: {fileID: 100100}\r
  m_Children:\r
  - {fileID: 1234567890}\r
  m_Father: {fileID: 0}\r
--- !u!4 &1234567890 stripped\r
Transform:\r
  m_CorrespondingSourceObject: {fileID: 400000, guid: 5d4c3b2a1f0e9d8c7b6a5f4e3d2c1b0a, type: 3}\r
  m_PrefabInstance: {fileID: 1001001}\r
--- !u!1001 &1001001\r
PrefabInstance:\r
  m_Modification:\r
    m_TransformParent: {fileID: 400400}\r
  m_SourcePrefab: {fileID: 100100000, guid: 5d4c3b2a1f0e9d8c7b6a5f4e3d2c1b0a, type: 3}\r
";

const MAIN_META: &str = "fileFormatVersion: 2
guid: 7e6d5c4b3a2f1e0d9c8b7a6f5e4d3c2b
TextureImporter:
  serializedVersion: 12
  mipmaps:
    enableMipMap: 1
  maxTextureSize: 2048
  textureFormat: 1
  platformSettings:
  - serializedVersion: 3
    buildTarget: DefaultTexturePlatform
    maxTextureSize: 8192
    textureCompression: 1
    compressionQuality: 50
    crunchedCompression: 0
    overridden: 0
  - serializedVersion: 3
    buildTarget: Android
    maxTextureSize: 2048
    textureCompression: 1
    overridden: 0
  userData:
";

#[test]
fn test_load_nested_prefab_from_disk() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("Avatar.prefab");
    fs::write(&path, NESTED_PREFAB)?;

    let doc = YamlDocument::load_yaml(&path)?;
    assert_eq!(doc.len(), 4);
    assert_eq!(doc.file_path(), Some(path.as_path()));

    let stripped = doc
        .find_by_file_id(1234567890)
        .expect("stripped transform is indexed");
    assert!(stripped.is_stripped());
    assert_eq!(stripped.class_name, "Transform");

    let instance = doc.filter_by_class("PrefabInstance");
    assert_eq!(instance.len(), 1);
    let source = instance[0].reference("m_SourcePrefab").unwrap();
    assert!(!source.is_local());
    assert_eq!(source.guid(), Some("5d4c3b2a1f0e9d8c7b6a5f4e3d2c1b0a"));

    let root = doc.find_by_file_id(400400).unwrap();
    let child = root.references("m_Children");
    assert_eq!(child, vec![AssetRef::local(1234567890)]);
    assert!(doc.resolve(&child[0]).is_some());
    Ok(())
}

#[test]
fn test_patch_meta_file_on_disk() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("albedo.png.meta");
    fs::write(&path, MAIN_META)?;

    let meta = MetaFile::load(&path)?;
    assert_eq!(meta.path(), Some(path.as_path()));
    assert_eq!(meta.guid().as_deref(), Some("7e6d5c4b3a2f1e0d9c8b7a6f5e4d3c2b"));

    let patch = ImporterPatch {
        max_texture_size: Some(1024),
        texture_compression: Some(2),
        compression_quality: Some(100),
        crunched_compression: Some(false),
        include_overrides: false,
    };
    let (patched, changes) = meta.patched(&patch)?;
    fs::write(&path, &patched)?;

    let importer = MetaFile::load(&path)?.texture_importer()?.unwrap();
    let default = importer.default_platform().unwrap();
    assert_eq!(default.max_texture_size, Some(1024));
    assert_eq!(default.texture_compression, Some(2));
    assert_eq!(default.compression_quality, Some(100));
    assert_eq!(default.crunched_compression, Some(0));
    assert_eq!(importer.max_texture_size, Some(1024));

    // Android is not overridden, so it keeps its values
    let android = &importer.platform_settings[1];
    assert_eq!(android.build_target, "Android");
    assert_eq!(android.max_texture_size, Some(2048));

    // Top-level size plus three default-platform values; crunch was already off
    assert_eq!(changes.len(), 4);
    assert!(patched.contains("  textureFormat: 1\n"));
    assert!(patched.ends_with("  userData:\n"));
    Ok(())
}
