//! Texture importer settings
//!
//! Turns the collected materials into per-texture import targets and
//! writes them through a [`TextureImporter`]. The `.meta` backed importer
//! stages every edit in memory; [`MetaImportPlan::commit`] writes them
//! only after all files were patched successfully.

use crate::preset::TextureSizes;
use crate::project::AssetDatabase;
use indexmap::IndexMap;
use lazy_vram_core::{AssetRef, LazyVramError, Result, texture_compression};
use lazy_vram_yaml::{FieldChange, ImporterPatch, MetaFile};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

/// Compression setting written alongside the size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// Normal quality, crunched
    #[default]
    Normal,
    /// High quality, not crunched
    HighQuality,
}

impl Compression {
    pub fn from_high_quality(high_quality: bool) -> Self {
        if high_quality {
            Compression::HighQuality
        } else {
            Compression::Normal
        }
    }

    /// `(textureCompression, compressionQuality, crunchedCompression)`
    pub fn importer_values(&self) -> (i64, i64, bool) {
        match self {
            Compression::Normal => (texture_compression::COMPRESSED, 50, true),
            Compression::HighQuality => (texture_compression::COMPRESSED_HQ, 100, false),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Normal => f.write_str("normal (crunched)"),
            Compression::HighQuality => f.write_str("high quality"),
        }
    }
}

/// A texture asset in the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureAsset {
    pub guid: String,
    pub path: PathBuf,
    pub meta_path: PathBuf,
}

/// Host import API: the two settings the optimizer changes
pub trait TextureImporter {
    fn set_max_size(&mut self, texture: &TextureAsset, size: u32) -> Result<()>;
    fn set_compression(&mut self, texture: &TextureAsset, quality: Compression) -> Result<()>;
}

/// A texture referenced by at least one collected material
#[derive(Debug, Clone)]
pub struct TextureTarget {
    pub texture: TextureAsset,
    /// Used in a main texture slot by some material
    pub is_main: bool,
    /// `material/slot` pairs that reference the texture
    pub used_by: Vec<String>,
}

/// Something the optimizer left alone, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub what: String,
    pub reason: String,
}

/// Resolve the textures behind a set of materials
///
/// Each texture appears once. A texture in a main slot of any material is
/// treated as a main texture.
pub fn texture_targets<'a, I>(
    db: &AssetDatabase,
    materials: I,
    main_slots: &[String],
) -> Result<(Vec<TextureTarget>, Vec<Skipped>)>
where
    I: IntoIterator<Item = &'a AssetRef>,
{
    let mut targets: IndexMap<String, TextureTarget> = IndexMap::new();
    let mut skipped = Vec::new();
    // GUIDs already checked and found not to be textures
    let mut not_textures: HashSet<String> = HashSet::new();

    for reference in materials {
        if reference.is_builtin() {
            skipped.push(Skipped {
                what: reference.to_string(),
                reason: "built-in material".to_string(),
            });
            continue;
        }

        let material = match db.load_material(reference) {
            Ok(material) => material,
            Err(LazyVramError::UnsupportedAsset { path, message }) => {
                warn!(path = %path.display(), "{}", message);
                skipped.push(Skipped {
                    what: db.relative(&path).display().to_string(),
                    reason: message,
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        for (slot, texture) in material.slots.assigned() {
            let is_main = main_slots.iter().any(|s| s == slot);
            let user = format!("{}/{}", material.name, slot);

            let Some(guid) = texture.guid().filter(|_| !texture.is_builtin()) else {
                skipped.push(Skipped {
                    what: user,
                    reason: "built-in or local texture".to_string(),
                });
                continue;
            };

            if let Some(target) = targets.get_mut(guid) {
                target.is_main |= is_main;
                target.used_by.push(user);
                continue;
            }
            if not_textures.contains(guid) {
                continue;
            }

            let (Some(path), Some(meta_path)) = (db.path_of(guid), db.meta_path_of(guid)) else {
                return Err(LazyVramError::asset_not_found(guid));
            };
            let meta = MetaFile::load(&meta_path)?;
            if !meta.is_texture() {
                let importer = meta.importer_name().unwrap_or("no importer");
                warn!(path = %path.display(), importer, "not imported as a texture");
                skipped.push(Skipped {
                    what: db.relative(path).display().to_string(),
                    reason: format!("imported by {}", importer),
                });
                not_textures.insert(guid.to_string());
                continue;
            }

            targets.insert(
                guid.to_string(),
                TextureTarget {
                    texture: TextureAsset {
                        guid: guid.to_string(),
                        path: path.to_path_buf(),
                        meta_path,
                    },
                    is_main,
                    used_by: vec![user],
                },
            );
        }
    }

    debug!(textures = targets.len(), skipped = skipped.len(), "resolved texture targets");
    Ok((targets.into_values().collect(), skipped))
}

/// Apply sizes and compression to every target through an importer
pub fn apply_settings<T: TextureImporter>(
    importer: &mut T,
    targets: &[TextureTarget],
    sizes: TextureSizes,
    compression: Compression,
) -> Result<()> {
    for target in targets {
        if let Some(size) = sizes.for_slot(target.is_main) {
            importer.set_max_size(&target.texture, size)?;
        }
        importer.set_compression(&target.texture, compression)?;
    }
    Ok(())
}

/// A patched `.meta` file waiting to be written
#[derive(Debug, Clone)]
pub struct StagedEdit {
    pub texture: TextureAsset,
    /// File text as read before patching
    pub original: String,
    pub content: String,
    pub changes: Vec<FieldChange>,
}

impl StagedEdit {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// `.meta` backed [`TextureImporter`]
#[derive(Debug, Default)]
pub struct MetaImportPlan {
    patches: IndexMap<String, (TextureAsset, ImporterPatch)>,
    include_overrides: bool,
}

impl MetaImportPlan {
    pub fn new(include_overrides: bool) -> Self {
        Self {
            patches: IndexMap::new(),
            include_overrides,
        }
    }

    fn patch_for(&mut self, texture: &TextureAsset) -> &mut ImporterPatch {
        let include_overrides = self.include_overrides;
        &mut self
            .patches
            .entry(texture.guid.clone())
            .or_insert_with(|| {
                (
                    texture.clone(),
                    ImporterPatch {
                        include_overrides,
                        ..ImporterPatch::default()
                    },
                )
            })
            .1
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Patch every `.meta` file in memory
    ///
    /// Fails on the first file that cannot be read or patched, before
    /// anything is written.
    pub fn stage(&self) -> Result<Vec<StagedEdit>> {
        self.patches
            .values()
            .filter(|(_, patch)| !patch.is_empty())
            .map(|(texture, patch)| {
                let meta = MetaFile::load(&texture.meta_path)?;
                if !meta.is_texture() {
                    return Err(LazyVramError::unsupported_asset(
                        &texture.path,
                        format!(
                            "imported by {} rather than TextureImporter",
                            meta.importer_name().unwrap_or("an unknown importer")
                        ),
                    ));
                }
                let (content, changes) = meta.patched(patch)?;
                Ok(StagedEdit {
                    texture: texture.clone(),
                    original: meta.content().to_string(),
                    content,
                    changes,
                })
            })
            .collect()
    }

    /// Write staged edits as one unit
    ///
    /// Every replacement is written and synced to a temp file beside its
    /// target first. Only then are the targets swapped in; if a swap fails,
    /// the files already replaced get their original text back.
    pub fn commit(edits: &[StagedEdit]) -> Result<usize> {
        let mut prepared = Vec::new();
        for edit in edits.iter().filter(|e| !e.is_noop()) {
            prepared.push((edit, temp_file_with(&edit.texture.meta_path, &edit.content)?));
        }

        let mut replaced: Vec<&StagedEdit> = Vec::with_capacity(prepared.len());
        for (edit, file) in prepared {
            if let Err(e) = file.persist(&edit.texture.meta_path) {
                restore(&replaced);
                return Err(LazyVramError::Io(e.error));
            }
            info!(path = %edit.texture.meta_path.display(), changes = edit.changes.len(), "updated importer");
            replaced.push(edit);
        }
        Ok(replaced.len())
    }
}

/// Put the pre-patch text back into already replaced files
fn restore(replaced: &[&StagedEdit]) {
    for edit in replaced.iter().rev() {
        let path = &edit.texture.meta_path;
        match temp_file_with(path, &edit.original)
            .and_then(|file| file.persist(path).map_err(|e| LazyVramError::Io(e.error)))
        {
            Ok(_) => warn!(path = %path.display(), "restored importer settings"),
            Err(e) => error!(path = %path.display(), error = %e, "could not restore importer settings"),
        }
    }
}

impl TextureImporter for MetaImportPlan {
    fn set_max_size(&mut self, texture: &TextureAsset, size: u32) -> Result<()> {
        self.patch_for(texture).max_texture_size = Some(size);
        Ok(())
    }

    fn set_compression(&mut self, texture: &TextureAsset, quality: Compression) -> Result<()> {
        let (mode, level, crunched) = quality.importer_values();
        let patch = self.patch_for(texture);
        patch.texture_compression = Some(mode);
        patch.compression_quality = Some(level);
        patch.crunched_compression = Some(crunched);
        Ok(())
    }
}

/// Synced temp file holding `content`, in the directory of `path`
fn temp_file_with(path: &Path, content: &str) -> Result<NamedTempFile> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(path) {
        file.as_file().set_permissions(metadata.permissions())?;
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{Preset, resolve};
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingImporter {
        calls: Vec<String>,
    }

    impl TextureImporter for RecordingImporter {
        fn set_max_size(&mut self, texture: &TextureAsset, size: u32) -> Result<()> {
            self.calls.push(format!("size {} {}", texture.guid, size));
            Ok(())
        }

        fn set_compression(&mut self, texture: &TextureAsset, quality: Compression) -> Result<()> {
            self.calls.push(format!("compress {} {:?}", texture.guid, quality));
            Ok(())
        }
    }

    fn target(guid: &str, is_main: bool) -> TextureTarget {
        TextureTarget {
            texture: TextureAsset {
                guid: guid.to_string(),
                path: PathBuf::from(format!("Assets/{}.png", guid)),
                meta_path: PathBuf::from(format!("Assets/{}.png.meta", guid)),
            },
            is_main,
            used_by: vec![],
        }
    }

    #[test]
    fn test_apply_main_and_other_sizes() {
        let mut importer = RecordingImporter::default();
        let sizes = resolve(Preset::High, 0, 0).unwrap();
        apply_settings(
            &mut importer,
            &[target("albedo", true), target("normal", false)],
            sizes,
            Compression::HighQuality,
        )
        .unwrap();

        assert_eq!(
            importer.calls,
            vec![
                "size albedo 1024",
                "compress albedo HighQuality",
                "size normal 512",
                "compress normal HighQuality",
            ]
        );
    }

    #[test]
    fn test_low_keeps_main_size() {
        let mut importer = RecordingImporter::default();
        let sizes = resolve(Preset::Low, 0, 0).unwrap();
        apply_settings(&mut importer, &[target("albedo", true)], sizes, Compression::Normal)
            .unwrap();
        assert_eq!(importer.calls, vec!["compress albedo Normal"]);
    }

    #[test]
    fn test_plan_merges_calls_per_texture() {
        let mut plan = MetaImportPlan::new(false);
        let albedo = target("albedo", true).texture;
        plan.set_max_size(&albedo, 2048).unwrap();
        plan.set_compression(&albedo, Compression::Normal).unwrap();
        assert_eq!(plan.len(), 1);

        let (_, patch) = &plan.patches["albedo"];
        assert_eq!(patch.max_texture_size, Some(2048));
        assert_eq!(patch.texture_compression, Some(1));
        assert_eq!(patch.crunched_compression, Some(true));
        assert!(!patch.include_overrides);
    }

    fn staged(meta_path: PathBuf, original: &str, content: &str) -> StagedEdit {
        StagedEdit {
            texture: TextureAsset {
                guid: "f00d".to_string(),
                path: meta_path.with_extension(""),
                meta_path,
            },
            original: original.to_string(),
            content: content.to_string(),
            changes: vec![FieldChange {
                scope: "TextureImporter".to_string(),
                key: "maxTextureSize".to_string(),
                old: Some("4096".to_string()),
                new: "1024".to_string(),
            }],
        }
    }

    #[test]
    fn test_commit_writes_all_edits() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.png.meta");
        let second = dir.path().join("b.png.meta");
        fs::write(&first, "old a").unwrap();
        fs::write(&second, "old b").unwrap();

        let written = MetaImportPlan::commit(&[
            staged(first.clone(), "old a", "new a"),
            staged(second.clone(), "old b", "new b"),
        ])
        .unwrap();
        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(&first).unwrap(), "new a");
        assert_eq!(fs::read_to_string(&second).unwrap(), "new b");
    }

    #[test]
    fn test_commit_failure_leaves_files_untouched() {
        let dir = TempDir::new().unwrap();
        let valid = dir.path().join("albedo.png.meta");
        fs::write(&valid, "maxTextureSize: 4096\n").unwrap();
        let unwritable = dir.path().join("missing").join("normal.png.meta");

        let result = MetaImportPlan::commit(&[
            staged(valid.clone(), "maxTextureSize: 4096\n", "maxTextureSize: 1024\n"),
            staged(unwritable, "", "maxTextureSize: 512\n"),
        ]);
        assert!(matches!(result, Err(LazyVramError::Io(_))));
        assert_eq!(fs::read_to_string(&valid).unwrap(), "maxTextureSize: 4096\n");
        // No temp files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_restore_puts_original_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("albedo.png.meta");
        fs::write(&path, "patched").unwrap();

        let edit = staged(path.clone(), "original", "patched");
        restore(&[&edit]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_compression_values() {
        assert_eq!(Compression::from_high_quality(true), Compression::HighQuality);
        assert_eq!(Compression::HighQuality.importer_values(), (2, 100, false));
        assert_eq!(Compression::Normal.importer_values(), (1, 50, true));
    }
}
