//! One optimize run, from avatar prefab to rewritten `.meta` files

use crate::applier::{
    Compression, MetaImportPlan, Skipped, StagedEdit, TextureTarget, apply_settings,
    texture_targets,
};
use crate::collector::collect;
use crate::config::Settings;
use crate::preset::{Preset, TextureSizes, resolve};
use crate::project::AssetDatabase;
use crate::scene::PrefabScene;
use lazy_vram_core::{AssetRef, LazyVramError, Result};
use std::path::PathBuf;
use tracing::info;

/// Everything one optimize run needs
#[derive(Debug, Clone)]
pub struct OptimizeRequest {
    pub project_root: PathBuf,
    /// Prefab or scene holding the avatar
    pub avatar_file: PathBuf,
    /// Avatar root by name or fileID
    pub avatar: Option<String>,
    pub preset: Preset,
    pub custom_main: u32,
    pub custom_other: u32,
    pub compression: Compression,
    pub dry_run: bool,
}

impl OptimizeRequest {
    /// Request with preset, sizes and compression taken from settings
    pub fn from_settings(
        project_root: PathBuf,
        avatar_file: PathBuf,
        settings: &Settings,
    ) -> Self {
        Self {
            project_root,
            avatar_file,
            avatar: None,
            preset: settings.preset,
            custom_main: settings.custom_main_size,
            custom_other: settings.custom_other_size,
            compression: Compression::from_high_quality(settings.high_quality_compression),
            dry_run: false,
        }
    }

    /// Avatar file resolved against the project root
    pub fn avatar_path(&self) -> PathBuf {
        if self.avatar_file.is_absolute() {
            self.avatar_file.clone()
        } else {
            self.project_root.join(&self.avatar_file)
        }
    }
}

/// Outcome of an optimize run
#[derive(Debug, Clone)]
pub struct OptimizeReport {
    pub avatar: String,
    pub sizes: TextureSizes,
    pub compression: Compression,
    pub materials: Vec<AssetRef>,
    pub targets: Vec<TextureTarget>,
    pub skipped: Vec<Skipped>,
    pub edits: Vec<StagedEdit>,
    /// Files written; zero on a dry run
    pub written: usize,
    pub dry_run: bool,
}

impl OptimizeReport {
    /// Edits that change at least one value
    pub fn changed(&self) -> impl Iterator<Item = &StagedEdit> {
        self.edits.iter().filter(|e| !e.is_noop())
    }
}

/// Load and validate the avatar, returning its materials
pub fn avatar_materials(
    request: &OptimizeRequest,
    settings: &Settings,
) -> Result<(String, Vec<AssetRef>)> {
    let scene = PrefabScene::load(request.avatar_path(), settings.scene_options())?;
    let root = scene.find_avatar_root(request.avatar.as_deref())?;
    if root.is_none()
        && let Some(selector) = &request.avatar
    {
        return Err(LazyVramError::missing_avatar(format!(
            "no GameObject named '{}' in {}",
            selector,
            request.avatar_file.display()
        )));
    }

    let materials = collect(&scene, root, settings.collect_options())?;
    let name = root.map(|id| scene.name_of(id)).unwrap_or_default();
    Ok((name, materials.into_iter().collect()))
}

/// Resolve, collect, plan and (unless dry-running) write
///
/// Every `.meta` file is patched in memory before the first one is
/// written, so any failure leaves the project untouched.
pub fn optimize(request: &OptimizeRequest, settings: &Settings) -> Result<OptimizeReport> {
    let sizes = resolve(request.preset, request.custom_main, request.custom_other)?;
    let (avatar, materials) = avatar_materials(request, settings)?;
    info!(avatar = %avatar, preset = %request.preset, sizes = %sizes, "optimizing avatar");

    let db = AssetDatabase::open(&request.project_root, &settings.skip_directories)?;
    let (targets, skipped) = texture_targets(&db, &materials, &settings.main_texture_slots)?;

    let mut plan = MetaImportPlan::new(settings.include_platform_overrides);
    apply_settings(&mut plan, &targets, sizes, request.compression)?;
    let edits = plan.stage()?;

    let written = if request.dry_run {
        info!(files = edits.iter().filter(|e| !e.is_noop()).count(), "dry run, nothing written");
        0
    } else {
        MetaImportPlan::commit(&edits)?
    };

    Ok(OptimizeReport {
        avatar,
        sizes,
        compression: request.compression,
        materials,
        targets,
        skipped,
        edits,
        written,
        dry_run: request.dry_run,
    })
}
