//! Avatar material collection

use crate::scene::SceneHost;
use indexmap::IndexSet;
use lazy_vram_core::{LazyVramError, Result};
use tracing::{debug, info};

/// Options for [`collect`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectOptions {
    /// Take every material slot instead of only the shared material
    pub all_material_slots: bool,
}

/// Gather the distinct materials used by renderers under an avatar root
///
/// The root must be present, active and carry an avatar descriptor.
/// Materials shared by several renderers appear once, in the order they
/// were first seen.
pub fn collect<H: SceneHost>(
    host: &H,
    root: Option<H::Node>,
    options: CollectOptions,
) -> Result<IndexSet<H::Material>> {
    let Some(root) = root else {
        return Err(LazyVramError::missing_avatar(
            "no avatar root selected; pick the avatar root GameObject",
        ));
    };
    if !host.is_active(root) {
        return Err(LazyVramError::missing_avatar(
            "avatar is currently not active in the scene, set the model as active",
        ));
    }
    if !host.has_avatar_marker(root) {
        return Err(LazyVramError::missing_avatar(
            "avatar contains no avatar descriptor",
        ));
    }
    debug!("avatar validation successful");

    let renderers = host.renderers_under(root);
    let mut materials = IndexSet::new();
    for renderer in &renderers {
        if options.all_material_slots {
            materials.extend(host.materials_of(renderer));
        } else if let Some(material) = host.material_of(renderer) {
            materials.insert(material);
        }
    }

    info!(
        renderers = renderers.len(),
        materials = materials.len(),
        "collected avatar materials"
    );
    Ok(materials)
}
