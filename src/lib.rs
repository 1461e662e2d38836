//! LazyVRAM
//!
//! Batch texture import optimizer for Unity avatars. Picks a size preset,
//! collects the materials an avatar's renderers use, and rewrites the
//! `TextureImporter` settings of every texture those materials reference.
//!
//! # Examples
//!
//! ```rust,no_run
//! use lazy_vram::{OptimizeRequest, Settings, optimize};
//!
//! let settings = Settings::default();
//! let mut request = OptimizeRequest::from_settings(
//!     "MyProject".into(),
//!     "Assets/Avatar.prefab".into(),
//!     &settings,
//! );
//! request.dry_run = true;
//!
//! let report = optimize(&request, &settings)?;
//! for edit in report.changed() {
//!     println!("{}: {} changes", edit.texture.path.display(), edit.changes.len());
//! }
//!
//! # Ok::<(), lazy_vram::LazyVramError>(())
//! ```

// Re-export from core and YAML crates
pub use lazy_vram_core::{AssetRef, LazyVramError, Result, UnityClass, UnityValue, constants::*};
pub use lazy_vram_yaml::{FieldChange, MetaFile, YamlDocument};

pub mod applier;
pub mod collector;
pub mod config;
pub mod material;
pub mod optimizer;
pub mod preset;
pub mod project;
pub mod scene;

pub use applier::{Compression, TextureAsset, TextureImporter};
pub use collector::{CollectOptions, collect};
pub use config::Settings;
pub use optimizer::{OptimizeReport, OptimizeRequest, optimize};
pub use preset::{Preset, TextureSizes, resolve};
pub use project::AssetDatabase;
pub use scene::{PrefabScene, SceneHost, SceneOptions};
