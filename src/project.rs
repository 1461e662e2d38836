//! Unity project asset database
//!
//! Maps asset GUIDs to paths by reading every `.meta` file under the
//! project's `Assets` and `Packages` folders.

use crate::material::MaterialAsset;
use lazy_vram_core::{AssetRef, LazyVramError, Result};
use lazy_vram_yaml::scan_guid;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directories never scanned for assets
pub const DEFAULT_SKIP_DIRECTORIES: [&str; 7] =
    ["Library", "Temp", "Logs", "obj", "UserSettings", ".git", ".vs"];

/// GUID index over a Unity project
#[derive(Debug)]
pub struct AssetDatabase {
    root: PathBuf,
    guid_to_path: HashMap<String, PathBuf>,
    skip_directories: Vec<String>,
}

impl AssetDatabase {
    /// Index a Unity project rooted at `root`
    pub fn open<P: AsRef<Path>>(root: P, skip_directories: &[String]) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(LazyVramError::config(format!(
                "project directory does not exist: {}",
                root.display()
            )));
        }

        let mut db = Self {
            root: root.to_path_buf(),
            guid_to_path: HashMap::new(),
            skip_directories: skip_directories.to_vec(),
        };

        let scan_roots: Vec<PathBuf> = ["Assets", "Packages"]
            .iter()
            .map(|dir| root.join(dir))
            .filter(|dir| dir.is_dir())
            .collect();
        if scan_roots.is_empty() {
            warn!(root = %root.display(), "no Assets folder, indexing the whole directory");
            db.traverse_directory(root)?;
        } else {
            for dir in scan_roots {
                db.traverse_directory(&dir)?;
            }
        }

        info!(assets = db.guid_to_path.len(), "indexed project");
        Ok(db)
    }

    /// Recursively index `.meta` files
    fn traverse_directory(&mut self, dir: &Path) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| {
            LazyVramError::config(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;

        for entry in entries {
            let path = entry?.path();

            if path.is_dir() {
                let skipped = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| self.skip_directories.iter().any(|s| s == name));
                if !skipped {
                    self.traverse_directory(&path)?;
                }
            } else if path.extension().is_some_and(|ext| ext == "meta") {
                self.index_meta(&path);
            }
        }

        Ok(())
    }

    fn index_meta(&mut self, meta_path: &Path) {
        let content = match fs::read_to_string(meta_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %meta_path.display(), error = %e, "unreadable meta file");
                return;
            }
        };
        let Some(guid) = scan_guid(&content) else {
            debug!(path = %meta_path.display(), "meta file without guid");
            return;
        };

        let asset_path = meta_path.with_extension("");
        if let Some(previous) = self.guid_to_path.insert(guid.clone(), asset_path.clone()) {
            warn!(
                guid = %guid,
                first = %previous.display(),
                second = %asset_path.display(),
                "duplicate GUID in project"
            );
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.guid_to_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guid_to_path.is_empty()
    }

    /// Asset path for a GUID
    pub fn path_of(&self, guid: &str) -> Option<&Path> {
        self.guid_to_path.get(guid).map(PathBuf::as_path)
    }

    /// `.meta` path for a GUID
    pub fn meta_path_of(&self, guid: &str) -> Option<PathBuf> {
        self.path_of(guid).map(|path| {
            let mut meta = path.as_os_str().to_owned();
            meta.push(".meta");
            PathBuf::from(meta)
        })
    }

    /// Project-relative display form of a path
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Load the material a renderer slot points at
    ///
    /// Materials that live inside imported models (FBX sub-assets) cannot
    /// be read as YAML and are reported as unsupported.
    pub fn load_material(&self, reference: &AssetRef) -> Result<MaterialAsset> {
        let guid = reference.guid().ok_or_else(|| {
            LazyVramError::unity_format(format!(
                "material reference {} has no GUID",
                reference
            ))
        })?;
        let path = self
            .path_of(guid)
            .ok_or_else(|| LazyVramError::asset_not_found(guid))?;

        if path.extension().is_none_or(|ext| ext != "mat") {
            return Err(LazyVramError::unsupported_asset(
                path,
                "material is embedded in an imported asset; extract it to a .mat file first",
            ));
        }

        MaterialAsset::load(path)
    }
}
