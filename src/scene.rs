//! Scene graph access
//!
//! [`SceneHost`] is the narrow view of a scene the material collector
//! needs. [`PrefabScene`] implements it over a Unity YAML prefab or scene
//! by following `GameObject` → `Transform` → `m_Children` references.

use lazy_vram_core::{
    AssetRef, LazyVramError, Result, UnityClass, UnityDocument, UnityValue, class_ids,
    class_names,
};
use lazy_vram_yaml::YamlDocument;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::path::Path;
use tracing::{debug, warn};

/// Scene graph operations used to find an avatar's materials
pub trait SceneHost {
    type Node: Copy;
    type Renderer;
    type Material: Clone + Eq + Hash;

    /// The node itself is active (`activeSelf`)
    fn is_active(&self, node: Self::Node) -> bool;

    /// The node carries an avatar descriptor component
    fn has_avatar_marker(&self, node: Self::Node) -> bool;

    /// Renderer components on the node and its descendants
    fn renderers_under(&self, node: Self::Node) -> Vec<Self::Renderer>;

    /// The renderer's shared material, `None` for an empty slot
    fn material_of(&self, renderer: &Self::Renderer) -> Option<Self::Material>;

    /// Every assigned material slot of the renderer
    fn materials_of(&self, renderer: &Self::Renderer) -> Vec<Self::Material> {
        self.material_of(renderer).into_iter().collect()
    }
}

/// How a [`PrefabScene`] interprets the document
#[derive(Debug, Clone)]
pub struct SceneOptions {
    /// Component class names treated as renderers
    pub renderer_classes: Vec<String>,
    /// Walk into inactive descendants
    pub include_inactive: bool,
    /// `m_Script` GUIDs that identify an avatar descriptor
    pub descriptor_script_guids: Vec<String>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            renderer_classes: vec![class_names::SKINNED_MESH_RENDERER.to_string()],
            include_inactive: false,
            descriptor_script_guids: vec![lazy_vram_core::VRC_AVATAR_DESCRIPTOR_GUID.to_string()],
        }
    }
}

/// Fields only an avatar descriptor serializes
const DESCRIPTOR_SIGNATURE: [&str; 2] = ["ViewPosition", "customExpressions"];

/// A prefab or scene loaded from Unity YAML
#[derive(Debug)]
pub struct PrefabScene {
    doc: YamlDocument,
    options: SceneOptions,
    by_file_id: HashMap<i64, usize>,
}

impl PrefabScene {
    /// Load a `.prefab` or `.unity` file
    pub fn load<P: AsRef<Path>>(path: P, options: SceneOptions) -> Result<Self> {
        let doc = YamlDocument::load_yaml(path)?;
        Ok(Self::from_document(doc, options))
    }

    pub fn from_document(doc: YamlDocument, options: SceneOptions) -> Self {
        let by_file_id = doc
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.file_id().map(|id| (id, index)))
            .collect();
        Self {
            doc,
            options,
            by_file_id,
        }
    }

    pub fn document(&self) -> &YamlDocument {
        &self.doc
    }

    /// Look up an object by local fileID
    pub fn object(&self, file_id: i64) -> Option<&UnityClass> {
        self.by_file_id
            .get(&file_id)
            .map(|&index| &self.doc.entries()[index])
    }

    fn resolve(&self, reference: &AssetRef) -> Option<&UnityClass> {
        if reference.is_null() || !reference.is_local() {
            return None;
        }
        self.object(reference.file_id)
    }

    /// Components attached to a GameObject
    ///
    /// Handles both `- component: {fileID: N}` and the older
    /// `- 4: {fileID: N}` layout.
    pub fn components(&self, game_object: i64) -> Vec<&UnityClass> {
        let Some(go) = self.object(game_object) else {
            return Vec::new();
        };
        go.get("m_Component")
            .and_then(UnityValue::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let reference = entry
                            .as_object()
                            .and_then(|obj| obj.values().next())
                            .and_then(AssetRef::from_value)?;
                        self.resolve(&reference)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn transform_of(&self, game_object: i64) -> Option<&UnityClass> {
        self.components(game_object).into_iter().find(|c| {
            c.class_id == class_ids::TRANSFORM
                || c.class_id == class_ids::RECT_TRANSFORM
                || c.class_name == class_names::TRANSFORM
                || c.class_name == class_names::RECT_TRANSFORM
        })
    }

    /// GameObjects of the transform's direct children
    fn children(&self, game_object: i64) -> Vec<i64> {
        let Some(transform) = self.transform_of(game_object) else {
            return Vec::new();
        };
        transform
            .references("m_Children")
            .iter()
            .filter_map(|child| {
                let Some(child_transform) = self.resolve(child) else {
                    debug!(child = %child, "child transform not in document");
                    return None;
                };
                if child_transform.is_stripped() {
                    debug!(child = %child, "skipping nested prefab placeholder");
                    return None;
                }
                child_transform
                    .reference("m_GameObject")
                    .filter(|r| !r.is_null())
                    .map(|r| r.file_id)
            })
            .collect()
    }

    /// GameObjects whose transform has no parent
    pub fn root_objects(&self) -> Vec<i64> {
        self.doc
            .entries()
            .iter()
            .filter(|e| e.class_name == class_names::GAME_OBJECT && !e.is_stripped())
            .filter_map(|go| {
                let id = go.file_id()?;
                let transform = self.transform_of(id)?;
                transform
                    .reference("m_Father")
                    .is_none_or(|father| father.is_null())
                    .then_some(id)
            })
            .collect()
    }

    /// Find the avatar root GameObject
    ///
    /// `selector` is a GameObject name or a fileID. Without a selector the
    /// single root object is used, or the single root carrying an avatar
    /// descriptor. Returns `Ok(None)` when nothing matches.
    pub fn find_avatar_root(&self, selector: Option<&str>) -> Result<Option<i64>> {
        if let Some(selector) = selector {
            let selector = selector.trim();
            if let Ok(file_id) = selector.parse::<i64>()
                && self
                    .object(file_id)
                    .is_some_and(|o| o.class_name == class_names::GAME_OBJECT)
            {
                return Ok(Some(file_id));
            }

            let matches: Vec<&UnityClass> = self
                .doc
                .filter(Some(&[class_names::GAME_OBJECT]), None)
                .into_iter()
                .filter(|go| go.name() == Some(selector))
                .collect();
            return match matches.as_slice() {
                [] => Ok(None),
                [only] => Ok(only.file_id()),
                many => Err(LazyVramError::missing_avatar(format!(
                    "{} GameObjects are named '{}'; select one by fileID ({})",
                    many.len(),
                    selector,
                    many.iter()
                        .map(|go| go.anchor.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))),
            };
        }

        let roots = self.root_objects();
        if roots.len() <= 1 {
            return Ok(roots.first().copied());
        }

        let marked: Vec<i64> = roots
            .iter()
            .copied()
            .filter(|&id| self.has_avatar_marker(id))
            .collect();
        match marked.as_slice() {
            [only] => Ok(Some(*only)),
            _ => Err(LazyVramError::missing_avatar(format!(
                "document has {} root objects; select the avatar by name",
                roots.len()
            ))),
        }
    }

    /// Display name of a GameObject for messages
    pub fn name_of(&self, game_object: i64) -> String {
        self.object(game_object)
            .and_then(UnityClass::name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("&{}", game_object))
    }

    fn is_descriptor(&self, behaviour: &UnityClass) -> bool {
        if let Some(script) = behaviour.reference("m_Script")
            && let Some(guid) = script.guid()
            && self
                .options
                .descriptor_script_guids
                .iter()
                .any(|g| g.eq_ignore_ascii_case(guid))
        {
            return true;
        }
        DESCRIPTOR_SIGNATURE
            .iter()
            .all(|field| behaviour.has_property(field))
    }
}

impl SceneHost for PrefabScene {
    type Node = i64;
    type Renderer = i64;
    type Material = AssetRef;

    fn is_active(&self, node: i64) -> bool {
        self.object(node)
            .and_then(|go| go.get("m_IsActive"))
            .and_then(UnityValue::as_bool)
            .unwrap_or(false)
    }

    fn has_avatar_marker(&self, node: i64) -> bool {
        self.components(node)
            .into_iter()
            .filter(|c| {
                c.class_id == class_ids::MONO_BEHAVIOUR || c.class_name == class_names::MONO_BEHAVIOUR
            })
            .any(|behaviour| self.is_descriptor(behaviour))
    }

    fn renderers_under(&self, node: i64) -> Vec<i64> {
        let mut renderers = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![node];

        while let Some(game_object) = stack.pop() {
            if !visited.insert(game_object) {
                warn!(game_object, "transform hierarchy loops back on itself");
                continue;
            }
            if game_object != node && !self.options.include_inactive && !self.is_active(game_object)
            {
                continue;
            }

            renderers.extend(
                self.components(game_object)
                    .into_iter()
                    .filter(|c| self.options.renderer_classes.contains(&c.class_name))
                    .filter_map(UnityClass::file_id),
            );

            // Reverse so children are visited in document order
            stack.extend(self.children(game_object).into_iter().rev());
        }

        renderers
    }

    fn material_of(&self, renderer: &i64) -> Option<AssetRef> {
        self.object(*renderer)?
            .references("m_Materials")
            .into_iter()
            .next()
            .filter(|m| !m.is_null())
    }

    fn materials_of(&self, renderer: &i64) -> Vec<AssetRef> {
        self.object(*renderer)
            .map(|r| {
                r.references("m_Materials")
                    .into_iter()
                    .filter(|m| !m.is_null())
                    .collect()
            })
            .unwrap_or_default()
    }
}
