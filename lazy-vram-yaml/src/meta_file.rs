//! `.meta` importer files
//!
//! Every Unity asset has a sibling `.meta` file holding its GUID and its
//! importer settings. Unity reserializes these on every change and they
//! are usually under version control, so edits are made line by line:
//! only the values being changed are rewritten, every other byte stays
//! as it was.

use lazy_vram_core::{
    DEFAULT_TEXTURE_PLATFORM, LazyVramError, LineEnding, Result, class_names,
};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Texture importer values read from a `.meta` file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextureImporterSection {
    pub max_texture_size: Option<i64>,
    pub texture_compression: Option<i64>,
    pub compression_quality: Option<i64>,
    pub crunched_compression: Option<i64>,
    pub platform_settings: Vec<PlatformSetting>,
}

/// One `platformSettings` entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformSetting {
    pub build_target: String,
    pub max_texture_size: Option<i64>,
    pub texture_compression: Option<i64>,
    pub compression_quality: Option<i64>,
    pub crunched_compression: Option<i64>,
    pub overridden: Option<i64>,
}

impl TextureImporterSection {
    /// The `DefaultTexturePlatform` entry, if the file has one
    pub fn default_platform(&self) -> Option<&PlatformSetting> {
        self.platform_settings
            .iter()
            .find(|p| p.build_target == DEFAULT_TEXTURE_PLATFORM)
    }

    /// Max size Unity will use when no platform override applies
    pub fn effective_max_size(&self) -> Option<i64> {
        self.default_platform()
            .and_then(|p| p.max_texture_size)
            .or(self.max_texture_size)
    }

    /// Compression mode Unity will use when no platform override applies
    pub fn effective_compression(&self) -> Option<i64> {
        self.default_platform()
            .and_then(|p| p.texture_compression)
            .or(self.texture_compression)
    }
}

#[derive(Debug, Deserialize)]
struct MetaRoot {
    #[serde(rename = "TextureImporter")]
    texture_importer: Option<TextureImporterSection>,
}

/// Importer fields to rewrite; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImporterPatch {
    pub max_texture_size: Option<u32>,
    pub texture_compression: Option<i64>,
    pub compression_quality: Option<i64>,
    pub crunched_compression: Option<bool>,
    /// Also rewrite platform entries that override the default (`overridden: 1`)
    pub include_overrides: bool,
}

impl ImporterPatch {
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(size) = self.max_texture_size {
            fields.push(("maxTextureSize", size.to_string()));
        }
        if let Some(mode) = self.texture_compression {
            fields.push(("textureCompression", mode.to_string()));
        }
        if let Some(quality) = self.compression_quality {
            fields.push(("compressionQuality", quality.to_string()));
        }
        if let Some(crunched) = self.crunched_compression {
            fields.push(("crunchedCompression", u8::from(crunched).to_string()));
        }
        fields
    }
}

/// A single rewritten value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// `TextureImporter` for top-level fields, otherwise the build target
    pub scope: String,
    pub key: String,
    /// Previous value, `None` when the field had to be added
    pub old: Option<String>,
    pub new: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.old {
            Some(old) => write!(f, "{}.{}: {} -> {}", self.scope, self.key, old, self.new),
            None => write!(f, "{}.{}: (added) {}", self.scope, self.key, self.new),
        }
    }
}

/// A `.meta` file held as text
#[derive(Debug, Clone)]
pub struct MetaFile {
    path: Option<PathBuf>,
    content: String,
    newline: LineEnding,
}

/// Key/value line inside a YAML block
#[derive(Debug, Clone, Copy)]
struct FieldLine<'a> {
    indent: usize,
    /// Line starts a sequence item (`- key: value`)
    item: bool,
    /// Byte column where the key starts
    key_col: usize,
    key: &'a str,
    value: &'a str,
}

/// One `platformSettings` sequence item
#[derive(Debug, Clone, Copy)]
struct PlatformItem {
    start: usize,
    end: usize,
    field_indent: usize,
}

fn line_body(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

fn indent_of(body: &str) -> usize {
    body.len() - body.trim_start_matches(' ').len()
}

fn parse_field(body: &str) -> Option<FieldLine<'_>> {
    let indent = indent_of(body);
    let rest = &body[indent..];
    let (item, rest, key_col) = match rest.strip_prefix("- ") {
        Some(r) => (true, r, indent + 2),
        None => (false, rest, indent),
    };
    let colon = rest.find(':')?;
    let key = &rest[..colon];
    if key.is_empty() || key.contains([' ', '{', '[', '"', '\'']) {
        return None;
    }
    let after = &rest[colon + 1..];
    if !(after.is_empty() || after.starts_with(' ')) {
        return None;
    }
    Some(FieldLine {
        indent,
        item,
        key_col,
        key,
        value: after.trim(),
    })
}

/// Extract the asset GUID without parsing the whole file
pub fn scan_guid(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        line.strip_prefix("guid:")
            .map(|rest| rest.trim().to_string())
            .filter(|guid| !guid.is_empty())
    })
}

impl MetaFile {
    /// Read a `.meta` file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut meta = Self::from_content(content);
        meta.path = Some(path.to_path_buf());
        Ok(meta)
    }

    pub fn from_content<S: Into<String>>(content: S) -> Self {
        let content = content.into();
        let newline = LineEnding::detect(&content);
        Self {
            path: None,
            content,
            newline,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn guid(&self) -> Option<String> {
        scan_guid(&self.content)
    }

    /// Name of the importer section, e.g. `TextureImporter` or `ModelImporter`
    pub fn importer_name(&self) -> Option<&str> {
        self.content.lines().find_map(|line| {
            let field = parse_field(line_body(line))?;
            (field.indent == 0
                && !field.item
                && field.value.is_empty()
                && field.key.ends_with("Importer"))
            .then_some(field.key)
        })
    }

    /// Whether the asset is imported as a texture
    pub fn is_texture(&self) -> bool {
        self.importer_name() == Some(class_names::TEXTURE_IMPORTER)
    }

    /// Read the texture importer section
    ///
    /// Returns `Ok(None)` when the asset has a different importer.
    pub fn texture_importer(&self) -> Result<Option<TextureImporterSection>> {
        let root: MetaRoot = serde_yaml::from_str(&self.content).map_err(|e| {
            LazyVramError::parse(format!("{}: {}", self.display_path(), e))
        })?;
        Ok(root.texture_importer)
    }

    fn display_path(&self) -> String {
        self.path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<meta>".to_string())
    }

    /// Compute the patched text of this file
    ///
    /// Top-level `TextureImporter` fields are rewritten where they exist.
    /// The `DefaultTexturePlatform` entry gets every patched field, added
    /// after its `buildTarget` line when missing. Nothing is written to
    /// disk; the caller decides when to commit.
    pub fn patched(&self, patch: &ImporterPatch) -> Result<(String, Vec<FieldChange>)> {
        if !self.is_texture() {
            return Err(LazyVramError::unsupported_asset(
                self.display_path(),
                "no TextureImporter section",
            ));
        }

        let fields = patch.fields();
        let mut lines: Vec<String> = self
            .content
            .split_inclusive('\n')
            .map(str::to_string)
            .collect();
        let mut changes = Vec::new();
        let mut in_importer = false;
        let mut body_indent: Option<usize> = None;
        let mut touched_platform = false;

        let mut i = 0;
        while i < lines.len() {
            let body = line_body(&lines[i]).to_string();
            if body.trim().is_empty() {
                i += 1;
                continue;
            }
            let indent = indent_of(&body);
            let field = parse_field(&body);

            if indent == 0 {
                in_importer = field
                    .is_some_and(|f| !f.item && f.key == class_names::TEXTURE_IMPORTER);
                i += 1;
                continue;
            }
            if !in_importer {
                i += 1;
                continue;
            }

            let bi = *body_indent.get_or_insert(indent);
            match field {
                Some(f) if f.indent == bi && !f.item && f.key == "platformSettings" => {
                    let (next, touched) = self.patch_platform_settings(
                        &mut lines,
                        i + 1,
                        bi,
                        patch,
                        &fields,
                        &mut changes,
                    );
                    touched_platform |= touched;
                    i = next;
                    continue;
                }
                Some(f) if f.indent == bi && !f.item => {
                    if let Some((key, new)) = fields.iter().find(|(k, _)| *k == f.key) {
                        Self::rewrite_line(
                            &mut lines[i],
                            f,
                            new,
                            class_names::TEXTURE_IMPORTER,
                            key,
                            &mut changes,
                        );
                    }
                }
                _ => {}
            }
            i += 1;
        }

        if !touched_platform && changes.is_empty() && !fields.is_empty() {
            let has_any_field = self.content.lines().any(|line| {
                parse_field(line_body(line)).is_some_and(|f| fields.iter().any(|(k, _)| *k == f.key))
            });
            if !has_any_field {
                return Err(LazyVramError::unsupported_asset(
                    self.display_path(),
                    "texture importer has neither platform settings nor size fields",
                ));
            }
        }

        debug!(path = %self.display_path(), changes = changes.len(), "patched meta");
        Ok((lines.concat(), changes))
    }

    fn rewrite_line(
        line: &mut String,
        field: FieldLine<'_>,
        new_value: &str,
        scope: &str,
        key: &str,
        changes: &mut Vec<FieldChange>,
    ) {
        if field.value == new_value {
            return;
        }
        let body = line_body(line);
        let eol = line[body.len()..].to_string();
        let rewritten = format!("{}{}: {}{}", &body[..field.key_col], key, new_value, eol);
        changes.push(FieldChange {
            scope: scope.to_string(),
            key: key.to_string(),
            old: Some(field.value.to_string()),
            new: new_value.to_string(),
        });
        *line = rewritten;
    }

    /// Collect the sequence items of `platformSettings` starting at `start`
    fn platform_items(lines: &[String], start: usize, body_indent: usize) -> (Vec<PlatformItem>, usize) {
        let mut items: Vec<PlatformItem> = Vec::new();
        let mut dash_indent: Option<usize> = None;
        let mut j = start;

        while j < lines.len() {
            let body = line_body(&lines[j]);
            if body.trim().is_empty() {
                j += 1;
                continue;
            }
            let indent = indent_of(body);
            let is_dash = body[indent..].starts_with("- ");

            if indent < body_indent || (indent == body_indent && !is_dash) {
                break;
            }
            if is_dash && dash_indent.is_none_or(|d| d == indent) {
                dash_indent = Some(indent);
                if let Some(last) = items.last_mut() {
                    last.end = j;
                }
                items.push(PlatformItem {
                    start: j,
                    end: j + 1,
                    field_indent: indent + 2,
                });
            }
            j += 1;
        }
        if let Some(last) = items.last_mut() {
            last.end = j;
        }
        (items, j)
    }

    fn patch_platform_settings(
        &self,
        lines: &mut Vec<String>,
        start: usize,
        body_indent: usize,
        patch: &ImporterPatch,
        fields: &[(&'static str, String)],
        changes: &mut Vec<FieldChange>,
    ) -> (usize, bool) {
        let (items, end) = Self::platform_items(lines, start, body_indent);
        let mut inserted = 0;
        let mut touched = false;
        let mut item_changes: Vec<Vec<FieldChange>> = Vec::new();

        // Walk backwards so insertions keep earlier indices valid
        for item in items.iter().rev() {
            let mut build_target: Option<(usize, String)> = None;
            let mut overridden = false;
            let mut present: Vec<(usize, &'static str)> = Vec::new();

            for idx in item.start..item.end {
                let Some(f) = parse_field(line_body(&lines[idx])) else {
                    continue;
                };
                if f.key_col != item.field_indent {
                    continue;
                }
                match f.key {
                    "buildTarget" => build_target = Some((idx, f.value.to_string())),
                    "overridden" => overridden = f.value == "1",
                    key => {
                        if let Some((k, _)) = fields.iter().find(|(k, _)| *k == key) {
                            present.push((idx, *k));
                        }
                    }
                }
            }

            let Some((target_idx, target)) = build_target else {
                continue;
            };
            let is_default = target == DEFAULT_TEXTURE_PLATFORM;
            if !is_default && !(patch.include_overrides && overridden) {
                continue;
            }
            touched = true;

            let mut local = Vec::new();
            for &(idx, key) in &present {
                let body = line_body(&lines[idx]).to_string();
                if let Some(f) = parse_field(&body)
                    && let Some((_, new)) = fields.iter().find(|(k, _)| *k == key)
                {
                    Self::rewrite_line(&mut lines[idx], f, new, &target, key, &mut local);
                }
            }

            if is_default {
                let missing: Vec<_> = fields
                    .iter()
                    .filter(|(k, _)| !present.iter().any(|(_, p)| p == k))
                    .collect();
                for (offset, (key, new)) in missing.iter().enumerate() {
                    let line = format!(
                        "{}{}: {}{}",
                        " ".repeat(item.field_indent),
                        key,
                        new,
                        self.newline.as_str()
                    );
                    lines.insert(target_idx + 1 + offset, line);
                    local.push(FieldChange {
                        scope: target.clone(),
                        key: key.to_string(),
                        old: None,
                        new: new.clone(),
                    });
                }
                inserted += missing.len();
            }
            item_changes.push(local);
        }

        for local in item_changes.into_iter().rev() {
            changes.extend(local);
        }
        (end + inserted, touched)
    }
}
