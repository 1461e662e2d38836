//! Unity YAML loader based on serde_yaml
//!
//! Unity files are multi-document YAML streams whose document headers
//! carry Unity tags (`--- !u!137 &1234 stripped`). Those headers are not
//! something serde_yaml can round-trip, so the loader first rewrites each
//! header into plain `---` and smuggles the class ID, anchor and trailing
//! data into the class body as reserved keys. GUID values are quoted on
//! the way through so hex GUIDs such as `0000000000000000e000000000000000`
//! stay strings instead of resolving to YAML numbers.

use crate::Result;
use indexmap::IndexMap;
use std::borrow::Cow;
use serde::Deserialize;
use serde_yaml::Value;
use std::io::Read;
use tracing::{debug, warn};
use lazy_vram_core::{LazyVramError, UnityClass, UnityValue};

const CLASS_ID_KEY: &str = "__unity_class_id__";
const ANCHOR_KEY: &str = "__unity_anchor__";
const EXTRA_KEY: &str = "__unity_extra__";

/// Parsed `--- !u!ID &anchor extra` header
#[derive(Debug, Clone, PartialEq, Eq)]
struct DocumentHeader {
    class_id: i32,
    anchor: String,
    extra: String,
}

/// Wrap bare `guid:` values in double quotes
///
/// Handles block (`guid: abc`) and flow (`{fileID: 1, guid: abc, type: 2}`)
/// forms. Values that are not plain hex tokens are left alone.
pub(crate) fn quote_guids(line: &str) -> Cow<'_, str> {
    const KEY: &str = "guid: ";
    if !line.contains(KEY) {
        return Cow::Borrowed(line);
    }

    let mut out = String::with_capacity(line.len() + 4);
    let mut rest = line;
    while let Some(pos) = rest.find(KEY) {
        let key_start_ok = rest[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'));
        let value_start = pos + KEY.len();
        out.push_str(&rest[..value_start]);
        rest = &rest[value_start..];

        let token_len = rest
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(rest.len());
        let token_ends = rest[token_len..]
            .chars()
            .next()
            .is_none_or(|c| c == ',' || c == '}' || c.is_whitespace());
        if key_start_ok && token_len > 0 && token_ends {
            out.push('"');
            out.push_str(&rest[..token_len]);
            out.push('"');
            rest = &rest[token_len..];
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Unity YAML loader based on serde_yaml
#[derive(Debug, Default)]
pub struct SerdeUnityLoader;

impl SerdeUnityLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load Unity YAML from a reader
    pub fn load_from_reader<R: Read>(&self, mut reader: R) -> Result<Vec<UnityClass>> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| LazyVramError::parse(format!("Failed to read input: {}", e)))?;

        self.load_from_str(&content)
    }

    /// Load Unity YAML from a string
    pub fn load_from_str(&self, yaml_str: &str) -> Result<Vec<UnityClass>> {
        let processed_content = self.preprocess_unity_yaml(yaml_str);

        let documents: Vec<Value> = serde_yaml::Deserializer::from_str(&processed_content)
            .map(Value::deserialize)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| LazyVramError::parse(format!("YAML parsing error: {}", e)))?;

        let mut unity_classes = Vec::with_capacity(documents.len());
        for (doc_index, document) in documents.iter().enumerate() {
            match self.convert_document_to_unity_class(document, doc_index) {
                Ok(unity_class) => unity_classes.push(unity_class),
                Err(e) => {
                    // One bad object should not hide the rest of the file
                    warn!(doc_index, error = %e, "skipping unconvertible document");
                }
            }
        }

        debug!(objects = unity_classes.len(), "loaded unity yaml");
        Ok(unity_classes)
    }

    /// Rewrite Unity document headers into plain YAML
    fn preprocess_unity_yaml(&self, content: &str) -> String {
        let mut processed = String::with_capacity(content.len() + content.len() / 8);
        let mut current_header: Option<DocumentHeader> = None;

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.starts_with("---") {
                match Self::parse_unity_document_header(trimmed) {
                    Some(header) => {
                        current_header = Some(header);
                        processed.push_str("---\n");
                    }
                    None => {
                        current_header = None;
                        processed.push_str(line);
                        processed.push('\n');
                    }
                }
                continue;
            }

            // First top-level key after a Unity header is the class name
            if !line.starts_with(' ')
                && trimmed.ends_with(':')
                && let Some(header) = current_header.take()
            {
                processed.push_str(line);
                processed.push('\n');
                processed.push_str(&format!("  {}: {}\n", CLASS_ID_KEY, header.class_id));
                processed.push_str(&format!("  {}: \"{}\"\n", ANCHOR_KEY, header.anchor));
                if !header.extra.is_empty() {
                    processed.push_str(&format!("  {}: \"{}\"\n", EXTRA_KEY, header.extra));
                }
                continue;
            }

            processed.push_str(&quote_guids(line));
            processed.push('\n');
        }

        processed
    }

    /// Parse Unity document header like "--- !u!1 &100100 stripped"
    fn parse_unity_document_header(line: &str) -> Option<DocumentHeader> {
        let mut class_id = None;
        let mut anchor = "0".to_string();
        let mut extra = Vec::new();

        for part in line.split_whitespace().skip(1) {
            if let Some(stripped) = part.strip_prefix("!u!") {
                class_id = stripped.parse::<i32>().ok();
            } else if let Some(stripped) = part.strip_prefix('&') {
                anchor = stripped.to_string();
            } else {
                extra.push(part);
            }
        }

        class_id.map(|class_id| DocumentHeader {
            class_id,
            anchor,
            extra: extra.join(" "),
        })
    }

    /// Convert a YAML document to UnityClass
    fn convert_document_to_unity_class(
        &self,
        document: &Value,
        doc_index: usize,
    ) -> Result<UnityClass> {
        let Value::Mapping(mapping) = document else {
            let mut unity_class =
                UnityClass::new(0, "Scalar".to_string(), format!("doc_{}", doc_index));
            unity_class.set("value".to_string(), Self::convert_value(document)?);
            return Ok(unity_class);
        };

        let Some((class_key, class_value)) = mapping.iter().next() else {
            return Ok(UnityClass::new(
                0,
                "Unknown".to_string(),
                format!("doc_{}", doc_index),
            ));
        };

        let mut class_id = 0;
        let mut anchor = format!("doc_{}", doc_index);
        let mut extra = String::new();
        let mut properties = IndexMap::new();

        if let Value::Mapping(class_props) = class_value {
            for (key, value) in class_props {
                let Value::String(key_str) = key else {
                    continue;
                };
                match key_str.as_str() {
                    CLASS_ID_KEY => {
                        if let Some(id) = value.as_i64() {
                            class_id = id as i32;
                        }
                    }
                    ANCHOR_KEY => {
                        if let Some(a) = value.as_str() {
                            anchor = a.to_string();
                        }
                    }
                    EXTRA_KEY => {
                        if let Some(e) = value.as_str() {
                            extra = e.to_string();
                        }
                    }
                    _ => {
                        properties.insert(key_str.clone(), Self::convert_value(value)?);
                    }
                }
            }
        } else if !class_value.is_null() {
            properties.insert("value".to_string(), Self::convert_value(class_value)?);
        }

        let mut unity_class = match class_key {
            Value::String(name) => UnityClass::new(class_id, name.clone(), anchor),
            _ => UnityClass::from_class_id(class_id, anchor),
        };
        unity_class.extra_anchor_data = extra;
        for (key, value) in properties {
            unity_class.set(key, value);
        }

        Ok(unity_class)
    }

    /// Convert serde_yaml Value to UnityValue
    pub(crate) fn convert_value(value: &Value) -> Result<UnityValue> {
        Ok(match value {
            Value::Null => UnityValue::Null,
            Value::Bool(b) => UnityValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    UnityValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    UnityValue::Float(f)
                } else {
                    UnityValue::String(n.to_string())
                }
            }
            Value::String(s) => UnityValue::String(s.clone()),
            Value::Sequence(seq) => UnityValue::Array(
                seq.iter()
                    .map(Self::convert_value)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Mapping(mapping) => {
                let mut object = IndexMap::with_capacity(mapping.len());
                for (k, v) in mapping {
                    let key = match k {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        other => {
                            return Err(LazyVramError::unity_format(format!(
                                "unsupported mapping key {:?}",
                                other
                            )));
                        }
                    };
                    object.insert(key, Self::convert_value(v)?);
                }
                UnityValue::Object(object)
            }
            Value::Tagged(tagged) => Self::convert_value(&tagged.value)?,
        })
    }
}
