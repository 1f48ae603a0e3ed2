//! Layered config fragment merging
//!
//! Fragments are applied in order on top of an empty mapping. For a key
//! already present, two arrays are concatenated; any other later value
//! replaces the earlier one, except `null` which leaves it untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::convert::yaml_to_value;
use crate::error::{Error, Result};

/// Extension of fragment files, matching the node's `config.d/*.yaml` glob.
const FRAGMENT_EXTENSION: &str = "yaml";

/// Merge a single fragment into the accumulator.
pub fn merge_into(acc: &mut Map<String, Value>, fragment: Map<String, Value>) {
    for (key, value) in fragment {
        match acc.get_mut(&key) {
            Some(_) if value.is_null() => {}
            Some(Value::Array(existing)) if value.is_array() => {
                if let Value::Array(mut extra) = value {
                    existing.append(&mut extra);
                }
            }
            _ => {
                acc.insert(key, value);
            }
        }
    }
}

/// Merge fragments in order into a single mapping.
///
/// `null` fragments (empty documents) are skipped. Any other non-mapping
/// fragment is rejected.
pub fn merge_fragments<I>(fragments: I) -> Result<Value>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut acc = Map::new();
    for (name, fragment) in fragments {
        match fragment {
            Value::Object(map) => merge_into(&mut acc, map),
            Value::Null => tracing::debug!(%name, "Skipping empty fragment"),
            other => {
                return Err(Error::NotAMapping {
                    name,
                    found: kind(&other).to_string(),
                });
            }
        }
    }
    Ok(Value::Object(acc))
}

/// Merge every fragment file in `dir`, in lexicographic filename order.
pub fn merge_directory(dir: &Path) -> Result<Value> {
    let mut fragments = Vec::new();
    for path in fragment_paths(dir)? {
        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let value = if content.trim().is_empty() {
            Value::Null
        } else {
            yaml_to_value(&content)?
        };
        tracing::debug!(path = %path.display(), "Loaded config fragment");
        fragments.push((path.display().to_string(), value));
    }
    merge_fragments(fragments)
}

fn fragment_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        let is_fragment = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == FRAGMENT_EXTENSION);
        if is_fragment {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}
