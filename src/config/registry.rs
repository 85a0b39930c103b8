//! Windows registry entry configuration loading (`registry.toml`).
//!
//! Each top-level section names a key `path`, an optional `min_build`
//! (Windows build number below which the section does not apply) and a
//! `values` table.  Plain TOML strings become `REG_SZ`, integers
//! `REG_DWORD` and booleans `REG_DWORD` 0/1; an inline table
//! `{ type = "dword", value = "0x0E" }` states the type explicitly.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::toml_loader;
use crate::error::ConfigError;
use crate::reconcile::ValueKind;

/// A Windows registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Section name in `registry.toml`.
    pub section: String,
    /// Registry key path (e.g., `HKCU\Control Panel\International`).
    pub key_path: String,
    /// Value name.
    pub value_name: String,
    /// Value data as text.
    pub value_data: String,
    /// Comparison and storage type.
    pub kind: ValueKind,
    /// Minimum Windows build the value applies to.
    pub min_build: Option<u32>,
}

/// TOML registry section with path and values.
#[derive(Debug, Deserialize)]
struct RegistrySection {
    path: String,
    #[serde(default)]
    min_build: Option<u32>,
    #[serde(default)]
    values: BTreeMap<String, toml::Value>,
}

/// Load registry settings from `registry.toml`.
///
/// Sections and values are returned in name order.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<Vec<RegistryEntry>, ConfigError> {
    let config: BTreeMap<String, RegistrySection> = toml_loader::load_config(path)?;

    Ok(config
        .into_iter()
        .flat_map(|(section_name, section)| {
            let RegistrySection {
                path: key_path,
                min_build,
                values,
            } = section;
            values.into_iter().map(move |(name, value)| {
                let (kind, value_data) = typed_value(&value);
                RegistryEntry {
                    section: section_name.clone(),
                    key_path: key_path.clone(),
                    value_name: name,
                    value_data,
                    kind,
                    min_build,
                }
            })
        })
        .collect())
}

/// Determine the kind and textual data of a TOML value.
fn typed_value(value: &toml::Value) -> (ValueKind, String) {
    match value {
        toml::Value::String(s) => (ValueKind::String, s.clone()),
        toml::Value::Integer(i) => (ValueKind::IntegerFlag, i.to_string()),
        toml::Value::Boolean(b) => (ValueKind::Boolean, if *b { "1" } else { "0" }.to_string()),
        toml::Value::Table(t) => {
            let data = t.get("value").map_or_else(String::new, scalar_to_string);
            let kind = match t.get("type").and_then(toml::Value::as_str) {
                Some("dword") => ValueKind::IntegerFlag,
                Some("bool") => ValueKind::Boolean,
                _ => ValueKind::String,
            };
            (kind, data)
        }
        _ => (ValueKind::String, value.to_string()),
    }
}

fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
        other => other.to_string(),
    }
}
