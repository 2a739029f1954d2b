//! `${env:VAR}` interpolation for repository credentials.
//!
//! Values come from `.jvmdeps.env` next to the configuration file first,
//! then from the process environment.

use std::collections::BTreeMap;
use std::path::Path;

/// Name of the optional secrets file next to `jvmdeps.toml`.
pub const ENV_FILE_NAME: &str = ".jvmdeps.env";

/// Load a shell-style `KEY=value` file. A missing file yields an empty map.
pub fn load_env_file(path: &Path) -> miette::Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    if !path.is_file() {
        return Ok(map);
    }
    let content = std::fs::read_to_string(path).map_err(jvmdeps_util::errors::JvmDepsError::Io)?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(map)
}

/// Replace every `${env:VAR}` in `input`. Unknown variables become empty.
pub fn interpolate(input: &str, overrides: &BTreeMap<String, String>) -> String {
    let mut result = input.to_string();
    let mut from = 0;
    while let Some(rel) = result[from..].find("${env:") {
        let start = from + rel;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let end = start + end;
        let key = &result[start + 6..end];
        let value = overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
            .unwrap_or_default();
        result.replace_range(start..=end, &value);
        from = start + value.len();
    }
    result
}
