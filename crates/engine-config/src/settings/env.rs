//! `${NAME}` and `${NAME:-default}` substitution inside settings documents.
//!
//! Only string values are rewritten; object keys are left alone. A default
//! applies when the variable is unset or empty.

use crate::settings::error::SettingsError;
use serde_json::Value;

const OPEN: &str = "${";
const DEFAULT_SEPARATOR: &str = ":-";

pub fn interpolate<F>(value: &mut Value, lookup: &F) -> Result<(), SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(s) if s.contains(OPEN) => {
            *s = interpolate_str(s, lookup)?;
        }
        Value::Array(items) => {
            for item in items {
                interpolate(item, lookup)?;
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                interpolate(item, lookup)?;
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn interpolate_str<F>(input: &str, lookup: &F) -> Result<String, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        let end = after
            .find('}')
            .ok_or_else(|| SettingsError::UnterminatedReference(input.to_string()))?;

        let reference = &after[..end];
        let resolved = match reference.split_once(DEFAULT_SEPARATOR) {
            Some((name, default)) => lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string()),
            None => lookup(reference)
                .ok_or_else(|| SettingsError::UnresolvedVariable(reference.to_string()))?,
        };
        out.push_str(&resolved);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Lookup backed by the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
