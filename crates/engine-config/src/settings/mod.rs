//! Import settings files.
//!
//! A settings file is a JSON document describing one import. String values
//! may reference environment variables, which are substituted before the
//! document is deserialized. [`SettingsValidator`] turns the raw document
//! into [`ValidatedSettings`].

use crate::settings::error::SettingsError;
use connectors::{source::Source, sql::teradata::tpt::TptConfig};
use model::{
    import::options::CastMode,
    schema::table::{NameMatching, TableDefinition},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

pub mod env;
pub mod error;
pub mod validated;
pub mod validator;

pub use validated::ValidatedSettings;
pub use validator::SettingsValidator;

/// Import options as written in a settings file. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsSettings {
    /// Imported columns. Defaults to every source column.
    pub columns: Option<Vec<String>>,
    pub incremental: bool,
    pub use_timestamp: bool,
    pub convert_empty_values_to_null: Vec<String>,
    pub number_of_ignored_lines: u32,
    pub cast_mode: CastMode,
    pub column_matching: NameMatching,
    pub use_ctas: bool,
}

/// The raw settings document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportSettings {
    pub backend: String,
    #[serde(default)]
    pub connection_url: Option<String>,
    pub source: Source,
    pub destination: TableDefinition,
    #[serde(default)]
    pub options: OptionsSettings,
    /// Teradata Parallel Transporter settings for file sources.
    #[serde(default)]
    pub loader: Option<TptConfig>,
    #[serde(default)]
    pub typed_staging: bool,
    /// Fixed `_timestamp` literal, `%Y-%m-%d %H:%M:%S`.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ImportSettings {
    /// Parses a settings document, resolving variables through `lookup`.
    pub fn from_json<F>(json: &str, lookup: &F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut value: Value = serde_json::from_str(json)?;
        env::interpolate(&mut value, lookup)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn load<F>(path: &Path, lookup: &F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!(path = %path.display(), "Loading settings");
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json, lookup)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_and_interpolation() {
        let settings =
            ImportSettings::from_json(&fixtures::document(""), &fixtures::lookup).unwrap();
        assert_eq!(settings.backend, "redshift");
        assert_eq!(
            settings.connection_url.as_deref(),
            Some("postgres://loader@localhost/dev")
        );
        assert_eq!(settings.options, OptionsSettings::default());
        assert!(settings.loader.is_none());
        assert!(!settings.typed_staging);
        assert_eq!(settings.destination.primary_keys, vec!["id"]);
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let doc = fixtures::document(r#", "options": { "incremantal": true }"#);
        let err = ImportSettings::from_json(&doc, &fixtures::lookup).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn test_missing_variable_fails_before_parsing() {
        let unset = |_: &str| -> Option<String> { None };
        let err = ImportSettings::from_json(&fixtures::document(""), &unset).unwrap_err();
        assert!(matches!(err, SettingsError::UnresolvedVariable(name) if name == "WH_USER"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(fixtures::document("").as_bytes()).unwrap();
        let settings = ImportSettings::load(file.path(), &fixtures::lookup).unwrap();
        assert_eq!(settings.destination.name, "accounts");

        let err = ImportSettings::load(Path::new("/nonexistent/import.json"), &fixtures::lookup)
            .unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
