use crate::settings::{ImportSettings, OptionsSettings, error::SettingsError, validated::ValidatedSettings};
use chrono::NaiveDateTime;
use connectors::source::{Source, SourceKind};
use model::{
    core::{backend::BackendKind, utils::TIMESTAMP_FORMAT},
    import::options::ImportOptions,
    schema::table::TableDefinition,
};
use tracing::{info, warn};

/// Validates a settings document before any connection is opened.
///
/// Every problem found is reported at once rather than the first one.
pub struct SettingsValidator<'a> {
    settings: &'a ImportSettings,
}

impl<'a> SettingsValidator<'a> {
    pub fn new(settings: &'a ImportSettings) -> Self {
        Self { settings }
    }

    pub fn validate(&self) -> Result<ValidatedSettings, SettingsError> {
        let settings = self.settings;
        info!(
            backend = %settings.backend,
            destination = %settings.destination.name,
            "Validating settings"
        );

        let backend: BackendKind = settings
            .backend
            .parse()
            .map_err(|_| SettingsError::UnknownBackend(settings.backend.clone()))?;

        let options = Self::resolve_options(&settings.source, &settings.options);
        let mut errors: Vec<String> = Vec::new();

        if let Err(e) = options.validate() {
            errors.push(e.to_string());
        }
        if let Err(e) = settings.destination.validate() {
            errors.push(e.to_string());
        }
        self.validate_primary_keys(&settings.destination, &options, &mut errors);
        self.validate_loader(backend, &mut errors);
        self.validate_timestamp(&mut errors);

        if !errors.is_empty() {
            return Err(SettingsError::ValidationFailed(errors));
        }

        let validated = ValidatedSettings {
            backend,
            connection_url: settings.connection_url.clone(),
            source: settings.source.clone(),
            destination: settings.destination.clone(),
            options,
            loader: settings.loader.clone(),
            typed_staging: settings.typed_staging,
            timestamp: settings.timestamp.clone(),
        };
        info!(
            backend = %validated.backend,
            columns = validated.options.columns.len(),
            incremental = validated.options.incremental,
            "Settings validation completed successfully"
        );
        Ok(validated)
    }

    fn resolve_options(source: &Source, raw: &OptionsSettings) -> ImportOptions {
        let columns = raw
            .columns
            .clone()
            .unwrap_or_else(|| source.column_names().to_vec());
        ImportOptions {
            columns,
            incremental: raw.incremental,
            use_timestamp: raw.use_timestamp,
            convert_empty_values_to_null: raw.convert_empty_values_to_null.clone(),
            number_of_ignored_lines: raw.number_of_ignored_lines,
            cast_mode: raw.cast_mode,
            column_matching: raw.column_matching,
            use_ctas: raw.use_ctas,
        }
    }

    /// Merging on a key requires the key columns to be imported.
    fn validate_primary_keys(
        &self,
        destination: &TableDefinition,
        options: &ImportOptions,
        errors: &mut Vec<String>,
    ) {
        let missing: Vec<&str> = destination
            .primary_keys
            .iter()
            .filter(|pk| {
                !options
                    .columns
                    .iter()
                    .any(|c| options.column_matching.matches(c, pk))
            })
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            return;
        }

        if options.incremental {
            errors.push(format!(
                "Primary key columns of '{}' are not imported: {}",
                destination.name,
                missing.join(", ")
            ));
        } else {
            warn!(
                destination = %destination.name,
                columns = %missing.join(", "),
                "Primary key columns are not imported, rows will not be deduplicated"
            );
        }
    }

    fn validate_loader(&self, backend: BackendKind, errors: &mut Vec<String>) {
        let settings = self.settings;
        match &settings.loader {
            Some(_) if backend != BackendKind::Teradata => {
                warn!(%backend, "Loader settings are only used by teradata and will be ignored");
            }
            Some(loader) if loader.timeout_secs == 0 => {
                errors.push("Loader timeout must be greater than zero".to_string());
            }
            None if backend == BackendKind::Teradata
                && settings.source.kind() != SourceKind::Table =>
            {
                errors.push(format!(
                    "Teradata {} sources require loader settings",
                    settings.source.kind()
                ));
            }
            _ => {}
        }
    }

    fn validate_timestamp(&self, errors: &mut Vec<String>) {
        if let Some(ts) = &self.settings.timestamp {
            if NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_err() {
                errors.push(format!(
                    "Timestamp '{ts}' does not match format {TIMESTAMP_FORMAT}"
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::fixtures;
    use connectors::{
        source::{Credentials, CsvOptions, FileSource, Storage},
        sql::teradata::tpt::TptConfig,
    };

    fn settings(extra: &str) -> ImportSettings {
        ImportSettings::from_json(&fixtures::document(extra), &fixtures::lookup).unwrap()
    }

    #[test]
    fn test_columns_default_to_source_columns() {
        let validated = SettingsValidator::new(&settings("")).validate().unwrap();
        assert_eq!(validated.backend(), BackendKind::Redshift);
        assert_eq!(validated.options().columns, vec!["id", "name", "price"]);
        assert!(!validated.is_incremental());
        assert!(validated.loader().is_none());
    }

    #[test]
    fn test_backend_aliases_and_unknown_backend() {
        let mut raw = settings("");
        raw.backend = "SF".into();
        let validated = SettingsValidator::new(&raw).validate().unwrap();
        assert_eq!(validated.backend(), BackendKind::Snowflake);

        raw.backend = "oracle".into();
        let err = SettingsValidator::new(&raw).validate().unwrap_err();
        assert_eq!(err.to_string(), "Unknown backend: oracle");
    }

    #[test]
    fn test_all_problems_are_reported() {
        let raw = settings(
            r#", "options": {
                "columns": ["name", "name"],
                "incremental": true,
                "convert_empty_values_to_null": ["price"]
            },
            "timestamp": "yesterday""#,
        );
        let err = SettingsValidator::new(&raw).validate().unwrap_err();
        let SettingsError::ValidationFailed(errors) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("Duplicate import columns"));
        assert!(errors[1].contains("not imported: id"));
        assert!(errors[2].contains("yesterday"));
    }

    #[test]
    fn test_teradata_file_source_needs_loader() {
        let mut raw = settings("");
        raw.backend = "teradata".into();
        raw.source = Source::File(FileSource {
            storage: Storage::S3 {
                bucket: "exports".into(),
                region: "us-east-1".into(),
            },
            files: vec!["a.csv".into()],
            columns: vec!["id".into(), "name".into(), "price".into()],
            primary_keys: vec![],
            csv: CsvOptions::default(),
            credentials: Credentials::None,
            manifest: None,
        });
        let err = SettingsValidator::new(&raw).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Settings validation failed: Teradata s3 sources require loader settings"
        );

        raw.loader = Some(TptConfig::new("tdp", "loader", "secret"));
        assert!(SettingsValidator::new(&raw).validate().is_ok());
    }

    #[test]
    fn test_loader_timeout_must_be_positive() {
        let mut raw = settings("");
        raw.backend = "teradata".into();
        let mut loader = TptConfig::new("tdp", "loader", "secret");
        loader.timeout_secs = 0;
        raw.loader = Some(loader);
        let err = SettingsValidator::new(&raw).validate().unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }
}
