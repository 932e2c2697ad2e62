//! Descriptions of where staging rows come from.
//!
//! File enumeration and credential minting happen upstream; a `Source` only
//! carries the resolved file list and the credentials to pass through.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The shape of a source, used as half of the copy-adapter lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    S3,
    Azure,
    Gcs,
    Table,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::S3 => "s3",
            SourceKind::Azure => "azure",
            SourceKind::Gcs => "gcs",
            SourceKind::Table => "table",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    File(FileSource),
    Table(TableSource),
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::File(file) => file.storage.kind(),
            Source::Table(_) => SourceKind::Table,
        }
    }

    pub fn column_names(&self) -> &[String] {
        match self {
            Source::File(file) => &file.columns,
            Source::Table(table) => &table.columns,
        }
    }

    /// `None` when the source declares no primary key.
    pub fn primary_key_names(&self) -> Option<&[String]> {
        let keys = match self {
            Source::File(file) => &file.primary_keys,
            Source::Table(table) => &table.primary_keys,
        };
        if keys.is_empty() { None } else { Some(keys) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum Storage {
    S3 { bucket: String, region: String },
    Azure { account: String, container: String },
    Gcs { bucket: String },
}

impl Storage {
    pub fn kind(&self) -> SourceKind {
        match self {
            Storage::S3 { .. } => SourceKind::S3,
            Storage::Azure { .. } => SourceKind::Azure,
            Storage::Gcs { .. } => SourceKind::Gcs,
        }
    }

    /// Canonical object URL: `s3://`, `https://<account>.blob...` or `gs://`.
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        match self {
            Storage::S3 { bucket, .. } => format!("s3://{bucket}/{path}"),
            Storage::Azure { account, container } => {
                format!("https://{account}.blob.core.windows.net/{container}/{path}")
            }
            Storage::Gcs { bucket } => format!("gs://{bucket}/{path}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
    #[default]
    None,
    AwsKeys {
        key_id: String,
        secret_key: String,
        #[serde(default)]
        session_token: Option<String>,
    },
    IamRole {
        arn: String,
    },
    AzureSas {
        token: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvOptions {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_enclosure")]
    pub enclosure: char,
    #[serde(default)]
    pub escaped_by: Option<char>,
    #[serde(default)]
    pub compressed: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_enclosure() -> char {
    '"'
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            enclosure: default_enclosure(),
            escaped_by: None,
            compressed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSource {
    pub storage: Storage,
    /// Object keys relative to the bucket/container, already enumerated.
    pub files: Vec<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub primary_keys: Vec<String>,
    #[serde(default)]
    pub csv: CsvOptions,
    #[serde(default)]
    pub credentials: Credentials,
    /// Key of a manifest object listing `files`, for loaders that take one.
    #[serde(default)]
    pub manifest: Option<String>,
}

impl FileSource {
    pub fn file_urls(&self) -> Vec<String> {
        self.files.iter().map(|f| self.storage.url(f)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSource {
    pub schema: String,
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub primary_keys: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_source() -> FileSource {
        FileSource {
            storage: Storage::S3 {
                bucket: "exports".into(),
                region: "eu-west-1".into(),
            },
            files: vec!["/sliced/part-0.csv".into(), "sliced/part-1.csv".into()],
            columns: vec!["id".into(), "name".into()],
            primary_keys: vec![],
            csv: CsvOptions::default(),
            credentials: Credentials::None,
            manifest: None,
        }
    }

    #[test]
    fn test_file_urls_are_normalized() {
        assert_eq!(
            s3_source().file_urls(),
            vec![
                "s3://exports/sliced/part-0.csv".to_string(),
                "s3://exports/sliced/part-1.csv".to_string()
            ]
        );
    }

    #[test]
    fn test_azure_url() {
        let storage = Storage::Azure {
            account: "acme".into(),
            container: "landing".into(),
        };
        assert_eq!(
            storage.url("a.csv"),
            "https://acme.blob.core.windows.net/landing/a.csv"
        );
    }

    #[test]
    fn test_primary_keys_empty_is_none() {
        let source = Source::File(s3_source());
        assert_eq!(source.kind(), SourceKind::S3);
        assert!(source.primary_key_names().is_none());
    }

    #[test]
    fn test_deserialize_table_source() {
        let json = r#"{"type":"table","schema":"in_c","name":"users","columns":["id"],"primary_keys":["id"]}"#;
        let source: Source = serde_json::from_str(json).unwrap();
        assert_eq!(source.kind(), SourceKind::Table);
        assert_eq!(source.primary_key_names(), Some(&["id".to_string()][..]));
    }
}
