use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap, fmt};

/// Logical column type shared by every warehouse.
///
/// The physical spelling of a type is a dialect concern; the planner renders
/// these through `Dialect::render_data_type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    VarChar,
    Char,
    SmallInt,
    Int,
    BigInt,
    Decimal,
    Float,
    Double,
    Boolean,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    Binary,
    Custom(String),
}

lazy_static! {
    static ref WAREHOUSE_TYPE_MAP: HashMap<&'static str, DataType> = build_warehouse_type_map();
}

impl DataType {
    /// Resolves a type name as reported by warehouse metadata.
    ///
    /// Names outside the known set are kept verbatim as `Custom`, so that
    /// reflection of exotic types never blocks an import.
    pub fn from_name(type_name: &str) -> Self {
        let normalized = Self::normalize_type_name(type_name);
        WAREHOUSE_TYPE_MAP
            .get(normalized.as_str())
            .cloned()
            .unwrap_or(DataType::Custom(normalized))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, DataType::String | DataType::VarChar | DataType::Char)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::SmallInt
                | DataType::Int
                | DataType::BigInt
                | DataType::Decimal
                | DataType::Float
                | DataType::Double
        )
    }

    /// Generic, ANSI-ish spelling used for display and as a fallback.
    pub fn ansi_name(&self) -> Cow<'_, str> {
        match self {
            DataType::String => Cow::Borrowed("TEXT"),
            DataType::VarChar => Cow::Borrowed("VARCHAR"),
            DataType::Char => Cow::Borrowed("CHAR"),
            DataType::SmallInt => Cow::Borrowed("SMALLINT"),
            DataType::Int => Cow::Borrowed("INTEGER"),
            DataType::BigInt => Cow::Borrowed("BIGINT"),
            DataType::Decimal => Cow::Borrowed("DECIMAL"),
            DataType::Float => Cow::Borrowed("REAL"),
            DataType::Double => Cow::Borrowed("DOUBLE PRECISION"),
            DataType::Boolean => Cow::Borrowed("BOOLEAN"),
            DataType::Date => Cow::Borrowed("DATE"),
            DataType::Time => Cow::Borrowed("TIME"),
            DataType::Timestamp => Cow::Borrowed("TIMESTAMP"),
            DataType::TimestampTz => Cow::Borrowed("TIMESTAMP WITH TIME ZONE"),
            DataType::Json => Cow::Borrowed("JSON"),
            DataType::Binary => Cow::Borrowed("BINARY"),
            DataType::Custom(name) => Cow::Borrowed(name),
        }
    }

    /// Whether a length/precision suffix such as `(255)` or `(38,2)` is valid.
    pub fn supports_length(&self) -> bool {
        matches!(
            self,
            DataType::VarChar | DataType::Char | DataType::Decimal | DataType::Binary
        )
    }

    fn normalize_type_name(type_name: &str) -> String {
        let trimmed = type_name.trim();
        // Strip a length suffix, `VARCHAR(255)` resolves like `VARCHAR`.
        let base = match trimmed.find('(') {
            Some(idx) => &trimmed[..idx],
            None => trimmed,
        };
        base.trim().to_uppercase()
    }
}

impl From<&str> for DataType {
    fn from(s: &str) -> Self {
        DataType::from_name(s)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ansi_name())
    }
}

fn build_warehouse_type_map() -> HashMap<&'static str, DataType> {
    use DataType::*;

    let entries = [
        ("STRING", String),
        ("TEXT", String),
        ("CLOB", String),
        ("NTEXT", String),
        ("VARCHAR", VarChar),
        ("NVARCHAR", VarChar),
        ("CHARACTER VARYING", VarChar),
        ("CHAR", Char),
        ("NCHAR", Char),
        ("CHARACTER", Char),
        ("BYTEINT", SmallInt),
        ("TINYINT", SmallInt),
        ("SMALLINT", SmallInt),
        ("INT2", SmallInt),
        ("INT", Int),
        ("INTEGER", Int),
        ("INT4", Int),
        ("BIGINT", BigInt),
        ("INT8", BigInt),
        ("INT64", BigInt),
        ("NUMBER", Decimal),
        ("NUMERIC", Decimal),
        ("DECIMAL", Decimal),
        ("BIGNUMERIC", Decimal),
        ("REAL", Float),
        ("FLOAT4", Float),
        ("FLOAT", Double),
        ("FLOAT8", Double),
        ("FLOAT64", Double),
        ("DOUBLE", Double),
        ("DOUBLE PRECISION", Double),
        ("BOOLEAN", Boolean),
        ("BOOL", Boolean),
        ("BIT", Boolean),
        ("DATE", Date),
        ("TIME", Time),
        ("DATETIME", Timestamp),
        ("DATETIME2", Timestamp),
        ("TIMESTAMP", Timestamp),
        ("TIMESTAMP_NTZ", Timestamp),
        ("TIMESTAMP WITHOUT TIME ZONE", Timestamp),
        ("TIMESTAMP_LTZ", TimestampTz),
        ("TIMESTAMP_TZ", TimestampTz),
        ("TIMESTAMPTZ", TimestampTz),
        ("DATETIMEOFFSET", TimestampTz),
        ("TIMESTAMP WITH TIME ZONE", TimestampTz),
        ("JSON", Json),
        ("VARIANT", Json),
        ("SUPER", Json),
        ("BINARY", Binary),
        ("VARBINARY", Binary),
        ("BYTES", Binary),
        ("BYTEA", Binary),
        ("BLOB", Binary),
    ];

    let mut map = HashMap::new();
    for (name, data_type) in entries {
        map.insert(name, data_type);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::DataType;

    #[test]
    fn test_from_name_resolves_warehouse_spellings() {
        assert_eq!(DataType::from_name("number"), DataType::Decimal);
        assert_eq!(DataType::from_name("NVARCHAR(4000)"), DataType::VarChar);
        assert_eq!(DataType::from_name(" timestamp_ntz "), DataType::Timestamp);
        assert_eq!(DataType::from_name("INT64"), DataType::BigInt);
    }

    #[test]
    fn test_unknown_type_is_kept_as_custom() {
        assert_eq!(
            DataType::from_name("geography"),
            DataType::Custom("GEOGRAPHY".to_string())
        );
    }

    #[test]
    fn test_string_classification() {
        assert!(DataType::VarChar.is_string());
        assert!(!DataType::Int.is_string());
        assert!(DataType::Decimal.is_numeric());
    }
}
