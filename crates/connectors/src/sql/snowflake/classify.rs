use crate::sql::base::classify::ErrorPatterns;

pub static PATTERNS: ErrorPatterns = ErrorPatterns {
    missing_source: &["Remote file", "was not found", "does not exist or not authorized"],
    invalid_data: &[
        "Numeric value",
        "is not recognized",
        "Field delimiter",
        "Number of columns in file",
        "End of record reached",
        "String '",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::base::classify::ErrorClass;

    #[test]
    fn test_classify_snowflake_messages() {
        assert_eq!(
            PATTERNS.classify("Numeric value 'abc' is not recognized"),
            ErrorClass::InvalidData
        );
        assert_eq!(
            PATTERNS.classify("Remote file 's3://b/x.csv' was not found."),
            ErrorClass::MissingSource
        );
        assert_eq!(
            PATTERNS.classify("Insufficient privileges to operate on schema"),
            ErrorClass::Other
        );
    }
}
