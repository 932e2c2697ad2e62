use crate::sql::base::classify::ErrorPatterns;

pub static PATTERNS: ErrorPatterns = ErrorPatterns {
    missing_source: &["The specified key does not exist", "NoSuchKey"],
    invalid_data: &[
        "Delimited Data Parsing error",
        "Column length overflow",
        "Invalid timestamp",
        "Bad character in format or data",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::base::classify::ErrorClass;

    #[test]
    fn test_classify_teradata_messages() {
        assert_eq!(
            PATTERNS.classify("S3 error: The specified key does not exist."),
            ErrorClass::MissingSource
        );
        assert_eq!(
            PATTERNS.classify("Delimited Data Parsing error: Too many columns in row 4"),
            ErrorClass::InvalidData
        );
    }
}
