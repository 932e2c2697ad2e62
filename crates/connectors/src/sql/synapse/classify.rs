use crate::sql::base::classify::ErrorPatterns;

pub static PATTERNS: ErrorPatterns = ErrorPatterns {
    missing_source: &[
        "Cannot bulk load because the file",
        "could not be opened",
        "Cannot find the object",
    ],
    invalid_data: &[
        "Bulk load data conversion error",
        "String or binary data would be truncated",
        "Too many columns in the line",
        "unexpected end of file",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::base::classify::ErrorClass;

    #[test]
    fn test_classify_synapse_messages() {
        assert_eq!(
            PATTERNS.classify(
                "Cannot bulk load because the file \"https://acme/landing/a.csv\" could not be opened."
            ),
            ErrorClass::MissingSource
        );
        assert_eq!(
            PATTERNS.classify("Bulk load data conversion error (type mismatch) for row 3, column 1"),
            ErrorClass::InvalidData
        );
    }
}
