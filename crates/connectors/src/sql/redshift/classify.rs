use crate::sql::base::classify::ErrorPatterns;

pub static PATTERNS: ErrorPatterns = ErrorPatterns {
    missing_source: &["The specified S3 prefix", "The specified key does not exist"],
    invalid_data: &["stl_load_errors", "Load into table"],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::base::classify::ErrorClass;

    #[test]
    fn test_classify_redshift_messages() {
        assert_eq!(
            PATTERNS.classify("The specified S3 prefix 'sliced/part-9.csv' does not exist"),
            ErrorClass::MissingSource
        );
        assert_eq!(
            PATTERNS.classify("relation \"public.accounts\" does not exist"),
            ErrorClass::Other
        );
    }
}
