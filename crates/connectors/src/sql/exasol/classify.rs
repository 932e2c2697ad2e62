use crate::sql::base::classify::ErrorPatterns;

pub static PATTERNS: ErrorPatterns = ErrorPatterns {
    missing_source: &["HTTP/1.1 404", "404 Not Found"],
    invalid_data: &["ETL-", "Too many rejected rows", "data exception"],
};
