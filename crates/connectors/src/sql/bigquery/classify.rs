use crate::sql::base::classify::ErrorPatterns;

pub static PATTERNS: ErrorPatterns = ErrorPatterns {
    missing_source: &["Not found: Uris", "Not found: URI"],
    invalid_data: &[
        "Error while reading data",
        "CSV table encountered too many errors",
        "Could not parse",
        "CSV processing encountered too many errors",
    ],
};
