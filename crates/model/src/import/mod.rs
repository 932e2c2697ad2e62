pub mod options;

/// Name of the column stamped with the import time when timestamps are on.
pub const TIMESTAMP_COLUMN_NAME: &str = "_timestamp";
