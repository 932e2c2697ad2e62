use crate::error::ImportError;
use chrono::Utc;
use model::core::{identifiers::ImportId, utils::format_timestamp};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use tracing::info;

/// Where a single import run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportStage {
    Created,
    StagingCreated,
    StagingPopulated,
    Merging,
    Cleaned,
    Done,
    Failed,
}

impl ImportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStage::Created => "Created",
            ImportStage::StagingCreated => "StagingCreated",
            ImportStage::StagingPopulated => "StagingPopulated",
            ImportStage::Merging => "Merging",
            ImportStage::Cleaned => "Cleaned",
            ImportStage::Done => "Done",
            ImportStage::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportStage::Done | ImportStage::Failed)
    }

    /// Forward steps go one stage at a time; any live stage may fail.
    pub fn can_transition_to(&self, next: ImportStage) -> bool {
        use ImportStage::*;
        match (self, next) {
            (Done | Failed, _) => false,
            (_, Failed) => true,
            (Created, StagingCreated)
            | (StagingCreated, StagingPopulated)
            | (StagingPopulated, Merging)
            | (Merging, Cleaned)
            | (Cleaned, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable context of one `import_table` call.
///
/// Owned by the call that created it and threaded by reference through the
/// phases. It is never shared between runs.
#[derive(Debug, Clone)]
pub struct ImportState {
    import_id: ImportId,
    staging_table_name: String,
    timestamp: String,
    stage: ImportStage,
    timers: Vec<(String, Duration)>,
    imported_rows_count: u64,
    imported_columns: Vec<String>,
}

impl ImportState {
    pub fn new(staging_table_name: &str) -> Self {
        ImportState {
            import_id: ImportId::generate(),
            staging_table_name: staging_table_name.to_string(),
            timestamp: format_timestamp(&Utc::now()),
            stage: ImportStage::Created,
            timers: Vec::new(),
            imported_rows_count: 0,
            imported_columns: Vec::new(),
        }
    }

    /// Pins the literal written to `_timestamp` columns.
    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    pub fn import_id(&self) -> &ImportId {
        &self.import_id
    }

    pub fn staging_table_name(&self) -> &str {
        &self.staging_table_name
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    pub fn transition(&mut self, next: ImportStage) -> Result<(), ImportError> {
        if !self.stage.can_transition_to(next) {
            return Err(ImportError::InvalidStage {
                current: self.stage,
                next,
            });
        }
        info!(
            import_id = %self.import_id,
            staging = %self.staging_table_name,
            from = %self.stage,
            to = %next,
            "Import stage changed"
        );
        self.stage = next;
        Ok(())
    }

    /// Moves a live run to `Failed`. Terminal runs are left as they are.
    pub fn fail(&mut self) {
        if !self.stage.is_terminal() {
            let _ = self.transition(ImportStage::Failed);
        }
    }

    pub fn add_timer(&mut self, phase: &str, duration: Duration) {
        self.timers.push((phase.to_string(), duration));
    }

    pub fn timers(&self) -> &[(String, Duration)] {
        &self.timers
    }

    pub fn add_imported_rows(&mut self, rows: u64) {
        self.imported_rows_count += rows;
    }

    pub fn set_imported_rows_count(&mut self, rows: u64) {
        self.imported_rows_count = rows;
    }

    pub fn imported_rows_count(&self) -> u64 {
        self.imported_rows_count
    }

    pub fn set_imported_columns(&mut self, columns: Vec<String>) {
        self.imported_columns = columns;
    }

    pub fn imported_columns(&self) -> &[String] {
        &self.imported_columns
    }

    pub fn into_result(self) -> ImportResult {
        ImportResult {
            imported_rows_count: self.imported_rows_count,
            imported_columns: self.imported_columns,
            timers: self.timers,
            staging_table_name: self.staging_table_name,
        }
    }
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub imported_rows_count: u64,
    pub imported_columns: Vec<String>,
    pub timers: Vec<(String, Duration)>,
    pub staging_table_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        let mut state = ImportState::new("__temp_x");
        for stage in [
            ImportStage::StagingCreated,
            ImportStage::StagingPopulated,
            ImportStage::Merging,
            ImportStage::Cleaned,
            ImportStage::Done,
        ] {
            state.transition(stage).unwrap();
        }
        assert_eq!(state.stage(), ImportStage::Done);
    }

    #[test]
    fn test_skipping_a_stage_is_rejected() {
        let mut state = ImportState::new("__temp_x");
        let err = state.transition(ImportStage::Merging).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid import stage transition: Created -> Merging"
        );
        assert_eq!(state.stage(), ImportStage::Created);
    }

    #[test]
    fn test_failed_is_absorbing() {
        let mut state = ImportState::new("__temp_x");
        state.transition(ImportStage::StagingCreated).unwrap();
        state.fail();
        assert_eq!(state.stage(), ImportStage::Failed);
        assert!(state.transition(ImportStage::StagingPopulated).is_err());
        state.fail();
        assert_eq!(state.stage(), ImportStage::Failed);
    }

    #[test]
    fn test_result_serializes() {
        let mut state = ImportState::new("__temp_x").with_timestamp("2024-05-01 10:00:00");
        assert_eq!(state.timestamp(), "2024-05-01 10:00:00");
        state.add_timer("copyToStaging", Duration::from_millis(1500));
        state.add_imported_rows(2);
        state.add_imported_rows(3);
        state.set_imported_columns(vec!["id".into(), "name".into()]);

        let result = state.into_result();
        assert_eq!(result.imported_rows_count, 5);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["staging_table_name"], "__temp_x");
        assert_eq!(json["imported_columns"][1], "name");
        assert_eq!(json["timers"][0][0], "copyToStaging");
        assert_eq!(json["timers"][0][1]["secs"], 1);
    }
}
