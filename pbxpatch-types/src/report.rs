use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a migration run did to the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    /// Already migrated (or nothing to undo); the file was not rewritten.
    NoOp,
    Migrated,
    Undone,
    /// Steps were computed in memory only.
    DryRun,
}

/// Orchestrator states. `Failed` is terminal and reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    NotStarted,
    Parsed,
    StepsApplied,
    Reserialized,
    Validated,
    Written,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Applied,
    AlreadySatisfied,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: String,
    pub status: StepStatus,
    /// Lines inserted (or removed, for undo).
    pub lines: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub schema: String,
    pub path: String,
    pub status: MigrationStatus,
    pub state: MigrationState,

    #[serde(default)]
    pub steps: Vec<StepResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,

    pub sha256_before: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_after: Option<String>,

    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl MigrationReport {
    pub fn new(path: impl Into<String>, sha256_before: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::PBXPATCH_REPORT_V1.to_string(),
            path: path.into(),
            status: MigrationStatus::NoOp,
            state: MigrationState::NotStarted,
            steps: vec![],
            backup_path: None,
            sha256_before: sha256_before.into(),
            sha256_after: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn applied_steps(&self) -> impl Iterator<Item = &StepResult> {
        self.steps
            .iter()
            .filter(|s| s.status != StepStatus::AlreadySatisfied)
    }

    pub fn lines_changed(&self) -> u64 {
        self.steps.iter().map(|s| s.lines).sum()
    }
}
