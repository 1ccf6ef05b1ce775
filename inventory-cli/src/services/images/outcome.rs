//! Results of image mutations
//!
//! Each mutation touches two independent systems (upload service and sheet)
//! with no transaction spanning them. The report records which steps ran,
//! which one failed and which were skipped, so callers can tell a clean
//! success from a half-applied change.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::services::inventory::SheetRow;

/// Errors that stop a mutation before anything is changed
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("not signed in: {0}")]
    Unauthorized(String),

    #[error("invalid upload: {0}")]
    InvalidUpload(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Register,
    Replace,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::Register => write!(f, "register"),
            MutationKind::Replace => write!(f, "replace"),
            MutationKind::Delete => write!(f, "delete"),
        }
    }
}

/// One side effect of a mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum MutationStep {
    UploadAsset { name: String },
    DeleteAsset { key: String },
    WriteCell { range: String },
    ClearCell { range: String },
}

impl fmt::Display for MutationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationStep::UploadAsset { name } => write!(f, "upload asset {}", name),
            MutationStep::DeleteAsset { key } => write!(f, "delete asset {}", key),
            MutationStep::WriteCell { range } => write!(f, "write {}", range),
            MutationStep::ClearCell { range } => write!(f, "clear {}", range),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub step: MutationStep,
    pub error: String,
}

/// Uploaded name differs from the name derived from the record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameMismatch {
    pub expected: String,
    pub actual: String,
}

/// Overall result of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    PartiallySucceeded,
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded => write!(f, "succeeded"),
            Outcome::PartiallySucceeded => write!(f, "partially succeeded"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// What a mutation did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationReport {
    pub kind: MutationKind,
    pub row: SheetRow,
    pub completed: Vec<MutationStep>,
    pub failed: Vec<StepFailure>,
    pub skipped: Vec<MutationStep>,
    /// Image URL the cell holds after the mutation, when it was written
    pub url: Option<String>,
    pub filename_mismatch: Option<FilenameMismatch>,
}

impl MutationReport {
    pub fn new(kind: MutationKind, row: SheetRow) -> Self {
        Self {
            kind,
            row,
            completed: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            url: None,
            filename_mismatch: None,
        }
    }

    pub fn complete(&mut self, step: MutationStep) {
        self.completed.push(step);
    }

    pub fn fail(&mut self, step: MutationStep, error: &anyhow::Error) {
        self.failed.push(StepFailure {
            step,
            error: format!("{:#}", error),
        });
    }

    pub fn skip(&mut self, step: MutationStep) {
        self.skipped.push(step);
    }

    pub fn outcome(&self) -> Outcome {
        match (self.completed.is_empty(), self.failed.is_empty()) {
            (_, true) => Outcome::Succeeded,
            (false, false) => Outcome::PartiallySucceeded,
            (true, false) => Outcome::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome() == Outcome::Succeeded
    }

    /// Whether the sheet changed, which is what makes a refetch worthwhile
    pub fn changed_sheet(&self) -> bool {
        self.completed.iter().any(|step| {
            matches!(
                step,
                MutationStep::WriteCell { .. } | MutationStep::ClearCell { .. }
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_step() -> MutationStep {
        MutationStep::WriteCell {
            range: "inventory!I3".to_string(),
        }
    }

    fn delete_step() -> MutationStep {
        MutationStep::DeleteAsset {
            key: "a.jpg".to_string(),
        }
    }

    #[test]
    fn test_outcome_succeeded_without_failures() {
        let mut report = MutationReport::new(MutationKind::Register, SheetRow(3));
        report.complete(write_step());
        assert_eq!(report.outcome(), Outcome::Succeeded);
        assert!(report.changed_sheet());
    }

    #[test]
    fn test_outcome_partial_when_some_steps_ran() {
        let mut report = MutationReport::new(MutationKind::Replace, SheetRow(3));
        report.fail(delete_step(), &anyhow::anyhow!("boom"));
        report.complete(write_step());
        assert_eq!(report.outcome(), Outcome::PartiallySucceeded);
    }

    #[test]
    fn test_outcome_failed_when_nothing_ran() {
        let mut report = MutationReport::new(MutationKind::Delete, SheetRow(3));
        report.fail(delete_step(), &anyhow::anyhow!("boom"));
        report.skip(MutationStep::ClearCell {
            range: "inventory!I3".to_string(),
        });
        assert_eq!(report.outcome(), Outcome::Failed);
        assert!(!report.changed_sheet());
        assert_eq!(report.failed[0].error, "boom");
    }
}
