//! Core logging types: operation entries, status, and the [`Log`] trait.
use crate::lifecycle::MutationReport;

/// Operation result for summary reporting.
#[derive(Debug, Clone)]
pub struct OperationEntry {
    /// Human-readable operation name (e.g. "disable `git_shell`").
    pub name: String,
    /// Final status of the operation.
    pub status: OperationStatus,
    /// Optional detail message (e.g., first failure or backup path).
    pub message: Option<String>,
}

/// Status of a completed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    /// At least one location was changed and none failed.
    Ok,
    /// Every location was already in the requested state.
    Unchanged,
    /// Some locations were changed and some refused.
    Partial,
    /// No location accepted the change.
    Failed,
}

impl OperationStatus {
    /// Summarise a mutation report.
    #[must_use]
    pub fn from_report(report: &MutationReport) -> Self {
        let (applied, unchanged, failed) = report.counts();
        match (applied + unchanged, failed) {
            (0, 0) => Self::Unchanged,
            (0, _) => Self::Failed,
            (_, 0) if applied == 0 => Self::Unchanged,
            (_, 0) => Self::Ok,
            _ => Self::Partial,
        }
    }
}

/// Abstraction over logging backends.
///
/// Command code logs through this trait so tests can swap in any
/// implementation without touching the global subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record an operation result for the summary.
    fn record_operation(&self, name: &str, status: OperationStatus, message: Option<&str>);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::lifecycle::{Operation, Outcome};
    use crate::registry::StoreError;

    fn denied() -> Outcome {
        Outcome::Failed(StoreError::PermissionDenied {
            path: "x".to_string(),
        })
    }

    fn report(outcomes: Vec<Outcome>) -> MutationReport {
        let mut report = MutationReport::new(Operation::Delete, "x");
        for (i, outcome) in outcomes.into_iter().enumerate() {
            report.record(format!("loc{i}"), outcome);
        }
        report
    }

    #[test]
    fn status_from_report() {
        assert_eq!(
            OperationStatus::from_report(&report(vec![Outcome::Applied, Outcome::Unchanged])),
            OperationStatus::Ok
        );
        assert_eq!(
            OperationStatus::from_report(&report(vec![Outcome::Unchanged])),
            OperationStatus::Unchanged
        );
        assert_eq!(
            OperationStatus::from_report(&report(vec![Outcome::Applied, denied()])),
            OperationStatus::Partial
        );
        assert_eq!(
            OperationStatus::from_report(&report(vec![denied(), denied()])),
            OperationStatus::Failed
        );
        assert_eq!(
            OperationStatus::from_report(&report(vec![])),
            OperationStatus::Unchanged
        );
    }
}
