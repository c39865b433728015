//! Per-location results of enable, disable and delete.
//!
//! Mutations never stop at the first failing location.  Each location is
//! attempted and its outcome recorded in a [`MutationReport`], which the
//! caller inspects afterwards.
use std::fmt;

use crate::registry::StoreError;

/// The three lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Clear the disabled marker.
    Enable,
    /// Set the disabled marker.
    Disable,
    /// Remove the registration.
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Delete => "delete",
        })
    }
}

/// What happened at one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The store was changed.
    Applied,
    /// The location was already in the requested state.
    Unchanged,
    /// The store refused the change.
    Failed(StoreError),
}

impl Outcome {
    /// `Ok` becomes [`Outcome::Applied`], any error [`Outcome::Failed`].
    #[must_use]
    pub fn from_result(result: Result<(), StoreError>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(e) => Self::Failed(e),
        }
    }

    /// Like [`Outcome::from_result`], but a missing key or value counts as
    /// [`Outcome::Unchanged`].
    #[must_use]
    pub fn missing_is_unchanged(result: Result<(), StoreError>) -> Self {
        match result {
            Err(e) if e.is_not_found() => Self::Unchanged,
            other => Self::from_result(other),
        }
    }

    /// Whether the location ended up in the requested state.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Applied | Self::Unchanged)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => f.write_str("applied"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Outcome for one registry location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationOutcome {
    /// Full path of the key or value that was touched.
    pub target: String,
    /// What happened there.
    pub outcome: Outcome,
}

/// Everything one mutation did, location by location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    /// The operation performed.
    pub operation: Operation,
    /// Key or value name of the entry.
    pub subject: String,
    /// One outcome per location, in the order they were attempted.
    pub outcomes: Vec<LocationOutcome>,
}

impl MutationReport {
    /// Start an empty report.
    #[must_use]
    pub fn new(operation: Operation, subject: impl Into<String>) -> Self {
        Self {
            operation,
            subject: subject.into(),
            outcomes: Vec::new(),
        }
    }

    /// Record the outcome for `target`, warning on failure.
    pub fn record(&mut self, target: impl Into<String>, outcome: Outcome) {
        let target = target.into();
        if let Outcome::Failed(e) = &outcome {
            tracing::warn!("{} {}: {target}: {e}", self.operation, self.subject);
        } else {
            tracing::debug!("{} {}: {target}: {outcome}", self.operation, self.subject);
        }
        self.outcomes.push(LocationOutcome { target, outcome });
    }

    /// Whether the operation ran to completion.
    ///
    /// Store failures are absorbed per location, so this is always `true`
    /// once a report exists; inspect [`MutationReport::failures`] for
    /// detail.
    #[must_use]
    pub const fn completed(&self) -> bool {
        true
    }

    /// Whether every location ended up in the requested state.
    #[must_use]
    pub fn all_applied(&self) -> bool {
        self.outcomes.iter().all(|o| o.outcome.is_accepted())
    }

    /// Whether at least one location was actually changed.
    #[must_use]
    pub fn any_applied(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.outcome, Outcome::Applied))
    }

    /// Whether at least one location ended up in the requested state.
    #[must_use]
    pub fn any_accepted(&self) -> bool {
        self.outcomes.iter().any(|o| o.outcome.is_accepted())
    }

    /// Locations that refused the change.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &StoreError)> {
        self.outcomes.iter().filter_map(|o| match &o.outcome {
            Outcome::Failed(e) => Some((o.target.as_str(), e)),
            _ => None,
        })
    }

    /// Count of `(applied, unchanged, failed)` outcomes.
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        self.outcomes
            .iter()
            .fold((0, 0, 0), |(a, u, f), o| match o.outcome {
                Outcome::Applied => (a + 1, u, f),
                Outcome::Unchanged => (a, u + 1, f),
                Outcome::Failed(_) => (a, u, f + 1),
            })
    }
}

impl fmt::Display for MutationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (applied, unchanged, failed) = self.counts();
        write!(
            f,
            "{} {}: {applied} applied, {unchanged} unchanged, {failed} failed",
            self.operation, self.subject
        )
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn denied() -> StoreError {
        StoreError::PermissionDenied {
            path: r"HKEY_CLASSES_ROOT\*\shell\x".to_string(),
        }
    }

    #[test]
    fn missing_counts_as_unchanged() {
        let nf = Err(StoreError::NotFound {
            path: "x".to_string(),
        });
        assert_eq!(Outcome::missing_is_unchanged(nf), Outcome::Unchanged);
        assert_eq!(Outcome::missing_is_unchanged(Ok(())), Outcome::Applied);
        assert!(matches!(
            Outcome::missing_is_unchanged(Err(denied())),
            Outcome::Failed(_)
        ));
    }

    #[test]
    fn not_found_is_a_failure_without_absorption() {
        let nf = Err(StoreError::NotFound {
            path: "x".to_string(),
        });
        assert!(matches!(Outcome::from_result(nf), Outcome::Failed(_)));
    }

    #[test]
    fn partial_failure_report() {
        let mut report = MutationReport::new(Operation::Disable, "git_shell");
        report.record("a", Outcome::Applied);
        report.record("b", Outcome::Failed(denied()));
        assert!(report.completed());
        assert!(report.any_applied());
        assert!(report.any_accepted());
        assert!(!report.all_applied());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.failures().next().unwrap().0, "b");
        assert_eq!(report.counts(), (1, 0, 1));
    }

    #[test]
    fn unchanged_only_report_is_accepted_but_not_applied() {
        let mut report = MutationReport::new(Operation::Enable, "x");
        report.record("a", Outcome::Unchanged);
        assert!(report.all_applied());
        assert!(!report.any_applied());
        assert!(report.any_accepted());
    }

    #[test]
    fn report_display_summarizes_counts() {
        let mut report = MutationReport::new(Operation::Delete, "OneDrive");
        report.record("a", Outcome::Applied);
        report.record("b", Outcome::Unchanged);
        assert_eq!(
            report.to_string(),
            "delete OneDrive: 1 applied, 1 unchanged, 0 failed"
        );
    }
}
