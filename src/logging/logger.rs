//! Structured logger with summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Log, OperationEntry, OperationStatus};
use super::utils::log_file_path;
use crate::lifecycle::MutationReport;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// The `record_operation` method is **not** included because its signature
/// differs from the `fn(&self, &str)` pattern shared by the display methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with summary collection.
///
/// All messages are always written to a persistent log file at
/// `<cache>/regtidy/<command>.log` with timestamps and ANSI codes stripped,
/// regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    operations: Mutex<Vec<OperationEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary.  The log file
    /// itself is created and initialised by [`init_subscriber`](super::subscriber::init_subscriber) via
    /// [`FileLayer`](super::subscriber::FileLayer); this constructor does not write to the file.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            operations: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded operation entries (test-only).
    #[cfg(test)]
    pub(crate) fn operation_entries(&self) -> Vec<OperationEntry> {
        self.operations.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "regtidy::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file via the [`FileLayer`](super::subscriber::FileLayer)).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record an operation result for the summary.
    pub fn record_operation(&self, name: &str, status: OperationStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.operations.lock() {
            guard.push(OperationEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Log every location of `report` and record it for the summary.
    pub fn record_report(&self, report: &MutationReport) {
        for location in &report.outcomes {
            self.debug(&format!("{}: {}", location.target, location.outcome));
        }
        let failure = report
            .failures()
            .next()
            .map(|(target, e)| format!("{target}: {e}"));
        self.record_operation(
            &format!("{} {}", report.operation, report.subject),
            OperationStatus::from_report(report),
            failure.as_deref(),
        );
    }

    /// Return `true` if any recorded operation has failed outright.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Count the operations that failed or only partly applied.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.operations.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|t| matches!(t.status, OperationStatus::Failed | OperationStatus::Partial))
                .count()
        })
    }

    /// Print the summary of all recorded operations.
    pub fn print_summary(&self) {
        let operations = match self.operations.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if operations.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut unchanged = 0u32;
        let mut partial = 0u32;
        let mut failed = 0u32;

        for op in &operations {
            let (icon, color) = match op.status {
                OperationStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                OperationStatus::Unchanged => {
                    unchanged += 1;
                    ("·", "\x1b[2m")
                }
                OperationStatus::Partial => {
                    partial += 1;
                    ("◐", "\x1b[33m")
                }
                OperationStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = op
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", op.name));
        }

        let total = ok + unchanged + partial + failed;
        self.info(&format!(
            "{total} operations: \x1b[32m{ok} ok\x1b[0m, \x1b[2m{unchanged} unchanged\x1b[0m, \x1b[33m{partial} partial\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record_operation(&self, name: &str, status: OperationStatus, message: Option<&str>) {
        self.record_operation(name, status, message);
    }
}
