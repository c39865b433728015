//! Startup entries: discovery, lifecycle and backup.
pub mod approval;
pub mod lifecycle;
pub mod scanner;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use crate::backup::{self, BackupSummary};
use crate::error::BackupError;
use crate::lifecycle::MutationReport;
use crate::model::{ScanOptions, StartupEntry};
use crate::platform::SystemDirs;
use crate::registry::RegistryStore;

/// Entry point for everything startup related.
#[derive(Clone)]
pub struct StartupManager {
    store: Arc<dyn RegistryStore>,
    system_dirs: SystemDirs,
    options: ScanOptions,
}

impl fmt::Debug for StartupManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartupManager")
            .field("store", &self.store)
            .field("system_dirs", &self.system_dirs)
            .field("options", &self.options)
            .finish()
    }
}

impl StartupManager {
    /// Create a manager over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RegistryStore>, system_dirs: SystemDirs, options: ScanOptions) -> Self {
        Self {
            store,
            system_dirs,
            options,
        }
    }

    /// Scan all four startup lists.
    #[must_use]
    pub fn discover(&self) -> Vec<StartupEntry> {
        let entries = scanner::scan(self.store.as_ref(), &self.system_dirs, &self.options);
        tracing::info!("found {} startup entries", entries.len());
        entries
    }

    /// Approve `entry` to run at logon.
    ///
    /// `entry.enabled` is set up front and restored if the approval record
    /// could not be changed.  Re-run [`StartupManager::discover`] for the
    /// authoritative state.
    #[must_use]
    pub fn enable(&self, entry: &mut StartupEntry) -> MutationReport {
        self.toggle(entry, true)
    }

    /// Stop `entry` from running at logon without removing it.
    #[must_use]
    pub fn disable(&self, entry: &mut StartupEntry) -> MutationReport {
        self.toggle(entry, false)
    }

    fn toggle(&self, entry: &mut StartupEntry, enabled: bool) -> MutationReport {
        let previous = entry.enabled;
        entry.enabled = enabled;
        let report = if enabled {
            lifecycle::enable(self.store.as_ref(), entry)
        } else {
            lifecycle::disable(self.store.as_ref(), entry)
        };
        if !report.any_accepted() {
            entry.enabled = previous;
        }
        tracing::info!("{report}");
        report
    }

    /// Remove `entry` and its approval record.
    #[must_use]
    pub fn delete(&self, entry: &StartupEntry) -> MutationReport {
        let report = lifecycle::delete(self.store.as_ref(), entry);
        tracing::info!("{report}");
        report
    }

    /// Back `entry` up into `backup_dir`, then delete it.
    ///
    /// # Errors
    ///
    /// Returns the backup error and leaves the registry untouched if the
    /// backup cannot be written.
    pub fn delete_after_backup(
        &self,
        entry: &StartupEntry,
        backup_dir: &Path,
    ) -> Result<(BackupSummary, MutationReport), BackupError> {
        let path = backup::auto_backup_path(backup_dir, "startup", &entry.name, Utc::now());
        let summary = self.backup(std::slice::from_ref(entry), &path)?;
        Ok((summary, self.delete(entry)))
    }

    /// Export `entries` to a `.reg` file.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Io`] if the destination cannot be written.
    pub fn backup(&self, entries: &[StartupEntry], path: &Path) -> Result<BackupSummary, BackupError> {
        backup::export_startup(entries, path)
    }
}
