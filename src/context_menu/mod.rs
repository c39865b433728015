//! Context-menu entries: discovery, lifecycle and backup.
pub mod dedup;
pub mod lifecycle;
pub mod scanner;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use crate::backup::{self, BackupSummary};
use crate::error::BackupError;
use crate::lifecycle::MutationReport;
use crate::model::{ContextMenuEntry, ScanOptions};
use crate::platform::SystemDirs;
use crate::registry::RegistryStore;
use crate::resolver::ResourceResolver;

use self::scanner::Scanner;

/// Entry point for everything context-menu related.
///
/// Holds its collaborators explicitly so tests can hand in a
/// [`MemoryRegistry`](crate::registry::MemoryRegistry) and a fixed set of
/// system directories.
#[derive(Clone)]
pub struct ContextMenuManager {
    store: Arc<dyn RegistryStore>,
    resolver: Arc<dyn ResourceResolver>,
    system_dirs: SystemDirs,
    options: ScanOptions,
}

impl fmt::Debug for ContextMenuManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenuManager")
            .field("store", &self.store)
            .field("system_dirs", &self.system_dirs)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ContextMenuManager {
    /// Create a manager over `store`.
    #[must_use]
    pub fn new(
        store: Arc<dyn RegistryStore>,
        resolver: Arc<dyn ResourceResolver>,
        system_dirs: SystemDirs,
        options: ScanOptions,
    ) -> Self {
        Self {
            store,
            resolver,
            system_dirs,
            options,
        }
    }

    /// The store this manager reads and writes.
    #[must_use]
    pub fn store(&self) -> &dyn RegistryStore {
        self.store.as_ref()
    }

    /// Scan and merge every context-menu entry.
    #[must_use]
    pub fn discover(&self) -> Vec<ContextMenuEntry> {
        let scanner = Scanner::new(
            self.store.as_ref(),
            self.resolver.as_ref(),
            &self.system_dirs,
            &self.options,
        );
        let candidates = scanner.scan();
        let found = candidates.len();
        let entries = dedup::deduplicate(candidates);
        tracing::info!(
            "found {} context menu entries ({found} registrations)",
            entries.len()
        );
        entries
    }

    /// Enable `entry` everywhere it is registered.
    ///
    /// `entry.enabled` is set up front and restored if no location
    /// accepted the change.
    #[must_use]
    pub fn enable(&self, entry: &mut ContextMenuEntry) -> MutationReport {
        self.toggle(entry, true)
    }

    /// Disable `entry` everywhere it is registered.
    #[must_use]
    pub fn disable(&self, entry: &mut ContextMenuEntry) -> MutationReport {
        self.toggle(entry, false)
    }

    fn toggle(&self, entry: &mut ContextMenuEntry, enabled: bool) -> MutationReport {
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

    /// Delete every key backing `entry`.
    #[must_use]
    pub fn delete(&self, entry: &ContextMenuEntry) -> MutationReport {
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
        entry: &ContextMenuEntry,
        backup_dir: &Path,
    ) -> Result<(BackupSummary, MutationReport), BackupError> {
        let path = backup::auto_backup_path(backup_dir, "menu", &entry.key, Utc::now());
        let summary = self.backup(std::slice::from_ref(entry), &path)?;
        Ok((summary, self.delete(entry)))
    }

    /// Export `entries` and their key trees to a `.reg` file.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Io`] if the destination cannot be written.
    pub fn backup(
        &self,
        entries: &[ContextMenuEntry],
        path: &Path,
    ) -> Result<BackupSummary, BackupError> {
        backup::export_context_menu(self.store.as_ref(), entries, path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::registry::{Hive, MemoryRegistry};
    use crate::resolver::NoopResolver;

    fn manager(store: MemoryRegistry) -> (Arc<MemoryRegistry>, ContextMenuManager) {
        let store = Arc::new(store);
        let manager = ContextMenuManager::new(
            store.clone(),
            Arc::new(NoopResolver),
            SystemDirs::from_windows_dir(r"C:\Windows"),
            ScanOptions::default(),
        );
        (store, manager)
    }

    #[test]
    fn failed_toggle_rolls_back_flag() {
        let (_, manager) = manager(
            MemoryRegistry::new()
                .with_string(Hive::ClassesRoot, r"*\shell\x\command", "", r"C:\x.exe")
                .with_write_denied(Hive::ClassesRoot, r"*\shell\x"),
        );
        let mut entry = manager.discover().remove(0);
        assert!(entry.enabled);
        let report = manager.disable(&mut entry);
        assert!(!report.any_accepted());
        assert!(entry.enabled);
    }

    #[test]
    fn toggle_updates_flag_and_rediscovery_agrees() {
        let (_, manager) = manager(
            MemoryRegistry::new()
                .with_string(Hive::ClassesRoot, r"*\shell\x\command", "", r"C:\x.exe"),
        );
        let mut entry = manager.discover().remove(0);
        assert!(manager.disable(&mut entry).all_applied());
        assert!(!entry.enabled);
        assert!(!manager.discover()[0].enabled);
        assert!(manager.enable(&mut entry).all_applied());
        assert!(entry.enabled);
        assert!(manager.discover()[0].enabled);
    }

    #[test]
    fn delete_after_backup_refuses_when_backup_fails() {
        let (store, manager) = manager(
            MemoryRegistry::new()
                .with_string(Hive::ClassesRoot, r"*\shell\x\command", "", r"C:\x.exe"),
        );
        let entry = manager.discover().remove(0);
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        assert!(manager.delete_after_backup(&entry, &blocker).is_err());
        assert!(store.contains_key(Hive::ClassesRoot, r"*\shell\x"));

        let (summary, report) = manager.delete_after_backup(&entry, dir.path()).unwrap();
        assert!(summary.path.exists());
        assert!(report.any_applied());
        assert!(!store.contains_key(Hive::ClassesRoot, r"*\shell\x"));
    }
}
