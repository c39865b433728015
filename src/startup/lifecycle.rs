//! Enable, disable and delete for startup entries.
//!
//! Enable and disable only touch the approval record; the Run or `RunOnce`
//! value itself is left alone so the entry can be switched back on.
use super::approval::DISABLED_RECORD;
use crate::lifecycle::{MutationReport, Operation, Outcome};
use crate::model::StartupEntry;
use crate::registry::{RegValue, RegistryStore};

fn approved_target(entry: &StartupEntry) -> String {
    format!(
        "{}\\{}",
        entry.kind.hive().full_path(entry.kind.approved_path()),
        entry.name
    )
}

/// Remove the approval record so the entry runs again.
#[must_use]
pub fn enable(store: &dyn RegistryStore, entry: &StartupEntry) -> MutationReport {
    let mut report = MutationReport::new(Operation::Enable, &entry.name);
    let result = store.delete_value(entry.kind.hive(), entry.kind.approved_path(), &entry.name);
    report.record(approved_target(entry), Outcome::missing_is_unchanged(result));
    report
}

/// Write a disabled approval record, creating the approval key if needed.
#[must_use]
pub fn disable(store: &dyn RegistryStore, entry: &StartupEntry) -> MutationReport {
    let mut report = MutationReport::new(Operation::Disable, &entry.name);
    let hive = entry.kind.hive();
    let path = entry.kind.approved_path();
    let result = store.create_key(hive, path).and_then(|()| {
        store.set_value(
            hive,
            path,
            &entry.name,
            &RegValue::Binary(DISABLED_RECORD.to_vec()),
        )
    });
    report.record(approved_target(entry), Outcome::from_result(result));
    report
}

/// Remove the entry from its list and drop its approval record.
#[must_use]
pub fn delete(store: &dyn RegistryStore, entry: &StartupEntry) -> MutationReport {
    let mut report = MutationReport::new(Operation::Delete, &entry.name);
    let location = entry.location();
    let result = store.delete_value(location.hive, location.sub_path, &entry.name);
    report.record(
        format!("{}\\{}", location.full_path(), entry.name),
        Outcome::missing_is_unchanged(result),
    );
    let result = store.delete_value(entry.kind.hive(), entry.kind.approved_path(), &entry.name);
    report.record(approved_target(entry), Outcome::missing_is_unchanged(result));
    report
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::StartupKind;
    use crate::model::location::{APPROVED_RUN32_PATH, APPROVED_RUN_PATH, RUN_PATH};
    use crate::registry::{Hive, MemoryRegistry};
    use crate::startup::approval;

    fn onedrive() -> StartupEntry {
        StartupEntry::new(StartupKind::UserRun, "OneDrive", r"C:\OneDrive.exe")
    }

    #[test]
    fn disable_creates_approval_key_and_record() {
        let store = MemoryRegistry::new().with_string(
            Hive::CurrentUser,
            RUN_PATH,
            "OneDrive",
            r"C:\OneDrive.exe",
        );
        let report = disable(&store, &onedrive());
        assert!(report.any_applied());
        assert_eq!(
            store.value(Hive::CurrentUser, APPROVED_RUN_PATH, "OneDrive"),
            Some(RegValue::Binary(DISABLED_RECORD.to_vec()))
        );
        assert!(!approval::is_enabled(&store, StartupKind::UserRun, "OneDrive"));
    }

    #[test]
    fn enable_removes_record_and_tolerates_absence() {
        let store = MemoryRegistry::new().with_value(
            Hive::CurrentUser,
            APPROVED_RUN_PATH,
            "OneDrive",
            RegValue::Binary(DISABLED_RECORD.to_vec()),
        );
        assert!(enable(&store, &onedrive()).any_applied());
        assert_eq!(store.value(Hive::CurrentUser, APPROVED_RUN_PATH, "OneDrive"), None);

        let again = enable(&store, &onedrive());
        assert!(again.all_applied());
        assert!(!again.any_applied());
    }

    #[test]
    fn system_entries_use_run32_record() {
        let entry = StartupEntry::new(StartupKind::SystemRunOnce, "Setup", r"C:\setup.exe");
        let store = MemoryRegistry::new();
        disable(&store, &entry);
        assert!(store.value(Hive::LocalMachine, APPROVED_RUN32_PATH, "Setup").is_some());
    }

    #[test]
    fn delete_removes_value_and_record() {
        let store = MemoryRegistry::new()
            .with_string(Hive::CurrentUser, RUN_PATH, "OneDrive", r"C:\OneDrive.exe")
            .with_string(Hive::CurrentUser, RUN_PATH, "Other", r"C:\other.exe")
            .with_value(
                Hive::CurrentUser,
                APPROVED_RUN_PATH,
                "OneDrive",
                RegValue::Binary(DISABLED_RECORD.to_vec()),
            );
        let report = delete(&store, &onedrive());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.counts(), (2, 0, 0));
        assert_eq!(store.value(Hive::CurrentUser, RUN_PATH, "OneDrive"), None);
        assert!(store.value(Hive::CurrentUser, RUN_PATH, "Other").is_some());
        assert_eq!(store.value(Hive::CurrentUser, APPROVED_RUN_PATH, "OneDrive"), None);
    }

    #[test]
    fn denied_write_is_reported_not_raised() {
        let store = MemoryRegistry::new()
            .with_string(Hive::LocalMachine, RUN_PATH, "Steam", r"C:\steam.exe")
            .with_write_denied(Hive::LocalMachine, "Software");
        let entry = StartupEntry::new(StartupKind::SystemRun, "Steam", r"C:\steam.exe");
        let report = disable(&store, &entry);
        assert!(report.completed());
        assert!(!report.any_accepted());
        assert!(report.failures().next().unwrap().1.is_permission_denied());
    }
}
