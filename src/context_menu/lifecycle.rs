//! Enable, disable and delete for context-menu entries.
//!
//! Every operation visits all of the entry's locations, records one
//! outcome per location and keeps going after a failure.
use super::scanner::LEGACY_DISABLE;
use crate::lifecycle::{MutationReport, Operation, Outcome};
use crate::model::ContextMenuEntry;
use crate::registry::{RegValue, RegistryStore, StoreError, split_parent};

/// Remove `LegacyDisable` from every location.
#[must_use]
pub fn enable(store: &dyn RegistryStore, entry: &ContextMenuEntry) -> MutationReport {
    let mut report = MutationReport::new(Operation::Enable, &entry.key);
    for location in &entry.locations {
        let result = store.delete_value(location.hive, &location.sub_path, LEGACY_DISABLE);
        report.record(location.full_path(), Outcome::missing_is_unchanged(result));
    }
    report
}

/// Set an empty `LegacyDisable` on every location.
#[must_use]
pub fn disable(store: &dyn RegistryStore, entry: &ContextMenuEntry) -> MutationReport {
    let mut report = MutationReport::new(Operation::Disable, &entry.key);
    for location in &entry.locations {
        let (hive, path) = (location.hive, location.sub_path.as_str());
        let outcome = if store.read_value(hive, path, LEGACY_DISABLE).is_ok() {
            Outcome::Unchanged
        } else {
            Outcome::from_result(store.create_key(hive, path).and_then(|()| {
                store.set_value(hive, path, LEGACY_DISABLE, &RegValue::String(String::new()))
            }))
        };
        report.record(location.full_path(), outcome);
    }
    report
}

/// Recursively delete every location's key.
#[must_use]
pub fn delete(store: &dyn RegistryStore, entry: &ContextMenuEntry) -> MutationReport {
    let mut report = MutationReport::new(Operation::Delete, &entry.key);
    for location in &entry.locations {
        let outcome = match split_parent(&location.sub_path) {
            Some((parent, leaf)) => {
                Outcome::missing_is_unchanged(store.delete_tree(location.hive, parent, leaf))
            }
            None => Outcome::Failed(StoreError::InvalidData {
                path: location.full_path(),
                reason: "refusing to delete a key directly under the hive root".to_string(),
            }),
        };
        report.record(location.full_path(), outcome);
    }
    report
}
