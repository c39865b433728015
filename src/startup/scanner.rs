//! Startup discovery over the four Run and `RunOnce` lists.
use super::approval;
use crate::command_line;
use crate::model::{ScanOptions, StartupEntry, StartupKind};
use crate::platform::SystemDirs;
use crate::publisher;
use crate::registry::{RegValue, RegistryStore};

/// Scan every startup list, sorted by name (case-insensitive) then kind.
#[must_use]
pub fn scan(
    store: &dyn RegistryStore,
    system_dirs: &SystemDirs,
    options: &ScanOptions,
) -> Vec<StartupEntry> {
    let mut entries: Vec<StartupEntry> = StartupKind::ALL
        .into_iter()
        .flat_map(|kind| scan_kind(store, system_dirs, options, kind))
        .collect();
    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.kind.cmp(&b.kind))
    });
    entries
}

/// Scan a single list.  An unreadable list yields no entries.
#[must_use]
pub fn scan_kind(
    store: &dyn RegistryStore,
    system_dirs: &SystemDirs,
    options: &ScanOptions,
    kind: StartupKind,
) -> Vec<StartupEntry> {
    let hive = kind.hive();
    let path = kind.run_path();
    let names = match store.value_names(hive, path) {
        Ok(names) => names,
        Err(e) => {
            tracing::debug!("skipping {}: {e}", hive.full_path(path));
            return Vec::new();
        }
    };

    names
        .into_iter()
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let command = match store.read_value(hive, path, &name) {
                Ok(RegValue::String(s) | RegValue::ExpandString(s)) if !s.trim().is_empty() => s,
                Ok(_) => return None,
                Err(e) => {
                    tracing::debug!("skipping startup value {name}: {e}");
                    return None;
                }
            };
            if !options.include_system_items {
                let expanded = system_dirs.expand(&command);
                if command_line::executable(&expanded).is_some_and(|exe| system_dirs.contains(&exe))
                {
                    tracing::debug!("filtering system startup entry {name}");
                    return None;
                }
            }
            let mut entry = StartupEntry::new(kind, &name, command);
            entry.publisher = publisher::for_startup(&entry.command);
            entry.enabled = approval::is_enabled(store, kind, &name);
            Some(entry)
        })
        .collect()
}
