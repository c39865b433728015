//! Context-menu discovery.
//!
//! Walks the `shell` (verb) and `shellex\ContextMenuHandlers` (shell
//! extension) subtrees of each object class, in both the machine-wide
//! classes view and the per-user classes hive, and produces one
//! [`RawCandidate`] per registration.  Candidates are not yet merged; see
//! [`super::dedup`].
use crate::command_line;
use crate::model::{Classification, MenuLocation, ScanOptions, Visibility};
use crate::platform::SystemDirs;
use crate::publisher;
use crate::registry::{DEFAULT_VALUE, Hive, RegistryStore};
use crate::resolver::{self, ResourceResolver};

/// Value whose presence disables an entry.
pub const LEGACY_DISABLE: &str = "LegacyDisable";
/// Value whose presence shows the entry only with Shift held.
pub const EXTENDED: &str = "Extended";
/// Value whose presence hides the entry from interactive menus.
pub const PROGRAMMATIC_ACCESS_ONLY: &str = "ProgrammaticAccessOnly";
/// Localizable caption value.
pub const MUI_VERB: &str = "MUIVerb";

/// Prefix of the per-user classes hive under `HKEY_CURRENT_USER`.
pub const USER_CLASSES: &str = r"Software\Classes";

/// Built-in shell verbs that are never reported.
pub const DENY_LIST: &[&str] = &[
    "pintostartscreen",
    "pintohome",
    "windows.modernshare",
    "windows.share",
    "copyaspath",
    "copyto",
    "moveto",
    "sendto",
    "opennewwindow",
    "opennewprocess",
];

/// One row of the scan table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPath {
    /// Object kind the row's entries apply to.
    pub classification: Classification,
    /// Verb subtree, relative to the classes root.
    pub verbs: &'static str,
    /// Shell-extension subtree, relative to the classes root.
    pub handlers: &'static str,
}

/// Every location a context-menu entry can be registered in.
pub const SCAN_TABLE: [ScanPath; 4] = [
    ScanPath {
        classification: Classification::File,
        verbs: r"*\shell",
        handlers: r"*\shellex\ContextMenuHandlers",
    },
    ScanPath {
        classification: Classification::Directory,
        verbs: r"Directory\shell",
        handlers: r"Directory\shellex\ContextMenuHandlers",
    },
    ScanPath {
        classification: Classification::Background,
        verbs: r"Directory\Background\shell",
        handlers: r"Directory\Background\shellex\ContextMenuHandlers",
    },
    ScanPath {
        classification: Classification::Drive,
        verbs: r"Drive\shell",
        handlers: r"Drive\shellex\ContextMenuHandlers",
    },
];

/// A single registration found by the scanner, before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    /// Sub-key name under the verb or handler path.
    pub key: String,
    /// Resolved caption with accelerators removed.
    pub display_name: String,
    /// Publisher guessed from the executable path.
    pub publisher: Option<String>,
    /// Command line, or the in-process server path for shell extensions.
    pub command: String,
    /// Object type of the scanned path.
    pub classification: Classification,
    /// Visibility read from the key's flags.
    pub visibility: Visibility,
    /// False when `LegacyDisable` is present.
    pub enabled: bool,
    /// Where the registration lives.
    pub location: MenuLocation,
}

/// Normalize a GUID to upper-case braced form.
///
/// Accepts the 8-4-4-4-12 hex form with or without braces.
#[must_use]
pub fn normalize_guid(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);
    let groups: Vec<&str> = inner.split('-').collect();
    let well_formed = groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(group, len)| group.len() == len && group.chars().all(|c| c.is_ascii_hexdigit()));
    well_formed.then(|| format!("{{{}}}", inner.to_ascii_uppercase()))
}

/// Walks the scan table against a [`RegistryStore`].
pub struct Scanner<'a> {
    store: &'a dyn RegistryStore,
    resolver: &'a dyn ResourceResolver,
    system_dirs: &'a SystemDirs,
    options: &'a ScanOptions,
}

impl std::fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("store", &self.store)
            .field("system_dirs", &self.system_dirs)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Scanner<'a> {
    /// Borrow the collaborators for one scan.
    #[must_use]
    pub fn new(
        store: &'a dyn RegistryStore,
        resolver: &'a dyn ResourceResolver,
        system_dirs: &'a SystemDirs,
        options: &'a ScanOptions,
    ) -> Self {
        Self {
            store,
            resolver,
            system_dirs,
            options,
        }
    }

    /// Scan every row of [`SCAN_TABLE`].
    #[must_use]
    pub fn scan(&self) -> Vec<RawCandidate> {
        SCAN_TABLE.iter().flat_map(|row| self.scan_row(row)).collect()
    }

    /// Scan one row in both the machine-wide and the per-user classes view.
    #[must_use]
    pub fn scan_row(&self, row: &ScanPath) -> Vec<RawCandidate> {
        let mut out = Vec::new();
        for (hive, prefix, is_system) in [
            (Hive::ClassesRoot, None, true),
            (Hive::CurrentUser, Some(USER_CLASSES), false),
        ] {
            let rooted = |base: &str| match prefix {
                Some(prefix) => format!("{prefix}\\{base}"),
                None => base.to_string(),
            };
            self.scan_verbs(hive, &rooted(row.verbs), row.classification, is_system, &mut out);
            if self.options.include_com_handlers {
                self.scan_handlers(
                    hive,
                    &rooted(row.handlers),
                    row.classification,
                    is_system,
                    &mut out,
                );
            }
        }
        out
    }

    fn child_keys(&self, hive: Hive, parent: &str) -> Vec<String> {
        match self.store.subkey_names(hive, parent) {
            Ok(names) => names
                .into_iter()
                .filter(|name| !self.is_skipped(name))
                .collect(),
            Err(e) => {
                tracing::debug!("skipping {}: {e}", hive.full_path(parent));
                Vec::new()
            }
        }
    }

    fn scan_verbs(
        &self,
        hive: Hive,
        parent: &str,
        classification: Classification,
        is_system: bool,
        out: &mut Vec<RawCandidate>,
    ) {
        for key in self.child_keys(hive, parent) {
            let path = format!("{parent}\\{key}");
            let Some(command) = self.non_empty(hive, &format!("{path}\\command"), DEFAULT_VALUE)
            else {
                tracing::debug!("no command under {}, skipping", hive.full_path(&path));
                continue;
            };
            if !self.keep(&command) {
                continue;
            }
            let caption = self
                .non_empty(hive, &path, MUI_VERB)
                .or_else(|| self.non_empty(hive, &path, DEFAULT_VALUE))
                .unwrap_or_else(|| key.clone());
            let location = MenuLocation::verb(hive, &path, is_system);
            out.push(self.candidate(key, &caption, command, classification, location));
        }
    }

    fn scan_handlers(
        &self,
        hive: Hive,
        parent: &str,
        classification: Classification,
        is_system: bool,
        out: &mut Vec<RawCandidate>,
    ) {
        for key in self.child_keys(hive, parent) {
            let path = format!("{parent}\\{key}");
            let Some(handler_id) = self
                .store
                .read_string(hive, &path, DEFAULT_VALUE)
                .and_then(|value| normalize_guid(&value))
                .or_else(|| normalize_guid(&key))
            else {
                tracing::debug!("no handler id under {}, skipping", hive.full_path(&path));
                continue;
            };
            let server_path = format!(r"CLSID\{handler_id}\InprocServer32");
            let Some(server) = self.non_empty(Hive::ClassesRoot, &server_path, DEFAULT_VALUE)
            else {
                tracing::debug!("handler {handler_id} has no server, skipping");
                continue;
            };
            if !self.keep(&server) {
                continue;
            }
            let caption = if normalize_guid(&key).is_some() {
                self.non_empty(Hive::ClassesRoot, &format!(r"CLSID\{handler_id}"), DEFAULT_VALUE)
                    .unwrap_or_else(|| key.clone())
            } else {
                key.clone()
            };
            let location = MenuLocation::com_handler(hive, &path, is_system, handler_id);
            out.push(self.candidate(key, &caption, server, classification, location));
        }
    }

    fn candidate(
        &self,
        key: String,
        caption: &str,
        command: String,
        classification: Classification,
        location: MenuLocation,
    ) -> RawCandidate {
        let display_name =
            resolver::strip_accelerators(&resolver::display_text(self.resolver, caption));
        let enabled = !self.has_value(location.hive, &location.sub_path, LEGACY_DISABLE);
        let visibility = if self.has_value(location.hive, &location.sub_path, PROGRAMMATIC_ACCESS_ONLY)
        {
            Visibility::Hidden
        } else if self.has_value(location.hive, &location.sub_path, EXTENDED) {
            Visibility::Extended
        } else {
            Visibility::Normal
        };
        RawCandidate {
            key,
            display_name,
            publisher: publisher::for_context_menu(&command),
            command,
            classification,
            visibility,
            enabled,
            location,
        }
    }

    fn is_skipped(&self, key: &str) -> bool {
        DENY_LIST.iter().any(|name| name.eq_ignore_ascii_case(key))
            || self
                .options
                .skip
                .iter()
                .any(|name| name.eq_ignore_ascii_case(key))
    }

    /// Whether a candidate survives the system-directory filter.
    fn keep(&self, command: &str) -> bool {
        if self.options.include_system_items {
            return true;
        }
        let expanded = self.system_dirs.expand(command);
        let is_system = command_line::executable(&expanded)
            .is_some_and(|exe| self.system_dirs.contains(&exe));
        if is_system {
            tracing::debug!("filtering system command {command}");
        }
        !is_system
    }

    fn has_value(&self, hive: Hive, path: &str, name: &str) -> bool {
        self.store.read_value(hive, path, name).is_ok()
    }

    fn non_empty(&self, hive: Hive, path: &str, name: &str) -> Option<String> {
        self.store
            .read_string(hive, path, name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
