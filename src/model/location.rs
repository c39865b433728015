//! Where an entry lives in the registry.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::registry::Hive;

/// Per-user and per-machine autorun key.
pub const RUN_PATH: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";
/// Per-user and per-machine run-once key.
pub const RUN_ONCE_PATH: &str = r"Software\Microsoft\Windows\CurrentVersion\RunOnce";
/// Approval record for per-user startup entries.
pub const APPROVED_RUN_PATH: &str =
    r"Software\Microsoft\Windows\CurrentVersion\Explorer\StartupApproved\Run";
/// Approval record for per-machine startup entries.
pub const APPROVED_RUN32_PATH: &str =
    r"Software\Microsoft\Windows\CurrentVersion\Explorer\StartupApproved\Run32";

/// One registry key that contributes to a context-menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MenuLocation {
    /// Hive the key lives in.
    pub hive: Hive,
    /// Path of the entry's own key below the hive root.
    pub sub_path: String,
    /// Whether the key sits in the machine-wide view.
    pub is_system: bool,
    /// Whether this is a shell-extension handler rather than a verb.
    pub is_com_handler: bool,
    /// Handler GUID, for shell-extension handlers only.
    pub handler_id: Option<String>,
}

impl MenuLocation {
    /// A verb key under a `shell` subtree.
    #[must_use]
    pub fn verb(hive: Hive, sub_path: impl Into<String>, is_system: bool) -> Self {
        Self {
            hive,
            sub_path: sub_path.into(),
            is_system,
            is_com_handler: false,
            handler_id: None,
        }
    }

    /// A handler key under a `shellex\ContextMenuHandlers` subtree.
    #[must_use]
    pub fn com_handler(
        hive: Hive,
        sub_path: impl Into<String>,
        is_system: bool,
        handler_id: impl Into<String>,
    ) -> Self {
        Self {
            hive,
            sub_path: sub_path.into(),
            is_system,
            is_com_handler: true,
            handler_id: Some(handler_id.into()),
        }
    }

    /// The location's full path, e.g. `HKEY_CLASSES_ROOT\*\shell\git`.
    #[must_use]
    pub fn full_path(&self) -> String {
        self.hive.full_path(&self.sub_path)
    }

    /// Path of the verb's `command` subkey.
    #[must_use]
    pub fn command_path(&self) -> String {
        format!("{}\\command", self.sub_path)
    }
}

/// The single key backing a startup entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StartupLocation {
    /// Hive owning both the list and its approval record.
    pub hive: Hive,
    /// Path of the Run or `RunOnce` list.
    pub sub_path: &'static str,
    /// Whether the list is machine-wide.
    pub is_system: bool,
}

impl StartupLocation {
    /// The list's full path.
    #[must_use]
    pub fn full_path(&self) -> String {
        self.hive.full_path(self.sub_path)
    }
}

/// The four registry lists that launch programs at logon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartupKind {
    /// Current user, every logon.
    UserRun,
    /// Local machine, every logon.
    SystemRun,
    /// Current user, next logon only.
    UserRunOnce,
    /// Local machine, next logon only.
    SystemRunOnce,
}

impl StartupKind {
    /// Every kind, in scan order.
    pub const ALL: [Self; 4] = [
        Self::UserRun,
        Self::SystemRun,
        Self::UserRunOnce,
        Self::SystemRunOnce,
    ];

    /// Hive holding this kind's list and its approval record.
    #[must_use]
    pub const fn hive(self) -> Hive {
        if self.is_system() {
            Hive::LocalMachine
        } else {
            Hive::CurrentUser
        }
    }

    /// Whether this kind is machine-wide.
    #[must_use]
    pub const fn is_system(self) -> bool {
        matches!(self, Self::SystemRun | Self::SystemRunOnce)
    }

    /// Path of the list holding the entries.
    #[must_use]
    pub const fn run_path(self) -> &'static str {
        match self {
            Self::UserRun | Self::SystemRun => RUN_PATH,
            Self::UserRunOnce | Self::SystemRunOnce => RUN_ONCE_PATH,
        }
    }

    /// Path of the approval record consulted for this kind.
    #[must_use]
    pub const fn approved_path(self) -> &'static str {
        if self.is_system() {
            APPROVED_RUN32_PATH
        } else {
            APPROVED_RUN_PATH
        }
    }

    /// Where entries of this kind are stored.
    #[must_use]
    pub const fn location(self) -> StartupLocation {
        StartupLocation {
            hive: self.hive(),
            sub_path: self.run_path(),
            is_system: self.is_system(),
        }
    }

    /// Stable command-line name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserRun => "user-run",
            Self::SystemRun => "system-run",
            Self::UserRunOnce => "user-run-once",
            Self::SystemRunOnce => "system-run-once",
        }
    }
}

impl fmt::Display for StartupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown startup kind '{s}' (expected one of: {})",
                    Self::ALL.map(Self::as_str).join(", ")
                )
            })
    }
}
