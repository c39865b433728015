//! User-facing entry records.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::location::{MenuLocation, StartupKind, StartupLocation};

/// Which kind of shell object a context-menu entry appears on.
///
/// The declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Classification {
    /// Right-click on a file.
    File,
    /// Right-click on a folder.
    Directory,
    /// Right-click on a drive.
    Drive,
    /// Right-click on the empty area of a folder window.
    Background,
}

impl Classification {
    /// Every classification in display order.
    pub const ALL: [Self; 4] = [Self::File, Self::Directory, Self::Drive, Self::Background];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Directory => "Directory",
            Self::Drive => "Drive",
            Self::Background => "Empty Area",
        }
    }

    /// Command-line spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Drive => "drive",
            Self::Background => "background",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s) || c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown classification '{s}' (expected one of: {})",
                    Self::ALL.map(Self::as_str).join(", ")
                )
            })
    }
}

/// When a context-menu entry is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Visibility {
    /// Always shown.
    #[default]
    Normal,
    /// Only shown with Shift held.
    Extended,
    /// Never shown interactively.
    Hidden,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Extended => "extended",
            Self::Hidden => "hidden",
        })
    }
}

/// One logical context-menu entry, possibly backed by several keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextMenuEntry {
    /// Whether the entry currently shows up.
    pub enabled: bool,
    /// Registry key name shared by every location.
    pub key: String,
    /// Resolved caption, accelerators removed.
    pub display_name: String,
    /// Best-guess vendor.
    pub publisher: Option<String>,
    /// Command line (verbs) or handler module path (shell extensions).
    pub command: Option<String>,
    /// Object kinds the entry applies to.
    pub classifications: BTreeSet<Classification>,
    /// Shift-only or hidden flag.
    pub visibility: Visibility,
    /// Whether any backing location is machine-wide.
    pub is_system: bool,
    /// Backing keys, primary first.
    pub locations: Vec<MenuLocation>,
}

impl ContextMenuEntry {
    /// Classifications joined for display, e.g. `File, Empty Area`.
    #[must_use]
    pub fn classification_label(&self) -> String {
        self.classifications
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The lowest classification, used as the primary sort key.
    #[must_use]
    pub fn primary_classification(&self) -> Option<Classification> {
        self.classifications.first().copied()
    }
}

/// One program launched at logon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupEntry {
    /// Whether the approval record allows the entry to run.
    pub enabled: bool,
    /// Value name in the Run or `RunOnce` list.
    pub name: String,
    /// Command line stored in the value.
    pub command: String,
    /// Best-guess vendor.
    pub publisher: Option<String>,
    /// Which list the entry belongs to.
    pub kind: StartupKind,
    /// Full path of the list, e.g. `HKEY_CURRENT_USER\Software\...\Run`.
    pub registry_path: String,
    /// Whether the entry is machine-wide.
    pub is_system: bool,
}

impl StartupEntry {
    /// Create an entry for `name` in the `kind` list.
    #[must_use]
    pub fn new(kind: StartupKind, name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            enabled: true,
            name: name.into(),
            command: command.into(),
            publisher: None,
            kind,
            registry_path: kind.location().full_path(),
            is_system: kind.is_system(),
        }
    }

    /// The list this entry lives in.
    #[must_use]
    pub const fn location(&self) -> StartupLocation {
        self.kind.location()
    }
}
