//! Data model shared by discovery, mutation and backup.
pub mod entry;
pub mod location;

pub use entry::{Classification, ContextMenuEntry, StartupEntry, Visibility};
pub use location::{MenuLocation, StartupKind, StartupLocation};

/// Knobs that change what a scan returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Keep entries whose executable lives in the system directories.
    pub include_system_items: bool,
    /// Also enumerate shell-extension handlers.
    pub include_com_handlers: bool,
    /// Extra key names to ignore, compared case-insensitively.
    pub skip: Vec<String>,
}
