//! Export of entries to `.reg` files that the registry importer accepts.
//!
//! Rendering and writing are separate steps.  The `render_*` functions
//! produce the exact file text; [`write_reg_file`] encodes it as UTF-16LE
//! with a byte-order mark.  Registry read failures are written into the
//! text as comments, so the destination file is the only thing that can
//! fail an export.
pub mod encode;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use self::encode::{CRLF, escape, value_line};
use crate::error::BackupError;
use crate::model::{ContextMenuEntry, StartupEntry};
use crate::registry::{Hive, RegistryStore};

/// First line of every `.reg` file.
pub const HEADER: &str = "Windows Registry Editor Version 5.00";

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    /// Destination file.
    pub path: PathBuf,
    /// Entries exported.
    pub entries: usize,
    /// Key blocks written.
    pub blocks: usize,
    /// Locations that could not be read and were written as comments.
    pub read_errors: usize,
}

#[derive(Debug, Default)]
struct Rendered {
    text: String,
    blocks: usize,
    read_errors: usize,
}

impl Rendered {
    fn new() -> Self {
        Self {
            text: format!("{HEADER}{CRLF}{CRLF}"),
            ..Self::default()
        }
    }

    fn line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push_str(CRLF);
    }

    /// Write `[path]` and every value under it.
    fn key_block(&mut self, store: &dyn RegistryStore, hive: Hive, path: &str) -> bool {
        let full = hive.full_path(path);
        match store.values(hive, path) {
            Ok(values) => {
                self.line(&format!("[{full}]"));
                for (name, value) in &values {
                    self.text.push_str(&value_line(name, value));
                }
                self.blocks += 1;
                true
            }
            Err(e) => {
                tracing::debug!("backup could not read {full}: {e}");
                self.line(&format!("; Error reading {full}: {e}"));
                self.read_errors += 1;
                false
            }
        }
    }
}

fn render_menu(store: &dyn RegistryStore, entries: &[ContextMenuEntry]) -> Rendered {
    let mut out = Rendered::new();
    for entry in entries {
        for location in &entry.locations {
            out.line(&format!(
                "; {} ({})",
                entry.display_name,
                entry.classification_label()
            ));
            if !out.key_block(store, location.hive, &location.sub_path) {
                continue;
            }
            let command = location.command_path();
            if store.key_exists(location.hive, &command) {
                out.line("");
                out.key_block(store, location.hive, &command);
            }
            out.line("");
        }
    }
    out
}

fn render_startup_entries(entries: &[StartupEntry]) -> Rendered {
    let mut out = Rendered::new();
    let mut paths: Vec<&str> = Vec::new();
    for entry in entries {
        if !paths.contains(&entry.registry_path.as_str()) {
            paths.push(&entry.registry_path);
        }
    }
    for path in paths {
        out.line(&format!("[{path}]"));
        for entry in entries.iter().filter(|e| e.registry_path == path) {
            out.line(&format!(
                "\"{}\"=\"{}\"",
                escape(&entry.name),
                escape(&entry.command)
            ));
        }
        out.line("");
        out.blocks += 1;
    }
    out
}

/// Render context-menu entries, reading every location's values (and its
/// `command` subkey) from `store`.
#[must_use]
pub fn render_context_menu(store: &dyn RegistryStore, entries: &[ContextMenuEntry]) -> String {
    render_menu(store, entries).text
}

/// Render startup entries grouped by their owning list, in first-seen
/// order.
#[must_use]
pub fn render_startup(entries: &[StartupEntry]) -> String {
    render_startup_entries(entries).text
}

/// Write rendered `.reg` text to `path` as UTF-16LE with a BOM.
///
/// # Errors
///
/// Returns [`BackupError::Io`] if the parent directory cannot be created or
/// the file cannot be written.
pub fn write_reg_file(path: &Path, text: &str) -> Result<(), BackupError> {
    let io_err = |source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, encode::utf16le_with_bom(text)).map_err(io_err)
}

/// Render and write context-menu entries.
///
/// # Errors
///
/// Returns [`BackupError::Io`] if the destination cannot be written.
pub fn export_context_menu(
    store: &dyn RegistryStore,
    entries: &[ContextMenuEntry],
    path: &Path,
) -> Result<BackupSummary, BackupError> {
    let rendered = render_menu(store, entries);
    write_reg_file(path, &rendered.text)?;
    tracing::info!(
        "backed up {} context menu entries to {}",
        entries.len(),
        path.display()
    );
    Ok(BackupSummary {
        path: path.to_path_buf(),
        entries: entries.len(),
        blocks: rendered.blocks,
        read_errors: rendered.read_errors,
    })
}

/// Render and write startup entries.
///
/// # Errors
///
/// Returns [`BackupError::Io`] if the destination cannot be written.
pub fn export_startup(entries: &[StartupEntry], path: &Path) -> Result<BackupSummary, BackupError> {
    let rendered = render_startup_entries(entries);
    write_reg_file(path, &rendered.text)?;
    tracing::info!(
        "backed up {} startup entries to {}",
        entries.len(),
        path.display()
    );
    Ok(BackupSummary {
        path: path.to_path_buf(),
        entries: entries.len(),
        blocks: rendered.blocks,
        read_errors: rendered.read_errors,
    })
}

/// File name for an automatic pre-delete backup:
/// `<dir>/<domain>-<subject>-<UTC timestamp>.reg`.
///
/// Characters that are unsafe in file names are replaced with `_`.
#[must_use]
pub fn auto_backup_path(dir: &Path, domain: &str, subject: &str, at: DateTime<Utc>) -> PathBuf {
    let safe: String = subject
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    dir.join(format!(
        "{domain}-{safe}-{}.reg",
        at.format("%Y%m%dT%H%M%SZ")
    ))
}
