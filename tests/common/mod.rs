// Shared helpers for integration tests.
//
// Provides a fluent builder over an in-memory registry so each integration
// test can lay out the keys it needs without repeating path boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use regtidy::context_menu::ContextMenuManager;
use regtidy::model::{ScanOptions, StartupKind};
use regtidy::platform::SystemDirs;
use regtidy::registry::{Hive, MemoryRegistry, RegValue};
use regtidy::resolver::NoopResolver;
use regtidy::startup::StartupManager;

/// Windows directory used by every fixture.
pub const WINDOWS_DIR: &str = r"C:\Windows";

/// Where a verb is registered.
#[derive(Debug, Clone, Copy)]
pub enum View {
    /// `HKEY_CLASSES_ROOT`.
    Machine,
    /// `HKEY_CURRENT_USER\Software\Classes`.
    User,
}

impl View {
    pub const fn hive(self) -> Hive {
        match self {
            Self::Machine => Hive::ClassesRoot,
            Self::User => Hive::CurrentUser,
        }
    }

    /// Path of `class_path` (e.g. `Directory\shell`) in this view.
    pub fn path(self, class_path: &str) -> String {
        match self {
            Self::Machine => class_path.to_string(),
            Self::User => format!(r"Software\Classes\{class_path}"),
        }
    }
}

/// Builds a [`MemoryRegistry`] and hands out managers over it.
#[derive(Debug, Default)]
pub struct Fixture {
    store: MemoryRegistry,
    options: ScanOptions,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a verb `key` under `verbs` (e.g. `*\shell`) in `view`.
    pub fn verb(mut self, view: View, verbs: &str, key: &str, caption: &str, command: &str) -> Self {
        let path = format!(r"{}\{key}", view.path(verbs));
        self.store = self
            .store
            .with_string(view.hive(), &path, "", caption)
            .with_string(view.hive(), &format!(r"{path}\command"), "", command);
        self
    }

    /// Add a value to an existing verb.
    pub fn verb_value(mut self, view: View, verbs: &str, key: &str, name: &str, value: RegValue) -> Self {
        let path = format!(r"{}\{key}", view.path(verbs));
        self.store = self.store.with_value(view.hive(), &path, name, value);
        self
    }

    /// Register a shell-extension handler backed by `server`.
    pub fn handler(mut self, view: View, handlers: &str, key: &str, clsid: &str, server: &str) -> Self {
        let path = format!(r"{}\{key}", view.path(handlers));
        self.store = self
            .store
            .with_string(view.hive(), &path, "", clsid)
            .with_string(
                Hive::ClassesRoot,
                &format!(r"CLSID\{clsid}\InprocServer32"),
                "",
                server,
            );
        self
    }

    /// Add `name` to the `kind` startup list.
    pub fn startup(mut self, kind: StartupKind, name: &str, command: &str) -> Self {
        self.store = self.store.with_string(kind.hive(), kind.run_path(), name, command);
        self
    }

    /// Write a raw approval record for `name`.
    pub fn approval(mut self, kind: StartupKind, name: &str, record: &[u8]) -> Self {
        self.store = self.store.with_value(
            kind.hive(),
            kind.approved_path(),
            name,
            RegValue::Binary(record.to_vec()),
        );
        self
    }

    pub fn write_denied(mut self, hive: Hive, prefix: &str) -> Self {
        self.store = self.store.with_write_denied(hive, prefix);
        self
    }

    pub fn read_denied(mut self, hive: Hive, prefix: &str) -> Self {
        self.store = self.store.with_read_denied(hive, prefix);
        self
    }

    pub fn include_system_items(mut self) -> Self {
        self.options.include_system_items = true;
        self
    }

    pub fn include_com_handlers(mut self) -> Self {
        self.options.include_com_handlers = true;
        self
    }

    /// Finish building and return the shared store plus both managers.
    pub fn build(self) -> Harness {
        let store = Arc::new(self.store);
        let dirs = SystemDirs::from_windows_dir(WINDOWS_DIR);
        Harness {
            menu: ContextMenuManager::new(
                store.clone(),
                Arc::new(NoopResolver),
                dirs.clone(),
                self.options.clone(),
            ),
            startup: StartupManager::new(store.clone(), dirs, self.options),
            store,
        }
    }
}

/// Managers over one shared in-memory registry.
#[derive(Debug)]
pub struct Harness {
    pub store: Arc<MemoryRegistry>,
    pub menu: ContextMenuManager,
    pub startup: StartupManager,
}

/// Read a `.reg` file back into text, checking the UTF-16LE byte-order mark
/// and normalizing line endings to `\n`.
pub fn read_reg_file(path: &std::path::Path) -> String {
    let bytes = std::fs::read(path).expect("read backup");
    let body = bytes
        .strip_prefix(&[0xFF, 0xFE])
        .expect("backup starts with a UTF-16LE BOM");
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .expect("backup is valid UTF-16")
        .replace("\r\n", "\n")
}
