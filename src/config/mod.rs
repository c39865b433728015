//! User settings loaded from `config.toml`.
pub mod toml_loader;
pub mod validation;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::ScanOptions;

/// File name looked up inside the configuration directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Settings that shape discovery and deletion.
///
/// Every key is optional; an absent file yields [`Settings::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Keep entries whose executable lives under the Windows directory.
    pub include_system_items: bool,
    /// Also scan `shellex\ContextMenuHandlers`.
    pub include_com_handlers: bool,
    /// Extra key names to ignore during discovery.
    pub skip: Vec<String>,
    /// Write a `.reg` backup before every delete.
    pub backup_before_delete: bool,
    /// Where automatic backups go.
    pub backup_dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, names
    /// an unknown key, or sets `backup_dir` to an empty path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings: Self = toml_loader::load_config(path)?;
        if settings
            .backup_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                key: "backup_dir".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(settings)
    }

    /// Default settings file: `<config dir>/regtidy/config.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        config_dir().join("regtidy").join(CONFIG_FILE)
    }

    /// Turn on the scan flags given on the command line.
    ///
    /// Flags only ever widen a scan; an unset flag leaves the file's value.
    #[must_use]
    pub const fn with_overrides(mut self, include_system: bool, com_handlers: bool) -> Self {
        self.include_system_items |= include_system;
        self.include_com_handlers |= com_handlers;
        self
    }

    /// Scanner options derived from these settings.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            include_system_items: self.include_system_items,
            include_com_handlers: self.include_com_handlers,
            skip: self.skip.clone(),
        }
    }

    /// Directory for automatic pre-delete backups.
    ///
    /// Falls back to `<cache dir>/regtidy/backups` when unset.
    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| crate::logging::cache_root().join("regtidy").join("backups"))
    }
}

/// Per-user configuration root.
///
/// `%APPDATA%` on Windows, otherwise `$XDG_CONFIG_HOME` or `~/.config`.
fn config_dir() -> PathBuf {
    if cfg!(windows)
        && let Ok(appdata) = std::env::var("APPDATA")
    {
        return PathBuf::from(appdata);
    }
    std::env::var("XDG_CONFIG_HOME").map_or_else(
        |_| {
            std::env::var("HOME")
                .or_else(|_| std::env::var("USERPROFILE"))
                .map_or_else(|_| PathBuf::from("."), PathBuf::from)
                .join(".config")
        },
        PathBuf::from,
    )
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn loads_every_key() {
        let (_dir, path) = write(
            r#"
include_system_items = true
include_com_handlers = true
skip = ["Git_Shell"]
backup_before_delete = true
backup_dir = 'C:\backups'
"#,
        );
        let settings = Settings::load(&path).unwrap();
        assert!(settings.include_system_items);
        assert!(settings.include_com_handlers);
        assert_eq!(settings.skip, vec!["Git_Shell"]);
        assert!(settings.backup_before_delete);
        assert_eq!(settings.backup_dir, Some(PathBuf::from(r"C:\backups")));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let (_dir, path) = write("include_sytem_items = true\n");
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }));
    }

    #[test]
    fn empty_backup_dir_is_rejected() {
        let (_dir, path) = write("backup_dir = \"\"\n");
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "backup_dir"));
    }

    #[test]
    fn overrides_only_widen() {
        let settings = Settings {
            include_com_handlers: true,
            ..Settings::default()
        }
        .with_overrides(true, false);
        assert!(settings.include_system_items);
        assert!(settings.include_com_handlers);
    }

    #[test]
    fn scan_options_carry_skip_list() {
        let settings = Settings {
            skip: vec!["x".into()],
            include_system_items: true,
            ..Settings::default()
        };
        let options = settings.scan_options();
        assert!(options.include_system_items);
        assert!(!options.include_com_handlers);
        assert_eq!(options.skip, vec!["x"]);
    }

    #[test]
    fn explicit_backup_dir_wins() {
        let settings = Settings {
            backup_dir: Some(PathBuf::from("/srv/backups")),
            ..Settings::default()
        };
        assert_eq!(settings.backup_dir(), PathBuf::from("/srv/backups"));
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        assert!(Settings::default_path().ends_with(Path::new("regtidy").join(CONFIG_FILE)));
    }
}
