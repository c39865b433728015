//! Subcommand implementations and the setup they share.
pub mod menu;
pub mod startup;
pub mod version;

use std::fmt;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::config::{Settings, validation};
use crate::context_menu::ContextMenuManager;
use crate::error::{PlatformError, RegtidyError};
use crate::logging::Logger;
use crate::platform::{Platform, SystemDirs};
use crate::registry::RegistryStore;
use crate::resolver::{self, ResourceResolver};
use crate::startup::StartupManager;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, settings loading, and backend selection
/// so that each command does not have to repeat the boilerplate.
pub struct CommandSetup {
    /// Settings file merged with command-line overrides.
    pub settings: Settings,
    /// Directories whose executables count as system-owned.
    pub system_dirs: SystemDirs,
    /// Registry backend every manager shares.
    pub store: Arc<dyn RegistryStore>,
    /// Indirect display-string resolver.
    pub resolver: Arc<dyn ResourceResolver>,
}

impl fmt::Debug for CommandSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSetup")
            .field("settings", &self.settings)
            .field("system_dirs", &self.system_dirs)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl CommandSetup {
    /// Assemble a setup from explicit parts.
    #[must_use]
    pub fn new(
        settings: Settings,
        system_dirs: SystemDirs,
        store: Arc<dyn RegistryStore>,
        resolver: Arc<dyn ResourceResolver>,
    ) -> Self {
        Self {
            settings,
            system_dirs,
            store,
            resolver,
        }
    }

    /// Detect the platform, load settings, and open the live registry.
    ///
    /// # Errors
    ///
    /// Returns an error on hosts without a registry or if the settings file
    /// fails to load.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        log.stage("Loading settings");
        let path = global.config.clone().unwrap_or_else(Settings::default_path);
        let (platform, settings, store) = open(&path, global)?;
        log.debug(&format!("settings: {}", path.display()));
        log.debug(&format!("{} skip entries", settings.skip.len()));

        let warnings = validation::validate(&settings);
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!("  [{}]: {}", warning.item, warning.message));
            }
        }

        Ok(Self::new(
            settings,
            platform.system_dirs,
            store,
            resolver::platform_resolver(),
        ))
    }

    /// Context-menu manager over this setup's store and settings.
    #[must_use]
    pub fn menu_manager(&self) -> ContextMenuManager {
        ContextMenuManager::new(
            Arc::clone(&self.store),
            Arc::clone(&self.resolver),
            self.system_dirs.clone(),
            self.settings.scan_options(),
        )
    }

    /// Startup manager over this setup's store and settings.
    #[must_use]
    pub fn startup_manager(&self) -> StartupManager {
        StartupManager::new(
            Arc::clone(&self.store),
            self.system_dirs.clone(),
            self.settings.scan_options(),
        )
    }
}

/// Check the host, load the settings file and open the registry.
fn open(
    path: &Path,
    global: &GlobalOpts,
) -> Result<(Platform, Settings, Arc<dyn RegistryStore>), RegtidyError> {
    let platform = Platform::detect();
    platform.require_windows()?;
    let settings =
        Settings::load(path)?.with_overrides(global.include_system, global.com_handlers);
    let store = open_store(&platform)?;
    Ok((platform, settings, store))
}

#[cfg(windows)]
#[allow(clippy::unnecessary_wraps)]
fn open_store(_platform: &Platform) -> Result<Arc<dyn RegistryStore>, PlatformError> {
    Ok(Arc::new(crate::registry::WinRegistry::new()))
}

#[cfg(not(windows))]
const fn open_store(platform: &Platform) -> Result<Arc<dyn RegistryStore>, PlatformError> {
    Err(PlatformError::Unsupported { os: platform.os })
}

/// Write `value` to stdout as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).context("writing JSON")?;
    writeln!(out).context("writing JSON")?;
    Ok(())
}

/// Print the summary and bail if any operation failed.
///
/// # Errors
///
/// Returns an error if one or more operations failed or only partly applied.
pub fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} operation(s) did not fully apply");
    }
    Ok(())
}
