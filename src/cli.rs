//! Command-line definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::model::{Classification, StartupKind};

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "regtidy",
    about = "Inspect and tidy Windows context-menu and startup entries",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options accepted by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Settings file (default: <config dir>/regtidy/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep entries whose executable lives under the Windows directory
    #[arg(long, global = true)]
    pub include_system: bool,

    /// Also scan shell-extension context-menu handlers
    #[arg(long, global = true)]
    pub com_handlers: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage context-menu entries
    #[command(subcommand)]
    Menu(MenuCommand),
    /// Manage startup entries
    #[command(subcommand)]
    Startup(StartupCommand),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Menu(_) => "menu",
            Self::Startup(_) => "startup",
            Self::Version => "version",
        }
    }
}

/// `menu` subcommands.
#[derive(Subcommand, Debug)]
pub enum MenuCommand {
    /// List every context-menu entry
    List(ListOpts),
    /// Show an entry again
    Enable(KeyOpts),
    /// Hide an entry without removing it
    Disable(KeyOpts),
    /// Remove every key backing an entry
    Delete(KeyOpts),
    /// Export entries to a .reg file
    Backup(BackupOpts),
}

/// `startup` subcommands.
#[derive(Subcommand, Debug)]
pub enum StartupCommand {
    /// List every startup entry
    List(ListOpts),
    /// Allow an entry to run at logon
    Enable(NameOpts),
    /// Stop an entry from running at logon
    Disable(NameOpts),
    /// Remove an entry and its approval record
    Delete(NameOpts),
    /// Export entries to a .reg file
    Backup(BackupOpts),
}

/// Options for `list`.
#[derive(Parser, Debug, Clone)]
pub struct ListOpts {
    /// Print entries as JSON
    #[arg(long)]
    pub json: bool,
}

/// Selects a context-menu entry by key name.
#[derive(Parser, Debug, Clone)]
pub struct KeyOpts {
    /// Registry key name of the entry (case-insensitive)
    pub key: String,

    /// Object type to use when the key names more than one entry
    #[arg(long)]
    pub classification: Option<Classification>,
}

/// Selects a startup entry by value name.
#[derive(Parser, Debug, Clone)]
pub struct NameOpts {
    /// Value name of the entry (case-insensitive)
    pub name: String,

    /// Which list to use when the name appears in more than one
    #[arg(long)]
    pub kind: Option<StartupKind>,
}

/// Options for `backup`.
#[derive(Parser, Debug, Clone)]
pub struct BackupOpts {
    /// Destination .reg file
    pub file: PathBuf,

    /// Entries to export (default: all)
    pub names: Vec<String>,
}
