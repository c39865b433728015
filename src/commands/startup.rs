//! Command: list, toggle, delete and back up startup entries.
use anyhow::{Context, Result};

use super::CommandSetup;
use crate::cli::{BackupOpts, GlobalOpts, NameOpts, StartupCommand};
use crate::logging::{Logger, OperationStatus};
use crate::model::StartupEntry;
use crate::worker;

/// Run a `startup` subcommand against the live registry.
///
/// # Errors
///
/// Returns an error if setup fails, the entry cannot be found or is
/// ambiguous, or any operation does not fully apply.
pub fn run(global: &GlobalOpts, cmd: &StartupCommand, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    execute(&setup, cmd, log)
}

/// Run a `startup` subcommand with an already assembled setup.
///
/// # Errors
///
/// See [`run`].
pub fn execute(setup: &CommandSetup, cmd: &StartupCommand, log: &Logger) -> Result<()> {
    let entries = discover(setup, log)?;
    match cmd {
        StartupCommand::List(opts) => {
            if opts.json {
                return super::write_json(&entries);
            }
            list(&entries, log);
            return Ok(());
        }
        StartupCommand::Enable(opts) => toggle(setup, select(entries, opts)?, true, log)?,
        StartupCommand::Disable(opts) => toggle(setup, select(entries, opts)?, false, log)?,
        StartupCommand::Delete(opts) => delete(setup, select(entries, opts)?, log)?,
        StartupCommand::Backup(opts) => backup(setup, entries, opts, log)?,
    }
    super::finish(log)
}

fn discover(setup: &CommandSetup, log: &Logger) -> Result<Vec<StartupEntry>> {
    log.stage("Scanning startup entries");
    let manager = setup.startup_manager();
    let entries = worker::dispatch("discover-startup", move || manager.discover())?.wait()?;
    log.info(&format!("{} entries", entries.len()));
    Ok(entries)
}

fn list(entries: &[StartupEntry], log: &Logger) {
    for entry in entries {
        let mark = if entry.enabled { "on " } else { "off" };
        log.info(&format!(
            "[{mark}] {:<28} {:<16} {:<20} {}",
            entry.name,
            entry.kind,
            entry.publisher.as_deref().unwrap_or("-"),
            entry.command,
        ));
    }
}

/// Pick the entry called `opts.name`, narrowed by `--kind` when given.
fn select(entries: Vec<StartupEntry>, opts: &NameOpts) -> Result<StartupEntry> {
    let mut matches = entries.into_iter().filter(|e| {
        e.name.eq_ignore_ascii_case(&opts.name) && opts.kind.is_none_or(|kind| e.kind == kind)
    });
    let first = matches
        .next()
        .with_context(|| format!("no startup entry named '{}'", opts.name))?;
    if let Some(second) = matches.next() {
        anyhow::bail!(
            "'{}' is registered as both {} and {}; choose one with --kind",
            opts.name,
            first.kind,
            second.kind
        );
    }
    Ok(first)
}

fn toggle(setup: &CommandSetup, entry: StartupEntry, enabled: bool, log: &Logger) -> Result<()> {
    log.stage(&format!(
        "{} {} ({})",
        if enabled { "Enabling" } else { "Disabling" },
        entry.name,
        entry.kind
    ));
    let manager = setup.startup_manager();
    let (entry, report) = worker::dispatch("toggle-startup", move || {
        let mut entry = entry;
        let report = if enabled {
            manager.enable(&mut entry)
        } else {
            manager.disable(&mut entry)
        };
        (entry, report)
    })?
    .wait()?;
    log.record_report(&report);
    log.info(&format!(
        "{} is now {}",
        entry.name,
        if entry.enabled { "enabled" } else { "disabled" }
    ));
    Ok(())
}

fn delete(setup: &CommandSetup, entry: StartupEntry, log: &Logger) -> Result<()> {
    log.stage(&format!("Deleting {} ({})", entry.name, entry.kind));
    let manager = setup.startup_manager();
    let report = if setup.settings.backup_before_delete {
        let dir = setup.settings.backup_dir();
        let (summary, report) = worker::dispatch("delete-startup", move || {
            manager.delete_after_backup(&entry, &dir)
        })?
        .wait()?
        .context("backup failed, entry not deleted")?;
        log.info(&format!("backup: {}", summary.path.display()));
        report
    } else {
        worker::dispatch("delete-startup", move || manager.delete(&entry))?.wait()?
    };
    log.record_report(&report);
    Ok(())
}

fn backup(
    setup: &CommandSetup,
    entries: Vec<StartupEntry>,
    opts: &BackupOpts,
    log: &Logger,
) -> Result<()> {
    let selected: Vec<StartupEntry> = if opts.names.is_empty() {
        entries
    } else {
        for name in &opts.names {
            if !entries.iter().any(|e| e.name.eq_ignore_ascii_case(name)) {
                log.warn(&format!("no startup entry named '{name}'"));
            }
        }
        entries
            .into_iter()
            .filter(|e| opts.names.iter().any(|n| e.name.eq_ignore_ascii_case(n)))
            .collect()
    };

    log.stage(&format!("Backing up {} entries", selected.len()));
    let manager = setup.startup_manager();
    let path = opts.file.clone();
    let summary = worker::dispatch("backup-startup", move || manager.backup(&selected, &path))?
        .wait()?
        .with_context(|| format!("writing {}", opts.file.display()))?;

    log.record_operation(
        "backup startup",
        OperationStatus::Ok,
        Some(&format!(
            "{} entries -> {}",
            summary.entries,
            summary.path.display()
        )),
    );
    Ok(())
}
