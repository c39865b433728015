//! Command: list, toggle, delete and back up context-menu entries.
use anyhow::{Context, Result};

use super::CommandSetup;
use crate::cli::{BackupOpts, GlobalOpts, KeyOpts, MenuCommand};
use crate::lifecycle::MutationReport;
use crate::logging::{Logger, OperationStatus};
use crate::model::ContextMenuEntry;
use crate::worker;

/// Run a `menu` subcommand against the live registry.
///
/// # Errors
///
/// Returns an error if setup fails, the entry cannot be found or is
/// ambiguous, or any operation does not fully apply.
pub fn run(global: &GlobalOpts, cmd: &MenuCommand, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    execute(&setup, cmd, log)
}

/// Run a `menu` subcommand with an already assembled setup.
///
/// # Errors
///
/// See [`run`].
pub fn execute(setup: &CommandSetup, cmd: &MenuCommand, log: &Logger) -> Result<()> {
    let entries = discover(setup, log)?;
    match cmd {
        MenuCommand::List(opts) => {
            if opts.json {
                return super::write_json(&entries);
            }
            list(&entries, log);
            return Ok(());
        }
        MenuCommand::Enable(opts) => toggle(setup, select(entries, opts)?, true, log)?,
        MenuCommand::Disable(opts) => toggle(setup, select(entries, opts)?, false, log)?,
        MenuCommand::Delete(opts) => delete(setup, select(entries, opts)?, log)?,
        MenuCommand::Backup(opts) => backup(setup, entries, opts, log)?,
    }
    super::finish(log)
}

fn discover(setup: &CommandSetup, log: &Logger) -> Result<Vec<ContextMenuEntry>> {
    log.stage("Scanning context menu");
    let manager = setup.menu_manager();
    let entries = worker::dispatch("discover-menu", move || manager.discover())?.wait()?;
    log.info(&format!("{} entries", entries.len()));
    Ok(entries)
}

fn list(entries: &[ContextMenuEntry], log: &Logger) {
    for entry in entries {
        let mark = if entry.enabled { "on " } else { "off" };
        log.info(&format!(
            "[{mark}] {:<36} {:<24} {:<20} {}",
            entry.display_name,
            entry.key,
            entry.classification_label(),
            entry.publisher.as_deref().unwrap_or("-"),
        ));
        for location in &entry.locations {
            log.debug(&format!("      {}", location.full_path()));
        }
    }
}

/// Pick the entry with key `opts.key`, narrowed by `--classification` when
/// given.  Keys shared by entries with different commands are refused.
fn select(entries: Vec<ContextMenuEntry>, opts: &KeyOpts) -> Result<ContextMenuEntry> {
    let mut matches = entries.into_iter().filter(|e| {
        e.key.eq_ignore_ascii_case(&opts.key)
            && opts
                .classification
                .is_none_or(|c| e.classifications.contains(&c))
    });
    let first = matches
        .next()
        .with_context(|| format!("no context menu entry with key '{}'", opts.key))?;
    if let Some(second) = matches.next() {
        anyhow::bail!(
            "'{}' names more than one entry ({} and {}); choose one with --classification",
            opts.key,
            first.classification_label(),
            second.classification_label()
        );
    }
    Ok(first)
}

fn toggle(setup: &CommandSetup, entry: ContextMenuEntry, enabled: bool, log: &Logger) -> Result<()> {
    log.stage(&format!(
        "{} {}",
        if enabled { "Enabling" } else { "Disabling" },
        entry.display_name
    ));
    let manager = setup.menu_manager();
    let (entry, report) = worker::dispatch("toggle-menu", move || {
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
        entry.key,
        if entry.enabled { "enabled" } else { "disabled" }
    ));
    Ok(())
}

fn delete(setup: &CommandSetup, entry: ContextMenuEntry, log: &Logger) -> Result<()> {
    log.stage(&format!("Deleting {}", entry.display_name));
    let manager = setup.menu_manager();
    let report: MutationReport = if setup.settings.backup_before_delete {
        let dir = setup.settings.backup_dir();
        let (summary, report) =
            worker::dispatch("delete-menu", move || manager.delete_after_backup(&entry, &dir))?
                .wait()?
                .context("backup failed, entry not deleted")?;
        log.info(&format!("backup: {}", summary.path.display()));
        report
    } else {
        worker::dispatch("delete-menu", move || manager.delete(&entry))?.wait()?
    };
    log.record_report(&report);
    Ok(())
}

fn backup(
    setup: &CommandSetup,
    entries: Vec<ContextMenuEntry>,
    opts: &BackupOpts,
    log: &Logger,
) -> Result<()> {
    let selected: Vec<ContextMenuEntry> = if opts.names.is_empty() {
        entries
    } else {
        for name in &opts.names {
            if !entries.iter().any(|e| e.key.eq_ignore_ascii_case(name)) {
                log.warn(&format!("no context menu entry with key '{name}'"));
            }
        }
        entries
            .into_iter()
            .filter(|e| opts.names.iter().any(|n| e.key.eq_ignore_ascii_case(n)))
            .collect()
    };

    log.stage(&format!("Backing up {} entries", selected.len()));
    let manager = setup.menu_manager();
    let path = opts.file.clone();
    let summary = worker::dispatch("backup-menu", move || manager.backup(&selected, &path))?
        .wait()?
        .with_context(|| format!("writing {}", opts.file.display()))?;

    let status = if summary.read_errors > 0 {
        OperationStatus::Partial
    } else {
        OperationStatus::Ok
    };
    log.record_operation(
        "backup context menu",
        status,
        Some(&format!(
            "{} entries, {} keys, {} unreadable -> {}",
            summary.entries,
            summary.blocks,
            summary.read_errors,
            summary.path.display()
        )),
    );
    Ok(())
}
