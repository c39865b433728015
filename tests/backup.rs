#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for `.reg` export.
//!
//! Entries are discovered from an in-memory registry, exported to a
//! temporary directory, and the file is decoded back to text.

mod common;

use common::*;
use regtidy::model::StartupKind;
use regtidy::registry::{Hive, RegValue};

const GIT_BASH: &str = r#""C:\Program Files\Git\git-bash.exe" "--cd=%1""#;

#[test]
fn merged_entry_exports_every_location() {
    let h = Fixture::new()
        .verb(View::Machine, r"Directory\shell", "git_shell", "Git Bash Here", GIT_BASH)
        .verb_value(
            View::Machine,
            r"Directory\shell",
            "git_shell",
            "Blob",
            RegValue::Binary((0u8..30).collect()),
        )
        .verb(View::User, r"Directory\shell", "git_shell", "Git Bash Here", GIT_BASH)
        .build();
    let entries = h.menu.discover();
    assert_eq!(entries.len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.reg");
    let summary = h.menu.backup(&entries, &path).unwrap();
    assert_eq!(summary.entries, 1);
    assert_eq!(summary.blocks, 4);
    assert_eq!(summary.read_errors, 0);

    insta::assert_snapshot!(read_reg_file(&path), @r#"
    Windows Registry Editor Version 5.00

    ; Git Bash Here (Directory)
    [HKEY_CLASSES_ROOT\Directory\shell\git_shell]
    @="Git Bash Here"
    "Blob"=hex:00,01,02,03,04,05,06,07,08,09,0a,0b,0c,0d,0e,0f,10,11,12,13,14,15,16,17,18,\
      19,1a,1b,1c,1d

    [HKEY_CLASSES_ROOT\Directory\shell\git_shell\command]
    @="\"C:\\Program Files\\Git\\git-bash.exe\" \"--cd=%1\""

    ; Git Bash Here (Directory)
    [HKEY_CURRENT_USER\Software\Classes\Directory\shell\git_shell]
    @="Git Bash Here"

    [HKEY_CURRENT_USER\Software\Classes\Directory\shell\git_shell\command]
    @="\"C:\\Program Files\\Git\\git-bash.exe\" \"--cd=%1\""
    "#);
}

#[test]
fn startup_export_escapes_and_groups() {
    let h = Fixture::new()
        .startup(StartupKind::UserRun, "Notes", r#""C:\Apps\notes.exe" --title "Daily""#)
        .startup(StartupKind::SystemRun, "Steam", r"C:\Steam\steam.exe -silent")
        .startup(StartupKind::UserRun, "Zoom", r"C:\Zoom\zoom.exe")
        .build();
    let entries = h.startup.discover();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("startup.reg");
    h.startup.backup(&entries, &path).unwrap();

    insta::assert_snapshot!(read_reg_file(&path), @r#"
    Windows Registry Editor Version 5.00

    [HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Run]
    "Notes"="\"C:\\Apps\\notes.exe\" --title \"Daily\""
    "Zoom"="C:\\Zoom\\zoom.exe"

    [HKEY_LOCAL_MACHINE\Software\Microsoft\Windows\CurrentVersion\Run]
    "Steam"="C:\\Steam\\steam.exe -silent"
    "#);
}

#[test]
fn delete_after_backup_leaves_a_restorable_file() {
    let h = Fixture::new()
        .startup(StartupKind::UserRun, "Spotify", r"C:\Spotify\Spotify.exe /minimized")
        .build();
    let entry = h.startup.discover().remove(0);
    let dir = tempfile::tempdir().unwrap();

    let (summary, report) = h.startup.delete_after_backup(&entry, dir.path()).unwrap();
    assert!(report.any_applied());
    assert!(h.startup.discover().is_empty());

    let name = summary.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("startup-Spotify-"), "{name}");
    assert!(name.ends_with("Z.reg"), "{name}");
    assert!(read_reg_file(&summary.path).contains(r#""Spotify"="C:\\Spotify\\Spotify.exe /minimized""#));
}

#[test]
fn unreadable_location_is_commented_not_fatal() {
    let h = Fixture::new()
        .verb(View::Machine, r"*\shell", "tool", "Tool", r"C:\Tools\tool.exe %1")
        .build();
    let entries = h.menu.discover();
    let locked = Fixture::new()
        .verb(View::Machine, r"*\shell", "tool", "Tool", r"C:\Tools\tool.exe %1")
        .read_denied(Hive::ClassesRoot, r"*\shell\tool")
        .build();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.reg");
    let summary = locked.menu.backup(&entries, &path).unwrap();
    assert_eq!(summary.read_errors, 1);
    assert_eq!(summary.blocks, 0);
    assert!(read_reg_file(&path).contains(r"; Error reading HKEY_CLASSES_ROOT\*\shell\tool: "));
}
