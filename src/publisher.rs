//! Best-effort vendor detection from an executable path.
//!
//! Both tables are ordered; the first needle found (case-insensitively)
//! anywhere in the path wins.

/// `(needle, publisher)` pairs tried for context-menu commands.
const CONTEXT_MENU_PUBLISHERS: &[(&str, &str)] = &[
    ("visual studio", "Microsoft Corporation"),
    ("vs code", "Microsoft Corporation"),
    ("\\code.exe", "Microsoft Corporation"),
    ("git", "Git"),
    ("7-zip", "Igor Pavlov"),
    ("dropbox", "Dropbox, Inc."),
    ("onedrive", "Microsoft Corporation"),
    ("winrar", "win.rar GmbH"),
    ("tortoise", "TortoiseSVN"),
];

/// `(needle, publisher)` pairs tried for startup commands.
const STARTUP_PUBLISHERS: &[(&str, &str)] = &[
    ("microsoft", "Microsoft Corporation"),
    ("onedrive", "Microsoft Corporation"),
    ("dropbox", "Dropbox, Inc."),
    ("google", "Google LLC"),
    ("adobe", "Adobe Inc."),
    ("steam", "Valve Corporation"),
    ("discord", "Discord Inc."),
    ("slack", "Slack Technologies"),
    ("spotify", "Spotify AB"),
];

fn lookup(table: &[(&str, &'static str)], path: &str) -> Option<String> {
    let lower = path.to_lowercase();
    table
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, publisher)| (*publisher).to_string())
}

/// Guess the vendor behind a context-menu command.
#[must_use]
pub fn for_context_menu(path: &str) -> Option<String> {
    lookup(CONTEXT_MENU_PUBLISHERS, path)
}

/// Guess the vendor behind a startup command.
#[must_use]
pub fn for_startup(path: &str) -> Option<String> {
    lookup(STARTUP_PUBLISHERS, path)
}
