//! Merging of redundant context-menu registrations.
//!
//! The same verb is frequently registered several times: once per object
//! class, and once in each of the machine-wide and per-user views.  Two
//! candidates are the same entry when their key names and executables
//! match case-insensitively.
use std::collections::{BTreeSet, HashMap};

use super::scanner::RawCandidate;
use crate::command_line;
use crate::model::ContextMenuEntry;
use crate::registry::Hive;

/// Equivalence key: lowercased key name and normalized executable.
#[must_use]
pub fn equivalence_key(key: &str, command: &str) -> (String, String) {
    (key.to_lowercase(), command_line::normalized_executable(command))
}

/// Merge raw candidates into entries.
///
/// Within a group, system-level candidates come first, then candidates are
/// ordered by hive and path; the first supplies the display fields and the
/// enabled state.  The
/// result does not depend on the input order and is sorted by lowest
/// classification, display name (case-insensitive) and key.
#[must_use]
pub fn deduplicate(candidates: Vec<RawCandidate>) -> Vec<ContextMenuEntry> {
    let mut groups: HashMap<(String, String), Vec<RawCandidate>> = HashMap::new();
    for candidate in candidates {
        groups
            .entry(equivalence_key(&candidate.key, &candidate.command))
            .or_default()
            .push(candidate);
    }

    let mut entries: Vec<ContextMenuEntry> = groups.into_values().filter_map(merge).collect();
    entries.sort_by(|a, b| {
        a.primary_classification()
            .cmp(&b.primary_classification())
            .then_with(|| {
                a.display_name
                    .to_lowercase()
                    .cmp(&b.display_name.to_lowercase())
            })
            .then_with(|| a.key.cmp(&b.key))
            .then_with(|| first_location(a).cmp(&first_location(b)))
    });
    entries
}

fn first_location(entry: &ContextMenuEntry) -> Option<(Hive, String)> {
    entry
        .locations
        .first()
        .map(|l| (l.hive, l.sub_path.to_lowercase()))
}

fn merge(mut members: Vec<RawCandidate>) -> Option<ContextMenuEntry> {
    members.sort_by(|a, b| {
        b.location
            .is_system
            .cmp(&a.location.is_system)
            .then_with(|| a.location.hive.cmp(&b.location.hive))
            .then_with(|| {
                a.location
                    .sub_path
                    .to_lowercase()
                    .cmp(&b.location.sub_path.to_lowercase())
            })
            .then_with(|| a.classification.cmp(&b.classification))
    });

    let primary = members.first()?.clone();
    let mut classifications = BTreeSet::new();
    let mut locations = Vec::with_capacity(members.len());
    let mut is_system = false;
    for member in members {
        classifications.insert(member.classification);
        is_system |= member.location.is_system;
        if !locations.contains(&member.location) {
            locations.push(member.location);
        }
    }

    Some(ContextMenuEntry {
        enabled: primary.enabled,
        key: primary.key,
        display_name: primary.display_name,
        publisher: primary.publisher,
        command: Some(primary.command),
        classifications,
        visibility: primary.visibility,
        is_system,
        locations,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::{Classification, MenuLocation, Visibility};

    fn candidate(
        key: &str,
        name: &str,
        command: &str,
        classification: Classification,
        hive: Hive,
        path: &str,
    ) -> RawCandidate {
        RawCandidate {
            key: key.to_string(),
            display_name: name.to_string(),
            publisher: None,
            command: command.to_string(),
            classification,
            visibility: Visibility::Normal,
            enabled: true,
            location: MenuLocation::verb(hive, path, hive == Hive::ClassesRoot),
        }
    }

    fn git_pair() -> Vec<RawCandidate> {
        vec![
            candidate(
                "git_shell",
                "Git Bash Here (user)",
                r#""C:\Program Files\Git\git-bash.exe" "--cd=%1""#,
                Classification::Background,
                Hive::CurrentUser,
                r"Software\Classes\Directory\Background\shell\git_shell",
            ),
            candidate(
                "Git_Shell",
                "Git Bash Here",
                r#""c:\program files\git\GIT-BASH.exe" "--cd=%v.""#,
                Classification::Directory,
                Hive::ClassesRoot,
                r"Directory\shell\git_shell",
            ),
        ]
    }

    #[test]
    fn equivalent_candidates_merge_and_keep_all_locations() {
        let entries = deduplicate(git_pair());
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.locations.len(), 2);
        assert_eq!(
            e.classifications.iter().copied().collect::<Vec<_>>(),
            [Classification::Directory, Classification::Background]
        );
        assert_eq!(e.classification_label(), "Directory, Empty Area");
        assert!(e.is_system);
    }

    #[test]
    fn system_candidate_supplies_display_fields() {
        let mut reversed = git_pair();
        reversed.reverse();
        for input in [git_pair(), reversed] {
            let e = &deduplicate(input)[0];
            assert_eq!(e.display_name, "Git Bash Here");
            assert_eq!(e.key, "Git_Shell");
            assert!(e.locations[0].is_system);
        }
    }

    #[test]
    fn different_executables_stay_separate() {
        let entries = deduplicate(vec![
            candidate("open", "Open", r"C:\a.exe %1", Classification::File, Hive::ClassesRoot, r"*\shell\open"),
            candidate("open", "Open", r"C:\b.exe %1", Classification::Drive, Hive::ClassesRoot, r"Drive\shell\open"),
        ]);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn enabled_state_follows_system_candidate() {
        // git_pair()[0] is the user candidate, [1] the machine-wide one.
        let mut input = git_pair();
        input[1].enabled = false;
        assert!(!deduplicate(input.clone())[0].enabled);
        input.reverse();
        assert!(!deduplicate(input)[0].enabled);

        let mut input = git_pair();
        input[0].enabled = false;
        assert!(deduplicate(input)[0].enabled);
    }

    #[test]
    fn result_independent_of_input_order() {
        let mut reversed = git_pair();
        reversed.reverse();
        assert_eq!(deduplicate(git_pair()), deduplicate(reversed));
        assert_eq!(deduplicate(git_pair()), deduplicate(git_pair()));
    }

    #[test]
    fn repeated_candidates_collapse() {
        let mut doubled = git_pair();
        doubled.extend(git_pair());
        assert_eq!(deduplicate(doubled), deduplicate(git_pair()));
    }

    #[test]
    fn output_sorted_by_classification_then_name() {
        let entries = deduplicate(vec![
            candidate("z", "zeta", r"C:\z.exe", Classification::Background, Hive::ClassesRoot, r"Directory\Background\shell\z"),
            candidate("b", "Beta", r"C:\b.exe", Classification::File, Hive::ClassesRoot, r"*\shell\b"),
            candidate("a", "alpha", r"C:\a.exe", Classification::File, Hive::ClassesRoot, r"*\shell\a"),
            candidate("d", "Delta", r"C:\d.exe", Classification::Drive, Hive::ClassesRoot, r"Drive\shell\d"),
        ]);
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "d", "z"]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(deduplicate(Vec::new()).is_empty());
    }
}
