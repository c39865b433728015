//! Helpers for picking apart registered command lines.
//!
//! Shell verbs and startup entries store a full command line such as
//! `"C:\Program Files\Git\git-bash.exe" "--cd=%1"`.  Discovery needs the
//! executable part for system filtering, publisher detection and
//! duplicate grouping.

/// Expand `%NAME%` references using `lookup`.
///
/// Unknown variables and unpaired `%` signs are left as written.
#[must_use]
pub fn expand_env_vars(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('%') {
        let (before, after_start) = rest.split_at(start);
        out.push_str(before);
        let tail = after_start.strip_prefix('%').unwrap_or(after_start);
        let Some(end) = tail.find('%') else {
            out.push_str(after_start);
            return out;
        };
        let (name, after_name) = tail.split_at(end);
        let Some(value) = lookup(name).filter(|_| !name.is_empty()) else {
            // Keep the opening '%' and retry from the closing one
            out.push('%');
            out.push_str(name);
            rest = after_name;
            continue;
        };
        out.push_str(&value);
        rest = after_name.strip_prefix('%').unwrap_or(after_name);
    }
    out.push_str(rest);
    out
}

/// Extensions that end an unquoted executable path.
const EXECUTABLE_EXTENSIONS: &[&str] = &[".exe", ".dll", ".com", ".bat", ".cmd"];

/// Extract the executable path from a command line.
///
/// A quoted leading path runs to the closing quote.  An unquoted one runs
/// through the first executable extension (`.exe`, `.dll`, ...) followed by
/// whitespace or the end of the line, otherwise to the first whitespace.
/// Returns `None` for a blank command line.
#[must_use]
pub fn executable(command: &str) -> Option<String> {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(quoted) = trimmed.strip_prefix('"') {
        let path = quoted.split('"').next().unwrap_or_default().trim();
        return (!path.is_empty()).then(|| path.to_string());
    }
    let lower = trimmed.to_ascii_lowercase();
    let end = lower.match_indices('.').find_map(|(pos, _)| {
        let rest = lower.get(pos..)?;
        let ext = EXECUTABLE_EXTENSIONS.iter().find(|ext| rest.starts_with(*ext))?;
        let end = pos + ext.len();
        lower
            .get(end..)
            .and_then(|after| after.chars().next())
            .is_none_or(char::is_whitespace)
            .then_some(end)
    });
    if let Some(path) = end.and_then(|end| trimmed.get(..end)) {
        return Some(path.to_string());
    }
    trimmed
        .split_whitespace()
        .next()
        .map(str::to_string)
}

/// Case-folded executable used to compare entries for equivalence.
///
/// Falls back to the whole trimmed command line when no executable can be
/// extracted, so two blank commands still compare equal.
#[must_use]
pub fn normalized_executable(command: &str) -> String {
    executable(command)
        .unwrap_or_else(|| command.trim().to_string())
        .replace('/', "\\")
        .to_lowercase()
}
