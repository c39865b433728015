//! Soft checks on loaded settings.
use super::Settings;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The setting that triggered the warning (e.g., "skip", "`backup_dir`").
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning for `item`.
    #[must_use]
    pub fn new(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Check loaded settings for values that load fine but probably do not do
/// what the user meant.
#[must_use]
pub fn validate(settings: &Settings) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (i, name) in settings.skip.iter().enumerate() {
        if name.trim().is_empty() {
            warnings.push(ValidationWarning::new(
                format!("skip[{i}]"),
                "empty key name never matches anything",
            ));
        } else if name.contains('\\') {
            warnings.push(ValidationWarning::new(
                format!("skip[{i}]"),
                format!("'{name}' looks like a path; skip entries match key names only"),
            ));
        }
    }

    if let Some(dir) = &settings.backup_dir
        && dir.is_relative()
    {
        warnings.push(ValidationWarning::new(
            "backup_dir",
            format!(
                "'{}' is relative and resolves against the working directory",
                dir.display()
            ),
        ));
    }

    if settings.backup_dir.is_some() && !settings.backup_before_delete {
        warnings.push(ValidationWarning::new(
            "backup_dir",
            "set but backup_before_delete is false, so automatic backups are off",
        ));
    }

    warnings
}
