//! Command: print version information.
use std::io::Write as _;

use anyhow::Result;

/// Version string, preferring the one stamped in by the build script.
#[must_use]
pub fn version() -> &'static str {
    option_env!("REGTIDY_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the regtidy version to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run() -> Result<()> {
    writeln!(std::io::stdout().lock(), "regtidy {}", version())?;
    Ok(())
}
