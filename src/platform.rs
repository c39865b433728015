//! Host detection and the Windows system directories.
use std::fmt;

use crate::command_line;
use crate::error::PlatformError;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Windows, the only host with a registry.
    Windows,
    /// Any other host, by its `std::env::consts::OS` name.
    Other(&'static str),
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Host operating system.
    pub os: Os,
    /// System directories used to filter OS-owned entries.
    pub system_dirs: SystemDirs,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            os: Self::detect_os(),
            system_dirs: SystemDirs::detect(),
        }
    }

    /// Create a platform with explicit values (for testing).
    #[cfg(test)]
    #[must_use]
    pub const fn new(os: Os, system_dirs: SystemDirs) -> Self {
        Self { os, system_dirs }
    }

    /// Whether the host is Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Fail with [`PlatformError::Unsupported`] unless running on Windows.
    ///
    /// # Errors
    ///
    /// Returns an error on every non-Windows host.
    pub fn require_windows(&self) -> Result<(), PlatformError> {
        if self.is_windows() {
            Ok(())
        } else {
            Err(PlatformError::Unsupported { os: self.os })
        }
    }

    const fn detect_os() -> Os {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            Os::Other(std::env::consts::OS)
        }
    }
}

/// The operating system's own directories, discovered at runtime.
///
/// Entries whose executable lives under one of these directories are
/// treated as system-owned and hidden by default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemDirs {
    windows_dir: Option<String>,
    dirs: Vec<String>,
}

impl SystemDirs {
    /// Ask the shell for the Windows, system and 32-bit system folders,
    /// falling back to `SystemRoot` (or `windir`) from the environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_known_folders().unwrap_or_else(Self::from_environment)
    }

    fn from_environment() -> Self {
        std::env::var("SystemRoot")
            .or_else(|_| std::env::var("windir"))
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(Self::default, |dir| Self::from_windows_dir(&dir))
    }

    #[cfg(windows)]
    fn from_known_folders() -> Option<Self> {
        use windows::Win32::UI::Shell::{FOLDERID_System, FOLDERID_SystemX86, FOLDERID_Windows};

        let windows_dir = known_folder(&FOLDERID_Windows)?;
        let system = [&FOLDERID_System, &FOLDERID_SystemX86]
            .into_iter()
            .filter_map(known_folder);
        Some(Self::from_parts(&windows_dir, system))
    }

    #[cfg(not(windows))]
    const fn from_known_folders() -> Option<Self> {
        None
    }

    /// Build the directory set from an explicit Windows directory, assuming
    /// the standard `System32` and `SysWOW64` layout beneath it.
    #[must_use]
    pub fn from_windows_dir(dir: &str) -> Self {
        let root = normalize_dir(dir);
        Self::from_parts(
            &root,
            [format!("{root}\\System32"), format!("{root}\\SysWOW64")],
        )
    }

    /// Build the directory set from a Windows directory and the system
    /// folders reported for it.  Duplicates are dropped.
    #[must_use]
    pub fn from_parts(windows_dir: &str, system: impl IntoIterator<Item = String>) -> Self {
        let root = normalize_dir(windows_dir);
        let mut dirs = vec![root.clone()];
        for dir in system {
            let dir = normalize_dir(&dir);
            if !dir.is_empty() && !dirs.iter().any(|d| d.eq_ignore_ascii_case(&dir)) {
                dirs.push(dir);
            }
        }
        Self {
            windows_dir: Some(root),
            dirs,
        }
    }

    /// The Windows directory, if one was discovered.
    #[must_use]
    pub fn windows_dir(&self) -> Option<&str> {
        self.windows_dir.as_deref()
    }

    /// Whether `executable` lies inside one of the system directories.
    ///
    /// Comparison is case-insensitive and only matches on a path component
    /// boundary, so `C:\WindowsApps` is not inside `C:\Windows`.
    #[must_use]
    pub fn contains(&self, executable: &str) -> bool {
        let candidate = executable.replace('/', "\\").to_lowercase();
        self.dirs.iter().any(|dir| {
            let dir = dir.to_lowercase();
            candidate
                .strip_prefix(&dir)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('\\'))
        })
    }

    /// Expand `%VAR%` references, answering `SystemRoot` and `windir` from
    /// the discovered directory before consulting the process environment.
    #[must_use]
    pub fn expand(&self, text: &str) -> String {
        command_line::expand_env_vars(text, |name| {
            if (name.eq_ignore_ascii_case("SystemRoot") || name.eq_ignore_ascii_case("windir"))
                && let Some(dir) = &self.windows_dir
            {
                return Some(dir.clone());
            }
            std::env::var(name).ok()
        })
    }
}

fn normalize_dir(dir: &str) -> String {
    dir.trim().trim_end_matches(['\\', '/']).replace('/', "\\")
}

/// Resolve a shell known folder to its path.
#[cfg(windows)]
#[allow(unsafe_code)]
fn known_folder(id: &windows::core::GUID) -> Option<String> {
    use windows::Win32::System::Com::CoTaskMemFree;
    use windows::Win32::UI::Shell::{KF_FLAG_DEFAULT, SHGetKnownFolderPath};

    // SAFETY: `id` is a valid GUID for the duration of the call.  On success
    // the shell hands back a NUL-terminated buffer that is copied once and
    // then released with `CoTaskMemFree`, as the API requires.
    unsafe {
        let path = SHGetKnownFolderPath(id, KF_FLAG_DEFAULT, None).ok()?;
        let text = path.to_string().ok();
        CoTaskMemFree(Some(path.as_ptr().cast::<std::ffi::c_void>().cast_const()));
        text.filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn platform_detect_returns_valid() {
        let p = Platform::detect();
        assert_eq!(p.is_windows(), cfg!(windows));
        if !p.is_windows() {
            assert_eq!(p.os, Os::Other(std::env::consts::OS));
        }
    }

    #[test]
    fn platform_new_windows() {
        let p = Platform::new(Os::Windows, SystemDirs::default());
        assert!(p.is_windows());
        assert!(p.require_windows().is_ok());
    }

    #[test]
    fn require_windows_fails_elsewhere() {
        let p = Platform::new(Os::Other("macos"), SystemDirs::default());
        let err = p.require_windows().unwrap_err();
        assert!(err.to_string().contains("macos"));
    }

    #[test]
    fn os_display() {
        assert_eq!(Os::Other("freebsd").to_string(), "freebsd");
        assert_eq!(Os::Windows.to_string(), "windows");
    }

    #[test]
    fn system_dirs_cover_root_and_both_system_folders() {
        let dirs = SystemDirs::from_windows_dir(r"C:\Windows\");
        assert_eq!(dirs.windows_dir(), Some(r"C:\Windows"));
        assert!(dirs.contains(r"c:\windows\explorer.exe"));
        assert!(dirs.contains(r"C:\Windows\System32\shell32.dll"));
        assert!(dirs.contains(r"C:\WINDOWS\SysWOW64\cmd.exe"));
        assert!(dirs.contains(r"C:\Windows"));
    }

    #[test]
    fn system_dirs_require_component_boundary() {
        let dirs = SystemDirs::from_windows_dir(r"C:\Windows");
        assert!(!dirs.contains(r"C:\WindowsApps\tool.exe"));
        assert!(!dirs.contains(r"C:\Program Files\Git\git-bash.exe"));
    }

    #[test]
    fn system_dirs_from_reported_folders() {
        // A 32-bit host reports System32 for both system folders.
        let dirs = SystemDirs::from_parts(
            r"D:\WINNT\",
            [r"D:\WINNT\system32".to_string(), r"D:\WINNT\System32".to_string()],
        );
        assert_eq!(dirs.windows_dir(), Some(r"D:\WINNT"));
        assert!(dirs.contains(r"d:\winnt\system32\cmd.exe"));
        assert!(!dirs.contains(r"D:\WINNT2\tool.exe"));
        assert_eq!(dirs, SystemDirs::from_parts(r"D:\WINNT", [r"D:\WINNT\system32".to_string()]));
    }

    #[test]
    fn empty_system_dirs_contain_nothing() {
        let dirs = SystemDirs::default();
        assert!(!dirs.contains(r"C:\Windows\explorer.exe"));
        assert_eq!(dirs.windows_dir(), None);
    }

    #[test]
    fn expand_prefers_discovered_windows_dir() {
        let dirs = SystemDirs::from_windows_dir(r"D:\Win");
        assert_eq!(
            dirs.expand(r"%SystemRoot%\System32\notepad.exe"),
            r"D:\Win\System32\notepad.exe"
        );
        assert_eq!(dirs.expand(r"%windir%\x.exe"), r"D:\Win\x.exe");
    }
}
