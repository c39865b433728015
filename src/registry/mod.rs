//! Registry access abstractions for dependency injection.
//!
//! Provides the [`RegistryStore`] trait so that discovery, mutation and
//! backup can run against the real Windows registry ([`WinRegistry`], Windows
//! only) or an in-memory tree ([`MemoryRegistry`]) in unit tests.
//!
//! Every trait method opens the key it needs, performs one operation and
//! drops the handle before returning, so no handle outlives a call.

mod error;
mod memory;
#[cfg(windows)]
mod native;

pub use error::StoreError;
pub use memory::MemoryRegistry;
#[cfg(windows)]
pub use native::WinRegistry;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Name of the unnamed (default) value of a key.
pub const DEFAULT_VALUE: &str = "";

/// Raw type tags used by the registry for value data.
pub mod kind {
    /// `REG_NONE`
    pub const NONE: u32 = 0;
    /// `REG_SZ`
    pub const SZ: u32 = 1;
    /// `REG_EXPAND_SZ`
    pub const EXPAND_SZ: u32 = 2;
    /// `REG_BINARY`
    pub const BINARY: u32 = 3;
    /// `REG_DWORD`
    pub const DWORD: u32 = 4;
    /// `REG_MULTI_SZ`
    pub const MULTI_SZ: u32 = 7;
    /// `REG_QWORD`
    pub const QWORD: u32 = 11;
}

/// One of the registry's top-level trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Hive {
    /// `HKEY_CLASSES_ROOT`: merged machine and user class registrations.
    #[serde(rename = "HKEY_CLASSES_ROOT")]
    ClassesRoot,
    /// `HKEY_CURRENT_USER`: per-user settings.
    #[serde(rename = "HKEY_CURRENT_USER")]
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE`: per-machine settings.
    #[serde(rename = "HKEY_LOCAL_MACHINE")]
    LocalMachine,
}

impl Hive {
    /// Canonical name as written by the registry editor.
    #[must_use]
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::ClassesRoot => "HKEY_CLASSES_ROOT",
            Self::CurrentUser => "HKEY_CURRENT_USER",
            Self::LocalMachine => "HKEY_LOCAL_MACHINE",
        }
    }

    /// Short alias (`HKCR`, `HKCU`, `HKLM`).
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::ClassesRoot => "HKCR",
            Self::CurrentUser => "HKCU",
            Self::LocalMachine => "HKLM",
        }
    }

    /// Join this hive and `path` into a full textual key path.
    #[must_use]
    pub fn full_path(self, path: &str) -> String {
        if path.is_empty() {
            self.canonical_name().to_string()
        } else {
            format!("{}\\{path}", self.canonical_name())
        }
    }
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for Hive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().trim_end_matches(':').to_ascii_uppercase();
        match upper.as_str() {
            "HKEY_CLASSES_ROOT" | "HKCR" => Ok(Self::ClassesRoot),
            "HKEY_CURRENT_USER" | "HKCU" => Ok(Self::CurrentUser),
            "HKEY_LOCAL_MACHINE" | "HKLM" => Ok(Self::LocalMachine),
            _ => Err(format!("unknown registry hive '{s}'")),
        }
    }
}

/// Typed registry value data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegValue {
    /// `REG_SZ`
    String(String),
    /// `REG_EXPAND_SZ`
    ExpandString(String),
    /// `REG_MULTI_SZ`
    MultiString(Vec<String>),
    /// `REG_DWORD`
    Dword(u32),
    /// `REG_QWORD`
    Qword(u64),
    /// `REG_BINARY`
    Binary(Vec<u8>),
    /// Any other type tag, or a known tag whose data is malformed.
    Other {
        /// Raw type tag.
        kind: u32,
        /// Raw data.
        bytes: Vec<u8>,
    },
}

impl RegValue {
    /// Decode raw `(kind, bytes)` data as delivered by the OS.
    ///
    /// Integer data of the wrong length is kept verbatim as
    /// [`RegValue::Other`] so it still round-trips through a backup.
    #[must_use]
    pub fn from_raw(kind: u32, bytes: &[u8]) -> Self {
        match kind {
            kind::SZ => Self::String(decode_utf16(bytes)),
            kind::EXPAND_SZ => Self::ExpandString(decode_utf16(bytes)),
            kind::MULTI_SZ => Self::MultiString(decode_multi_utf16(bytes)),
            kind::BINARY => Self::Binary(bytes.to_vec()),
            kind::DWORD => <[u8; 4]>::try_from(bytes).map_or_else(
                |_| Self::Other {
                    kind,
                    bytes: bytes.to_vec(),
                },
                |b| Self::Dword(u32::from_le_bytes(b)),
            ),
            kind::QWORD => <[u8; 8]>::try_from(bytes).map_or_else(
                |_| Self::Other {
                    kind,
                    bytes: bytes.to_vec(),
                },
                |b| Self::Qword(u64::from_le_bytes(b)),
            ),
            _ => Self::Other {
                kind,
                bytes: bytes.to_vec(),
            },
        }
    }

    /// Raw type tag of this value.
    #[must_use]
    pub const fn kind(&self) -> u32 {
        match self {
            Self::String(_) => kind::SZ,
            Self::ExpandString(_) => kind::EXPAND_SZ,
            Self::MultiString(_) => kind::MULTI_SZ,
            Self::Dword(_) => kind::DWORD,
            Self::Qword(_) => kind::QWORD,
            Self::Binary(_) => kind::BINARY,
            Self::Other { kind, .. } => *kind,
        }
    }

    /// Native byte representation (UTF-16LE for text, little-endian integers).
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::String(s) | Self::ExpandString(s) => utf16z(s),
            Self::MultiString(items) => multi_utf16z(items),
            Self::Dword(n) => n.to_le_bytes().to_vec(),
            Self::Qword(n) => n.to_le_bytes().to_vec(),
            Self::Binary(bytes) | Self::Other { bytes, .. } => bytes.clone(),
        }
    }

    /// Text content of a `REG_SZ` or `REG_EXPAND_SZ` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::ExpandString(s) => Some(s),
            _ => None,
        }
    }
}

/// UTF-16LE bytes of `s` followed by a NUL terminator.
#[must_use]
pub fn utf16z(s: &str) -> Vec<u8> {
    s.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// UTF-16LE bytes of `items` joined by NUL, terminated by a NUL item and
/// the final NUL terminator.
#[must_use]
pub fn multi_utf16z(items: &[String]) -> Vec<u8> {
    let mut joined = items.join("\0");
    joined.push('\0');
    utf16z(&joined)
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .filter_map(|pair| <[u8; 2]>::try_from(pair).ok())
        .map(u16::from_le_bytes)
        .collect()
}

/// Decode UTF-16LE bytes up to the first NUL.
fn decode_utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = utf16_units(bytes)
        .into_iter()
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Decode a NUL-separated, double-NUL-terminated UTF-16LE list.
fn decode_multi_utf16(bytes: &[u8]) -> Vec<String> {
    utf16_units(bytes)
        .split(|&u| u == 0)
        .take_while(|item| !item.is_empty())
        .map(String::from_utf16_lossy)
        .collect()
}

/// Split `path` at its last backslash into `(parent, leaf)`.
///
/// Returns `None` when the path has no parent component.
#[must_use]
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once('\\')
        .filter(|(parent, leaf)| !parent.is_empty() && !leaf.is_empty())
}

/// Abstraction over the registry operations used by the engine.
///
/// Implement this trait to swap in an in-memory tree during tests.  The
/// production implementation is [`WinRegistry`].  Paths are backslash
/// separated and relative to `hive`; the default value is named
/// [`DEFAULT_VALUE`].
pub trait RegistryStore: Send + Sync + fmt::Debug {
    /// Names of the keys directly under `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be opened for reading.
    fn subkey_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, StoreError>;

    /// Names of the values stored on `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be opened for reading.
    fn value_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, StoreError>;

    /// Read one value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the key or value is missing.
    fn read_value(&self, hive: Hive, path: &str, name: &str) -> Result<RegValue, StoreError>;

    /// Create `path` (and any missing ancestors); existing keys are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be created.
    fn create_key(&self, hive: Hive, path: &str) -> Result<(), StoreError>;

    /// Write one value on an existing key, opened writable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the key is missing, or
    /// [`StoreError::PermissionDenied`] if it cannot be opened writable.
    fn set_value(
        &self,
        hive: Hive,
        path: &str,
        name: &str,
        value: &RegValue,
    ) -> Result<(), StoreError>;

    /// Delete one value from a key opened writable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the key or value is missing.
    fn delete_value(&self, hive: Hive, path: &str, name: &str) -> Result<(), StoreError>;

    /// Open `parent` writable and recursively delete its child `leaf`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if either key is missing.
    fn delete_tree(&self, hive: Hive, parent: &str, leaf: &str) -> Result<(), StoreError>;

    /// Returns `true` if `path` can be opened for reading.
    fn key_exists(&self, hive: Hive, path: &str) -> bool {
        self.value_names(hive, path).is_ok()
    }

    /// Read a `REG_SZ`/`REG_EXPAND_SZ` value, returning `None` when it is
    /// missing, unreadable or of another type.
    fn read_string(&self, hive: Hive, path: &str, name: &str) -> Option<String> {
        self.read_value(hive, path, name)
            .ok()
            .and_then(|v| v.as_text().map(str::to_string))
    }

    /// All values stored on `path`, in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while listing or reading values.
    fn values(&self, hive: Hive, path: &str) -> Result<Vec<(String, RegValue)>, StoreError> {
        self.value_names(hive, path)?
            .into_iter()
            .map(|name| {
                let value = self.read_value(hive, path, &name)?;
                Ok((name, value))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn hive_parses_long_and_short_names() {
        assert_eq!("HKEY_CLASSES_ROOT".parse::<Hive>(), Ok(Hive::ClassesRoot));
        assert_eq!("hkcu".parse::<Hive>(), Ok(Hive::CurrentUser));
        assert_eq!("HKLM:".parse::<Hive>(), Ok(Hive::LocalMachine));
        assert!("HKEY_USERS".parse::<Hive>().is_err());
    }

    #[test]
    fn full_path_joins_with_backslash() {
        assert_eq!(
            Hive::CurrentUser.full_path(r"Software\Classes"),
            r"HKEY_CURRENT_USER\Software\Classes"
        );
        assert_eq!(Hive::ClassesRoot.full_path(""), "HKEY_CLASSES_ROOT");
    }

    #[test]
    fn decodes_string_without_terminator() {
        let v = RegValue::from_raw(kind::SZ, &utf16z("notepad"));
        assert_eq!(v, RegValue::String("notepad".to_string()));
    }

    #[test]
    fn decodes_multi_string() {
        let items = vec!["a".to_string(), "bc".to_string()];
        let v = RegValue::from_raw(kind::MULTI_SZ, &multi_utf16z(&items));
        assert_eq!(v, RegValue::MultiString(items));
    }

    #[test]
    fn multi_string_bytes_end_with_two_nul_units() {
        let bytes = multi_utf16z(&["x".to_string()]);
        // "x" NUL NUL
        assert_eq!(bytes, vec![b'x', 0, 0, 0, 0, 0]);
    }

    #[test]
    fn decodes_integers() {
        assert_eq!(
            RegValue::from_raw(kind::DWORD, &7u32.to_le_bytes()),
            RegValue::Dword(7)
        );
        assert_eq!(
            RegValue::from_raw(kind::QWORD, &u64::MAX.to_le_bytes()),
            RegValue::Qword(u64::MAX)
        );
    }

    #[test]
    fn malformed_dword_is_kept_raw() {
        let v = RegValue::from_raw(kind::DWORD, &[1, 2]);
        assert_eq!(
            v,
            RegValue::Other {
                kind: kind::DWORD,
                bytes: vec![1, 2]
            }
        );
        assert_eq!(v.kind(), kind::DWORD);
    }

    #[test]
    fn split_parent_uses_last_backslash() {
        assert_eq!(
            split_parent(r"Directory\shell\git_shell"),
            Some((r"Directory\shell", "git_shell"))
        );
        assert_eq!(split_parent("orphan"), None);
    }
}
