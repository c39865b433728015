//! Native Windows registry backend.
use winreg::RegKey;
use winreg::enums::{
    HKEY_CLASSES_ROOT, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WRITE, RegType,
};

use super::{Hive, RegValue, RegistryStore, StoreError, kind};

/// [`RegistryStore`] backed by the live registry through the `winreg` crate.
///
/// Every call opens the key it needs with the narrowest access mask and
/// drops the handle before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct WinRegistry;

impl WinRegistry {
    /// Create a handle to the live registry.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn predef(hive: Hive) -> RegKey {
    RegKey::predef(match hive {
        Hive::ClassesRoot => HKEY_CLASSES_ROOT,
        Hive::CurrentUser => HKEY_CURRENT_USER,
        Hive::LocalMachine => HKEY_LOCAL_MACHINE,
    })
}

fn open(hive: Hive, path: &str, writable: bool) -> Result<RegKey, StoreError> {
    let flags = if writable { KEY_READ | KEY_WRITE } else { KEY_READ };
    predef(hive)
        .open_subkey_with_flags(path, flags)
        .map_err(|e| StoreError::from_io(hive.full_path(path), &e))
}

fn reg_type(raw_kind: u32) -> Option<RegType> {
    match raw_kind {
        kind::NONE => Some(RegType::REG_NONE),
        kind::SZ => Some(RegType::REG_SZ),
        kind::EXPAND_SZ => Some(RegType::REG_EXPAND_SZ),
        kind::BINARY => Some(RegType::REG_BINARY),
        kind::DWORD => Some(RegType::REG_DWORD),
        kind::MULTI_SZ => Some(RegType::REG_MULTI_SZ),
        kind::QWORD => Some(RegType::REG_QWORD),
        _ => None,
    }
}

impl RegistryStore for WinRegistry {
    fn subkey_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, StoreError> {
        let key = open(hive, path, false)?;
        Ok(key
            .enum_keys()
            .filter_map(|name| {
                name.map_err(|e| {
                    tracing::debug!("skipping unreadable subkey under {}: {e}", hive.full_path(path));
                })
                .ok()
            })
            .collect())
    }

    fn value_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, StoreError> {
        let key = open(hive, path, false)?;
        Ok(key
            .enum_values()
            .filter_map(|entry| {
                entry
                    .map_err(|e| {
                        tracing::debug!("skipping unreadable value under {}: {e}", hive.full_path(path));
                    })
                    .ok()
                    .map(|(name, _)| name)
            })
            .collect())
    }

    fn read_value(&self, hive: Hive, path: &str, name: &str) -> Result<RegValue, StoreError> {
        let key = open(hive, path, false)?;
        let raw = key
            .get_raw_value(name)
            .map_err(|e| StoreError::from_io(format!("{}\\{name}", hive.full_path(path)), &e))?;
        let raw_kind = raw.vtype as u32;
        Ok(RegValue::from_raw(raw_kind, &raw.bytes))
    }

    fn create_key(&self, hive: Hive, path: &str) -> Result<(), StoreError> {
        predef(hive)
            .create_subkey(path)
            .map(|_| ())
            .map_err(|e| StoreError::from_io(hive.full_path(path), &e))
    }

    fn set_value(
        &self,
        hive: Hive,
        path: &str,
        name: &str,
        value: &RegValue,
    ) -> Result<(), StoreError> {
        let full = hive.full_path(path);
        let vtype = reg_type(value.kind()).ok_or_else(|| StoreError::Unsupported {
            operation: format!("set_value(kind {})", value.kind()),
            path: full.clone(),
        })?;
        let key = open(hive, path, true)?;
        let raw = winreg::RegValue {
            bytes: value.to_bytes().into(),
            vtype,
        };
        key.set_raw_value(name, &raw)
            .map_err(|e| StoreError::from_io(full, &e))
    }

    fn delete_value(&self, hive: Hive, path: &str, name: &str) -> Result<(), StoreError> {
        let key = open(hive, path, true)?;
        key.delete_value(name)
            .map_err(|e| StoreError::from_io(format!("{}\\{name}", hive.full_path(path)), &e))
    }

    fn delete_tree(&self, hive: Hive, parent: &str, leaf: &str) -> Result<(), StoreError> {
        let key = open(hive, parent, true)?;
        key.delete_subkey_all(leaf)
            .map_err(|e| StoreError::from_io(format!("{}\\{leaf}", hive.full_path(parent)), &e))
    }
}
