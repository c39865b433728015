//! In-memory [`RegistryStore`] used by tests and offline experiments.
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Hive, RegValue, RegistryStore, StoreError};

/// A case-insensitive, in-memory registry tree.
///
/// Pre-populate keys and values with the builder-style methods, optionally
/// mark sub-trees as unreadable or read-only to simulate missing rights,
/// then pass it wherever a [`RegistryStore`] is expected.
///
/// # Example
///
/// ```
/// use regtidy::registry::{Hive, MemoryRegistry, RegistryStore};
///
/// let store = MemoryRegistry::new()
///     .with_string(Hive::ClassesRoot, r"*\shell\edit\command", "", "editor.exe %1")
///     .with_write_denied(Hive::ClassesRoot, r"*\shell");
///
/// assert_eq!(
///     store.subkey_names(Hive::ClassesRoot, r"*\shell").unwrap(),
///     vec!["edit".to_string()]
/// );
/// ```
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    tree: Mutex<Tree>,
}

#[derive(Debug, Default)]
struct Tree {
    keys: BTreeMap<(Hive, String), KeyData>,
    read_denied: Vec<(Hive, String)>,
    write_denied: Vec<(Hive, String)>,
}

#[derive(Debug, Default, Clone)]
struct KeyData {
    /// Leaf name with its original casing.
    name: String,
    /// Values in insertion order.
    values: Vec<(String, RegValue)>,
}

fn normalize(path: &str) -> String {
    path.trim_matches('\\').to_lowercase()
}

fn under(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('\\'))
}

impl Tree {
    fn denied(list: &[(Hive, String)], hive: Hive, path: &str) -> bool {
        let path = normalize(path);
        list.iter().any(|(h, prefix)| *h == hive && under(&path, prefix))
    }

    fn check_read(&self, hive: Hive, path: &str) -> Result<(), StoreError> {
        if Self::denied(&self.read_denied, hive, path) {
            return Err(StoreError::PermissionDenied {
                path: hive.full_path(path),
            });
        }
        Ok(())
    }

    fn check_write(&self, hive: Hive, path: &str) -> Result<(), StoreError> {
        if Self::denied(&self.write_denied, hive, path) {
            return Err(StoreError::PermissionDenied {
                path: hive.full_path(path),
            });
        }
        Ok(())
    }

    fn exists(&self, hive: Hive, path: &str) -> bool {
        let norm = normalize(path);
        norm.is_empty() || self.keys.contains_key(&(hive, norm))
    }

    fn key(&self, hive: Hive, path: &str) -> Result<&KeyData, StoreError> {
        self.keys
            .get(&(hive, normalize(path)))
            .ok_or_else(|| StoreError::NotFound {
                path: hive.full_path(path),
            })
    }

    fn key_mut(&mut self, hive: Hive, path: &str) -> Result<&mut KeyData, StoreError> {
        self.keys
            .get_mut(&(hive, normalize(path)))
            .ok_or_else(|| StoreError::NotFound {
                path: hive.full_path(path),
            })
    }

    /// Insert `path` and every missing ancestor.
    fn ensure(&mut self, hive: Hive, path: &str) {
        let mut norm = String::new();
        for component in path.trim_matches('\\').split('\\').filter(|c| !c.is_empty()) {
            if !norm.is_empty() {
                norm.push('\\');
            }
            norm.push_str(&component.to_lowercase());
            self.keys
                .entry((hive, norm.clone()))
                .or_insert_with(|| KeyData {
                    name: component.to_string(),
                    values: Vec::new(),
                });
        }
    }

    fn put(&mut self, hive: Hive, path: &str, name: &str, value: RegValue) {
        self.ensure(hive, path);
        if let Ok(key) = self.key_mut(hive, path) {
            upsert(&mut key.values, name, value);
        }
    }

    fn subkey_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, StoreError> {
        self.check_read(hive, path)?;
        if !self.exists(hive, path) {
            return Err(StoreError::NotFound {
                path: hive.full_path(path),
            });
        }
        let parent = normalize(path);
        Ok(self
            .keys
            .iter()
            .filter(|((h, p), _)| {
                *h == hive
                    && p.rsplit_once('\\')
                        .map_or(parent.is_empty(), |(head, _)| head == parent)
            })
            .map(|(_, key)| key.name.clone())
            .collect())
    }

    fn value_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, StoreError> {
        self.check_read(hive, path)?;
        if normalize(path).is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .key(hive, path)?
            .values
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn read_value(&self, hive: Hive, path: &str, name: &str) -> Result<RegValue, StoreError> {
        self.check_read(hive, path)?;
        self.key(hive, path)?
            .values
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| StoreError::NotFound {
                path: format!("{}\\{name}", hive.full_path(path)),
            })
    }

    fn create_key(&mut self, hive: Hive, path: &str) -> Result<(), StoreError> {
        if self.exists(hive, path) {
            return Ok(());
        }
        self.check_write(hive, path)?;
        self.ensure(hive, path);
        Ok(())
    }

    fn set_value(
        &mut self,
        hive: Hive,
        path: &str,
        name: &str,
        value: &RegValue,
    ) -> Result<(), StoreError> {
        self.key(hive, path)?;
        self.check_write(hive, path)?;
        let key = self.key_mut(hive, path)?;
        upsert(&mut key.values, name, value.clone());
        Ok(())
    }

    fn delete_value(&mut self, hive: Hive, path: &str, name: &str) -> Result<(), StoreError> {
        self.key(hive, path)?;
        self.check_write(hive, path)?;
        let key = self.key_mut(hive, path)?;
        let before = key.values.len();
        key.values.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        if key.values.len() == before {
            return Err(StoreError::NotFound {
                path: format!("{}\\{name}", hive.full_path(path)),
            });
        }
        Ok(())
    }

    fn delete_tree(&mut self, hive: Hive, parent: &str, leaf: &str) -> Result<(), StoreError> {
        if !self.exists(hive, parent) {
            return Err(StoreError::NotFound {
                path: hive.full_path(parent),
            });
        }
        let target = format!("{}\\{leaf}", parent.trim_matches('\\'));
        self.check_write(hive, parent)?;
        self.check_write(hive, &target)?;
        if !self.exists(hive, &target) {
            return Err(StoreError::NotFound {
                path: hive.full_path(&target),
            });
        }
        let prefix = normalize(&target);
        self.keys.retain(|(h, p), _| *h != hive || !under(p, &prefix));
        Ok(())
    }
}

fn upsert(values: &mut Vec<(String, RegValue)>, name: &str, value: RegValue) {
    if let Some(slot) = values
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        slot.1 = value;
    } else {
        values.push((name.to_string(), value));
    }
}

impl MemoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an empty key (and any missing ancestors).
    #[must_use]
    pub fn with_key(self, hive: Hive, path: &str) -> Self {
        self.lock().ensure(hive, path);
        self
    }

    /// Add a value, creating its key if needed.
    #[must_use]
    pub fn with_value(self, hive: Hive, path: &str, name: &str, value: RegValue) -> Self {
        self.lock().put(hive, path, name, value);
        self
    }

    /// Add a `REG_SZ` value, creating its key if needed.
    #[must_use]
    pub fn with_string(self, hive: Hive, path: &str, name: &str, value: &str) -> Self {
        self.with_value(hive, path, name, RegValue::String(value.to_string()))
    }

    /// Make every key at or below `prefix` unreadable.
    #[must_use]
    pub fn with_read_denied(self, hive: Hive, prefix: &str) -> Self {
        self.lock().read_denied.push((hive, normalize(prefix)));
        self
    }

    /// Make every key at or below `prefix` read-only.
    #[must_use]
    pub fn with_write_denied(self, hive: Hive, prefix: &str) -> Self {
        self.lock().write_denied.push((hive, normalize(prefix)));
        self
    }

    /// Returns `true` if the key exists, ignoring read denials.
    #[must_use]
    pub fn contains_key(&self, hive: Hive, path: &str) -> bool {
        self.lock().exists(hive, path)
    }

    /// Look up a value, ignoring read denials.
    #[must_use]
    pub fn value(&self, hive: Hive, path: &str, name: &str) -> Option<RegValue> {
        self.lock().key(hive, path).ok().and_then(|key| {
            key.values
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        })
    }
}

impl RegistryStore for MemoryRegistry {
    fn subkey_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, StoreError> {
        self.lock().subkey_names(hive, path)
    }

    fn value_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, StoreError> {
        self.lock().value_names(hive, path)
    }

    fn read_value(&self, hive: Hive, path: &str, name: &str) -> Result<RegValue, StoreError> {
        self.lock().read_value(hive, path, name)
    }

    fn create_key(&self, hive: Hive, path: &str) -> Result<(), StoreError> {
        self.lock().create_key(hive, path)
    }

    fn set_value(
        &self,
        hive: Hive,
        path: &str,
        name: &str,
        value: &RegValue,
    ) -> Result<(), StoreError> {
        self.lock().set_value(hive, path, name, value)
    }

    fn delete_value(&self, hive: Hive, path: &str, name: &str) -> Result<(), StoreError> {
        self.lock().delete_value(hive, path, name)
    }

    fn delete_tree(&self, hive: Hive, parent: &str, leaf: &str) -> Result<(), StoreError> {
        self.lock().delete_tree(hive, parent, leaf)
    }
}
