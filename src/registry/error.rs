//! Typed error variants for registry store access.
//!
//! Every [`RegistryStore`](super::RegistryStore) method reports failures as
//! a [`StoreError`].  Callers in the discovery and mutation paths absorb
//! these per key or per location; only the backup destination file can
//! fail a whole operation.

use thiserror::Error;

/// Errors that arise from reading or writing the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The key or value does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// Full path of the missing key or value.
        path: String,
    },

    /// The caller lacks the rights to open or modify the key.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// Full path of the key that could not be opened.
        path: String,
    },

    /// The stored data does not have the expected shape.
    #[error("invalid data at {path}: {reason}")]
    InvalidData {
        /// Full path of the offending value.
        path: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// The backend cannot perform the requested operation.
    #[error("unsupported operation '{operation}' at {path}")]
    Unsupported {
        /// Name of the operation (e.g. `"set_value"`).
        operation: String,
        /// Full path the operation targeted.
        path: String,
    },

    /// Any other OS-level failure.
    #[error("registry I/O error at {path}: {message}")]
    Io {
        /// Full path the operation targeted.
        path: String,
        /// Message of the underlying OS error.
        message: String,
    },
}

impl StoreError {
    /// Map a [`std::io::Error`] raised for `path` onto the matching variant.
    #[must_use]
    pub fn from_io(path: impl Into<String>, err: &std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io {
                path,
                message: err.to_string(),
            },
        }
    }

    /// Returns `true` for [`StoreError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for [`StoreError::PermissionDenied`].
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let e = StoreError::NotFound {
            path: r"HKEY_CURRENT_USER\Software\Nope".to_string(),
        };
        assert_eq!(e.to_string(), r"not found: HKEY_CURRENT_USER\Software\Nope");
    }

    #[test]
    fn permission_denied_display() {
        let e = StoreError::PermissionDenied {
            path: r"HKEY_CLASSES_ROOT\*\shell\git".to_string(),
        };
        assert!(e.to_string().contains("permission denied"));
        assert!(e.to_string().contains(r"*\shell\git"));
    }

    #[test]
    fn from_io_maps_kinds() {
        let nf = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(StoreError::from_io("k", &nf).is_not_found());

        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(StoreError::from_io("k", &denied).is_permission_denied());

        let other = std::io::Error::other("boom");
        assert!(matches!(
            StoreError::from_io("k", &other),
            StoreError::Io { ref message, .. } if message.contains("boom")
        ));
    }

    #[test]
    fn store_error_converts_to_anyhow() {
        let e = StoreError::NotFound {
            path: "x".to_string(),
        };
        let _anyhow_err: anyhow::Error = e.into();
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn store_error_is_send_sync() {
        assert_send_sync::<StoreError>();
    }
}
