//! The `StartupApproved` record that Task Manager uses to switch startup
//! entries off without deleting them.
//!
//! Each entry may have a binary value of the same name under the approval
//! key for its hive.  Only the first byte matters: [`DISABLED_MARKER`]
//! means disabled, anything else means enabled.  No record at all also
//! means enabled.
use crate::model::StartupKind;
use crate::registry::{RegValue, RegistryStore};

/// First byte of a disabled approval record.
pub const DISABLED_MARKER: u8 = 0x02;

/// Record written to disable an entry.
pub const DISABLED_RECORD: [u8; 12] = [DISABLED_MARKER, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

/// Decode an approval value.  Anything but binary data starting with
/// [`DISABLED_MARKER`] reads as enabled.
#[must_use]
pub fn is_enabled_value(value: &RegValue) -> bool {
    match value {
        RegValue::Binary(bytes) => bytes.first() != Some(&DISABLED_MARKER),
        _ => true,
    }
}

/// Whether `name` in the `kind` list is approved to run.
///
/// Read failures of any sort leave the entry enabled.
#[must_use]
pub fn is_enabled(store: &dyn RegistryStore, kind: StartupKind, name: &str) -> bool {
    match store.read_value(kind.hive(), kind.approved_path(), name) {
        Ok(value) => is_enabled_value(&value),
        Err(e) => {
            if !e.is_not_found() {
                tracing::debug!("approval lookup for {name} failed, assuming enabled: {e}");
            }
            true
        }
    }
}
