//! Background hand-off for discovery, mutation and backup.
//!
//! Each operation runs to completion on its own named OS thread.  There is
//! no cancellation and no internal parallelism; the caller decides when to
//! block on the result.
use std::fmt;
use std::thread::JoinHandle;

use crate::error::WorkerError;

/// Handle to an operation running on a worker thread.
pub struct Pending<T> {
    name: String,
    handle: JoinHandle<T>,
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("name", &self.name)
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

impl<T> Pending<T> {
    /// Operation name, also used as the thread name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the operation has finished, without blocking.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the operation finishes and return its result.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Panicked`] if the operation panicked.
    pub fn wait(self) -> Result<T, WorkerError> {
        let name = self.name;
        self.handle.join().map_err(|_| {
            tracing::error!("worker {name} panicked");
            WorkerError::Panicked { name }
        })
    }
}

/// Run `op` on a new thread called `name`.
///
/// # Errors
///
/// Returns [`WorkerError::Spawn`] if the thread cannot be created.
pub fn dispatch<T, F>(name: &str, op: F) -> Result<Pending<T>, WorkerError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tracing::debug!("dispatching {name}");
    let handle = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(op)
        .map_err(|source| WorkerError::Spawn {
            name: name.to_string(),
            source,
        })?;
    Ok(Pending {
        name: name.to_string(),
        handle,
    })
}
