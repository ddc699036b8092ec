//! Registry of in-flight uploads keyed by handle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::model::{PendingUpload, UploadHandle};

/// Handle → pending-upload map. An entry is inserted once at submission and
/// removed once at completion, so a handle can never complete twice.
#[derive(Debug, Default)]
pub struct PendingUploads {
    next_id: AtomicU64,
    entries: Mutex<HashMap<UploadHandle, PendingUpload>>,
}

impl PendingUploads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh handle and record `remote_name` against it.
    pub fn register(&self, remote_name: &str) -> PendingUpload {
        let handle = UploadHandle::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let pending = PendingUpload {
            handle,
            remote_name: remote_name.to_string(),
        };
        self.lock().insert(handle, pending.clone());
        pending
    }

    /// Remove and return the entry for `handle`. `None` if it was already completed.
    pub fn complete(&self, handle: UploadHandle) -> Option<PendingUpload> {
        self.lock().remove(&handle)
    }

    pub fn contains(&self, handle: UploadHandle) -> bool {
        self.lock().contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic elsewhere while holding the lock leaves the map itself intact.
    fn lock(&self) -> MutexGuard<'_, HashMap<UploadHandle, PendingUpload>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
