//! secrets::memory_store
//!
//! In-process record storage. Nothing survives the process.
//!
//! Used for ephemeral sessions (`provider = "memory"`) and throughout the
//! tests. Failures can be injected per operation to exercise the error
//! paths of callers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{SecretError, SecretStore};

/// Operation to fail on, for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Read,
    Write,
    Delete,
}

/// Memory-backed store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, Vec<u8>>,
    fail_on: Option<FailOn>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call of one operation fail.
    pub fn fail_on(&self, op: FailOn) {
        self.lock().fail_on = Some(op);
    }

    /// Stop injecting failures.
    pub fn clear_failure(&self) {
        self.lock().fail_on = None;
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a panicking test thread; the map is
        // still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, SecretError> {
        let inner = self.lock();
        if inner.fail_on == Some(FailOn::Read) {
            return Err(SecretError::ReadError("injected failure".into()));
        }
        Ok(inner.records.get(name).cloned())
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), SecretError> {
        let mut inner = self.lock();
        if inner.fail_on == Some(FailOn::Write) {
            return Err(SecretError::WriteError("injected failure".into()));
        }
        inner.records.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), SecretError> {
        let mut inner = self.lock();
        if inner.fail_on == Some(FailOn::Delete) {
            return Err(SecretError::DeleteError("injected failure".into()));
        }
        inner.records.remove(name);
        Ok(())
    }
}
