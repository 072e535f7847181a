//! secrets::traits
//!
//! The persistence capability.
//!
//! # Design
//!
//! A `SecretStore` is a tiny key-value interface: opaque bytes stored under
//! a record name (e.g. `twitter.config`). What the bytes mean is up to the
//! caller; the credential store keeps a JSON document there.
//!
//! # Security
//!
//! Implementations MUST:
//! - Never log, print, or include stored bytes in error messages
//! - Use storage appropriate to the platform
//! - Be thread-safe (Send + Sync)
//!
//! # Example
//!
//! ```ignore
//! use birdhouse::secrets::{SecretStore, SecretError};
//!
//! fn has_record(store: &dyn SecretStore) -> Result<bool, SecretError> {
//!     store.exists("twitter.config")
//! }
//! ```

use thiserror::Error;

/// Errors from secret storage operations.
///
/// Messages never include stored values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Failed to read from secret storage.
    #[error("failed to read secret: {0}")]
    ReadError(String),

    /// Failed to write to secret storage.
    #[error("failed to write secret: {0}")]
    WriteError(String),

    /// Failed to delete from secret storage.
    #[error("failed to delete secret: {0}")]
    DeleteError(String),

    /// Permission denied accessing secret storage.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Provider not available or not configured.
    #[error("secret provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Trait for persistence providers.
///
/// # Names
///
/// Record names are plain strings like `twitter.config`. Implementations
/// store them as-is; the file store rejects names that would escape its
/// directory.
pub trait SecretStore: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Read a record.
    ///
    /// Returns `Ok(None)` if the record does not exist.
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, SecretError>;

    /// Write a record, replacing any existing value.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), SecretError>;

    /// Delete a record.
    ///
    /// Returns `Ok(())` even if the record did not exist.
    fn delete(&self, name: &str) -> Result<(), SecretError>;

    /// Check if a record exists.
    fn exists(&self, name: &str) -> Result<bool, SecretError> {
        Ok(self.read(name)?.is_some())
    }
}
