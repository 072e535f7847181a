//! secrets
//!
//! Persistence capability for the access-token record.
//!
//! # Architecture
//!
//! Records are stored through the [`SecretStore`] trait:
//!
//! - [`FileSecretStore`]: one file per record in `~/.birdhouse/` (default)
//! - [`KeychainSecretStore`]: OS keychain (optional, feature-gated)
//! - [`MemorySecretStore`]: in-process only
//!
//! # Security
//!
//! - Record contents are **never** logged or included in error messages
//! - The file store uses 0600 permissions on Unix
//! - File writes are atomic (temp file + rename)
//!
//! # Provider Selection
//!
//! ```ignore
//! use birdhouse::secrets::create_store;
//!
//! let store = create_store(&config.secrets_provider(), config.secrets_directory())?;
//! ```

mod file_store;
mod keychain_store;
mod memory_store;
mod traits;

use std::path::Path;

pub use file_store::FileSecretStore;
pub use keychain_store::KeychainSecretStore;
pub use memory_store::{FailOn, MemorySecretStore};
pub use traits::{SecretError, SecretStore};

/// The default provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Provider names accepted by [`create_store`].
pub const PROVIDERS: &[&str] = &["file", "keychain", "memory"];

/// Create a secret store from a provider name.
///
/// `directory` only applies to the file provider; `None` means
/// `~/.birdhouse`.
///
/// # Errors
///
/// - Unknown provider name
/// - Keychain provider without the `keychain` feature
/// - No home directory for the default file location
pub fn create_store(
    provider: &str,
    directory: Option<&Path>,
) -> Result<Box<dyn SecretStore>, SecretError> {
    match provider {
        "file" => match directory {
            Some(dir) => Ok(Box::new(FileSecretStore::with_directory(dir))),
            None => Ok(Box::new(FileSecretStore::new()?)),
        },
        "memory" => Ok(Box::new(MemorySecretStore::new())),
        "keychain" => Ok(Box::new(KeychainSecretStore::new()?)),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unknown secret provider: '{}' (valid: {})",
            other,
            PROVIDERS.join(", ")
        ))),
    }
}
