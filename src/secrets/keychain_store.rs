//! secrets::keychain_store
//!
//! Record storage in the OS keychain.
//!
//! # Platform Support
//!
//! Uses the `keyring` crate: macOS Keychain, Windows Credential Manager,
//! Linux Secret Service (via D-Bus).
//!
//! # Feature Flag
//!
//! Only functional with the `keychain` feature:
//!
//! ```toml
//! birdhouse = { version = "0.2", features = ["keychain"] }
//! ```

#[cfg(feature = "keychain")]
use keyring::Entry;

use super::traits::{SecretError, SecretStore};

/// Keychain service name used for all entries.
#[cfg(feature = "keychain")]
pub const DEFAULT_SERVICE: &str = "birdhouse";

/// Keychain-backed record storage.
///
/// Each record is one keychain entry under the service name, with the record
/// name as the account.
#[cfg(feature = "keychain")]
#[derive(Debug)]
pub struct KeychainSecretStore {
    service: String,
}

#[cfg(feature = "keychain")]
impl KeychainSecretStore {
    /// Create a store under the [`DEFAULT_SERVICE`] service name.
    pub fn new() -> Result<Self, SecretError> {
        Ok(Self::with_service(DEFAULT_SERVICE))
    }

    /// Create a store with a custom service name (tests use a unique one).
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, name: &str) -> Result<Entry, SecretError> {
        Entry::new(&self.service, name)
            .map_err(|e| SecretError::ReadError(format!("cannot create keyring entry: {}", e)))
    }
}

#[cfg(feature = "keychain")]
impl SecretStore for KeychainSecretStore {
    fn name(&self) -> &'static str {
        "keychain"
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, SecretError> {
        let entry = self.entry(name)?;

        match entry.get_secret() {
            Ok(bytes) => Ok(Some(bytes)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(keyring::Error::Ambiguous(_)) => Err(SecretError::ReadError(
                "ambiguous keychain entry".to_string(),
            )),
            Err(e) => Err(SecretError::ReadError(format!(
                "cannot read from keychain: {}",
                e
            ))),
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), SecretError> {
        self.entry(name)?
            .set_secret(bytes)
            .map_err(|e| SecretError::WriteError(format!("cannot write to keychain: {}", e)))
    }

    fn delete(&self, name: &str) -> Result<(), SecretError> {
        match self.entry(name)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretError::DeleteError(format!(
                "cannot delete from keychain: {}",
                e
            ))),
        }
    }
}

// Stub when the keychain feature is disabled.
#[cfg(not(feature = "keychain"))]
#[derive(Debug)]
pub struct KeychainSecretStore {
    _private: (),
}

#[cfg(not(feature = "keychain"))]
impl KeychainSecretStore {
    /// Always fails when compiled without the `keychain` feature.
    pub fn new() -> Result<Self, SecretError> {
        Err(SecretError::ProviderNotAvailable(
            "keychain support not enabled (compile with --features keychain)".into(),
        ))
    }
}

#[cfg(not(feature = "keychain"))]
impl SecretStore for KeychainSecretStore {
    fn name(&self) -> &'static str {
        "keychain"
    }

    fn read(&self, _name: &str) -> Result<Option<Vec<u8>>, SecretError> {
        Err(SecretError::ReadError("keychain not available".into()))
    }

    fn write(&self, _name: &str, _bytes: &[u8]) -> Result<(), SecretError> {
        Err(SecretError::WriteError("keychain not available".into()))
    }

    fn delete(&self, _name: &str) -> Result<(), SecretError> {
        Err(SecretError::DeleteError("keychain not available".into()))
    }
}


#[cfg(all(test, not(feature = "keychain")))]
mod tests {
    use super::*;

    #[test]
    fn new_fails_without_feature() {
        let err = KeychainSecretStore::new().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("keychain"));
        assert!(msg.contains("not enabled"));
    }
}
