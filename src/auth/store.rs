//! auth::store
//!
//! Persists the access token pair between sessions.
//!
//! # Design
//!
//! The record is a JSON object with exactly two fields:
//!
//! ```json
//! {"access_token": "...", "access_token_secret": "..."}
//! ```
//!
//! Unknown fields, missing fields, empty values or bytes that are not JSON
//! make the record invalid. An invalid record is treated as absent: loading
//! never fails, it just yields `None` and logs why.
//!
//! # Security
//!
//! `StoredCredentials` implements `Debug` by hand; token values never reach
//! logs.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::AuthError;
use crate::oauth::TokenPair;
use crate::secrets::SecretStore;

/// Default record name.
pub const DEFAULT_RECORD_NAME: &str = "twitter.config";

/// The persisted record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredCredentials {
    pub access_token: String,
    pub access_token_secret: String,
}

impl StoredCredentials {
    pub fn from_pair(pair: &TokenPair) -> Self {
        Self {
            access_token: pair.token().to_string(),
            access_token_secret: pair.secret().to_string(),
        }
    }

    /// Convert to a token pair. `None` when either field is empty.
    pub fn into_pair(self) -> Option<TokenPair> {
        TokenPair::new(self.access_token, self.access_token_secret)
    }

    /// Serialize to the on-disk JSON.
    pub fn to_json(&self) -> Result<String, AuthError> {
        serde_json::to_string(self)
            .map_err(|e| AuthError::Persistence(format!("cannot serialize record: {}", e)))
    }

    /// Parse the on-disk JSON.
    ///
    /// Only a JSON object with the two named fields is a record; serde would
    /// otherwise also accept a two-element array.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(fields) => serde_json::from_value(Value::Object(fields)),
            _ => Err(serde::de::Error::custom("record is not a JSON object")),
        }
    }
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("access_token", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .finish()
    }
}

/// Load, save and clear the access token record.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn SecretStore>,
    record_name: String,
}

impl CredentialStore {
    /// Use the default record name.
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self::with_record_name(store, DEFAULT_RECORD_NAME)
    }

    pub fn with_record_name(store: Arc<dyn SecretStore>, record_name: impl Into<String>) -> Self {
        Self {
            store,
            record_name: record_name.into(),
        }
    }

    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    /// Load the persisted pair, if a valid one exists.
    pub fn load(&self) -> Option<TokenPair> {
        let bytes = match self.store.read(&self.record_name) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!(record = %self.record_name, "no persisted credentials");
                return None;
            }
            Err(e) => {
                tracing::warn!(record = %self.record_name, error = %e, "cannot read persisted credentials");
                return None;
            }
        };

        let record = match StoredCredentials::from_json(&bytes) {
            Ok(record) => record,
            Err(e) => {
                // serde_json errors report position and category, not content.
                tracing::warn!(record = %self.record_name, error = %e, "ignoring malformed credential record");
                return None;
            }
        };

        let pair = record.into_pair();
        if pair.is_none() {
            tracing::warn!(record = %self.record_name, "ignoring credential record with empty fields");
        }
        pair
    }

    /// Persist the pair, replacing any previous record.
    pub fn save(&self, pair: &TokenPair) -> Result<(), AuthError> {
        let json = StoredCredentials::from_pair(pair).to_json()?;
        self.store.write(&self.record_name, json.as_bytes())?;
        tracing::debug!(record = %self.record_name, provider = self.store.name(), "credentials persisted");
        Ok(())
    }

    /// Remove the record. Succeeds if it was already gone.
    pub fn clear(&self) -> Result<(), AuthError> {
        self.store.delete(&self.record_name)?;
        Ok(())
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("provider", &self.store.name())
            .field("record_name", &self.record_name)
            .finish()
    }
}
