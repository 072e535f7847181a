//! api::types
//!
//! Payloads exchanged with the timeline API.
//!
//! Deserialization is lenient: every field defaults when absent, and
//! unknown fields are ignored. The API returns far more than is modelled
//! here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::ApiError;

/// Maximum status length in Unicode scalar values.
pub const MAX_STATUS_CHARS: usize = 280;

/// Author of a status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusUser {
    pub id_str: String,
    pub screen_name: String,
    pub name: String,
}

/// A status (tweet).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub id_str: String,
    pub text: String,
    pub created_at: String,
    pub user: Option<StatusUser>,
}

impl Status {
    /// `@screen_name`, or an empty string for statuses without a user.
    pub fn author(&self) -> String {
        self.user
            .as_ref()
            .map(|u| format!("@{}", u.screen_name))
            .unwrap_or_default()
    }
}

/// Optional timeline parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineQuery {
    pub count: Option<u32>,
    pub since_id: Option<String>,
    pub max_id: Option<String>,
}

impl TimelineQuery {
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(count) = self.count {
            params.push(("count".to_string(), count.to_string()));
        }
        if let Some(since_id) = &self.since_id {
            params.push(("since_id".to_string(), since_id.clone()));
        }
        if let Some(max_id) = &self.max_id {
            params.push(("max_id".to_string(), max_id.clone()));
        }
        params
    }
}

/// Successful raw response from a signed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

/// Check a status text before sending it.
pub fn validate_status_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::InvalidStatus("status text is empty".into()));
    }
    let chars = text.chars().count();
    if chars > MAX_STATUS_CHARS {
        return Err(ApiError::InvalidStatus(format!(
            "status text is {} characters (max {})",
            chars, MAX_STATUS_CHARS
        )));
    }
    Ok(())
}
