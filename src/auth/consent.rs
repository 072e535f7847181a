//! auth::consent
//!
//! The consent capability: show the provider's authorize page to the user
//! and report how it ended.
//!
//! # Design
//!
//! A [`ConsentProvider`] is handed the authorize URL and resolves to one
//! [`ConsentOutcome`]:
//!
//! - `Redirected(url)`: the provider navigated to the callback; the URL's
//!   query carries `oauth_token` and `oauth_verifier`
//! - `Pin(code)`: out-of-band flow, the user typed the code shown by the
//!   provider
//! - `Denied`: the user declined or closed the surface
//!
//! [`extract_verifier`] turns an outcome into the verifier or a denial.
//!
//! # Example
//!
//! ```
//! use birdhouse::auth::consent::{extract_verifier, ConsentOutcome};
//!
//! let outcome = ConsentOutcome::Redirected(
//!     "oob://callback?oauth_token=RT&oauth_verifier=V1".to_string(),
//! );
//! assert_eq!(extract_verifier(&outcome, "RT").as_deref(), Some("V1"));
//! assert_eq!(extract_verifier(&outcome, "OTHER"), None);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use crate::oauth::encoding::{append_query, percent_encode};

/// How a consent interaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentOutcome {
    /// The provider redirected to this URL.
    Redirected(String),
    /// The user entered this out-of-band code.
    Pin(String),
    /// The user declined or dismissed consent.
    Denied,
}

/// The consent capability.
#[async_trait]
pub trait ConsentProvider: Send + Sync {
    /// Present `authorize_url` and wait for the user to finish.
    async fn request_consent(&self, authorize_url: &str) -> ConsentOutcome;
}

/// Build the URL the user visits: `<authorize>?oauth_token=<token>`.
pub fn authorize_url(base: &str, request_token: &str) -> String {
    append_query(
        base,
        &format!("oauth_token={}", percent_encode(request_token)),
    )
}

/// Provider pages that end the flow without a verifier (account signup,
/// suspended account).
fn is_account_page(url: &Url) -> bool {
    let path = url.path();
    path.contains("account") || path.contains("suspended")
}

/// Resolve an outcome to a verifier.
///
/// Returns `None` (denial) when:
/// - the user denied, or typed an empty PIN
/// - the redirect carries `denied=...`
/// - the redirect carries an `oauth_token` other than `request_token`
/// - the redirect has no non-empty `oauth_verifier`
pub fn extract_verifier(outcome: &ConsentOutcome, request_token: &str) -> Option<String> {
    match outcome {
        ConsentOutcome::Denied => None,
        ConsentOutcome::Pin(code) => {
            let code = code.trim();
            if code.is_empty() {
                None
            } else {
                Some(code.to_string())
            }
        }
        ConsentOutcome::Redirected(raw) => verifier_from_redirect(raw.trim(), request_token),
    }
}

fn verifier_from_redirect(raw: &str, request_token: &str) -> Option<String> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(error = %e, "consent redirect is not a URL");
            return None;
        }
    };

    let mut verifier = None;
    let mut token = None;
    let mut denied = false;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "oauth_verifier" => verifier = Some(value.into_owned()),
            "oauth_token" => token = Some(value.into_owned()),
            "denied" => denied = true,
            _ => {}
        }
    }

    if denied {
        tracing::debug!("provider reported denial in redirect");
        return None;
    }
    if let Some(token) = token {
        if token != request_token {
            tracing::warn!("redirect carries a token from a different handshake");
            return None;
        }
    }

    match verifier.filter(|v| !v.is_empty()) {
        Some(v) => Some(v),
        None => {
            if is_account_page(&url) {
                tracing::debug!(path = url.path(), "consent ended on an account page");
            } else {
                tracing::debug!(path = url.path(), "redirect has no verifier");
            }
            None
        }
    }
}

/// Consent provider that replays scripted outcomes.
///
/// Records every authorize URL it is shown. Once the script runs out it
/// answers `Denied`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConsent {
    inner: Arc<Mutex<ScriptedInner>>,
}

#[derive(Debug, Default)]
struct ScriptedInner {
    outcomes: VecDeque<ConsentOutcome>,
    shown: Vec<String>,
}

impl ScriptedConsent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with one queued outcome.
    pub fn with(outcome: ConsentOutcome) -> Self {
        let consent = Self::new();
        consent.push(outcome);
        consent
    }

    /// Queue an outcome.
    pub fn push(&self, outcome: ConsentOutcome) -> &Self {
        self.lock().outcomes.push_back(outcome);
        self
    }

    /// Authorize URLs shown so far.
    pub fn shown(&self) -> Vec<String> {
        self.lock().shown.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ConsentProvider for ScriptedConsent {
    async fn request_consent(&self, authorize_url: &str) -> ConsentOutcome {
        let mut inner = self.lock();
        inner.shown.push(authorize_url.to_string());
        inner.outcomes.pop_front().unwrap_or(ConsentOutcome::Denied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirected(url: &str) -> ConsentOutcome {
        ConsentOutcome::Redirected(url.to_string())
    }

    #[test]
    fn authorize_url_appends_token() {
        assert_eq!(
            authorize_url("https://api.example.com/oauth/authorize", "R T"),
            "https://api.example.com/oauth/authorize?oauth_token=R%20T"
        );
        assert_eq!(
            authorize_url("https://api.example.com/oauth/authorize?force_login=true", "RT"),
            "https://api.example.com/oauth/authorize?force_login=true&oauth_token=RT"
        );
    }

    #[test]
    fn authorize_url_keeps_fragment_last() {
        assert_eq!(
            authorize_url("https://api.example.com/oauth/authorize#login", "RT"),
            "https://api.example.com/oauth/authorize?oauth_token=RT#login"
        );

        let url = Url::parse(&authorize_url(
            "https://api.example.com/oauth/authorize?lang=en#login",
            "RT",
        ))
        .expect("parse");
        assert_eq!(url.query(), Some("lang=en&oauth_token=RT"));
        assert_eq!(url.fragment(), Some("login"));
    }

    #[test]
    fn redirect_with_matching_token_yields_verifier() {
        let outcome = redirected("https://cb.example/done?oauth_token=RT&oauth_verifier=V");
        assert_eq!(extract_verifier(&outcome, "RT").as_deref(), Some("V"));
    }

    #[test]
    fn redirect_without_token_still_yields_verifier() {
        let outcome = redirected("https://cb.example/done?oauth_verifier=V%2B1");
        assert_eq!(extract_verifier(&outcome, "RT").as_deref(), Some("V+1"));
    }

    #[test]
    fn foreign_token_is_denial() {
        let outcome = redirected("https://cb.example/done?oauth_token=OTHER&oauth_verifier=V");
        assert_eq!(extract_verifier(&outcome, "RT"), None);
    }

    #[test]
    fn denied_parameter_is_denial() {
        let outcome = redirected("https://cb.example/done?denied=RT");
        assert_eq!(extract_verifier(&outcome, "RT"), None);
    }

    #[test]
    fn account_pages_are_denial() {
        assert_eq!(
            extract_verifier(&redirected("https://api.example.com/account/suspended"), "RT"),
            None
        );
        assert_eq!(
            extract_verifier(&redirected("https://api.example.com/account/begin_password_reset"), "RT"),
            None
        );
    }

    #[test]
    fn empty_verifier_is_denial() {
        let outcome = redirected("https://cb.example/done?oauth_token=RT&oauth_verifier=");
        assert_eq!(extract_verifier(&outcome, "RT"), None);
    }

    #[test]
    fn unparseable_redirect_is_denial() {
        assert_eq!(extract_verifier(&redirected("not a url"), "RT"), None);
    }

    #[test]
    fn pin_is_trimmed() {
        assert_eq!(
            extract_verifier(&ConsentOutcome::Pin(" 1234567\n".into()), "RT").as_deref(),
            Some("1234567")
        );
        assert_eq!(extract_verifier(&ConsentOutcome::Pin("  ".into()), "RT"), None);
    }

    #[test]
    fn denied_is_denial() {
        assert_eq!(extract_verifier(&ConsentOutcome::Denied, "RT"), None);
    }

    #[tokio::test]
    async fn scripted_consent_replays_then_denies() {
        let consent = ScriptedConsent::with(ConsentOutcome::Pin("1".into()));

        assert_eq!(
            consent.request_consent("https://a.example/1").await,
            ConsentOutcome::Pin("1".into())
        );
        assert_eq!(
            consent.request_consent("https://a.example/2").await,
            ConsentOutcome::Denied
        );
        assert_eq!(consent.shown(), vec!["https://a.example/1", "https://a.example/2"]);
    }
}
