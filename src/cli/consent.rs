//! cli::consent
//!
//! Terminal consent: print the authorize URL, optionally open it in the
//! browser, and read the redirect URL or PIN the user pastes back.

use async_trait::async_trait;
use url::Url;

use crate::auth::{ConsentOutcome, ConsentProvider};
use crate::ui::prompts;

const PROMPT: &str = "Paste the redirect URL or PIN (empty to cancel): ";

/// Consent through the terminal the CLI runs in.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConsent {
    open_browser: bool,
}

impl TerminalConsent {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

#[async_trait]
impl ConsentProvider for TerminalConsent {
    async fn request_consent(&self, authorize_url: &str) -> ConsentOutcome {
        eprintln!("Authorize birdhouse by visiting:\n\n    {}\n", authorize_url);

        if self.open_browser {
            if let Err(e) = open::that(authorize_url) {
                tracing::warn!(error = %e, "could not open browser");
            }
        }

        // stdin is read even when it is not a terminal so a PIN can be piped in
        let line = tokio::task::spawn_blocking(|| prompts::input(PROMPT, true)).await;
        match line {
            Ok(Ok(line)) => interpret_response(&line),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "no consent response");
                ConsentOutcome::Denied
            }
            Err(e) => {
                tracing::warn!(error = %e, "consent prompt failed");
                ConsentOutcome::Denied
            }
        }
    }
}

/// Classify what the user typed.
///
/// An empty line is a denial, a URL with a query is the provider's
/// redirect, anything else is a PIN.
pub fn interpret_response(line: &str) -> ConsentOutcome {
    let line = line.trim();
    if line.is_empty() {
        return ConsentOutcome::Denied;
    }
    match Url::parse(line) {
        Ok(url) if url.query().is_some() => ConsentOutcome::Redirected(line.to_string()),
        _ => ConsentOutcome::Pin(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_denial() {
        assert_eq!(interpret_response(""), ConsentOutcome::Denied);
        assert_eq!(interpret_response("   \t"), ConsentOutcome::Denied);
    }

    #[test]
    fn redirect_url() {
        let raw = "https://example.com/cb?oauth_token=RT&oauth_verifier=V";
        assert_eq!(
            interpret_response(&format!("  {}\n", raw)),
            ConsentOutcome::Redirected(raw.to_string())
        );
    }

    #[test]
    fn pin() {
        assert_eq!(
            interpret_response("1234567"),
            ConsentOutcome::Pin("1234567".to_string())
        );
        assert_eq!(
            interpret_response("https://example.com/no-query"),
            ConsentOutcome::Pin("https://example.com/no-query".to_string())
        );
    }
}
