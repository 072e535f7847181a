//! auth::state
//!
//! The handshake state enum and its legal transitions.

use std::fmt;

/// Where the authorization handshake currently stands.
///
/// ```text
/// Unauthorized ──authorize──▶ RequestTokenPending ──▶ AwaitingUserConsent
///      ▲                                                      │
///      │                                                      ▼
///      └──── deauthorize ──── Authorized ◀── AccessTokenPending
/// ```
///
/// Every in-progress state may also fall back to `Unauthorized` on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationState {
    Unauthorized,
    RequestTokenPending,
    AwaitingUserConsent,
    AccessTokenPending,
    Authorized,
}

impl AuthorizationState {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: AuthorizationState) -> bool {
        use AuthorizationState::*;
        matches!(
            (self, next),
            (Unauthorized, RequestTokenPending)
                | (RequestTokenPending, AwaitingUserConsent)
                | (AwaitingUserConsent, AccessTokenPending)
                | (AccessTokenPending, Authorized)
                | (Authorized, Unauthorized)
                | (RequestTokenPending, Unauthorized)
                | (AwaitingUserConsent, Unauthorized)
                | (AccessTokenPending, Unauthorized)
        )
    }

    /// A handshake is underway.
    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            AuthorizationState::RequestTokenPending
                | AuthorizationState::AwaitingUserConsent
                | AuthorizationState::AccessTokenPending
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthorizationState::Unauthorized => "unauthorized",
            AuthorizationState::RequestTokenPending => "request-token-pending",
            AuthorizationState::AwaitingUserConsent => "awaiting-user-consent",
            AuthorizationState::AccessTokenPending => "access-token-pending",
            AuthorizationState::Authorized => "authorized",
        }
    }
}

impl fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
