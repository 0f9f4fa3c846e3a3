//! Explicit client session state.
//!
//! Auth state lives in one owned object that is passed through the call
//! chain. Interested parties subscribe for change notification and drop the
//! receiver to unsubscribe; there is no ambient global listener.

use tokio::sync::watch;

/// Current authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn {
        user_id: String,
        access_token: String,
    },
}

impl AuthState {
    /// Bearer token for the signed-in user, if any.
    pub fn access_token(&self) -> Option<&str> {
        match self {
            AuthState::SignedIn { access_token, .. } => Some(access_token),
            AuthState::SignedOut => None,
        }
    }
}

/// Owned session handle.
pub struct Session {
    state: watch::Sender<AuthState>,
}

impl Session {
    /// Create a signed-out session.
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(AuthState::SignedOut),
        }
    }

    /// Record a successful sign-in and notify subscribers.
    pub fn sign_in(&self, user_id: impl Into<String>, access_token: impl Into<String>) {
        self.state.send_replace(AuthState::SignedIn {
            user_id: user_id.into(),
            access_token: access_token.into(),
        });
    }

    /// Clear the session and notify subscribers.
    pub fn sign_out(&self) {
        self.state.send_replace(AuthState::SignedOut);
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Bearer token for the signed-in user, if any.
    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token().map(|s| s.to_string())
    }

    /// Subscribe to state changes; dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_signed_out() {
        let session = Session::new();
        assert_eq!(session.current(), AuthState::SignedOut);
        assert!(session.access_token().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_observe_sign_in_and_out() {
        let session = Session::new();
        let mut updates = session.subscribe();

        session.sign_in("user-1", "token-abc");
        updates.changed().await.unwrap();
        assert_eq!(
            *updates.borrow(),
            AuthState::SignedIn {
                user_id: "user-1".to_string(),
                access_token: "token-abc".to_string(),
            }
        );
        assert_eq!(session.access_token().as_deref(), Some("token-abc"));

        session.sign_out();
        updates.changed().await.unwrap();
        assert_eq!(*updates.borrow(), AuthState::SignedOut);
    }
}
