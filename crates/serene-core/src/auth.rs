//! Observable signed-in state.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

use crate::signin::EmailSignIn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    SignedOut,
    SignedIn { email: String },
}

impl AuthState {
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::SignedOut => None,
            Self::SignedIn { email } => Some(email),
        }
    }
}

/// Holds the current [`AuthState`] and notifies subscribers when it changes.
#[derive(Debug)]
pub struct AuthSession {
    tx: watch::Sender<AuthState>,
}

impl AuthSession {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AuthState::SignedOut);
        Self { tx }
    }

    /// Signed in if `flow` has been verified.
    pub fn from_sign_in(flow: &EmailSignIn) -> Self {
        let session = Self::new();
        if flow.is_verified() {
            session.sign_in(flow.email());
        }
        session
    }

    pub fn current(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(*self.tx.borrow(), AuthState::SignedIn { .. })
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    pub fn sign_in(&self, email: &str) {
        info!(email, "signed in");
        self.tx.send_replace(AuthState::SignedIn {
            email: email.to_string(),
        });
    }

    /// No-op when already signed out.
    pub fn sign_out(&self) {
        self.tx.send_if_modified(|state| {
            if *state == AuthState::SignedOut {
                return false;
            }
            info!("signed out");
            *state = AuthState::SignedOut;
            true
        });
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}
