use std::fmt;

use shared::domain::{SessionState, View};
use tracing::{info, warn};

pub const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password. Please try again.";

/// Decides whether a username/password pair grants admin access.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single configured admin account. Plain comparison, no hashing and no
/// rate limiting.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// What the main area should show for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOutcome {
    PublicGallery,
    AdminDashboard,
    AccessDenied,
}

#[derive(Debug, Default, Clone)]
pub struct SessionController {
    state: SessionState,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// On success the session becomes admin and switches to the admin view.
    /// On failure nothing changes.
    pub fn attempt_login(
        &mut self,
        verifier: &dyn CredentialVerifier,
        username: &str,
        password: &str,
    ) -> bool {
        if !verifier.verify(username, password) {
            warn!(%username, "admin login rejected");
            return false;
        }
        info!(%username, "admin logged in");
        self.state = SessionState {
            is_admin: true,
            view: View::Admin,
        };
        true
    }

    pub fn logout(&mut self) {
        if self.state.is_admin {
            info!("admin logged out");
        }
        self.state = SessionState::default();
    }

    /// Selecting a view never fails; authorization is applied by `outcome`.
    pub fn set_view(&mut self, view: View) {
        self.state.view = view;
    }

    pub fn view(&self) -> View {
        self.state.view
    }

    pub fn is_admin(&self) -> bool {
        self.state.is_admin
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn outcome(&self) -> ViewOutcome {
        match (self.state.view, self.state.is_admin) {
            (View::Public, _) => ViewOutcome::PublicGallery,
            (View::Admin, true) => ViewOutcome::AdminDashboard,
            (View::Admin, false) => ViewOutcome::AccessDenied,
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
