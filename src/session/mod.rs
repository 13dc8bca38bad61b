use std::future::Future;

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::request::{Credentials, Registration};
use crate::types::Identity;

mod components;

pub use components::{AuthForm, UserBadge};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Checking,
    Anonymous,
    Authenticated(Identity),
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Checking | Self::Anonymous => None,
        }
    }

    pub fn is_checking(&self) -> bool {
        matches!(self, Self::Checking)
    }

    pub fn login(&mut self, identity: Identity) {
        *self = Self::Authenticated(identity);
    }

    pub fn logout(&mut self) {
        *self = Self::Anonymous;
    }
}

/// Asks the backend who is signed in. Any failure means nobody is.
pub async fn check_session<F, Fut>(current_user: F) -> SessionState
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Identity, ApiError>>,
{
    match current_user().await {
        Ok(identity) => {
            debug!(username = %identity.username, "session found");
            SessionState::Authenticated(identity)
        }
        Err(err) if err.is_auth() => {
            debug!("no session: {err}");
            SessionState::Anonymous
        }
        Err(err) => {
            warn!("session check failed: {err}");
            SessionState::Anonymous
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::SignIn => Self::Register,
            Self::Register => Self::SignIn,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CredentialsError {
    #[error("Username and password are required")]
    Missing,
}

pub fn credentials(username: &str, password: &str) -> Result<Credentials, CredentialsError> {
    // Whitespace-only names are rejected, but a valid name is sent as typed
    if username.trim().is_empty() || password.is_empty() {
        return Err(CredentialsError::Missing);
    }

    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

pub fn registration(
    username: &str,
    password: &str,
    email: &str,
) -> Result<Registration, CredentialsError> {
    let Credentials { username, password } = credentials(username, password)?;

    Ok(Registration {
        username,
        password,
        email: email.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    fn alice() -> Identity {
        Identity {
            id: Some(1),
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
        }
    }

    #[test]
    fn failed_check_is_anonymous() {
        let state = block_on(check_session(|| async {
            Err::<Identity, _>(ApiError::Auth("Authentication credentials were not provided.".to_string()))
        }));
        assert_eq!(state, SessionState::Anonymous);

        let state = block_on(check_session(|| async {
            Err::<Identity, _>(ApiError::Network("connection refused".to_string()))
        }));
        assert_eq!(state, SessionState::Anonymous);
    }

    #[test]
    fn successful_check_is_authenticated() {
        let state = block_on(check_session(|| async { Ok::<_, ApiError>(alice()) }));

        assert_eq!(state.identity(), Some(&alice()));
    }

    #[test]
    fn login_after_anonymous_check() {
        let mut state = block_on(check_session(|| async {
            Err::<Identity, _>(ApiError::Auth(String::new()))
        }));
        assert!(state.identity().is_none());

        state.login(alice());

        assert_eq!(state, SessionState::Authenticated(alice()));
    }

    #[test]
    fn logout_is_idempotent() {
        let mut state = SessionState::Authenticated(alice());

        state.logout();
        state.logout();

        assert_eq!(state, SessionState::Anonymous);
    }

    #[test]
    fn credentials_are_required() {
        assert_eq!(credentials("  ", "secret"), Err(CredentialsError::Missing));
        assert_eq!(credentials("alice", ""), Err(CredentialsError::Missing));
        assert_eq!(
            credentials(" alice", "secret").map(|credentials| credentials.username),
            Ok(" alice".to_string())
        );
    }

    #[test]
    fn registration_email_is_optional() {
        let registration = registration("bob", "hunter2", "").unwrap();

        assert_eq!(registration.email, "");
        assert_eq!(AuthMode::SignIn.toggled(), AuthMode::Register);
    }
}
