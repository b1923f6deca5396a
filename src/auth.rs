use std::sync::Arc;
use tracing::warn;

use crate::{
    bus::ShellEvent,
    error::ShellError,
    models::{SessionRecord, UserDirectory},
    routes::{RouteTable, base_path},
    session::SessionService,
};

/// Credentials
///
/// What the login form submits. Values are trimmed before matching.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_name: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user_name: &str, password: &str) -> Self {
        Self {
            user_name: user_name.trim().to_string(),
            password: password.trim().to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .finish_non_exhaustive()
    }
}

/// authenticate
///
/// Matches credentials against the static user list. On success returns the session
/// record to store; the password never leaves this function.
///
/// This is a session simulation against a fetched document, not real authentication.
pub fn authenticate(directory: &UserDirectory, credentials: &Credentials) -> Option<SessionRecord> {
    directory
        .find(&credentials.user_name, &credentials.password)
        .map(SessionRecord::from)
}

/// AuthGuard
///
/// Decides whether a path may be entered given the current session. Invoked at
/// bootstrap and before any protected page controller runs.
///
/// Decision table:
/// 1. Protected path, no session: publish `SessionExpired` and reject.
/// 2. Session present (any path): restart the inactivity timer and allow.
/// 3. Unprotected path, no session: allow.
///
/// A corrupt stored record counts as "no session" and is cleared on the spot.
#[derive(Clone)]
pub struct AuthGuard {
    session: SessionService,
    routes: Arc<RouteTable>,
}

impl AuthGuard {
    pub fn new(session: SessionService, routes: Arc<RouteTable>) -> Self {
        Self { session, routes }
    }

    pub fn check(&self, path: &str) -> Result<(), ShellError> {
        let path = base_path(path);

        let authenticated = match self.session.current() {
            Ok(record) => record.is_some(),
            Err(e) => {
                warn!(error = %e, "discarding unreadable session record");
                self.session.clear();
                false
            }
        };

        if self.routes.is_protected(path) && !authenticated {
            warn!(%path, "blocked unauthorized access");
            self.session.bus().publish(ShellEvent::SessionExpired);
            return Err(ShellError::AuthDenied(path.to_string()));
        }

        if authenticated {
            self.session.reset_timer();
        }

        Ok(())
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.routes.is_protected(path)
    }
}
