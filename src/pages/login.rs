use async_trait::async_trait;
use tracing::{error, info, warn};

use super::{PageContext, PageController};
use crate::{
    assets::fetch_json,
    auth::{Credentials, authenticate},
    error::ShellError,
    models::{SessionRecord, UserDirectory},
    router::RouteOutcome,
    routes::{HOME_PATH, ROOT_PATH},
};

pub const USERS_RESOURCE: &str = "data/users.json";
pub const MESSAGE_AREA: &str = "messageArea";
pub const USERNAME_FIELD: &str = "username";

pub const INVALID_CREDENTIALS: &str = "Invalid username or password. Please try again.";
pub const LOGIN_UNAVAILABLE: &str = "Unable to sign in right now. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(SessionRecord),
    Rejected,
    /// The user list could not be fetched or decoded.
    Unavailable,
}

/// LoginPage
///
/// Entering the page while already authenticated redirects home. Submissions are
/// matched against the static user list.
#[derive(Debug, Default)]
pub struct LoginPage;

impl LoginPage {
    /// submit
    ///
    /// On a match: write the session record (no password), hide the message area,
    /// refresh the header and navigate home. On a miss: show the inline error and
    /// refocus the username field; nothing is written.
    pub async fn submit(
        &self,
        ctx: &PageContext,
        credentials: &Credentials,
    ) -> Result<LoginOutcome, ShellError> {
        let directory: UserDirectory =
            match fetch_json(ctx.assets.as_ref(), USERS_RESOURCE).await {
                Ok(directory) => directory,
                Err(e) => {
                    error!(error = %e, "login failed, user list unavailable");
                    if let Err(e) = ctx.host.show_message(MESSAGE_AREA, LOGIN_UNAVAILABLE) {
                        warn!(error = %e, "no message area on the login page");
                    }
                    return Ok(LoginOutcome::Unavailable);
                }
            };

        let Some(record) = authenticate(&directory, credentials) else {
            warn!(user = %credentials.user_name, "login rejected");
            if let Err(e) = ctx.host.show_message(MESSAGE_AREA, INVALID_CREDENTIALS) {
                warn!(error = %e, "no message area on the login page");
            }
            ctx.host.focus_field(USERNAME_FIELD);
            return Ok(LoginOutcome::Rejected);
        };

        ctx.session.begin(&record)?;
        ctx.host.hide_message(MESSAGE_AREA);
        ctx.header.load().await;
        ctx.router.navigate(HOME_PATH).await?;
        Ok(LoginOutcome::Authenticated(record))
    }

    pub async fn cancel(&self, ctx: &PageContext) -> Result<RouteOutcome, ShellError> {
        ctx.router.navigate(ROOT_PATH).await
    }
}

#[async_trait]
impl PageController for LoginPage {
    async fn enter(&self, ctx: &PageContext) -> Result<(), ShellError> {
        if ctx.session.is_authenticated() {
            info!("already authenticated, redirecting home");
            ctx.router.navigate(HOME_PATH).await?;
            return Ok(());
        }
        ctx.host.hide_message(MESSAGE_AREA);
        Ok(())
    }
}
