use async_trait::async_trait;
use tracing::{debug, info};

use super::{PageContext, PageController};
use crate::{error::ShellError, router::RouteOutcome, routes::ABOUT_PATH};

pub const ABOUT_BUTTON: &str = "AboutUsBtn";

/// HomePage
///
/// Landing page for `/` and `/home`. Its "About Us" button leads to the about page.
#[derive(Debug, Default)]
pub struct HomePage;

impl HomePage {
    /// Follows the "About Us" button. A page rendered without the button ignores the click.
    pub async fn show_about(&self, ctx: &PageContext) -> Result<Option<RouteOutcome>, ShellError> {
        if !ctx.host.has_element(ABOUT_BUTTON) {
            debug!("no about button on this page");
            return Ok(None);
        }
        info!("about button clicked");
        ctx.router.navigate(ABOUT_PATH).await.map(Some)
    }
}

#[async_trait]
impl PageController for HomePage {
    async fn enter(&self, ctx: &PageContext) -> Result<(), ShellError> {
        if !ctx.host.has_element(ABOUT_BUTTON) {
            return Err(ShellError::MissingElement(ABOUT_BUTTON.to_string()));
        }
        Ok(())
    }
}
