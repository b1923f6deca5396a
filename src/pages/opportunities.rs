use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use super::{PageContext, PageController, escape};
use crate::{
    dom::ModalHandle,
    error::ShellError,
    models::{Opportunity, default_opportunities},
};

pub const OPPORTUNITY_CARDS: &str = "opportunity-cards";
pub const SIGNUP_MODAL: &str = "signupModal";
pub const SIGNUP_ERROR: &str = "signupError";
pub const CONFIRMATION_MESSAGE: &str = "confirmationMessage";

pub const FIELDS_REQUIRED: &str = "All fields are required!";
pub const SIGNUP_CONFIRMED: &str = "Thank you for signing up! We will contact you soon.";
pub const CONFIRMATION_VISIBLE_FOR: Duration = Duration::from_secs(2);

/// What the signup modal submits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl SignupForm {
    pub fn new(name: &str, email: &str, role: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            role: role.trim().to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.role.is_empty()
    }
}

fn render_card(opportunity: &Opportunity) -> String {
    format!(
        r##"<div class="col-md-4"><div class="card mb-3"><div class="card-body"><h5 class="card-title">{}</h5><p class="card-text">{}</p><p class="card-text"><small class="text-muted">{}</small></p><button class="btn btn-primary" data-bs-target="#{SIGNUP_MODAL}">Sign Up</button></div></div></div>"##,
        escape(&opportunity.title),
        escape(&opportunity.description),
        escape(&opportunity.date_time),
    )
}

/// OpportunitiesPage
///
/// Static volunteer opportunities with a signup modal. The modal is opened through the
/// router so that leaving the page always disposes it.
#[derive(Debug)]
pub struct OpportunitiesPage {
    opportunities: Vec<Opportunity>,
}

impl Default for OpportunitiesPage {
    fn default() -> Self {
        Self {
            opportunities: default_opportunities(),
        }
    }
}

impl OpportunitiesPage {
    pub fn opportunities(&self) -> &[Opportunity] {
        &self.opportunities
    }

    pub fn open_signup(&self, ctx: &PageContext) -> Result<(), ShellError> {
        ctx.host.hide_message(SIGNUP_ERROR);
        ctx.router.open_modal(ModalHandle::new(SIGNUP_MODAL))
    }

    /// submit_signup
    ///
    /// An incomplete form keeps the modal open with an inline error. A complete one shows
    /// the confirmation, closes the modal and hides the confirmation again after
    /// [`CONFIRMATION_VISIBLE_FOR`]. The hide task belongs to the router, so leaving the
    /// page first cancels it. Returns whether the signup was accepted.
    pub fn submit_signup(&self, ctx: &PageContext, form: &SignupForm) -> Result<bool, ShellError> {
        if !form.is_complete() {
            warn!("signup submitted with missing fields");
            ctx.host.show_message(SIGNUP_ERROR, FIELDS_REQUIRED)?;
            return Ok(false);
        }

        info!(role = %form.role, "volunteer signup accepted");
        ctx.host.hide_message(SIGNUP_ERROR);
        ctx.host.show_message(CONFIRMATION_MESSAGE, SIGNUP_CONFIRMED)?;
        ctx.router.close_modal();

        let host = ctx.host.clone();
        ctx.router.track_page_task(tokio::spawn(async move {
            tokio::time::sleep(CONFIRMATION_VISIBLE_FOR).await;
            host.hide_message(CONFIRMATION_MESSAGE);
        }));
        Ok(true)
    }
}

#[async_trait]
impl PageController for OpportunitiesPage {
    async fn enter(&self, ctx: &PageContext) -> Result<(), ShellError> {
        let cards: String = self.opportunities.iter().map(render_card).collect();
        ctx.host.set_region_markup(OPPORTUNITY_CARDS, &cards)
    }
}
