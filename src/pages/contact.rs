use async_trait::async_trait;
use tracing::{info, warn};

use super::{PageContext, PageController};
use crate::{error::ShellError, models::Contact};

pub const CONFIRMATION_MESSAGE: &str = "confirmationMessage";
pub const CONTACT_CONFIRMED: &str = "Thank you for your message! We will get back to you soon.";
const FIELD_IDS: [&str; 3] = ["fullName", "contactNumber", "emailAddress"];

/// What the contact form submits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub full_name: String,
    pub contact_number: String,
    pub email_address: String,
}

/// ContactPage
#[derive(Debug, Default)]
pub struct ContactPage;

impl ContactPage {
    /// submit
    ///
    /// Validates through [`Contact::new`]. The first failing field gets its
    /// `<field>_error` message and focus, and `Ok(None)` is returned.
    pub fn submit(&self, ctx: &PageContext, form: &ContactForm) -> Result<Option<Contact>, ShellError> {
        for field in FIELD_IDS {
            ctx.host.hide_message(&format!("{field}_error"));
        }

        match Contact::new(&form.full_name, &form.contact_number, &form.email_address) {
            Ok(contact) => {
                info!(name = %contact.full_name(), "contact form submitted");
                ctx.host.show_message(CONFIRMATION_MESSAGE, CONTACT_CONFIRMED)?;
                Ok(Some(contact))
            }
            Err(e) => {
                warn!(error = %e, "contact form rejected");
                if let Some(field) = e.field() {
                    ctx.host.show_message(&format!("{field}_error"), &e.message())?;
                    ctx.host.focus_field(field);
                }
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl PageController for ContactPage {
    async fn enter(&self, ctx: &PageContext) -> Result<(), ShellError> {
        ctx.host.hide_message(CONFIRMATION_MESSAGE);
        Ok(())
    }
}
