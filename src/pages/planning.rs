use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

use super::{PageContext, PageController, escape, events::load_events};
use crate::{error::ShellError, models::EventItem};

pub const EVENTS_LIST: &str = "eventsList";
pub const PLANNING_ERROR: &str = "eventFormError";

/// What the planning form submits. `date` is `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub category: String,
}

/// EventPlanningPage
///
/// Protected. Shows the scheduled events and lets a logged-in user add more. Added
/// events live only as long as this controller.
#[derive(Debug, Default)]
pub struct EventPlanningPage {
    events: Mutex<Vec<EventItem>>,
}

impl EventPlanningPage {
    pub fn events(&self) -> Vec<EventItem> {
        self.lock().clone()
    }

    /// add_event
    ///
    /// Validates the draft, appends it and re-renders the list. A rejected draft shows
    /// its message in the form's error area and returns `Ok(None)`.
    pub fn add_event(
        &self,
        ctx: &PageContext,
        draft: &EventDraft,
    ) -> Result<Option<EventItem>, ShellError> {
        let item = match EventItem::new(&draft.title, &draft.description, &draft.date, &draft.category)
        {
            Ok(item) => item,
            Err(e) => {
                warn!(error = %e, "event draft rejected");
                ctx.host.show_message(PLANNING_ERROR, &e.to_string())?;
                return Ok(None);
            }
        };

        info!(title = %item.title, "event planned");
        ctx.host.hide_message(PLANNING_ERROR);
        self.lock().push(item.clone());
        self.render(ctx)?;
        Ok(Some(item))
    }

    fn render(&self, ctx: &PageContext) -> Result<(), ShellError> {
        let html: String = self
            .lock()
            .iter()
            .map(|e| {
                format!(
                    r#"<li class="list-group-item"><strong>{}</strong> ({}) {} <span class="badge bg-secondary">{}</span></li>"#,
                    escape(&e.title),
                    e.date.format("%Y-%m-%d"),
                    escape(&e.description),
                    escape(&e.category),
                )
            })
            .collect();
        ctx.host.set_region_markup(EVENTS_LIST, &html)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EventItem>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PageController for EventPlanningPage {
    async fn enter(&self, ctx: &PageContext) -> Result<(), ShellError> {
        match load_events(ctx).await {
            Ok(events) => *self.lock() = events,
            Err(e) => {
                error!(error = %e, "error fetching events for planning");
                self.lock().clear();
            }
        }
        self.render(ctx)
    }
}
