use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use tracing::{error, info};

use super::{PageContext, PageController, escape};
use crate::{assets::fetch_json, error::ShellError, models::EventItem};

pub const EVENTS_RESOURCE: &str = "data/events.json";
pub const EVENT_LIST: &str = "event-list";
pub const ALL_CATEGORIES: &str = "All";

const NO_EVENTS: &str = "<p>No events found for this category.</p>";

/// Fetches the community events document. Shared with the planning page.
pub async fn load_events(ctx: &PageContext) -> Result<Vec<EventItem>, ShellError> {
    fetch_json(ctx.assets.as_ref(), EVENTS_RESOURCE).await
}

/// Renders `events` as cards, keeping only `category` unless it is [`ALL_CATEGORIES`].
pub fn render_events(events: &[EventItem], category: &str) -> String {
    let cards: Vec<String> = events
        .iter()
        .filter(|e| category == ALL_CATEGORIES || e.category == category)
        .map(|e| {
            format!(
                r#"<div class="card mb-3"><div class="card-body"><h5 class="card-title">{}</h5><p class="card-text">{}</p><p class="card-text"><small class="text-muted">{} | {}</small></p></div></div>"#,
                escape(&e.title),
                escape(&e.description),
                e.date.format("%Y-%m-%d"),
                escape(&e.category),
            )
        })
        .collect();

    if cards.is_empty() {
        NO_EVENTS.to_string()
    } else {
        cards.concat()
    }
}

/// EventsPage
///
/// Lists community events with a category filter. The fetched list is cached for the
/// lifetime of the page, so switching categories never refetches. A failed fetch
/// leaves the list empty.
#[derive(Debug, Default)]
pub struct EventsPage {
    cache: Mutex<Vec<EventItem>>,
}

impl EventsPage {
    pub fn select_category(&self, ctx: &PageContext, category: &str) -> Result<(), ShellError> {
        info!(%category, "filtering events");
        let html = {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            render_events(&cache, category)
        };
        ctx.host.set_region_markup(EVENT_LIST, &html)
    }
}

#[async_trait]
impl PageController for EventsPage {
    async fn enter(&self, ctx: &PageContext) -> Result<(), ShellError> {
        match load_events(ctx).await {
            Ok(events) => {
                *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = events;
                self.select_category(ctx, ALL_CATEGORIES)
            }
            Err(e) => {
                error!(error = %e, "error fetching events");
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clear();
                ctx.host.set_region_markup(EVENT_LIST, "")
            }
        }
    }
}
