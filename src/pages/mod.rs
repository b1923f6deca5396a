//! Page controllers and the dispatch table that runs them after a route loads.
//!
//! Each controller is defined once and owns the interactive wiring of one route. The
//! dispatcher consults the guard first for protected paths; a denied path is never
//! rendered.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    assets::AssetState,
    auth::AuthGuard,
    dom::HostState,
    error::ShellError,
    header::HeaderView,
    router::Router,
    routes::base_path,
    session::SessionService,
};

pub mod contact;
pub mod events;
pub mod gallery;
pub mod home;
pub mod login;
pub mod news;
pub mod opportunities;
pub mod planning;
pub mod statistics;

pub use contact::{ContactForm, ContactPage};
pub use events::EventsPage;
pub use gallery::GalleryPage;
pub use home::HomePage;
pub use login::{LoginOutcome, LoginPage};
pub use news::NewsPage;
pub use opportunities::{OpportunitiesPage, SignupForm};
pub use planning::{EventDraft, EventPlanningPage};
pub use statistics::StatisticsPage;

/// Everything a controller may touch. Controllers never mutate the content region,
/// the script slot or the modal slot directly; they go through `router`.
#[derive(Clone)]
pub struct PageContext {
    pub host: HostState,
    pub assets: AssetState,
    pub session: SessionService,
    pub header: HeaderView,
    pub router: Arc<Router>,
}

/// PageController
///
/// Runs after the route's fragment is in place and the header reflects the current
/// session. Errors are logged by the dispatcher and never bubble further.
#[async_trait]
pub trait PageController: Send + Sync {
    async fn enter(&self, ctx: &PageContext) -> Result<(), ShellError>;
}

/// Result of handing a loaded route to its controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Rendered,
    /// Protected path without a session. The guard has already published
    /// `SessionExpired`.
    Denied,
    /// No controller is registered; the fragment is static.
    Unhandled,
    Failed(ShellError),
}

/// Dispatcher
///
/// The path → controller table.
pub struct Dispatcher {
    controllers: HashMap<String, Arc<dyn PageController>>,
    guard: AuthGuard,
}

impl Dispatcher {
    pub fn new(guard: AuthGuard) -> Self {
        Self {
            controllers: HashMap::new(),
            guard,
        }
    }

    pub fn register(&mut self, path: &str, controller: Arc<dyn PageController>) {
        self.controllers.insert(path.to_string(), controller);
    }

    pub async fn dispatch(&self, ctx: &PageContext, path: &str) -> DispatchOutcome {
        let path = base_path(path);
        info!(%path, "new route loaded");

        if self.guard.is_protected(path) && self.guard.check(path).is_err() {
            ctx.host.replace_content_region();
            return DispatchOutcome::Denied;
        }

        let Some(controller) = self.controllers.get(path) else {
            warn!(%path, "no page logic matching path");
            return DispatchOutcome::Unhandled;
        };

        match controller.enter(ctx).await {
            Ok(()) => DispatchOutcome::Rendered,
            Err(e) => {
                error!(%path, error = %e, "page controller failed");
                DispatchOutcome::Failed(e)
            }
        }
    }
}

/// Minimal HTML escaping for text interpolated into generated markup.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
