//! Router / page lifecycle coordinator.
//!
//! The coordinator is the only writer of the content region, the page-script slot and
//! the modal slot. One transition runs at a time: each `load_route` takes a sequence
//! token before waiting for the transition lock, and a transition whose token is no
//! longer the latest drops its fetched fragment instead of applying it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{
    assets::AssetState,
    bus::{EventBus, ShellEvent},
    dom::{HostState, ModalHandle, ScriptHandle},
    error::ShellError,
    header::HeaderView,
    routes::{RouteTable, base_path, normalize, script_for},
};

/// How a `load_route` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The path was installed and `RouteLoaded` published.
    Loaded(String),
    /// `from` was unmapped or its fragment failed; the not-found route was installed.
    Redirected { from: String, to: String },
    /// A newer transition started while this one was waiting; nothing was applied.
    Superseded,
    /// The page could not take the fragment (no content region, or the not-found
    /// fragment itself failed). Nothing further is attempted.
    Abandoned(String),
}

enum Install {
    Done,
    NotFound,
    Superseded,
    Abandoned,
}

#[derive(Debug, Default)]
struct NavigationState {
    current: Option<String>,
    requested: Option<String>,
    previous_markup: Option<String>,
    script: Option<ScriptHandle>,
    modal: Option<ModalHandle>,
    page_task: Option<JoinHandle<()>>,
}

/// Router
///
/// Owns navigation, fragment loading, page-script attach/detach, teardown of the
/// previous page and the route-loaded notification.
pub struct Router {
    routes: Arc<RouteTable>,
    host: HostState,
    assets: AssetState,
    header: HeaderView,
    bus: EventBus,
    nav: Mutex<NavigationState>,
    latest: AtomicU64,
    transition: tokio::sync::Mutex<()>,
}

impl Router {
    pub fn new(
        routes: Arc<RouteTable>,
        host: HostState,
        assets: AssetState,
        header: HeaderView,
        bus: EventBus,
    ) -> Self {
        Self {
            routes,
            host,
            assets,
            header,
            bus,
            nav: Mutex::new(NavigationState::default()),
            latest: AtomicU64::new(0),
            transition: tokio::sync::Mutex::new(()),
        }
    }

    /// Initial load: the path in the location fragment, or the root.
    pub async fn start(&self) -> Result<RouteOutcome, ShellError> {
        let path = normalize(&self.host.location_hash());
        self.remember_request(&path);
        self.load_route(&path).await
    }

    /// navigate
    ///
    /// Tears down the current page, points the location at `path` and loads it.
    /// The location change this causes is remembered, so a host that reports it back
    /// through `handle_location_change` does not load the route a second time.
    pub async fn navigate(&self, path: &str) -> Result<RouteOutcome, ShellError> {
        self.cleanup_previous_route();
        self.host.set_location_hash(path);
        self.remember_request(path);
        self.load_route(path).await
    }

    /// handle_location_change
    ///
    /// Browser back/forward (or any external fragment change). Returns `None` when the
    /// change is the echo of our own `navigate`.
    pub async fn handle_location_change(
        &self,
        hash: &str,
    ) -> Result<Option<RouteOutcome>, ShellError> {
        let path = normalize(hash);
        if self.lock_nav().requested.as_deref() == Some(path.as_str()) {
            debug!(%path, "location change already handled");
            return Ok(None);
        }
        self.cleanup_previous_route();
        self.remember_request(&path);
        self.load_route(&path).await.map(Some)
    }

    /// load_route
    ///
    /// Resolves `path`, injects its fragment, swaps the page script, refreshes the header
    /// and then publishes `RouteLoaded`. Unmapped paths and failed fetches are redirected
    /// to the not-found route exactly once; if that route fails too the transition is
    /// abandoned rather than retried.
    pub async fn load_route(&self, path: &str) -> Result<RouteOutcome, ShellError> {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let _transition = self.transition.lock().await;

        let path = base_path(path).to_string();
        info!(%path, "loading route");

        match self.install(&path, token).await? {
            Install::Done => Ok(RouteOutcome::Loaded(path)),
            Install::Superseded => Ok(RouteOutcome::Superseded),
            Install::Abandoned => Ok(RouteOutcome::Abandoned(path)),
            Install::NotFound => {
                let target = self.routes.not_found().to_string();
                if path == target {
                    error!(%path, "not-found route could not be rendered");
                    return Ok(RouteOutcome::Abandoned(path));
                }

                self.cleanup_previous_route();
                self.host.set_location_hash(&target);
                self.remember_request(&target);

                match self.install(&target, token).await? {
                    Install::Done => Ok(RouteOutcome::Redirected {
                        from: path,
                        to: target,
                    }),
                    Install::Superseded => Ok(RouteOutcome::Superseded),
                    Install::NotFound | Install::Abandoned => {
                        error!(path = %target, "not-found route could not be rendered");
                        Ok(RouteOutcome::Abandoned(target))
                    }
                }
            }
        }
    }

    async fn install(&self, path: &str, token: u64) -> Result<Install, ShellError> {
        if self.is_stale(token) {
            return Ok(Install::Superseded);
        }

        let Some(entry) = self.routes.resolve(path) else {
            if path == self.routes.not_found() {
                return Err(ShellError::Configuration(format!(
                    "not-found route {path} is not mapped"
                )));
            }
            warn!(%path, "route not found");
            return Ok(Install::NotFound);
        };
        let entry = entry.clone();

        let previous = self.host.content_markup().filter(|m| !m.is_empty());
        self.lock_nav().previous_markup = previous;

        let html = match self.assets.fetch_text(&entry.fragment).await {
            Ok(html) => html,
            Err(e) => {
                if e.is_resource_not_found() {
                    warn!(%path, error = %e, "route fragment unavailable");
                } else {
                    error!(%path, error = %e, "route loading failed");
                }
                return Ok(Install::NotFound);
            }
        };

        if self.is_stale(token) {
            debug!(%path, "transition superseded, dropping fragment");
            return Ok(Install::Superseded);
        }

        if let Err(e) = self.host.set_content_markup(&html) {
            error!(%path, error = %e, "no content region to inject into");
            return Ok(Install::Abandoned);
        }
        self.host.set_title(&entry.title);

        self.swap_script(path);

        self.header.load().await;

        if self.is_stale(token) {
            debug!(%path, "transition superseded after header refresh");
            return Ok(Install::Superseded);
        }

        self.lock_nav().current = Some(path.to_string());
        self.bus.publish(ShellEvent::RouteLoaded(path.to_string()));
        Ok(Install::Done)
    }

    fn swap_script(&self, path: &str) {
        let previous = self.lock_nav().script.take();
        if let Some(handle) = previous {
            self.host.detach_script(handle);
        }

        let src = script_for(path);
        match self.host.attach_script(&src) {
            Ok(handle) => self.lock_nav().script = Some(handle),
            Err(e) => error!(%path, error = %e, "failed to load page script"),
        }
    }

    /// cleanup_previous_route
    ///
    /// Cancels the page's pending task, disposes the open modal and its backdrop,
    /// replaces the content region with a listener-free clone when a previous page was
    /// rendered, and resets every form.
    /// Idempotent: with nothing to clean up it only re-resets the forms.
    pub fn cleanup_previous_route(&self) {
        let (task, modal, had_previous) = {
            let mut nav = self.lock_nav();
            (
                nav.page_task.take(),
                nav.modal.take(),
                nav.previous_markup.take().is_some(),
            )
        };

        if let Some(task) = task {
            task.abort();
        }

        if let Some(modal) = modal {
            self.host.dispose_modal(&modal);
            self.host.remove_backdrop();
        }

        if had_previous {
            self.host.replace_content_region();
        }

        self.host.reset_forms();
    }

    /// Shows `modal` and takes ownership of it. A modal already open is disposed first,
    /// so at most one is ever tracked.
    pub fn open_modal(&self, modal: ModalHandle) -> Result<(), ShellError> {
        self.close_modal();
        self.host.show_modal(&modal)?;
        self.lock_nav().modal = Some(modal);
        Ok(())
    }

    pub fn close_modal(&self) {
        let previous = self.lock_nav().modal.take();
        if let Some(modal) = previous {
            self.host.dispose_modal(&modal);
            self.host.remove_backdrop();
        }
    }

    /// Hands a page-owned background task to the router. It is aborted on the next
    /// teardown; a task already tracked is aborted first.
    pub fn track_page_task(&self, task: JoinHandle<()>) {
        let previous = self.lock_nav().page_task.replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn has_page_task(&self) -> bool {
        self.lock_nav()
            .page_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn current_route(&self) -> Option<String> {
        self.lock_nav().current.clone()
    }

    pub fn open_modal_id(&self) -> Option<String> {
        self.lock_nav().modal.as_ref().map(|m| m.id().to_string())
    }

    pub fn has_script(&self) -> bool {
        self.lock_nav().script.is_some()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    fn is_stale(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) != token
    }

    fn remember_request(&self, path: &str) {
        self.lock_nav().requested = Some(base_path(path).to_string());
    }

    fn lock_nav(&self) -> MutexGuard<'_, NavigationState> {
        self.nav.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
