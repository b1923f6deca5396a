//! Application bootstrap and event loop.
//!
//! `App` wires the shell together once: session store, route table, header, router,
//! guard and the controller dispatch table. Shell notifications (`RouteLoaded`,
//! `SessionExpired`) are drained from the bus after every step, so a test can drive the
//! whole shell one UI event at a time without spawning anything.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::{
    assets::AssetState,
    auth::{AuthGuard, Credentials},
    bus::{EventBus, ShellEvent},
    dom::HostState,
    error::ShellError,
    header::{HeaderView, load_footer},
    pages::{
        ContactForm, ContactPage, DispatchOutcome, Dispatcher, EventDraft, EventPlanningPage,
        EventsPage, GalleryPage, HomePage, LoginPage, NewsPage, OpportunitiesPage, PageContext,
        SignupForm, StatisticsPage,
    },
    router::Router,
    routes::{HOME_PATH, LOGIN_PATH, ROOT_PATH, RouteTable, normalize},
    session::{DEFAULT_SESSION_TIMEOUT, SessionService},
    storage::TabStorageState,
};

/// Input coming from the page: user gestures and location changes.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Mouse movement, key press or click anywhere in the document.
    Activity,
    /// The location fragment changed (back/forward or a plain link).
    LocationChanged(String),
    Navigate(String),
    LogoutClicked,
    AboutUsClicked,
    LoginSubmitted(Credentials),
    LoginCancelled,
    EventCategorySelected(String),
    SignupOpened,
    SignupSubmitted(SignupForm),
    ContactSubmitted(ContactForm),
    PlannedEventSubmitted(EventDraft),
}

/// A controller run triggered by a `RouteLoaded` notification.
pub type Dispatched = (String, DispatchOutcome);

struct Pages {
    home: Arc<HomePage>,
    login: Arc<LoginPage>,
    events: Arc<EventsPage>,
    opportunities: Arc<OpportunitiesPage>,
    contact: Arc<ContactPage>,
    planning: Arc<EventPlanningPage>,
}

/// App
///
/// Single owner of the shell's components.
pub struct App {
    ctx: PageContext,
    guard: AuthGuard,
    dispatcher: Dispatcher,
    pages: Pages,
    events: broadcast::Receiver<ShellEvent>,
}

impl App {
    /// new
    ///
    /// The standard route table and the 15-minute inactivity window.
    pub fn new(
        host: HostState,
        assets: AssetState,
        storage: TabStorageState,
    ) -> Result<Self, ShellError> {
        Ok(Self::with_routes(
            host,
            assets,
            storage,
            DEFAULT_SESSION_TIMEOUT,
            RouteTable::standard()?,
        ))
    }

    pub fn with_routes(
        host: HostState,
        assets: AssetState,
        storage: TabStorageState,
        session_timeout: Duration,
        routes: RouteTable,
    ) -> Self {
        let bus = EventBus::new();
        // Subscribe before anything can publish.
        let events = bus.subscribe();

        let routes = Arc::new(routes);
        let session = SessionService::new(storage, bus.clone(), session_timeout);
        let header = HeaderView::new(host.clone(), assets.clone(), session.clone());
        let router = Arc::new(Router::new(
            routes.clone(),
            host.clone(),
            assets.clone(),
            header.clone(),
            bus,
        ));
        let guard = AuthGuard::new(session.clone(), routes);

        let pages = Pages {
            home: Arc::new(HomePage),
            login: Arc::new(LoginPage),
            events: Arc::new(EventsPage::default()),
            opportunities: Arc::new(OpportunitiesPage::default()),
            contact: Arc::new(ContactPage),
            planning: Arc::new(EventPlanningPage::default()),
        };

        let mut dispatcher = Dispatcher::new(guard.clone());
        dispatcher.register(ROOT_PATH, pages.home.clone());
        dispatcher.register(HOME_PATH, pages.home.clone());
        dispatcher.register(LOGIN_PATH, pages.login.clone());
        dispatcher.register("/events", pages.events.clone());
        dispatcher.register("/opportunities", pages.opportunities.clone());
        dispatcher.register("/contact", pages.contact.clone());
        dispatcher.register("/event-planning", pages.planning.clone());
        dispatcher.register("/news", Arc::new(NewsPage));
        dispatcher.register("/gallery", Arc::new(GalleryPage));
        dispatcher.register("/statistics", Arc::new(StatisticsPage));

        Self {
            ctx: PageContext {
                host,
                assets,
                session,
                header,
                router,
            },
            guard,
            dispatcher,
            pages,
            events,
        }
    }

    /// start
    ///
    /// Bootstrap: header, footer, guard check on the initial path, then the initial route.
    /// A denied initial path is not loaded; the resulting `SessionExpired` sends the user
    /// to the login page instead.
    pub async fn start(&mut self) -> Result<Vec<Dispatched>, ShellError> {
        info!("initializing shell");
        self.ctx.header.load().await;
        load_footer(&self.ctx.host, &self.ctx.assets).await;

        let initial = normalize(&self.ctx.host.location_hash());
        match self.guard.check(&initial) {
            Ok(()) => {
                self.ctx.router.start().await?;
            }
            Err(e) => warn!(error = %e, "initial route denied"),
        }
        self.pump().await
    }

    /// pump
    ///
    /// Drains pending shell notifications, including any published while handling them.
    pub async fn pump(&mut self) -> Result<Vec<Dispatched>, ShellError> {
        let mut dispatched = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if let Some(run) = self.handle_shell_event(event).await? {
                        dispatched.push(run);
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return Ok(dispatched),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "shell event receiver lagged");
                }
                Err(broadcast::error::TryRecvError::Closed) => return Ok(dispatched),
            }
        }
    }

    async fn handle_shell_event(
        &mut self,
        event: ShellEvent,
    ) -> Result<Option<Dispatched>, ShellError> {
        match event {
            ShellEvent::RouteLoaded(path) => {
                if self.ctx.router.current_route().as_deref() != Some(path.as_str()) {
                    debug!(%path, "route already replaced, skipping page logic");
                    return Ok(None);
                }
                let outcome = self.dispatcher.dispatch(&self.ctx, &path).await;
                Ok(Some((path, outcome)))
            }
            ShellEvent::SessionExpired => {
                if self.ctx.router.current_route().as_deref() == Some(LOGIN_PATH) {
                    debug!("session expired while on the login page");
                    return Ok(None);
                }
                info!("session expired, redirecting to login");
                self.ctx.router.navigate(LOGIN_PATH).await?;
                Ok(None)
            }
        }
    }

    /// handle_ui
    ///
    /// Applies one page event and then drains the notifications it caused.
    pub async fn handle_ui(&mut self, event: UiEvent) -> Result<Vec<Dispatched>, ShellError> {
        self.apply_ui(event).await?;
        self.pump().await
    }

    async fn apply_ui(&mut self, event: UiEvent) -> Result<(), ShellError> {
        let ctx = &self.ctx;
        match event {
            UiEvent::Activity => ctx.session.touch(),
            UiEvent::LocationChanged(hash) => {
                ctx.router.handle_location_change(&hash).await?;
            }
            UiEvent::Navigate(path) => {
                ctx.router.navigate(&path).await?;
            }
            UiEvent::LogoutClicked => {
                info!("user logged out");
                ctx.header.logout().await;
                ctx.router.navigate(HOME_PATH).await?;
            }
            UiEvent::AboutUsClicked => {
                self.pages.home.show_about(ctx).await?;
            }
            UiEvent::LoginSubmitted(credentials) => {
                self.pages.login.submit(ctx, &credentials).await?;
            }
            UiEvent::LoginCancelled => {
                self.pages.login.cancel(ctx).await?;
            }
            UiEvent::EventCategorySelected(category) => {
                self.pages.events.select_category(ctx, &category)?;
            }
            UiEvent::SignupOpened => self.pages.opportunities.open_signup(ctx)?,
            UiEvent::SignupSubmitted(form) => {
                self.pages.opportunities.submit_signup(ctx, &form)?;
            }
            UiEvent::ContactSubmitted(form) => {
                self.pages.contact.submit(ctx, &form)?;
            }
            UiEvent::PlannedEventSubmitted(draft) => {
                self.pages.planning.add_event(ctx, &draft)?;
            }
        }
        Ok(())
    }

    /// run
    ///
    /// Long-running loop: bootstraps, then serves page events from `ui` and shell
    /// notifications raised in the background (timer expiry) until `ui` closes. Failures
    /// while handling one event are logged and the loop continues.
    pub async fn run(&mut self, mut ui: mpsc::Receiver<UiEvent>) -> Result<(), ShellError> {
        self.start().await?;

        enum Next {
            Ui(Option<UiEvent>),
            Shell(Result<ShellEvent, broadcast::error::RecvError>),
        }

        loop {
            let next = tokio::select! {
                event = ui.recv() => Next::Ui(event),
                event = self.events.recv() => Next::Shell(event),
            };

            let result = match next {
                Next::Ui(Some(event)) => self.handle_ui(event).await.map(|_| ()),
                Next::Ui(None) => {
                    info!("page event channel closed, stopping shell");
                    return Ok(());
                }
                Next::Shell(Ok(event)) => match self.handle_shell_event(event).await {
                    Ok(_) => self.pump().await.map(|_| ()),
                    Err(e) => Err(e),
                },
                Next::Shell(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    warn!(skipped, "shell event receiver lagged");
                    Ok(())
                }
                Next::Shell(Err(broadcast::error::RecvError::Closed)) => return Ok(()),
            };

            if let Err(e) = result {
                error!(error = %e, "failed to handle event");
            }
        }
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn session(&self) -> &SessionService {
        &self.ctx.session
    }

    pub fn router(&self) -> &Router {
        &self.ctx.router
    }

    pub fn planned_events(&self) -> Vec<crate::models::EventItem> {
        self.pages.planning.events()
    }
}
