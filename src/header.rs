use tracing::{error, info, warn};

use crate::{
    assets::AssetState,
    dom::{HostState, LoginAffordance},
    routes::normalize,
    session::SessionService,
};

pub const HEADER_FRAGMENT: &str = "views/components/header.html";
pub const FOOTER_FRAGMENT: &str = "views/components/footer.html";

/// HeaderView
///
/// The shared navigation chrome. Reads session state only through `SessionService`, so
/// it can never disagree with the guard about whether someone is logged in.
#[derive(Clone)]
pub struct HeaderView {
    host: HostState,
    assets: AssetState,
    session: SessionService,
}

impl HeaderView {
    pub fn new(host: HostState, assets: AssetState, session: SessionService) -> Self {
        Self {
            host,
            assets,
            session,
        }
    }

    /// load
    ///
    /// Fetches and injects the header fragment, marks the active nav link and renders the
    /// login affordance. A failed fetch keeps the existing header markup but still
    /// re-renders the affordance, so the nav never shows stale session state.
    pub async fn load(&self) -> Option<LoginAffordance> {
        info!("loading header");
        match self.assets.fetch_text(HEADER_FRAGMENT).await {
            Ok(html) => {
                if let Err(e) = self.host.set_header_markup(&html) {
                    error!(error = %e, "failed to locate header in the page");
                }
            }
            Err(e) => error!(error = %e, "unable to load header"),
        }
        self.update_active_nav();
        self.check_login()
    }

    pub fn update_active_nav(&self) {
        let current = normalize(&self.host.location_hash());
        self.host.mark_active_nav(&current);
    }

    /// check_login
    ///
    /// Renders `Logout` (with the welcome message) when a session exists, `Login`
    /// otherwise, and returns what was rendered. A page without the login target is
    /// logged and skipped. A corrupt record is discarded and the page reloaded.
    pub fn check_login(&self) -> Option<LoginAffordance> {
        let affordance = match self.session.current() {
            Ok(Some(record)) => LoginAffordance::Logout {
                display_name: record.display_name,
            },
            Ok(None) => LoginAffordance::Login,
            Err(e) => {
                error!(error = %e, "session parsing failed");
                self.session.clear();
                self.host.reload();
                return None;
            }
        };

        match self.host.render_login_affordance(&affordance) {
            Ok(()) => Some(affordance),
            Err(e) => {
                warn!(error = %e, "login nav element not found, skipping check_login");
                None
            }
        }
    }

    /// Logout handler: clears the record and reloads the header. Navigating home is the
    /// caller's job, since the header does not own the router.
    pub async fn logout(&self) -> Option<LoginAffordance> {
        self.session.end();
        self.load().await
    }
}

/// load_footer
///
/// One-shot footer injection at bootstrap. Failures are logged only.
pub async fn load_footer(host: &HostState, assets: &AssetState) {
    match assets.fetch_text(FOOTER_FRAGMENT).await {
        Ok(html) => {
            if let Err(e) = host.set_footer_markup(&html) {
                error!(error = %e, "failed to locate the footer in the page");
            }
        }
        Err(e) => error!(error = %e, "failed to load footer"),
    }
}
