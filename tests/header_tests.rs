use portal_shell::{
    assets::{AssetState, MockAssetClient},
    bus::EventBus,
    dom::{HostState, LoginAffordance, MemoryPage},
    header::{FOOTER_FRAGMENT, HEADER_FRAGMENT, HeaderView, load_footer},
    models::SessionRecord,
    session::{SESSION_KEY, SessionService},
    storage::{MemoryTabStorage, TabStorage},
};
use std::sync::Arc;
use std::time::Duration;

const HEADER: &str = include_str!("../public/views/components/header.html");
const FOOTER: &str = include_str!("../public/views/components/footer.html");

fn header_with(
    page: MemoryPage,
    assets: MockAssetClient,
    storage: MemoryTabStorage,
) -> (HeaderView, Arc<MemoryPage>, SessionService, Arc<MemoryTabStorage>) {
    let page = Arc::new(page);
    let storage = Arc::new(storage);
    let session = SessionService::new(storage.clone(), EventBus::new(), Duration::from_secs(900));
    let header = HeaderView::new(
        page.clone() as HostState,
        Arc::new(assets) as AssetState,
        session.clone(),
    );
    (header, page, session, storage)
}

fn site() -> MockAssetClient {
    MockAssetClient::new()
        .with_text(HEADER_FRAGMENT, HEADER)
        .with_text(FOOTER_FRAGMENT, FOOTER)
}

#[tokio::test]
async fn test_logged_out_header_shows_login() {
    let (header, page, _, _) = header_with(MemoryPage::new(), site(), MemoryTabStorage::new());

    let affordance = header.load().await;

    assert_eq!(affordance, Some(LoginAffordance::Login));
    assert_eq!(page.affordance(), Some(LoginAffordance::Login));
    assert_eq!(LoginAffordance::Login.href(), "#/login");
    assert!(page.header().unwrap().contains("Volunteer Connect"));
}

#[tokio::test]
async fn test_login_then_logout_round_trip() {
    let (header, page, session, storage) =
        header_with(MemoryPage::new(), site(), MemoryTabStorage::new());
    session
        .begin(&SessionRecord::new("Jane Volunteer", "jane@example.com", "jane").unwrap())
        .unwrap();

    let affordance = header.load().await.unwrap();
    assert_eq!(affordance.label(), "Logout");
    assert_eq!(
        affordance.welcome_message().as_deref(),
        Some("Welcome, Jane Volunteer")
    );
    assert_eq!(page.affordance(), Some(affordance));

    let after = header.logout().await;

    assert_eq!(after, Some(LoginAffordance::Login));
    assert_eq!(storage.get_item(SESSION_KEY), None);
    assert!(!session.timer_armed());
}

#[tokio::test]
async fn test_affordance_follows_session_for_any_display_name() {
    let (header, page, session, _) =
        header_with(MemoryPage::new(), site(), MemoryTabStorage::new());

    for name in ["Jo", "Zoë Ö'Brien", "<b>Admin</b>", "x"] {
        session
            .begin(&SessionRecord::new(name, "someone@example.com", "someone").unwrap())
            .unwrap();
        assert_eq!(
            header.load().await,
            Some(LoginAffordance::Logout {
                display_name: name.to_string()
            })
        );

        session.clear();
        assert_eq!(header.load().await, Some(LoginAffordance::Login));
        assert_eq!(page.affordance(), Some(LoginAffordance::Login));
    }
}

#[tokio::test]
async fn test_missing_login_target_is_skipped() {
    let assets = MockAssetClient::new().with_text(HEADER_FRAGMENT, "<nav>No login here</nav>");
    let (header, page, _, _) = header_with(MemoryPage::new(), assets, MemoryTabStorage::new());

    assert_eq!(header.load().await, None);
    assert_eq!(page.affordance(), None);
    assert_eq!(page.reload_count(), 0);
}

#[tokio::test]
async fn test_failed_header_fetch_keeps_markup_and_still_checks_login() {
    let assets = MockAssetClient::new().with_status(HEADER_FRAGMENT, 500);
    let (header, page, _, _) = header_with(MemoryPage::new(), assets, MemoryTabStorage::new());

    // A fresh page has an empty header, so there is nothing to render into.
    assert_eq!(header.load().await, None);
    assert_eq!(page.header().as_deref(), Some(""));
}

#[tokio::test]
async fn test_corrupt_record_is_cleared_and_page_reloaded() {
    let (header, page, _, storage) = header_with(
        MemoryPage::new(),
        site(),
        MemoryTabStorage::with_item(SESSION_KEY, "not-json"),
    );

    assert_eq!(header.load().await, None);
    assert_eq!(storage.get_item(SESSION_KEY), None);
    assert_eq!(page.reload_count(), 1);
}

#[tokio::test]
async fn test_active_nav_follows_location() {
    let (header, page, _, _) =
        header_with(MemoryPage::new().at("/events"), site(), MemoryTabStorage::new());

    header.load().await;

    assert_eq!(page.active_nav().as_deref(), Some("/events"));
}

#[tokio::test]
async fn test_footer_loaded_once_and_failure_tolerated() {
    let page = Arc::new(MemoryPage::new());
    let host = page.clone() as HostState;

    let assets = Arc::new(site()) as AssetState;
    load_footer(&host, &assets).await;
    assert!(page.footer().unwrap().contains("Privacy Policy"));

    let failing = Arc::new(MockAssetClient::new()) as AssetState;
    let bare = Arc::new(MemoryPage::new());
    load_footer(&(bare.clone() as HostState), &failing).await;
    assert_eq!(bare.footer().as_deref(), Some(""));
}
