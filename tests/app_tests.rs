use portal_shell::{
    App, UiEvent,
    assets::{AssetState, MockAssetClient},
    auth::Credentials,
    dom::{HostState, LoginAffordance, MemoryPage},
    pages::{
        ContactForm, DispatchOutcome, EventDraft, SignupForm,
        contact::CONTACT_CONFIRMED,
        login::INVALID_CREDENTIALS,
        news::{NEWS_FAILED, NO_NEWS},
        opportunities::{FIELDS_REQUIRED, SIGNUP_CONFIRMED},
    },
    session::SESSION_KEY,
    storage::{MemoryTabStorage, TabStorage},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const LOGGED_IN: &str =
    r#"{"DisplayName":"Admin User","EmailAddress":"admin@example.com","Username":"admin"}"#;

const NEWS: &str = r#"{"articles":[
    {"title":"One","description":"First","url":"https://news.example/1","publishedAt":"2025-02-01T10:00:00Z"},
    {"title":"Two","description":null,"url":"https://news.example/2","publishedAt":"2025-02-02T10:00:00Z"},
    {"title":"Three","url":"https://news.example/3","publishedAt":"2025-02-03T10:00:00Z"},
    {"title":"Four","description":"Fourth","url":"https://news.example/4","publishedAt":"2025-02-04T10:00:00Z"},
    {"title":"Five","description":"Fifth","url":"https://news.example/5","publishedAt":"2025-02-05T10:00:00Z"},
    {"title":"Six","description":"Sixth","url":"https://news.example/6","publishedAt":"2025-02-06T10:00:00Z"}
]}"#;

// --- Test Utilities ---

fn site() -> MockAssetClient {
    MockAssetClient::new()
        .with_text(
            "views/components/header.html",
            include_str!("../public/views/components/header.html"),
        )
        .with_text(
            "views/components/footer.html",
            include_str!("../public/views/components/footer.html"),
        )
        .with_text("views/pages/home.html", include_str!("../public/views/pages/home.html"))
        .with_text("views/pages/about.html", include_str!("../public/views/pages/about.html"))
        .with_text(
            "views/pages/opportunities.html",
            include_str!("../public/views/pages/opportunities.html"),
        )
        .with_text("views/pages/events.html", include_str!("../public/views/pages/events.html"))
        .with_text("views/pages/contact.html", include_str!("../public/views/pages/contact.html"))
        .with_text("views/pages/news.html", include_str!("../public/views/pages/news.html"))
        .with_text("views/pages/gallery.html", include_str!("../public/views/pages/gallery.html"))
        .with_text("views/pages/login.html", include_str!("../public/views/pages/login.html"))
        .with_text(
            "views/pages/statistics.html",
            include_str!("../public/views/pages/statistics.html"),
        )
        .with_text(
            "views/pages/event-planning.html",
            include_str!("../public/views/pages/event-planning.html"),
        )
        .with_text("views/pages/404.html", include_str!("../public/views/pages/404.html"))
        .with_text("data/users.json", include_str!("../public/data/users.json"))
        .with_text("data/events.json", include_str!("../public/data/events.json"))
        .with_text("data/gallery.json", include_str!("../public/data/gallery.json"))
        .with_text("data/statistics.json", include_str!("../public/data/statistics.json"))
        .with_text("api/news", NEWS)
}

struct Harness {
    app: App,
    page: Arc<MemoryPage>,
    assets: Arc<MockAssetClient>,
    storage: Arc<MemoryTabStorage>,
}

fn harness(page: MemoryPage, assets: MockAssetClient, storage: MemoryTabStorage) -> Harness {
    let page = Arc::new(page);
    let assets = Arc::new(assets);
    let storage = Arc::new(storage);
    let app = App::new(
        page.clone() as HostState,
        assets.clone() as AssetState,
        storage.clone(),
    )
    .unwrap();
    Harness {
        app,
        page,
        assets,
        storage,
    }
}

fn dispatched(path: &str, outcome: DispatchOutcome) -> (String, DispatchOutcome) {
    (path.to_string(), outcome)
}

// --- Bootstrap ---

#[tokio::test]
async fn test_bootstrap_loads_chrome_and_initial_route() {
    let mut h = harness(MemoryPage::new(), site(), MemoryTabStorage::new());

    let runs = h.app.start().await.unwrap();

    assert_eq!(runs, vec![dispatched("/", DispatchOutcome::Rendered)]);
    assert!(h.page.footer().unwrap().contains("Privacy Policy"));
    assert_eq!(h.page.affordance(), Some(LoginAffordance::Login));
    assert_eq!(h.page.title(), "Home Page");
    assert_eq!(h.page.scripts(), vec!["js/home.js"]);
}

#[tokio::test]
async fn test_protected_initial_route_goes_to_login() {
    let mut h = harness(
        MemoryPage::new().at("/statistics"),
        site(),
        MemoryTabStorage::new(),
    );

    let runs = h.app.start().await.unwrap();

    assert_eq!(runs, vec![dispatched("/login", DispatchOutcome::Rendered)]);
    assert_eq!(h.page.location(), "/login");
    assert_eq!(h.assets.request_count("views/pages/statistics.html"), 0);
    assert_eq!(h.assets.request_count("data/statistics.json"), 0);
}

#[tokio::test]
async fn test_protected_navigation_is_denied_then_redirected() {
    let mut h = harness(MemoryPage::new().at("/home"), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();

    let runs = h
        .app
        .handle_ui(UiEvent::Navigate("/statistics".to_string()))
        .await
        .unwrap();

    assert_eq!(
        runs,
        vec![
            dispatched("/statistics", DispatchOutcome::Denied),
            dispatched("/login", DispatchOutcome::Rendered),
        ]
    );
    assert_eq!(h.page.location(), "/login");
    assert_eq!(h.page.region("visitorChart"), None);
    assert_eq!(h.assets.request_count("data/statistics.json"), 0);
}

#[tokio::test]
async fn test_unknown_route_shows_not_found() {
    let mut h = harness(MemoryPage::new().at("/does-not-exist"), site(), MemoryTabStorage::new());

    let runs = h.app.start().await.unwrap();

    assert_eq!(runs, vec![dispatched("/404", DispatchOutcome::Unhandled)]);
    assert_eq!(h.page.title(), "Page Not Found");
}

#[tokio::test]
async fn test_unknown_route_keeps_session_in_header() {
    let mut h = harness(
        MemoryPage::new().at("/nope"),
        site(),
        MemoryTabStorage::with_item(SESSION_KEY, LOGGED_IN),
    );

    let runs = h.app.start().await.unwrap();

    assert_eq!(runs, vec![dispatched("/404", DispatchOutcome::Unhandled)]);
    assert_eq!(h.page.location(), "/404");
    assert_eq!(
        h.page.affordance(),
        Some(LoginAffordance::Logout {
            display_name: "Admin User".to_string()
        })
    );
    assert!(h.storage.get_item(SESSION_KEY).is_some());
}

#[tokio::test]
async fn test_location_change_loads_route() {
    let mut h = harness(MemoryPage::new(), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();

    let runs = h
        .app
        .handle_ui(UiEvent::LocationChanged("#/about".to_string()))
        .await
        .unwrap();

    assert_eq!(runs, vec![dispatched("/about", DispatchOutcome::Unhandled)]);
    assert_eq!(h.page.title(), "About Page");
}

#[tokio::test]
async fn test_about_button_leads_to_about() {
    let mut h = harness(MemoryPage::new(), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();

    let runs = h.app.handle_ui(UiEvent::AboutUsClicked).await.unwrap();

    assert_eq!(runs, vec![dispatched("/about", DispatchOutcome::Unhandled)]);
    assert_eq!(h.page.location(), "/about");
    assert_eq!(h.page.title(), "About Page");

    // The about page has no such button, so a stray click does nothing.
    let runs = h.app.handle_ui(UiEvent::AboutUsClicked).await.unwrap();
    assert!(runs.is_empty());
    assert_eq!(h.page.location(), "/about");
}

// --- Login Flow ---

#[tokio::test]
async fn test_wrong_password_shows_error_and_stores_nothing() {
    let mut h = harness(MemoryPage::new().at("/login"), site(), MemoryTabStorage::new());
    assert_eq!(
        h.app.start().await.unwrap(),
        vec![dispatched("/login", DispatchOutcome::Rendered)]
    );

    h.app
        .handle_ui(UiEvent::LoginSubmitted(Credentials::new("alice", "wrong")))
        .await
        .unwrap();

    assert_eq!(
        h.page.message("messageArea").as_deref(),
        Some(INVALID_CREDENTIALS)
    );
    assert_eq!(h.page.focused().as_deref(), Some("username"));
    assert_eq!(h.storage.get_item(SESSION_KEY), None);
    assert_eq!(h.page.location(), "/login");
}

#[tokio::test]
async fn test_successful_login_opens_protected_pages() {
    let mut h = harness(MemoryPage::new().at("/login"), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();

    let runs = h
        .app
        .handle_ui(UiEvent::LoginSubmitted(Credentials::new(" admin ", "password")))
        .await
        .unwrap();

    assert_eq!(runs, vec![dispatched("/home", DispatchOutcome::Rendered)]);
    let raw = h.storage.get_item(SESSION_KEY).unwrap();
    assert!(raw.contains("Admin User"));
    assert!(!raw.contains("Password"));
    assert_eq!(h.page.location(), "/home");
    assert_eq!(
        h.page.affordance(),
        Some(LoginAffordance::Logout {
            display_name: "Admin User".to_string()
        })
    );
    assert!(h.app.session().timer_armed());

    let runs = h
        .app
        .handle_ui(UiEvent::Navigate("/statistics".to_string()))
        .await
        .unwrap();

    assert_eq!(runs, vec![dispatched("/statistics", DispatchOutcome::Rendered)]);
    assert!(h.page.region("visitorChart").unwrap().contains(r#""type":"line""#));
    assert!(
        h.page
            .region("engagementChart")
            .unwrap()
            .contains(r#""type":"doughnut""#)
    );
}

#[tokio::test]
async fn test_login_page_redirects_when_already_logged_in() {
    let mut h = harness(
        MemoryPage::new().at("/login"),
        site(),
        MemoryTabStorage::with_item(SESSION_KEY, LOGGED_IN),
    );

    let runs = h.app.start().await.unwrap();

    assert_eq!(
        runs,
        vec![
            dispatched("/login", DispatchOutcome::Rendered),
            dispatched("/home", DispatchOutcome::Rendered),
        ]
    );
    assert_eq!(h.page.location(), "/home");
}

#[tokio::test]
async fn test_login_cancel_goes_to_root() {
    let mut h = harness(MemoryPage::new().at("/login"), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();

    h.app.handle_ui(UiEvent::LoginCancelled).await.unwrap();

    assert_eq!(h.page.location(), "/");
}

#[tokio::test]
async fn test_user_list_unavailable() {
    let assets = site().with_status("data/users.json", 503);
    let mut h = harness(MemoryPage::new().at("/login"), assets, MemoryTabStorage::new());
    h.app.start().await.unwrap();

    h.app
        .handle_ui(UiEvent::LoginSubmitted(Credentials::new("admin", "password")))
        .await
        .unwrap();

    assert!(h.page.message("messageArea").is_some());
    assert_eq!(h.storage.get_item(SESSION_KEY), None);
}

#[tokio::test]
async fn test_logout_clears_session_and_goes_home() {
    let mut h = harness(
        MemoryPage::new().at("/event-planning"),
        site(),
        MemoryTabStorage::with_item(SESSION_KEY, LOGGED_IN),
    );
    h.app.start().await.unwrap();

    h.app.handle_ui(UiEvent::LogoutClicked).await.unwrap();

    assert_eq!(h.storage.get_item(SESSION_KEY), None);
    assert_eq!(h.page.affordance(), Some(LoginAffordance::Login));
    assert_eq!(h.page.location(), "/home");
}

// --- Inactivity ---

#[tokio::test(start_paused = true)]
async fn test_inactivity_returns_to_login() {
    let mut h = harness(
        MemoryPage::new().at("/statistics"),
        site(),
        MemoryTabStorage::with_item(SESSION_KEY, LOGGED_IN),
    );
    h.app.start().await.unwrap();
    assert_eq!(h.page.location(), "/statistics");

    tokio::time::sleep(Duration::from_secs(901)).await;
    h.app.pump().await.unwrap();

    assert_eq!(h.storage.get_item(SESSION_KEY), None);
    assert_eq!(h.page.location(), "/login");
    assert_eq!(h.page.affordance(), Some(LoginAffordance::Login));
}

#[tokio::test(start_paused = true)]
async fn test_activity_keeps_session_alive() {
    let mut h = harness(
        MemoryPage::new().at("/home"),
        site(),
        MemoryTabStorage::with_item(SESSION_KEY, LOGGED_IN),
    );
    h.app.start().await.unwrap();

    tokio::time::sleep(Duration::from_secs(600)).await;
    h.app.handle_ui(UiEvent::Activity).await.unwrap();
    tokio::time::sleep(Duration::from_secs(400)).await;
    h.app.pump().await.unwrap();

    assert!(h.app.session().is_authenticated());
    assert_eq!(h.page.location(), "/home");
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_handles_expiry_and_stops_when_ui_closes() {
    let mut h = harness(
        MemoryPage::new().at("/statistics"),
        site(),
        MemoryTabStorage::with_item(SESSION_KEY, LOGGED_IN),
    );
    let (tx, rx) = mpsc::channel(8);
    let page = h.page.clone();

    let observe = async move {
        tx.send(UiEvent::Activity).await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        let before = page.location();

        tokio::time::sleep(Duration::from_secs(901)).await;
        let after = page.location();

        drop(tx);
        (before, after)
    };

    let (result, (before, after)) = tokio::join!(h.app.run(rx), observe);

    assert_eq!(result, Ok(()));
    assert_eq!(before, "/statistics");
    assert_eq!(after, "/login");
    assert_eq!(h.storage.get_item(SESSION_KEY), None);
    assert_eq!(h.page.affordance(), Some(LoginAffordance::Login));
}

// --- Page Controllers ---

#[tokio::test]
async fn test_events_render_and_filter() {
    let mut h = harness(MemoryPage::new().at("/events"), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();

    let list = h.page.region("event-list").unwrap();
    assert!(list.contains("Community Garden Workshop"));
    assert!(list.contains("Charity Fun Run"));
    assert!(list.contains("River Cleanup"));

    h.app
        .handle_ui(UiEvent::EventCategorySelected("Cleanup".to_string()))
        .await
        .unwrap();

    let list = h.page.region("event-list").unwrap();
    assert!(list.contains("River Cleanup"));
    assert!(!list.contains("Charity Fun Run"));
    assert_eq!(h.assets.request_count("data/events.json"), 1);
}

#[tokio::test]
async fn test_events_failure_leaves_empty_list() {
    let assets = site().with_network_failure("data/events.json");
    let mut h = harness(MemoryPage::new().at("/events"), assets, MemoryTabStorage::new());

    let runs = h.app.start().await.unwrap();

    assert_eq!(runs, vec![dispatched("/events", DispatchOutcome::Rendered)]);
    assert_eq!(h.page.region("event-list").as_deref(), Some(""));
}

#[tokio::test(start_paused = true)]
async fn test_opportunity_signup_flow() {
    let mut h = harness(MemoryPage::new().at("/opportunities"), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();
    assert!(
        h.page
            .region("opportunity-cards")
            .unwrap()
            .contains("Beach Cleanup")
    );

    h.app.handle_ui(UiEvent::SignupOpened).await.unwrap();
    assert_eq!(h.app.router().open_modal_id().as_deref(), Some("signupModal"));

    h.app
        .handle_ui(UiEvent::SignupSubmitted(SignupForm::new("Jane", "", "Helper")))
        .await
        .unwrap();
    assert_eq!(h.page.message("signupError").as_deref(), Some(FIELDS_REQUIRED));
    assert_eq!(h.app.router().open_modal_id().as_deref(), Some("signupModal"));

    h.app
        .handle_ui(UiEvent::SignupSubmitted(SignupForm::new(
            "Jane",
            "jane@example.com",
            "Helper",
        )))
        .await
        .unwrap();
    assert_eq!(
        h.page.message("confirmationMessage").as_deref(),
        Some(SIGNUP_CONFIRMED)
    );
    assert_eq!(h.app.router().open_modal_id(), None);
    assert!(!h.page.has_backdrop());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(h.page.message("confirmationMessage"), None);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_opportunities_cancels_confirmation_hide() {
    let mut h = harness(MemoryPage::new().at("/opportunities"), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();

    h.app.handle_ui(UiEvent::SignupOpened).await.unwrap();
    h.app
        .handle_ui(UiEvent::SignupSubmitted(SignupForm::new(
            "Jane",
            "jane@example.com",
            "Helper",
        )))
        .await
        .unwrap();
    assert!(h.app.router().has_page_task());

    h.app
        .handle_ui(UiEvent::Navigate("/contact".to_string()))
        .await
        .unwrap();
    assert!(!h.app.router().has_page_task());

    h.app
        .handle_ui(UiEvent::ContactSubmitted(ContactForm {
            full_name: "Jane Doe".to_string(),
            contact_number: "555-123-4567".to_string(),
            email_address: "jane@example.com".to_string(),
        }))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2100)).await;

    assert_eq!(
        h.page.message("confirmationMessage").as_deref(),
        Some(CONTACT_CONFIRMED)
    );
}

#[tokio::test]
async fn test_contact_validation() {
    let mut h = harness(MemoryPage::new().at("/contact"), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();

    h.app
        .handle_ui(UiEvent::ContactSubmitted(ContactForm {
            full_name: "Jane Doe".to_string(),
            contact_number: "5551234567".to_string(),
            email_address: "jane@example.com".to_string(),
        }))
        .await
        .unwrap();

    assert_eq!(
        h.page.message("contactNumber_error").as_deref(),
        Some("Contact Number must be in format ###-###-####")
    );
    assert_eq!(h.page.focused().as_deref(), Some("contactNumber"));
    assert_eq!(h.page.message("confirmationMessage"), None);

    h.app
        .handle_ui(UiEvent::ContactSubmitted(ContactForm {
            full_name: "Jane Doe".to_string(),
            contact_number: "555-123-4567".to_string(),
            email_address: "jane@example.com".to_string(),
        }))
        .await
        .unwrap();

    assert_eq!(h.page.message("contactNumber_error"), None);
    assert_eq!(
        h.page.message("confirmationMessage").as_deref(),
        Some(CONTACT_CONFIRMED)
    );
}

#[tokio::test]
async fn test_news_limits_articles() {
    let mut h = harness(MemoryPage::new().at("/news"), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();

    let list = h.page.region("news-list").unwrap();
    assert_eq!(list.matches(r#"class="news-item""#).count(), 5);
    assert!(list.contains("Five"));
    assert!(!list.contains("Six"));
}

#[tokio::test]
async fn test_news_placeholders() {
    let empty = site().with_text("api/news", r#"{"articles":[]}"#);
    let mut h = harness(MemoryPage::new().at("/news"), empty, MemoryTabStorage::new());
    h.app.start().await.unwrap();
    assert!(h.page.region("news-list").unwrap().contains(NO_NEWS));

    let failing = site().with_status("api/news", 503);
    let mut h = harness(MemoryPage::new().at("/news"), failing, MemoryTabStorage::new());
    h.app.start().await.unwrap();
    assert!(h.page.region("news-list").unwrap().contains(NEWS_FAILED));
}

#[tokio::test]
async fn test_gallery_renders_images() {
    let mut h = harness(MemoryPage::new().at("/gallery"), site(), MemoryTabStorage::new());
    h.app.start().await.unwrap();

    let gallery = h.page.region("gallery-container").unwrap();
    assert!(gallery.contains("images/thumbs/trees.jpg"));
    assert!(gallery.contains("Food Bank Drive"));
}

#[tokio::test]
async fn test_event_planning_adds_valid_events_only() {
    let mut h = harness(
        MemoryPage::new().at("/event-planning"),
        site(),
        MemoryTabStorage::with_item(SESSION_KEY, LOGGED_IN),
    );
    let runs = h.app.start().await.unwrap();
    assert_eq!(
        runs,
        vec![dispatched("/event-planning", DispatchOutcome::Rendered)]
    );
    assert_eq!(h.app.planned_events().len(), 3);

    h.app
        .handle_ui(UiEvent::PlannedEventSubmitted(EventDraft {
            title: "Bake Sale".to_string(),
            description: "Cakes for charity".to_string(),
            date: "next friday".to_string(),
            category: "Fundraiser".to_string(),
        }))
        .await
        .unwrap();
    assert!(h.page.message("eventFormError").is_some());
    assert_eq!(h.app.planned_events().len(), 3);

    h.app
        .handle_ui(UiEvent::PlannedEventSubmitted(EventDraft {
            title: "Bake Sale".to_string(),
            description: "Cakes for charity".to_string(),
            date: "2025-05-09".to_string(),
            category: "Fundraiser".to_string(),
        }))
        .await
        .unwrap();
    assert_eq!(h.page.message("eventFormError"), None);
    assert_eq!(h.app.planned_events().len(), 4);
    assert!(h.page.region("eventsList").unwrap().contains("Bake Sale"));
}
