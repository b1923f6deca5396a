use super::RouteEntry;

/// Protected Route Module
///
/// Pages that require a session record. The guard is consulted before the page
/// controller runs; without a session the page is never rendered.
pub fn protected_routes() -> Vec<(String, RouteEntry)> {
    vec![
        (
            "/statistics".to_string(),
            RouteEntry::page("statistics", "Visitor Statistics"),
        ),
        (
            "/event-planning".to_string(),
            RouteEntry::page("event-planning", "Event Planning"),
        ),
    ]
}

/// The protected set. `/contact-list` and `/edit` have no page yet but stay guarded,
/// so adding them to the table later cannot expose them.
pub fn protected_paths() -> Vec<String> {
    ["/contact-list", "/edit", "/statistics", "/event-planning"]
        .into_iter()
        .map(String::from)
        .collect()
}
