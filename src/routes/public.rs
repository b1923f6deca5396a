use super::RouteEntry;

/// Public Route Module
///
/// Pages that render for anonymous and logged-in visitors alike. The login page is
/// public; it redirects home by itself when a session already exists.
pub fn public_routes() -> Vec<(String, RouteEntry)> {
    [
        ("/", "home", "Home Page"),
        ("/home", "home", "Home Page"),
        ("/about", "about", "About Page"),
        ("/opportunities", "opportunities", "Volunteer Opportunities"),
        ("/events", "events", "Events Page"),
        ("/contact", "contact", "Contact"),
        ("/news", "news", "News Page"),
        ("/gallery", "gallery", "Gallery"),
        ("/login", "login", "Login Page"),
        ("/register", "register", "Register"),
        ("/privacy-policy", "privacy-policy", "Privacy Policy"),
        ("/terms-of-service", "terms-of-service", "Terms-of-Service"),
        ("/404", "404", "Page Not Found"),
    ]
    .into_iter()
    .map(|(path, page, title)| (path.to_string(), RouteEntry::page(page, title)))
    .collect()
}
