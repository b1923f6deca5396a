//! Route Table Module Index
//!
//! The route table is assembled from two security-segregated modules, so a protected
//! page can never be registered without also landing in the protected set.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ShellError;

/// Routes anyone may load, with or without a session.
pub mod public;

/// Routes that require an active session record.
pub mod protected;

/// Reserved fallback for unmapped paths and failed fragment fetches.
pub const NOT_FOUND_PATH: &str = "/404";
pub const ROOT_PATH: &str = "/";
pub const HOME_PATH: &str = "/home";
pub const LOGIN_PATH: &str = "/login";
pub const ABOUT_PATH: &str = "/about";

const UNTITLED: &str = "Untitled Page";

/// RouteEntry
///
/// What a path resolves to: the fragment injected into the content region and the
/// document title shown while it is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub fragment: String,
    pub title: String,
}

impl RouteEntry {
    /// Entry for `views/pages/<page>.html`.
    pub fn page(page: &str, title: &str) -> Self {
        Self {
            fragment: format!("views/pages/{page}.html"),
            title: title.to_string(),
        }
    }
}

/// RouteTable
///
/// Static, read-only mapping from path to entry, plus the protected path set.
/// Construction fails if the not-found path itself is unmapped, which is what keeps
/// the not-found redirect from looping.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: BTreeMap<String, RouteEntry>,
    protected: BTreeSet<String>,
}

impl RouteTable {
    pub fn new(
        entries: impl IntoIterator<Item = (String, RouteEntry)>,
        protected: impl IntoIterator<Item = String>,
    ) -> Result<Self, ShellError> {
        let entries: BTreeMap<String, RouteEntry> = entries.into_iter().collect();
        if !entries.contains_key(NOT_FOUND_PATH) {
            return Err(ShellError::Configuration(format!(
                "not-found route {NOT_FOUND_PATH} is not mapped"
            )));
        }
        Ok(Self {
            entries,
            protected: protected.into_iter().collect(),
        })
    }

    /// standard
    ///
    /// The site's full table: public pages merged with protected pages.
    pub fn standard() -> Result<Self, ShellError> {
        let entries = public::public_routes()
            .into_iter()
            .chain(protected::protected_routes());
        Self::new(entries, protected::protected_paths())
    }

    /// Looks up the base path; anything after a `#` inside the path is ignored.
    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        self.entries.get(base_path(path))
    }

    pub fn not_found(&self) -> &str {
        NOT_FOUND_PATH
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.contains(base_path(path))
    }

    pub fn title(&self, path: &str) -> &str {
        self.resolve(path)
            .map(|entry| entry.title.as_str())
            .unwrap_or(UNTITLED)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// base_path
///
/// Strips any trailing `#fragment` from a route path.
pub fn base_path(path: &str) -> &str {
    path.split_once('#').map_or(path, |(base, _)| base)
}

/// normalize
///
/// Turns a location fragment identifier (`#/events`, `/events`, `` or `#`) into a
/// route path. An empty fragment is the root.
pub fn normalize(hash: &str) -> String {
    let path = hash.strip_prefix('#').unwrap_or(hash);
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path.to_string()
    }
}

/// script_for
///
/// Page-script resource by naming convention: `js/<path without slash>.js`.
/// The root path shares the home page's script.
pub fn script_for(path: &str) -> String {
    let name = base_path(path).trim_start_matches('/');
    let name = if name.is_empty() { "home" } else { name };
    format!("js/{name}.js")
}
