//! The page seam: everything the shell does to the document goes through `PageHost`.
//!
//! `MemoryPage` is a headless document model. It tracks exactly the state the shell
//! cares about (content region, header, page-script slot, modal slot, forms, named
//! regions) and answers "does element `#id` exist" by looking for `id="..."` in the
//! current content markup, the same way a fragment either contains an element or not.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ShellError;

/// Identifies the page script node attached for the current route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptHandle(u64);

/// Identifies an open modal dialog by element id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModalHandle(String);

impl ModalHandle {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// The login/logout control in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAffordance {
    Login,
    Logout { display_name: String },
}

impl LoginAffordance {
    pub fn label(&self) -> &'static str {
        match self {
            LoginAffordance::Login => "Login",
            LoginAffordance::Logout { .. } => "Logout",
        }
    }

    pub fn href(&self) -> &'static str {
        match self {
            LoginAffordance::Login => "#/login",
            LoginAffordance::Logout { .. } => "#",
        }
    }

    pub fn markup(&self) -> String {
        match self {
            LoginAffordance::Login => r#"<i class="fas fa-sign-in-alt"></i> Login"#.to_string(),
            LoginAffordance::Logout { .. } => {
                r#"<i class="fas fa-sign-out-alt"></i> Logout"#.to_string()
            }
        }
    }

    pub fn welcome_message(&self) -> Option<String> {
        match self {
            LoginAffordance::Login => None,
            LoginAffordance::Logout { display_name } => Some(format!("Welcome, {display_name}")),
        }
    }
}

/// PageHost
///
/// The document operations the shell needs. Implementations must be cheap and
/// synchronous; all waiting happens in the asset client.
pub trait PageHost: Send + Sync {
    // --- Location ---

    /// Current fragment identifier without the leading `#`.
    fn location_hash(&self) -> String;
    fn set_location_hash(&self, path: &str);
    /// Full page reload. Used after discarding a corrupt session record.
    fn reload(&self);
    fn set_title(&self, title: &str);

    // --- Shared content region ---

    /// Current content markup, or `None` when the page has no content region.
    fn content_markup(&self) -> Option<String>;
    fn set_content_markup(&self, html: &str) -> Result<(), ShellError>;
    /// Swaps the content region for an empty, listener-free clone.
    fn replace_content_region(&self);

    // --- Page script slot ---

    fn attach_script(&self, src: &str) -> Result<ScriptHandle, ShellError>;
    fn detach_script(&self, handle: ScriptHandle);

    // --- Modals and forms ---

    fn show_modal(&self, modal: &ModalHandle) -> Result<(), ShellError>;
    /// Hides and disposes the modal instance.
    fn dispose_modal(&self, modal: &ModalHandle);
    /// Removes a leftover modal backdrop element if one exists.
    fn remove_backdrop(&self);
    /// Resets every form in the document and hides its `confirmation*` messages.
    fn reset_forms(&self);

    // --- Layout chrome ---

    fn set_header_markup(&self, html: &str) -> Result<(), ShellError>;
    fn set_footer_markup(&self, html: &str) -> Result<(), ShellError>;
    fn mark_active_nav(&self, path: &str);
    fn render_login_affordance(&self, affordance: &LoginAffordance) -> Result<(), ShellError>;

    // --- Elements inside the current fragment ---

    fn has_element(&self, id: &str) -> bool;
    fn set_region_markup(&self, id: &str, html: &str) -> Result<(), ShellError>;
    fn show_message(&self, id: &str, text: &str) -> Result<(), ShellError>;
    fn hide_message(&self, id: &str);
    fn focus_field(&self, id: &str);
}

/// HostState
///
/// The concrete type used to share the page host across the shell.
pub type HostState = Arc<dyn PageHost>;

#[derive(Debug, Default, Clone)]
struct ContentRegion {
    markup: String,
    listeners: usize,
}

#[derive(Debug, Default, Clone)]
struct FormState {
    values: BTreeMap<String, String>,
    confirmation_visible: bool,
}

#[derive(Debug, Default)]
struct PageState {
    location: String,
    title: String,
    reloads: usize,
    content: Option<ContentRegion>,
    header: Option<String>,
    footer: Option<String>,
    affordance: Option<LoginAffordance>,
    active_nav: Option<String>,
    scripts: Vec<(ScriptHandle, String)>,
    next_script: u64,
    refuse_scripts: bool,
    modals: BTreeSet<String>,
    backdrop: bool,
    forms: BTreeMap<String, FormState>,
    regions: BTreeMap<String, String>,
    messages: BTreeMap<String, String>,
    focused: Option<String>,
    journal: Vec<String>,
}

impl PageState {
    fn content_has(&self, id: &str) -> bool {
        self.content
            .as_ref()
            .is_some_and(|c| c.markup.contains(&format!(r#"id="{id}""#)))
    }

    fn record(&mut self, entry: String) {
        self.journal.push(entry);
    }
}

/// MemoryPage
///
/// Headless `PageHost`. A fresh page has an empty content region, an empty header (so
/// no login target until a header fragment containing `id="login"` is loaded) and an
/// empty footer.
pub struct MemoryPage {
    state: Mutex<PageState>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PageState {
                content: Some(ContentRegion::default()),
                header: Some(String::new()),
                footer: Some(String::new()),
                ..PageState::default()
            }),
        }
    }

    /// Starts at `#<path>`.
    pub fn at(self, path: &str) -> Self {
        self.lock().location = path.to_string();
        self
    }

    pub fn without_content_region(self) -> Self {
        self.lock().content = None;
        self
    }

    pub fn without_header(self) -> Self {
        self.lock().header = None;
        self
    }

    /// Every `attach_script` call fails.
    pub fn refusing_scripts(self) -> Self {
        self.lock().refuse_scripts = true;
        self
    }

    // --- Simulated page activity ---

    /// A page script wiring a listener onto the content region.
    pub fn add_content_listener(&self) {
        if let Some(content) = self.lock().content.as_mut() {
            content.listeners += 1;
        }
    }

    pub fn fill_form(&self, form: &str, field: &str, value: &str) {
        self.lock()
            .forms
            .entry(form.to_string())
            .or_default()
            .values
            .insert(field.to_string(), value.to_string());
    }

    pub fn show_form_confirmation(&self, form: &str) {
        self.lock()
            .forms
            .entry(form.to_string())
            .or_default()
            .confirmation_visible = true;
    }

    // --- Inspection ---

    pub fn location(&self) -> String {
        self.lock().location.clone()
    }

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    pub fn reload_count(&self) -> usize {
        self.lock().reloads
    }

    pub fn content(&self) -> Option<String> {
        self.lock().content.as_ref().map(|c| c.markup.clone())
    }

    pub fn content_listeners(&self) -> usize {
        self.lock().content.as_ref().map_or(0, |c| c.listeners)
    }

    pub fn header(&self) -> Option<String> {
        self.lock().header.clone()
    }

    pub fn footer(&self) -> Option<String> {
        self.lock().footer.clone()
    }

    pub fn affordance(&self) -> Option<LoginAffordance> {
        self.lock().affordance.clone()
    }

    pub fn active_nav(&self) -> Option<String> {
        self.lock().active_nav.clone()
    }

    /// Sources of the attached page scripts, in attach order.
    pub fn scripts(&self) -> Vec<String> {
        self.lock().scripts.iter().map(|(_, src)| src.clone()).collect()
    }

    pub fn open_modals(&self) -> Vec<String> {
        self.lock().modals.iter().cloned().collect()
    }

    pub fn has_backdrop(&self) -> bool {
        self.lock().backdrop
    }

    pub fn form_value(&self, form: &str, field: &str) -> Option<String> {
        self.lock()
            .forms
            .get(form)
            .and_then(|f| f.values.get(field).cloned())
    }

    pub fn form_confirmation_visible(&self, form: &str) -> bool {
        self.lock()
            .forms
            .get(form)
            .is_some_and(|f| f.confirmation_visible)
    }

    pub fn region(&self, id: &str) -> Option<String> {
        self.lock().regions.get(id).cloned()
    }

    pub fn message(&self, id: &str) -> Option<String> {
        self.lock().messages.get(id).cloned()
    }

    pub fn focused(&self) -> Option<String> {
        self.lock().focused.clone()
    }

    /// Ordered log of document mutations, e.g. `content`, `script+ js/home.js`, `header`.
    pub fn journal(&self) -> Vec<String> {
        self.lock().journal.clone()
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PageHost for MemoryPage {
    fn location_hash(&self) -> String {
        self.lock().location.clone()
    }

    fn set_location_hash(&self, path: &str) {
        let mut state = self.lock();
        state.location = path.to_string();
        state.record(format!("location {path}"));
    }

    fn reload(&self) {
        let mut state = self.lock();
        state.reloads += 1;
        state.record("reload".to_string());
    }

    fn set_title(&self, title: &str) {
        self.lock().title = title.to_string();
    }

    fn content_markup(&self) -> Option<String> {
        self.content()
    }

    fn set_content_markup(&self, html: &str) -> Result<(), ShellError> {
        let mut state = self.lock();
        let Some(content) = state.content.as_mut() else {
            return Err(ShellError::MissingElement("main".to_string()));
        };
        content.markup = html.to_string();
        state.regions.clear();
        state.messages.clear();
        state.focused = None;
        state.record("content".to_string());
        Ok(())
    }

    fn replace_content_region(&self) {
        let mut state = self.lock();
        if state.content.is_some() {
            state.content = Some(ContentRegion::default());
            state.regions.clear();
            state.messages.clear();
            state.record("content cleared".to_string());
        }
    }

    fn attach_script(&self, src: &str) -> Result<ScriptHandle, ShellError> {
        let mut state = self.lock();
        if state.refuse_scripts {
            return Err(ShellError::ScriptAttach {
                src: src.to_string(),
                message: "document refused the script node".to_string(),
            });
        }
        state.next_script += 1;
        let handle = ScriptHandle(state.next_script);
        state.scripts.push((handle, src.to_string()));
        state.record(format!("script+ {src}"));
        Ok(handle)
    }

    fn detach_script(&self, handle: ScriptHandle) {
        let mut state = self.lock();
        if let Some(index) = state.scripts.iter().position(|(h, _)| *h == handle) {
            let (_, src) = state.scripts.remove(index);
            state.record(format!("script- {src}"));
        }
    }

    fn show_modal(&self, modal: &ModalHandle) -> Result<(), ShellError> {
        let mut state = self.lock();
        if !state.content_has(modal.id()) {
            return Err(ShellError::MissingElement(modal.id().to_string()));
        }
        state.modals.insert(modal.id().to_string());
        state.backdrop = true;
        state.record(format!("modal+ {}", modal.id()));
        Ok(())
    }

    fn dispose_modal(&self, modal: &ModalHandle) {
        let mut state = self.lock();
        if state.modals.remove(modal.id()) {
            state.record(format!("modal- {}", modal.id()));
        }
    }

    fn remove_backdrop(&self) {
        self.lock().backdrop = false;
    }

    fn reset_forms(&self) {
        for form in self.lock().forms.values_mut() {
            form.values.clear();
            form.confirmation_visible = false;
        }
    }

    fn set_header_markup(&self, html: &str) -> Result<(), ShellError> {
        let mut state = self.lock();
        let Some(header) = state.header.as_mut() else {
            return Err(ShellError::MissingElement("header".to_string()));
        };
        *header = html.to_string();
        state.affordance = None;
        state.record("header".to_string());
        Ok(())
    }

    fn set_footer_markup(&self, html: &str) -> Result<(), ShellError> {
        let mut state = self.lock();
        let Some(footer) = state.footer.as_mut() else {
            return Err(ShellError::MissingElement("footer".to_string()));
        };
        *footer = html.to_string();
        Ok(())
    }

    fn mark_active_nav(&self, path: &str) {
        self.lock().active_nav = Some(path.to_string());
    }

    fn render_login_affordance(&self, affordance: &LoginAffordance) -> Result<(), ShellError> {
        let mut state = self.lock();
        let has_target = state
            .header
            .as_ref()
            .is_some_and(|h| h.contains(r#"id="login""#));
        if !has_target {
            return Err(ShellError::MissingElement("login".to_string()));
        }
        state.affordance = Some(affordance.clone());
        state.record(format!("login {}", affordance.label()));
        Ok(())
    }

    fn has_element(&self, id: &str) -> bool {
        self.lock().content_has(id)
    }

    fn set_region_markup(&self, id: &str, html: &str) -> Result<(), ShellError> {
        let mut state = self.lock();
        if !state.content_has(id) {
            return Err(ShellError::MissingElement(id.to_string()));
        }
        state.regions.insert(id.to_string(), html.to_string());
        Ok(())
    }

    fn show_message(&self, id: &str, text: &str) -> Result<(), ShellError> {
        let mut state = self.lock();
        if !state.content_has(id) {
            return Err(ShellError::MissingElement(id.to_string()));
        }
        state.messages.insert(id.to_string(), text.to_string());
        Ok(())
    }

    fn hide_message(&self, id: &str) {
        self.lock().messages.remove(id);
    }

    fn focus_field(&self, id: &str) {
        let mut state = self.lock();
        if state.content_has(id) {
            state.focused = Some(id.to_string());
        }
    }
}
