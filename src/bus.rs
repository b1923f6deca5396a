use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Process-wide notifications published by the coordinator and the session service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// A route finished installing: fragment injected, page script attached, header
    /// refreshed. Carries the base path.
    RouteLoaded(String),
    /// The session ended without the user asking for it (inactivity, or a protected
    /// route was requested without a session).
    SessionExpired,
}

/// EventBus
///
/// Typed publish/subscribe over a tokio broadcast channel. Subscribers receive events in
/// publish order; a subscriber created after a publish does not see it.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ShellEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes to every current subscriber and returns how many there were.
    pub fn publish(&self, event: ShellEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(?event, "published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
