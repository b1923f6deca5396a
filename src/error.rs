use thiserror::Error;

/// ShellError
///
/// Every failure the shell can observe. None of these is fatal to the running
/// shell: each variant is recovered at a well-defined layer (redirect to the
/// not-found route, redirect to login, placeholder markup, or a log line).
/// `Configuration` is the only one surfaced to callers, because a route table
/// without a not-found entry cannot recover from anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("request for {resource} failed with HTTP status {status}")]
    HttpStatus { resource: String, status: u16 },

    #[error("network failure fetching {resource}: {message}")]
    Network { resource: String, message: String },

    #[error("malformed payload from {resource}: {message}")]
    Decode { resource: String, message: String },

    #[error("failed to attach page script {src}: {message}")]
    ScriptAttach { src: String, message: String },

    #[error("stored session record is corrupt: {0}")]
    SessionCorrupt(String),

    #[error("access to protected route {0} denied")]
    AuthDenied(String),

    #[error("element '{0}' not found in the page")]
    MissingElement(String),

    #[error("route table misconfigured: {0}")]
    Configuration(String),
}

impl ShellError {
    /// True for the fetch failures that send the user to the not-found route.
    pub fn is_resource_not_found(&self) -> bool {
        matches!(
            self,
            ShellError::HttpStatus { .. } | ShellError::Network { .. }
        )
    }
}
