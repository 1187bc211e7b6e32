//! Error type shared by the remote API, the registry view and the controller.

/// Result type alias
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors surfaced by command operations.
///
/// Poll-tick failures never reach callers as errors; they are logged and
/// folded into the degraded-connectivity signal instead.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Network failure or remote unreachable
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered a command with a non-success status
    #[error("Remote rejected request ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    /// Start attempted with an empty camera source
    #[error("Camera source is empty")]
    InvalidSource,

    /// Start requested while a session is starting or streaming
    #[error("Session already active")]
    SessionAlreadyActive,

    /// `GET /models` could not be fetched or parsed
    #[error("Model registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Switch requested for a model the registry does not list
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Upload accepted by transport but no job id came back
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

impl WatchError {
    /// Whether the failure came from the network layer rather than the service.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for WatchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
