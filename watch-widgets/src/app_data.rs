//! # WatchAppData - Shell-Provided App Data
//!
//! The shell owns one [`WatchAppData`] and passes it to screens when they
//! render. Screens never mutate shell state directly; user input reaches
//! them as [`AppAction`] values that the shell parses from the console.
//!
//! Console lines are either a verb with an optional argument
//! (`mode sugar`, `source rtsp://cam-2/live`, `start`) or a JSON object
//! (`{"action":"select_model","model":"sugar_bag_a"}`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data the shell exposes to every screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchAppData {
    /// Base URL of the detection service
    pub api_url: String,
    /// Current navigation page
    pub current_view: String,
}

impl WatchAppData {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }
}

/// Operator actions dispatched to the visible screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AppAction {
    /// Switch operating mode ("truck" or "sugar")
    SetMode { mode: String },
    /// Pick a detection model
    SelectModel { model: String },
    /// Edit the camera source
    SetSource { source: String },
    /// Upload a local video file and use it as the source
    Upload { path: String },
    Start,
    Stop,
    /// Zero the offloaded-bag counter
    ResetCount,
    /// Reload the model registry
    Refresh,
    /// Print the current view
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseActionError {
    Empty,
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidJson(String),
}

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command '{}' (try 'help')", cmd),
            Self::MissingArgument(cmd) => write!(f, "'{}' needs an argument", cmd),
            Self::InvalidJson(e) => write!(f, "invalid action JSON: {}", e),
        }
    }
}

impl std::error::Error for ParseActionError {}

impl AppAction {
    /// Parse one console line.
    pub fn parse(line: &str) -> Result<Self, ParseActionError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseActionError::Empty);
        }
        if line.starts_with('{') {
            return serde_json::from_str(line).map_err(|e| ParseActionError::InvalidJson(e.to_string()));
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let arg = |name: &'static str| {
            if rest.is_empty() {
                Err(ParseActionError::MissingArgument(name))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb.to_lowercase().as_str() {
            "mode" => Ok(Self::SetMode { mode: arg("mode")? }),
            "model" | "select" => Ok(Self::SelectModel { model: arg("model")? }),
            // An empty source is legal to set; start rejects it.
            "source" => Ok(Self::SetSource {
                source: rest.to_string(),
            }),
            "upload" => Ok(Self::Upload { path: arg("upload")? }),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "reset" => Ok(Self::ResetCount),
            "refresh" => Ok(Self::Refresh),
            "show" | "status" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(ParseActionError::UnknownCommand(other.to_string())),
        }
    }

    pub const HELP: &'static str = "\
mode <truck|sugar>     switch operating mode
model <id>             select a detection model (sugar mode)
source <value>         set the camera source
upload <path>          upload a video file and use it as the source
start | stop           start or stop the live session
reset                  reset the bag counter
refresh                reload the model list
show                   print the current state
quit                   leave the page and exit";
}
