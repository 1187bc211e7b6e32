//! Live Detection App
//!
//! Camera monitoring for truck entry/exit and sugar-bag offloading.

pub mod screen;

use watch_widgets::{AppInfo, WatchApp};

pub use screen::{LiveDetectionScreen, ScreenResponse};

/// Main app struct for WatchApp trait implementation
pub struct LiveDetectionApp;

impl WatchApp for LiveDetectionApp {
    fn info() -> AppInfo {
        AppInfo {
            name: "Live Detection",
            id: "watch-live",
            description: "Live camera monitoring with truck and sugar-bag detection",
            page_id: "live_detection",
        }
    }
}
