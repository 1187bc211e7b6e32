//! # WatchApp Trait - Screen Integration Interface
//!
//! Screens are separate crates under `apps/` that implement [`WatchApp`].
//! The shell registers their metadata in an [`AppRegistry`] and hands the
//! page ids to the [`PageRouter`](crate::PageRouter).
//!
//! ## Usage in Shell
//!
//! ```rust,ignore
//! use watch_widgets::{WatchApp, AppRegistry, PageRouter};
//! use watch_live::LiveDetectionApp;
//!
//! let mut registry = AppRegistry::new();
//! registry.register(LiveDetectionApp::info());
//!
//! let mut router = PageRouter::new();
//! for app in registry.apps() {
//!     router.register_page(app.page_id);
//! }
//! ```

/// Metadata about a registered app
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppInfo {
    /// Display name shown in the console header
    pub name: &'static str,
    /// Unique identifier for the app
    pub id: &'static str,
    /// Description of the app
    pub description: &'static str,
    /// Page id used for navigation
    pub page_id: &'static str,
}

/// Trait for screens that integrate with the shell
pub trait WatchApp {
    /// Returns metadata about this app
    fn info() -> AppInfo
    where
        Self: Sized;
}

/// Trait for screens that own background pollers
///
/// The shell calls `stop_timers` on every page the router reports as hidden,
/// and `start_timers` on the page that becomes visible. `stop_timers` must be
/// synchronous and safe to call repeatedly.
///
/// # Example
/// ```ignore
/// impl TimerControl for LiveDetectionScreen {
///     fn stop_timers(&mut self) {
///         self.controller.teardown();
///     }
///
///     fn start_timers(&mut self) {}
/// }
/// ```
pub trait TimerControl {
    /// Called when the page is being hidden (navigated away from)
    fn stop_timers(&mut self);

    /// Called when the page is being shown (navigated to)
    fn start_timers(&mut self);
}

/// Registry of all installed apps
pub struct AppRegistry {
    apps: Vec<AppInfo>,
}

impl AppRegistry {
    /// Create a new empty registry
    pub const fn new() -> Self {
        Self { apps: Vec::new() }
    }

    /// Register an app; a second registration with the same id is ignored
    pub fn register(&mut self, info: AppInfo) {
        if self.find_by_id(info.id).is_some() {
            log::warn!("AppRegistry: app {} already registered", info.id);
            return;
        }
        self.apps.push(info);
    }

    /// Get all registered apps
    pub fn apps(&self) -> &[AppInfo] {
        &self.apps
    }

    /// Find an app by ID
    pub fn find_by_id(&self, id: &str) -> Option<&AppInfo> {
        self.apps.iter().find(|app| app.id == id)
    }
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIVE: AppInfo = AppInfo {
        name: "Live Detection",
        id: "watch-live",
        description: "Live camera monitoring",
        page_id: "live_detection",
    };

    #[test]
    fn test_registry_lookup() {
        let mut registry = AppRegistry::new();
        assert!(registry.apps().is_empty());

        registry.register(LIVE);
        registry.register(LIVE);

        assert_eq!(registry.apps(), &[LIVE]);
        assert_eq!(registry.find_by_id("watch-live"), Some(&LIVE));
        assert!(registry.find_by_id("watch-hub").is_none());
    }
}
