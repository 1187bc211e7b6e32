//! # PageRouter - Page Visibility
//!
//! Tracks which registered page is on screen. Every navigation returns the
//! pages that just went out of view, so the shell can call
//! [`TimerControl::stop_timers`](crate::TimerControl::stop_timers) on them.
//! Leaving with [`PageRouter::navigate_away`] hides whatever is visible.

/// Page identifier, taken from [`AppInfo::page_id`](crate::AppInfo).
pub type PageId = &'static str;

#[derive(Clone, Debug, Default)]
pub struct PageRouter {
    /// Page on screen, `None` before the first navigation and after leaving
    current_page: Option<PageId>,
    pages: Vec<PageId>,
}

impl PageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_page(&mut self, page_id: PageId) {
        if !self.pages.contains(&page_id) {
            self.pages.push(page_id);
        }
    }

    /// Show `page_id`. Returns the page that was hidden, if any. Unknown
    /// pages are refused and leave the current page on screen.
    pub fn navigate_to(&mut self, page_id: PageId) -> Option<PageId> {
        if !self.pages.contains(&page_id) {
            log::warn!("PageRouter: unknown page {:?}", page_id);
            return None;
        }
        if self.current_page == Some(page_id) {
            return None;
        }
        log::debug!("PageRouter: navigated to {:?}", page_id);
        self.current_page.replace(page_id)
    }

    /// Leave the visible page without showing another one.
    pub fn navigate_away(&mut self) -> Option<PageId> {
        self.current_page.take()
    }

    pub fn current_page(&self) -> Option<PageId> {
        self.current_page
    }
}
