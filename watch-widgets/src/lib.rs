pub mod app_trait;
pub mod app_data;
pub mod page_router;

pub use app_trait::{WatchApp, AppInfo, AppRegistry, TimerControl};
pub use app_data::{WatchAppData, AppAction, ParseActionError};
pub use page_router::{PageId, PageRouter};
