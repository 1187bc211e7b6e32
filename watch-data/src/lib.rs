pub mod config;
pub mod controller;
pub mod error;
pub mod live_state;
pub mod model_registry;
pub mod poller;
pub mod reconciler;
pub mod session;
pub mod session_api;
pub mod session_client;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

pub use config::WatchConfig;
pub use controller::{LiveSessionController, LiveView};
pub use error::{Result, WatchError};
pub use live_state::{HandleLedger, LoopKind, SnapshotInfo};
pub use model_registry::{
    display_name, initial_mode_for, is_sugar_model, Mode, ModelRegistrySnapshot, SUGAR_MARKER,
    TRUCK_MODEL,
};
pub use poller::{DualPoller, PollCadence};
pub use reconciler::reconcile;
pub use session::{file_extension, upload_source, Lifecycle, Session};
pub use session_api::{ApiFuture, SessionApi};
pub use session_client::HttpSessionApi;
pub use types::{Detection, ModelsInfo, UploadReceipt};
