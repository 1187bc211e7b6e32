//! Model Registry View: the detector models the service has loaded.
//!
//! Fetched once when the live session view opens and treated as immutable
//! until the next explicit refresh. The controller keeps the snapshot; the
//! session record never owns it.

use crate::error::{Result, WatchError};
use crate::session_api::SessionApi;
use crate::types::ModelsInfo;

/// Substring that marks a model as a sugar-bag counter.
pub const SUGAR_MARKER: &str = "sugar";

/// The model truck entry/exit monitoring is locked to.
pub const TRUCK_MODEL: &str = "best_dec20";

const SUGAR_DISPLAY_PREFIX: &str = "sugar_bag_";

// ─── Mode ─────────────────────────────────────────────────────────────────────

/// Operating profile, controlling which model family should be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Truck entry/exit
    #[default]
    Truck,
    /// Sugar-bag offloading
    Sugar,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Truck => "Truck Entry/Exit",
            Self::Sugar => "Sugar Bag Offloading",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "truck" => Some(Self::Truck),
            "sugar" => Some(Self::Sugar),
            _ => None,
        }
    }
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRegistrySnapshot {
    /// Model identifiers in the order the service lists them
    pub available: Vec<String>,
    /// Model the service reports as active
    pub active: String,
    /// Whether the canonical truck model is loaded server-side
    pub main_loaded: bool,
}

impl From<ModelsInfo> for ModelRegistrySnapshot {
    fn from(info: ModelsInfo) -> Self {
        Self {
            available: info.available,
            active: info.active,
            main_loaded: info.main_loaded,
        }
    }
}

impl ModelRegistrySnapshot {
    pub fn new(available: &[&str], active: &str) -> Self {
        Self {
            available: available.iter().map(|s| s.to_string()).collect(),
            active: active.to_string(),
            main_loaded: available.contains(&TRUCK_MODEL),
        }
    }

    /// `GET /models`. Transport and decode failures become
    /// `RegistryUnavailable`; the caller decides whether to retry.
    pub async fn load<A: SessionApi + ?Sized>(api: &A) -> Result<Self> {
        match api.list_models().await {
            Ok(info) => {
                let snapshot = Self::from(info);
                log::info!(
                    "ModelRegistry: {} models available, active {}",
                    snapshot.available.len(),
                    snapshot.active
                );
                Ok(snapshot)
            }
            Err(e) => {
                log::warn!("ModelRegistry: failed to load models: {}", e);
                Err(WatchError::RegistryUnavailable(e.to_string()))
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.available.iter().any(|m| m == id)
    }

    pub fn sugar_models(&self) -> impl Iterator<Item = &str> {
        self.available
            .iter()
            .map(String::as_str)
            .filter(|m| is_sugar_model(m))
    }

    /// Models offered for selection in a mode: everything in Truck mode
    /// (where the selection is locked anyway), sugar models only in Sugar mode.
    pub fn selectable(&self, mode: Mode) -> Vec<&str> {
        match mode {
            Mode::Truck => self.available.iter().map(String::as_str).collect(),
            Mode::Sugar => self.sugar_models().collect(),
        }
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

pub fn is_sugar_model(id: &str) -> bool {
    id.contains(SUGAR_MARKER)
}

/// Sugar if the active model carries the sugar marker, else Truck.
pub fn initial_mode_for(snapshot: &ModelRegistrySnapshot) -> Mode {
    if is_sugar_model(&snapshot.active) {
        Mode::Sugar
    } else {
        Mode::Truck
    }
}

/// Short label for a model: `sugar_bag_final` → `final`, `best_dec20` → `best dec20`.
pub fn display_name(id: &str) -> String {
    id.replacen(SUGAR_DISPLAY_PREFIX, "", 1).replace('_', " ")
}
