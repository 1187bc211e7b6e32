//! Wire types for the detection service.

use serde::{Deserialize, Serialize};

/// One entry from `GET /camera/detections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class name reported by the detector (e.g. "truck", "sugar_bag")
    #[serde(rename = "class")]
    pub label: String,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
    /// Model that produced the detection, when the service reports it
    #[serde(rename = "model", default, skip_serializing_if = "Option::is_none")]
    pub source_model: Option<String>,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
            source_model: None,
        }
    }

    /// Whether this detection counts towards the offloaded-bag total.
    pub fn is_bag(&self) -> bool {
        self.label.to_lowercase().contains("bag")
    }
}

/// Body of `GET /models`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelsInfo {
    pub available: Vec<String>,
    pub active: String,
    #[serde(default)]
    pub main_loaded: bool,
}

/// Body of `POST /compression/upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub original_size: Option<u64>,
}
