//! Session record and its lifecycle transitions.
//!
//! `Idle → Starting → Streaming → Stopping → Idle` are the only legal edges.
//! The record is owned by the controller; pollers only read it (through the
//! shared live state) to decide whether a tick result may still be applied.

use crate::error::{Result, WatchError};
use crate::model_registry::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Starting,
    Streaming,
    Stopping,
}

impl Lifecycle {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Starting => "Starting...",
            Self::Streaming => "Streaming",
            Self::Stopping => "Stopping...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub mode: Mode,
    pub lifecycle: Lifecycle,
    pub camera_source: String,
    pub is_uploaded_source: bool,
    /// Source string synthesized by the last upload, if it is still bound
    upload_source: Option<String>,
}

impl Session {
    pub fn new(default_source: impl Into<String>) -> Self {
        Self {
            mode: Mode::default(),
            lifecycle: Lifecycle::Idle,
            camera_source: default_source.into(),
            is_uploaded_source: false,
            upload_source: None,
        }
    }

    /// Legal in any state. A value other than the upload-derived source
    /// supersedes the upload.
    pub fn set_source(&mut self, value: impl Into<String>) {
        let value = value.into();
        if self.upload_source.as_deref() != Some(value.as_str()) {
            self.is_uploaded_source = false;
            self.upload_source = None;
        }
        self.camera_source = value;
    }

    /// Bind an uploaded file as the camera source. Does not touch the lifecycle.
    pub fn bind_upload(&mut self, uploads_root: &str, job_id: &str, file_extension: &str) {
        let source = upload_source(uploads_root, job_id, file_extension);
        self.camera_source = source.clone();
        self.upload_source = Some(source);
        self.is_uploaded_source = true;
    }

    /// Drop the upload binding without changing the source text.
    pub fn clear_upload(&mut self) {
        self.is_uploaded_source = false;
        self.upload_source = None;
    }

    /// Idle → Starting
    pub fn begin_start(&mut self) -> Result<()> {
        if self.lifecycle != Lifecycle::Idle {
            return Err(WatchError::SessionAlreadyActive);
        }
        if self.camera_source.trim().is_empty() {
            return Err(WatchError::InvalidSource);
        }
        self.lifecycle = Lifecycle::Starting;
        Ok(())
    }

    /// Starting → Streaming on a confirmed start, Starting → Idle otherwise.
    pub fn finish_start(&mut self, started: bool) {
        debug_assert_eq!(self.lifecycle, Lifecycle::Starting);
        self.lifecycle = if started {
            Lifecycle::Streaming
        } else {
            Lifecycle::Idle
        };
    }

    /// Streaming → Stopping. Returns false (no-op) from any other state.
    pub fn begin_stop(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Streaming {
            return false;
        }
        self.lifecycle = Lifecycle::Stopping;
        true
    }

    /// Back to Idle; stop is best-effort, so this never fails.
    pub fn finish_stop(&mut self) {
        self.lifecycle = Lifecycle::Idle;
    }
}

/// `<uploads-root>/<jobId>_input<ext>`, the path the service saved the upload to.
pub fn upload_source(uploads_root: &str, job_id: &str, file_extension: &str) -> String {
    let root = uploads_root.trim_end_matches('/');
    if root.is_empty() {
        format!("{}_input{}", job_id, file_extension)
    } else {
        format!("{}/{}_input{}", root, job_id, file_extension)
    }
}

/// Extension of an uploaded file name including the dot; empty if none.
pub fn file_extension(file_name: &str) -> &str {
    let base = file_name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(idx) if idx > 0 => &base[idx..],
        _ => "",
    }
}
