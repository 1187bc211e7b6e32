//! Scripted in-memory [`SessionApi`] for tests.
//!
//! Calls are counted when issued, before any configured delay elapses, so a
//! test can observe an in-flight request.

use futures::FutureExt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{Result, WatchError};
use crate::session_api::{ApiFuture, SessionApi};
use crate::types::{Detection, ModelsInfo, UploadReceipt};

/// Failure injected into a scripted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Transport,
    Rejected(u16),
}

impl Failure {
    fn into_error(self) -> WatchError {
        match self {
            Self::Transport => WatchError::Transport("connection refused".to_string()),
            Self::Rejected(status) => WatchError::RemoteRejected {
                status,
                message: "Request failed".to_string(),
            },
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub start: u32,
    pub stop: u32,
    pub switch_model: u32,
    pub list_models: u32,
    pub detections: u32,
    pub snapshot: u32,
    pub upload: u32,
    pub reset_bag_count: u32,
}

#[derive(Debug, Default)]
struct Script {
    calls: CallCounts,
    models: Vec<String>,
    active: String,
    detections: Vec<Detection>,
    snapshot: Vec<u8>,
    upload_job: Option<String>,
    start_delay: Duration,
    snapshot_delay: Duration,
    detections_delay: Duration,
    last_source: Option<String>,
    switched: Vec<String>,
    fail_start: Option<Failure>,
    fail_stop: Option<Failure>,
    fail_switch: Option<Failure>,
    fail_upload: Option<Failure>,
    fail_models: Option<Failure>,
    failing_detections: u32,
    failing_snapshots: u32,
}

#[derive(Debug, Default)]
pub struct FakeSessionApi {
    script: Mutex<Script>,
}

impl FakeSessionApi {
    pub fn with_models(models: &[&str], active: &str) -> Self {
        let fake = Self::default();
        {
            let mut script = fake.script();
            script.models = models.iter().map(|m| m.to_string()).collect();
            script.active = active.to_string();
            script.snapshot = vec![0xff, 0xd8, 0xff, 0xe0];
        }
        fake
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Scripting ───────────────────────────────────────────────────────────

    pub fn set_detections(&self, detections: Vec<Detection>) {
        self.script().detections = detections;
    }

    pub fn set_snapshot(&self, image: Vec<u8>) {
        self.script().snapshot = image;
    }

    pub fn set_upload_job(&self, job_id: &str) {
        self.script().upload_job = Some(job_id.to_string());
    }

    /// Hold `start` open, as a hung service would.
    pub fn set_start_delay(&self, delay: Duration) {
        self.script().start_delay = delay;
    }

    pub fn set_snapshot_delay(&self, delay: Duration) {
        self.script().snapshot_delay = delay;
    }

    pub fn set_detections_delay(&self, delay: Duration) {
        self.script().detections_delay = delay;
    }

    pub fn fail_next_start(&self, failure: Failure) {
        self.script().fail_start = Some(failure);
    }

    pub fn fail_next_stop(&self, failure: Failure) {
        self.script().fail_stop = Some(failure);
    }

    pub fn fail_next_switch(&self, failure: Failure) {
        self.script().fail_switch = Some(failure);
    }

    pub fn fail_next_upload(&self, failure: Failure) {
        self.script().fail_upload = Some(failure);
    }

    /// Every `list_models` call fails until cleared with `None`.
    pub fn fail_models(&self, failure: impl Into<Option<Failure>>) {
        self.script().fail_models = failure.into();
    }

    /// The next `count` detection fetches fail with a transport error.
    pub fn fail_detections(&self, count: u32) {
        self.script().failing_detections = count;
    }

    /// The next `count` snapshot fetches fail with a transport error.
    pub fn fail_snapshots(&self, count: u32) {
        self.script().failing_snapshots = count;
    }

    // ─── Inspection ──────────────────────────────────────────────────────────

    pub fn calls(&self) -> CallCounts {
        self.script().calls
    }

    pub fn last_source(&self) -> Option<String> {
        self.script().last_source.clone()
    }

    pub fn switched_models(&self) -> Vec<String> {
        self.script().switched.clone()
    }

    pub fn active_model(&self) -> String {
        self.script().active.clone()
    }
}

fn ready<T: Send + 'static>(result: Result<T>) -> ApiFuture<T> {
    futures::future::ready(result).boxed()
}

fn delayed<T: Send + 'static>(delay: Duration, result: Result<T>) -> ApiFuture<T> {
    if delay.is_zero() {
        return ready(result);
    }
    async move {
        tokio::time::sleep(delay).await;
        result
    }
    .boxed()
}

impl SessionApi for FakeSessionApi {
    fn start(&self, source: &str) -> ApiFuture<()> {
        let mut script = self.script();
        script.calls.start += 1;
        script.last_source = Some(source.to_string());
        let result = script.fail_start.take().map_or(Ok(()), |f| Err(f.into_error()));
        delayed(script.start_delay, result)
    }

    fn stop(&self) -> ApiFuture<()> {
        let mut script = self.script();
        script.calls.stop += 1;
        ready(script.fail_stop.take().map_or(Ok(()), |f| Err(f.into_error())))
    }

    fn switch_model(&self, model: &str) -> ApiFuture<()> {
        let mut script = self.script();
        script.calls.switch_model += 1;
        if let Some(failure) = script.fail_switch.take() {
            return ready(Err(failure.into_error()));
        }
        if !script.models.iter().any(|m| m == model) {
            return ready(Err(WatchError::RemoteRejected {
                status: 404,
                message: format!("Model {} not found", model),
            }));
        }
        script.active = model.to_string();
        script.switched.push(model.to_string());
        ready(Ok(()))
    }

    fn list_models(&self) -> ApiFuture<ModelsInfo> {
        let mut script = self.script();
        script.calls.list_models += 1;
        if let Some(failure) = script.fail_models {
            return ready(Err(failure.into_error()));
        }
        ready(Ok(ModelsInfo {
            available: script.models.clone(),
            active: script.active.clone(),
            main_loaded: true,
        }))
    }

    fn detections(&self) -> ApiFuture<Vec<Detection>> {
        let mut script = self.script();
        script.calls.detections += 1;
        let result = if script.failing_detections > 0 {
            script.failing_detections -= 1;
            Err(Failure::Transport.into_error())
        } else {
            Ok(script.detections.clone())
        };
        delayed(script.detections_delay, result)
    }

    fn snapshot(&self) -> ApiFuture<Vec<u8>> {
        let mut script = self.script();
        script.calls.snapshot += 1;
        let result = if script.failing_snapshots > 0 {
            script.failing_snapshots -= 1;
            Err(Failure::Transport.into_error())
        } else {
            Ok(script.snapshot.clone())
        };
        delayed(script.snapshot_delay, result)
    }

    fn upload(&self, _file_name: &str, _bytes: Vec<u8>) -> ApiFuture<UploadReceipt> {
        let mut script = self.script();
        script.calls.upload += 1;
        if let Some(failure) = script.fail_upload.take() {
            return ready(Err(failure.into_error()));
        }
        ready(Ok(UploadReceipt {
            job_id: script.upload_job.clone(),
            status: Some("processing".to_string()),
            original_size: None,
        }))
    }

    fn reset_bag_count(&self) -> ApiFuture<()> {
        self.script().calls.reset_bag_count += 1;
        ready(Ok(()))
    }
}
