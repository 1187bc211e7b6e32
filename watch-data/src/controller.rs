//! Live monitoring session controller
//!
//! Owns the session state machine, the model selection and the poll loops
//! of the Live Detection view. All public operations take `&mut self`, so
//! user commands never interleave with each other; only the poll loops run
//! concurrently with them, and those go through [`SharedLiveState`].
//!
//! The automatic model switch runs at two call sites only: [`set_mode`]
//! and [`apply_registry`] (open / refresh).
//!
//! [`set_mode`]: LiveSessionController::set_mode
//! [`apply_registry`]: LiveSessionController::refresh_registry

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::live_state::{HandleLedger, LiveState, SharedLiveState, SnapshotInfo};
use crate::model_registry::{initial_mode_for, Mode, ModelRegistrySnapshot};
use crate::poller::{DualPoller, PollCadence};
use crate::reconciler::reconcile;
use crate::session::{file_extension, Lifecycle, Session};
use crate::session_api::SessionApi;
use crate::types::Detection;

/// Display-only projection of the controller, rebuilt on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveView {
    pub lifecycle: Lifecycle,
    pub mode: Mode,
    pub camera_source: String,
    pub is_uploaded_source: bool,
    pub selected_model: Option<String>,
    /// Model the service reported active at the last registry load
    pub registry_active: Option<String>,
    /// Models offered for selection in the current mode
    pub selectable_models: Vec<String>,
    pub detections: Vec<Detection>,
    pub detections_at: Option<DateTime<Utc>>,
    pub snapshot: Option<SnapshotInfo>,
    pub bag_count: u64,
    pub degraded: bool,
}

pub struct LiveSessionController<A: SessionApi + Clone> {
    api: A,
    shared: SharedLiveState,
    registry: Option<ModelRegistrySnapshot>,
    selected_model: Option<String>,
    /// Set once the operator has picked a mode; stops registry-driven seeding.
    mode_touched: bool,
    pollers: Option<DualPoller>,
    cadence: PollCadence,
    uploads_root: String,
    degraded_after: u32,
}

impl<A: SessionApi + Clone> LiveSessionController<A> {
    pub fn new(api: A, config: &WatchConfig) -> Self {
        let session = Session::new(config.default_source.clone());
        Self {
            api,
            shared: SharedLiveState::new(LiveState::new(session)),
            registry: None,
            selected_model: None,
            mode_touched: false,
            pollers: None,
            cadence: PollCadence {
                detections: config.detection_interval(),
                snapshot: config.snapshot_interval(),
            },
            uploads_root: config.uploads_root.clone(),
            degraded_after: config.degraded_after_failures,
        }
    }

    // ── Registry / model selection ───────────────────────────────────────────

    /// Load the model registry when the view opens. Seeds the selected model
    /// from the service's active model and, unless the operator already
    /// chose one, the mode. Returns the model switched to, if any.
    pub async fn open(&mut self) -> Result<Option<String>> {
        let snapshot = ModelRegistrySnapshot::load(&self.api).await?;
        self.selected_model = Some(snapshot.active.clone()).filter(|m| snapshot.contains(m));

        if !self.mode_touched {
            let mode = initial_mode_for(&snapshot);
            self.shared.lock().session.mode = mode;
            log::info!("LiveSession: initial mode {:?} (active model {})", mode, snapshot.active);
        }

        self.apply_registry(snapshot).await
    }

    /// Reload the registry without reseeding the mode.
    pub async fn refresh_registry(&mut self) -> Result<Option<String>> {
        let snapshot = ModelRegistrySnapshot::load(&self.api).await?;
        if let Some(selected) = &self.selected_model {
            if !snapshot.contains(selected) {
                log::warn!("LiveSession: selected model {} no longer available", selected);
                self.selected_model = Some(snapshot.active.clone()).filter(|m| snapshot.contains(m));
            }
        }
        self.apply_registry(snapshot).await
    }

    async fn apply_registry(&mut self, snapshot: ModelRegistrySnapshot) -> Result<Option<String>> {
        self.registry = Some(snapshot);
        self.reconcile_model().await
    }

    /// Operator picks a mode. A real change triggers model reconciliation.
    pub async fn set_mode(&mut self, mode: Mode) -> Result<Option<String>> {
        self.mode_touched = true;
        {
            let mut state = self.shared.lock();
            if state.session.mode == mode {
                return Ok(None);
            }
            state.session.mode = mode;
        }
        log::info!("LiveSession: mode set to {:?}", mode);
        self.reconcile_model().await
    }

    async fn reconcile_model(&mut self) -> Result<Option<String>> {
        let Some(registry) = &self.registry else {
            return Ok(None);
        };
        let mode = self.mode();
        match reconcile(mode, registry, self.selected_model.as_deref()) {
            Some(target) => {
                self.switch_model(&target).await?;
                Ok(Some(target))
            }
            None => Ok(None),
        }
    }

    /// Switch the active model. Re-requesting the selected model is a no-op
    /// with no remote call. The selection only changes once the service
    /// confirms. Returns whether a switch was issued.
    pub async fn switch_model(&mut self, model: &str) -> Result<bool> {
        if self.selected_model.as_deref() == Some(model) {
            return Ok(false);
        }
        if let Some(registry) = &self.registry {
            if !registry.contains(model) {
                return Err(WatchError::UnknownModel(model.to_string()));
            }
        }

        match self.api.switch_model(model).await {
            Ok(()) => {
                log::info!("LiveSession: switched to {}", model);
                self.selected_model = Some(model.to_string());
                Ok(true)
            }
            Err(e) => {
                log::warn!("LiveSession: failed to switch to {}: {}", model, e);
                Err(e)
            }
        }
    }

    // ── Source ───────────────────────────────────────────────────────────────

    pub fn set_source(&mut self, value: impl Into<String>) {
        self.shared.lock().session.set_source(value);
    }

    pub fn bind_upload(&mut self, job_id: &str, file_extension: &str) {
        self.shared
            .lock()
            .session
            .bind_upload(&self.uploads_root, job_id, file_extension);
    }

    /// Hand a video file to the upload collaborator and make it the source.
    /// Returns the new camera source.
    pub async fn upload(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let result = match self.api.upload(file_name, bytes).await {
            Ok(receipt) => receipt
                .job_id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| WatchError::Upload(format!("no job id returned for {}", file_name))),
            Err(e) => Err(e),
        };

        match result {
            Ok(job_id) => {
                self.bind_upload(&job_id, file_extension(file_name));
                let source = self.shared.lock().session.camera_source.clone();
                log::info!("LiveSession: uploaded {} as {}", file_name, source);
                Ok(source)
            }
            Err(e) => {
                log::warn!("LiveSession: upload of {} failed: {}", file_name, e);
                self.shared.lock().session.clear_upload();
                Err(e)
            }
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Idle → Starting → Streaming. Never retried: starting a camera has
    /// side effects on the remote end.
    pub async fn start(&mut self) -> Result<()> {
        let source = {
            let mut state = self.shared.lock();
            state.session.begin_start()?;
            state.session.camera_source.clone()
        };

        log::info!("LiveSession: starting source {}", source);
        if let Err(e) = self.api.start(&source).await {
            log::warn!("LiveSession: start failed: {}", e);
            self.shared.lock().session.finish_start(false);
            return Err(e);
        }

        let generation = {
            let mut state = self.shared.lock();
            state.session.finish_start(true);
            state.clear_stream_data();
            state.next_generation()
        };

        self.pollers = Some(DualPoller::activate(
            self.api.clone(),
            self.shared.clone(),
            generation,
            self.cadence,
        ));
        log::info!("LiveSession: streaming (generation {})", generation);
        Ok(())
    }

    /// Streaming → Stopping → Idle. The loops are cancelled before the
    /// stream data is cleared; local state reaches Idle even if the remote
    /// stop fails, and that failure is returned afterwards.
    pub async fn stop(&mut self) -> Result<()> {
        {
            let mut state = self.shared.lock();
            if !state.session.begin_stop() {
                return Ok(());
            }
            state.next_generation();
        }
        self.cancel_pollers();
        self.shared.lock().clear_stream_data();

        let result = self.api.stop().await;
        self.shared.lock().session.finish_stop();

        match result {
            Ok(()) => {
                log::info!("LiveSession: stopped");
                Ok(())
            }
            Err(e) => {
                log::warn!("LiveSession: remote stop failed: {}", e);
                Err(e)
            }
        }
    }

    /// Synchronous teardown for view close / navigation away. Cancels both
    /// loops, releases the snapshot handle and returns to Idle. Safe to call
    /// any number of times. The remote camera is not stopped.
    pub fn teardown(&mut self) {
        let was = {
            let mut state = self.shared.lock();
            let was = state.session.lifecycle;
            state.next_generation();
            was
        };
        self.cancel_pollers();
        {
            let mut state = self.shared.lock();
            state.clear_stream_data();
            state.session.finish_stop();
        }
        if was != Lifecycle::Idle {
            log::info!("LiveSession: torn down from {:?}", was);
        }
    }

    fn cancel_pollers(&mut self) {
        if let Some(pollers) = self.pollers.take() {
            pollers.cancel();
        }
    }

    // ── Bag counter ──────────────────────────────────────────────────────────

    /// Zero the local counter and ask the service to do the same.
    pub async fn reset_bag_count(&mut self) -> Result<()> {
        self.shared.lock().bag_count = 0;
        self.api.reset_bag_count().await.map_err(|e| {
            log::warn!("LiveSession: remote bag counter reset failed: {}", e);
            e
        })
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.lock().session.lifecycle
    }

    pub fn mode(&self) -> Mode {
        self.shared.lock().session.mode
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    pub fn registry(&self) -> Option<&ModelRegistrySnapshot> {
        self.registry.as_ref()
    }

    pub fn is_polling(&self) -> bool {
        self.pollers.is_some()
    }

    pub fn handle_ledger(&self) -> Arc<HandleLedger> {
        self.shared.lock().ledger()
    }

    pub fn view(&self) -> LiveView {
        let state = self.shared.lock();
        let mode = state.session.mode;
        LiveView {
            lifecycle: state.session.lifecycle,
            mode,
            camera_source: state.session.camera_source.clone(),
            is_uploaded_source: state.session.is_uploaded_source,
            selected_model: self.selected_model.clone(),
            registry_active: self.registry.as_ref().map(|r| r.active.clone()),
            selectable_models: self
                .registry
                .as_ref()
                .map(|r| r.selectable(mode).into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            detections: state
                .frame
                .as_ref()
                .map(|f| f.detections.clone())
                .unwrap_or_default(),
            detections_at: state.frame.as_ref().map(|f| f.received_at),
            snapshot: state.snapshot.as_ref().map(|h| h.info()),
            bag_count: state.bag_count,
            degraded: state.is_degraded(self.degraded_after),
        }
    }
}

impl<A: SessionApi + Clone> Drop for LiveSessionController<A> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeSessionApi, Failure};
    use std::time::Duration;

    fn test_config() -> WatchConfig {
        WatchConfig {
            degraded_after_failures: 3,
            ..Default::default()
        }
    }

    fn plant_api() -> Arc<FakeSessionApi> {
        Arc::new(FakeSessionApi::with_models(
            &["best_dec20", "sugar_bag_a", "sugar_bag_b"],
            "best_dec20",
        ))
    }

    async fn opened(api: &Arc<FakeSessionApi>) -> LiveSessionController<Arc<FakeSessionApi>> {
        let mut controller = LiveSessionController::new(api.clone(), &test_config());
        controller.open().await.unwrap();
        controller
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_seeds_mode_and_selection_without_switching() {
        let api = plant_api();
        let controller = opened(&api).await;

        assert_eq!(controller.mode(), Mode::Truck);
        assert_eq!(controller.selected_model(), Some("best_dec20"));
        assert_eq!(api.calls().switch_model, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_with_sugar_active_starts_in_sugar_mode() {
        let api = Arc::new(FakeSessionApi::with_models(
            &["best_dec20", "sugar_bag_final"],
            "sugar_bag_final",
        ));
        let controller = opened(&api).await;
        assert_eq!(controller.mode(), Mode::Sugar);
        assert_eq!(api.calls().switch_model, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_switch_selects_first_sugar_model() {
        let api = plant_api();
        let mut controller = opened(&api).await;

        let switched = controller.set_mode(Mode::Sugar).await.unwrap();
        assert_eq!(switched.as_deref(), Some("sugar_bag_a"));
        assert_eq!(controller.selected_model(), Some("sugar_bag_a"));
        assert_eq!(api.switched_models(), vec!["sugar_bag_a".to_string()]);

        // Same mode again: not a transition point.
        assert_eq!(controller.set_mode(Mode::Sugar).await.unwrap(), None);

        let back = controller.set_mode(Mode::Truck).await.unwrap();
        assert_eq!(back.as_deref(), Some("best_dec20"));
        assert_eq!(api.calls().switch_model, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_operator_mode_survives_registry_refresh() {
        let api = plant_api();
        let mut controller = opened(&api).await;
        controller.set_mode(Mode::Sugar).await.unwrap();

        controller.refresh_registry().await.unwrap();
        assert_eq!(controller.mode(), Mode::Sugar);
        assert_eq!(controller.selected_model(), Some("sugar_bag_a"));
        assert_eq!(api.calls().switch_model, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_to_selected_model_makes_no_call() {
        let api = plant_api();
        let mut controller = opened(&api).await;

        assert!(!controller.switch_model("best_dec20").await.unwrap());
        assert_eq!(api.calls().switch_model, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_switch_keeps_selection() {
        let api = plant_api();
        let mut controller = opened(&api).await;
        api.fail_next_switch(Failure::Rejected(404));

        let err = controller.switch_model("sugar_bag_b").await.unwrap_err();
        assert!(matches!(err, WatchError::RemoteRejected { status: 404, .. }));
        assert_eq!(controller.selected_model(), Some("best_dec20"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_model_is_rejected_locally() {
        let api = plant_api();
        let mut controller = opened(&api).await;

        let err = controller.switch_model("yolo_v99").await.unwrap_err();
        assert!(matches!(err, WatchError::UnknownModel(_)));
        assert_eq!(api.calls().switch_model, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_unavailable_is_surfaced() {
        let api = plant_api();
        api.fail_models(Failure::Transport);
        let mut controller = LiveSessionController::new(api.clone(), &test_config());

        let err = controller.open().await.unwrap_err();
        assert!(matches!(err, WatchError::RegistryUnavailable(_)));
        assert!(controller.registry().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_then_immediate_stop_applies_nothing() {
        let api = plant_api();
        let mut controller = opened(&api).await;
        let ledger = controller.handle_ledger();

        controller.start().await.unwrap();
        controller.stop().await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(controller.lifecycle(), Lifecycle::Idle);
        assert_eq!(api.calls().detections, 0);
        assert_eq!(api.calls().snapshot, 0);
        assert_eq!(ledger.allocated(), 0);
        let view = controller.view();
        assert!(view.detections.is_empty());
        assert!(view.snapshot.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_streaming_polls_both_loops_at_their_cadence() {
        let api = plant_api();
        api.set_detections(vec![Detection::new("truck", 0.93)]);
        let mut controller = opened(&api).await;

        controller.start().await.unwrap();
        assert_eq!(api.last_source().as_deref(), Some("0"));
        tokio::time::sleep(Duration::from_millis(1050)).await;

        let calls = api.calls();
        assert_eq!(calls.detections, 1);
        assert_eq!(calls.snapshot, 5);

        let view = controller.view();
        assert_eq!(view.lifecycle, Lifecycle::Streaming);
        assert_eq!(view.detections, vec![Detection::new("truck", 0.93)]);
        assert_eq!(view.snapshot.map(|s| s.handle_id), Some(5));

        let ledger = controller.handle_ledger();
        assert_eq!(ledger.live(), 1);
        controller.stop().await.unwrap();
        assert_eq!(ledger.live(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_snapshot_resolving_after_stop_is_discarded() {
        let api = plant_api();
        api.set_snapshot_delay(Duration::from_millis(500));
        let mut controller = opened(&api).await;
        let ledger = controller.handle_ledger();

        controller.start().await.unwrap();
        // First snapshot tick fires at 200ms and is still in flight.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(api.calls().snapshot, 1);

        controller.stop().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(controller.lifecycle(), Lifecycle::Idle);
        assert_eq!(ledger.allocated(), ledger.released());
        assert!(controller.view().snapshot.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_rejected_reverts_to_idle_once() {
        let api = plant_api();
        let mut controller = opened(&api).await;
        api.fail_next_start(Failure::Rejected(500));

        let err = controller.start().await.unwrap_err();
        assert!(matches!(err, WatchError::RemoteRejected { status: 500, .. }));
        assert_eq!(controller.lifecycle(), Lifecycle::Idle);
        assert!(!controller.is_polling());
        assert_eq!(api.calls().start, 1);

        // Nothing retries behind the caller's back.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(api.calls().start, 1);
        assert_eq!(api.calls().detections, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_guards() {
        let api = plant_api();
        let mut controller = opened(&api).await;

        controller.set_source("");
        assert!(matches!(controller.start().await, Err(WatchError::InvalidSource)));

        controller.set_source("rtsp://cam-3/live");
        controller.start().await.unwrap();
        assert!(matches!(
            controller.start().await,
            Err(WatchError::SessionAlreadyActive)
        ));
        assert_eq!(api.calls().start, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle_is_noop() {
        let api = plant_api();
        let mut controller = opened(&api).await;
        controller.stop().await.unwrap();
        assert_eq!(api.calls().stop, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_remote_stop_still_reaches_idle() {
        let api = plant_api();
        let mut controller = opened(&api).await;
        controller.start().await.unwrap();
        api.fail_next_stop(Failure::Transport);

        let err = controller.stop().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(controller.lifecycle(), Lifecycle::Idle);
        assert!(!controller.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_failures_do_not_stop_the_loops() {
        let api = plant_api();
        api.fail_detections(2);
        api.set_detections(vec![Detection::new("truck", 0.5)]);
        let mut controller = opened(&api).await;

        controller.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(controller.view().detections.is_empty());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(api.calls().detections, 3);
        assert_eq!(controller.view().detections.len(), 1);
        assert_eq!(controller.lifecycle(), Lifecycle::Streaming);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_snapshot_failures_flag_degraded() {
        let api = plant_api();
        api.fail_snapshots(u32::MAX);
        let mut controller = opened(&api).await;

        controller.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(450)).await;
        assert!(!controller.view().degraded);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(controller.view().degraded);

        controller.stop().await.unwrap();
        assert!(!controller.view().degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_is_idempotent_and_releases_handles() {
        let api = plant_api();
        let mut controller = opened(&api).await;
        let ledger = controller.handle_ledger();

        controller.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(650)).await;
        assert_eq!(ledger.live(), 1);

        controller.teardown();
        controller.teardown();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(controller.lifecycle(), Lifecycle::Idle);
        assert_eq!(ledger.live(), 0);
        assert_eq!(ledger.allocated(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_cycles_do_not_leak() {
        let api = plant_api();
        let mut controller = opened(&api).await;
        let ledger = controller.handle_ledger();

        for round in 0..4 {
            controller.start().await.unwrap();
            tokio::time::sleep(Duration::from_millis(450)).await;
            if round % 2 == 0 {
                controller.stop().await.unwrap();
            } else {
                controller.teardown();
            }
            let mode = if round % 2 == 0 { Mode::Sugar } else { Mode::Truck };
            controller.set_mode(mode).await.unwrap();
        }
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(ledger.allocated(), 8);
        assert_eq!(ledger.live(), 0);
        assert_eq!(api.calls().snapshot, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_loops() {
        let api = plant_api();
        let ledger = {
            let mut controller = opened(&api).await;
            controller.start().await.unwrap();
            tokio::time::sleep(Duration::from_millis(250)).await;
            controller.handle_ledger()
        };
        let polled = api.calls().snapshot;
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(api.calls().snapshot, polled);
        assert_eq!(ledger.live(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_binds_source() {
        let api = plant_api();
        api.set_upload_job("job123");
        let mut controller = opened(&api).await;

        let source = controller.upload("yard_cam.mp4", vec![0u8; 16]).await.unwrap();
        assert_eq!(source, "uploads/job123_input.mp4");
        let view = controller.view();
        assert!(view.is_uploaded_source);
        assert_eq!(view.lifecycle, Lifecycle::Idle);

        controller.start().await.unwrap();
        assert_eq!(api.last_source().as_deref(), Some("uploads/job123_input.mp4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_upload_clears_flag() {
        let api = plant_api();
        api.set_upload_job("job1");
        let mut controller = opened(&api).await;
        controller.upload("a.mp4", vec![1]).await.unwrap();

        api.fail_next_upload(Failure::Transport);
        assert!(controller.upload("b.mp4", vec![2]).await.is_err());
        let view = controller.view();
        assert!(!view.is_uploaded_source);
        assert_eq!(view.camera_source, "uploads/job1_input.mp4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sugar_bag_counter_and_reset() {
        let api = plant_api();
        api.set_detections(vec![
            Detection::new("sugar_bag", 0.88),
            Detection::new("sugar_bag", 0.71),
        ]);
        let mut controller = opened(&api).await;
        controller.set_mode(Mode::Sugar).await.unwrap();

        controller.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2050)).await;
        assert_eq!(controller.view().bag_count, 4);

        controller.reset_bag_count().await.unwrap();
        assert_eq!(controller.view().bag_count, 0);
        assert_eq!(api.calls().reset_bag_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_lists_sugar_models_in_sugar_mode() {
        let api = plant_api();
        let mut controller = opened(&api).await;
        assert_eq!(controller.view().selectable_models.len(), 3);

        controller.set_mode(Mode::Sugar).await.unwrap();
        let view = controller.view();
        assert_eq!(view.selectable_models, vec!["sugar_bag_a", "sugar_bag_b"]);
        assert_eq!(view.registry_active.as_deref(), Some("best_dec20"));
    }
}
