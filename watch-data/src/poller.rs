//! Dual Poller: the detection and snapshot loops of a streaming session.
//!
//! Each loop runs as its own task on its own cadence. A tick runs to
//! completion before the same loop's next tick is scheduled; the two loops
//! are independent of each other. Every activation carries the generation
//! it was started under and re-checks it under the state lock before
//! writing, so a tick that resolves after stop drops its result.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::WatchError;
use crate::live_state::{ApplyOutcome, LoopKind, SharedLiveState};
use crate::session_api::SessionApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollCadence {
    pub detections: Duration,
    pub snapshot: Duration,
}

impl Default for PollCadence {
    fn default() -> Self {
        Self {
            detections: Duration::from_millis(1000),
            snapshot: Duration::from_millis(200),
        }
    }
}

// ─── Loop activation ──────────────────────────────────────────────────────────

/// One running loop. Dropping the activation aborts the task.
#[derive(Debug)]
struct LoopActivation {
    kind: LoopKind,
    generation: u64,
    handle: JoinHandle<()>,
}

impl LoopActivation {
    fn spawn<F>(kind: LoopKind, generation: u64, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            kind,
            generation,
            handle: tokio::spawn(task),
        }
    }
}

impl Drop for LoopActivation {
    fn drop(&mut self) {
        self.handle.abort();
        log::debug!(
            "Poller: cancelled {} loop (generation {})",
            self.kind.label(),
            self.generation
        );
    }
}

// ─── Dual poller ──────────────────────────────────────────────────────────────

/// Both loops of one Streaming period.
#[derive(Debug)]
pub struct DualPoller {
    detections: LoopActivation,
    snapshot: LoopActivation,
}

impl DualPoller {
    /// Spawn both loops for `generation`. Must be called from inside a
    /// tokio runtime. The first tick of each loop fires one cadence later.
    pub fn activate<A>(api: A, shared: SharedLiveState, generation: u64, cadence: PollCadence) -> Self
    where
        A: SessionApi + Clone,
    {
        log::debug!(
            "Poller: activating generation {} (detections every {:?}, snapshot every {:?})",
            generation,
            cadence.detections,
            cadence.snapshot
        );

        let detections = LoopActivation::spawn(
            LoopKind::Detections,
            generation,
            detection_loop(api.clone(), shared.clone(), generation, cadence.detections),
        );
        let snapshot = LoopActivation::spawn(
            LoopKind::Snapshot,
            generation,
            snapshot_loop(api, shared, generation, cadence.snapshot),
        );

        Self {
            detections,
            snapshot,
        }
    }

    /// Abort both loops.
    pub fn cancel(self) {
        let Self {
            detections,
            snapshot,
        } = self;
        drop(detections);
        drop(snapshot);
    }
}

// ─── Loops ────────────────────────────────────────────────────────────────────

fn ticker(cadence: Duration) -> tokio::time::Interval {
    let mut ticker = interval_at(Instant::now() + cadence, cadence);
    // A slow fetch pushes the next tick back rather than bunching ticks up.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn detection_loop<A: SessionApi>(api: A, shared: SharedLiveState, generation: u64, cadence: Duration) {
    let mut ticker = ticker(cadence);
    loop {
        ticker.tick().await;
        if !shared.lock().accepts(generation) {
            break;
        }

        let result = api.detections().await;

        let mut state = shared.lock();
        let outcome = match result {
            Ok(detections) => state.apply_detections(generation, detections),
            Err(e) => match state.record_failure(generation, LoopKind::Detections) {
                Some(failures) => {
                    log_tick_failure(LoopKind::Detections, failures, &e);
                    continue;
                }
                None => ApplyOutcome::Stale,
            },
        };

        if outcome == ApplyOutcome::Stale {
            log::debug!("Poller: dropped stale detections (generation {})", generation);
            break;
        }
    }
}

async fn snapshot_loop<A: SessionApi>(api: A, shared: SharedLiveState, generation: u64, cadence: Duration) {
    let mut ticker = ticker(cadence);
    loop {
        ticker.tick().await;
        if !shared.lock().accepts(generation) {
            break;
        }

        let result = api.snapshot().await;

        let mut state = shared.lock();
        let outcome = match result {
            Ok(image) => state.apply_snapshot(generation, image),
            // The previous frame stays on screen.
            Err(e) => match state.record_failure(generation, LoopKind::Snapshot) {
                Some(failures) => {
                    log_tick_failure(LoopKind::Snapshot, failures, &e);
                    continue;
                }
                None => ApplyOutcome::Stale,
            },
        };

        if outcome == ApplyOutcome::Stale {
            log::debug!("Poller: dropped stale snapshot (generation {})", generation);
            break;
        }
    }
}

fn log_tick_failure(kind: LoopKind, consecutive: u32, error: &WatchError) {
    if consecutive == 1 {
        log::warn!("Poller: {} fetch failed: {}", kind.label(), error);
    } else {
        log::debug!(
            "Poller: {} fetch failed ({} in a row): {}",
            kind.label(),
            consecutive,
            error
        );
    }
}
