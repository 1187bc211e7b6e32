//! State shared between the session controller and the two poll loops.
//!
//! The controller is the only writer of lifecycle and generation. Poll
//! loops write the detection frame and the snapshot handle, and only after
//! re-checking under the lock that their activation is still current.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::model_registry::Mode;
use crate::session::{Lifecycle, Session};
use crate::types::Detection;

// ─── Snapshot handles ─────────────────────────────────────────────────────────

/// Counts snapshot handle allocations and releases.
#[derive(Debug, Default)]
pub struct HandleLedger {
    allocated: AtomicU64,
    released: AtomicU64,
}

impl HandleLedger {
    pub fn allocate(self: &Arc<Self>, image: Vec<u8>) -> SnapshotHandle {
        let id = self.allocated.fetch_add(1, Ordering::SeqCst) + 1;
        SnapshotHandle {
            id,
            image,
            received_at: Utc::now(),
            ledger: Arc::clone(self),
        }
    }

    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    /// Handles allocated but not yet released.
    pub fn live(&self) -> u64 {
        self.allocated().saturating_sub(self.released())
    }
}

/// The latest displayable video frame. Released exactly once, on drop.
#[derive(Debug)]
pub struct SnapshotHandle {
    id: u64,
    image: Vec<u8>,
    received_at: DateTime<Utc>,
    ledger: Arc<HandleLedger>,
}

impl SnapshotHandle {
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            handle_id: self.id,
            size_bytes: self.image.len(),
            received_at: self.received_at,
        }
    }
}

impl Drop for SnapshotHandle {
    fn drop(&mut self) {
        self.ledger.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub handle_id: u64,
    pub size_bytes: usize,
    pub received_at: DateTime<Utc>,
}

// ─── Detection frame ──────────────────────────────────────────────────────────

/// The detection list from the last successful tick. Replaced wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionFrame {
    pub detections: Vec<Detection>,
    pub received_at: DateTime<Utc>,
}

// ─── Live state ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    Detections,
    Snapshot,
}

impl LoopKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Detections => "detections",
            Self::Snapshot => "snapshot",
        }
    }
}

/// Result of offering a tick's data to the live state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The activation that fetched the data is no longer current; dropped.
    Stale,
}

#[derive(Debug)]
pub struct LiveState {
    pub session: Session,
    /// Bumped on every Streaming entry and exit; tags loop activations.
    pub generation: u64,
    pub frame: Option<DetectionFrame>,
    pub snapshot: Option<SnapshotHandle>,
    /// Running offloaded-bag total (Sugar mode)
    pub bag_count: u64,
    detection_failures: u32,
    snapshot_failures: u32,
    ledger: Arc<HandleLedger>,
}

impl LiveState {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            generation: 0,
            frame: None,
            snapshot: None,
            bag_count: 0,
            detection_failures: 0,
            snapshot_failures: 0,
            ledger: Arc::new(HandleLedger::default()),
        }
    }

    pub fn ledger(&self) -> Arc<HandleLedger> {
        Arc::clone(&self.ledger)
    }

    /// Whether a loop activation tagged `generation` may still write.
    pub fn accepts(&self, generation: u64) -> bool {
        self.session.lifecycle == Lifecycle::Streaming && self.generation == generation
    }

    /// Start a new generation; every older activation becomes stale.
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn apply_detections(&mut self, generation: u64, detections: Vec<Detection>) -> ApplyOutcome {
        if !self.accepts(generation) {
            return ApplyOutcome::Stale;
        }
        self.detection_failures = 0;

        if self.session.mode == Mode::Sugar {
            // Adds the whole frame's bag count every tick, so a bag that stays
            // in view is counted again on each poll.
            let bags = detections.iter().filter(|d| d.is_bag()).count() as u64;
            self.bag_count += bags;
        }

        self.frame = Some(DetectionFrame {
            detections,
            received_at: Utc::now(),
        });
        ApplyOutcome::Applied
    }

    /// Install a new frame, then release the previous one.
    pub fn apply_snapshot(&mut self, generation: u64, image: Vec<u8>) -> ApplyOutcome {
        if !self.accepts(generation) {
            return ApplyOutcome::Stale;
        }
        self.snapshot_failures = 0;

        let handle = self.ledger.allocate(image);
        let previous = self.snapshot.replace(handle);
        drop(previous);
        ApplyOutcome::Applied
    }

    /// Count a failed tick. Returns the consecutive-failure count, or `None`
    /// when the activation is stale and the failure should be ignored.
    pub fn record_failure(&mut self, generation: u64, kind: LoopKind) -> Option<u32> {
        if !self.accepts(generation) {
            return None;
        }
        let counter = match kind {
            LoopKind::Detections => &mut self.detection_failures,
            LoopKind::Snapshot => &mut self.snapshot_failures,
        };
        *counter = counter.saturating_add(1);
        Some(*counter)
    }

    pub fn failures(&self, kind: LoopKind) -> u32 {
        match kind {
            LoopKind::Detections => self.detection_failures,
            LoopKind::Snapshot => self.snapshot_failures,
        }
    }

    pub fn is_degraded(&self, threshold: u32) -> bool {
        threshold > 0
            && (self.detection_failures >= threshold || self.snapshot_failures >= threshold)
    }

    /// Drop the display projection. Loops must already be cancelled.
    pub fn clear_stream_data(&mut self) {
        self.frame = None;
        self.snapshot = None;
        self.detection_failures = 0;
        self.snapshot_failures = 0;
    }
}

/// Cloneable handle to the live state.
#[derive(Debug, Clone)]
pub struct SharedLiveState(Arc<Mutex<LiveState>>);

impl SharedLiveState {
    pub fn new(state: LiveState) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    /// Lock, recovering the data if a previous holder panicked.
    pub fn lock(&self) -> MutexGuard<'_, LiveState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
