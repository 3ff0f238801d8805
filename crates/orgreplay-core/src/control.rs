//! Playback control state shared with the player loop.
//!
//! Holds the control plane for one playback: pause/resume, speed, seek
//! and stop requests. A [`PlaybackControl`] is wrapped in an [`Arc`] and
//! shared between the player task and whoever drives it (a UI bridge, the
//! binary, a test). Every request wakes the player through one
//! [`Notify`], so the player never polls.
//!
//! Flags and speed are atomics; only the pending seek target and the end
//! reason sit behind a [`Mutex`].
//!
//! [`Arc`]: std::sync::Arc

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::clock::{ClockError, PlaybackSpeed};
use crate::config::PlaybackConfig;

/// Why a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The cursor reached the end tick.
    Finished,
    /// A stop was requested.
    Stopped,
}

/// Shared playback control state.
#[derive(Debug)]
pub struct PlaybackControl {
    /// Whether playback is paused.
    paused: AtomicBool,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Requested speed multiplier.
    speed: AtomicU32,

    /// Upper bound for `speed`.
    max_speed: u32,

    /// Wakes the player loop after any request.
    changed: Notify,

    /// Seek target not yet picked up by the player.
    pending_seek: Mutex<Option<u64>>,

    /// Wall-clock time the control was created.
    started_at: DateTime<Utc>,

    /// Reason the run ended, once it has.
    end_reason: Mutex<Option<EndReason>>,
}

impl PlaybackControl {
    /// Create control state at the configured default speed.
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            speed: AtomicU32::new(config.default_speed),
            max_speed: config.max_speed,
            changed: Notify::new(),
            pending_seek: Mutex::new(None),
            started_at: Utc::now(),
            end_reason: Mutex::new(None),
        }
    }

    /// Wait until any request arrives. A request made while nobody was
    /// waiting is remembered and completes the next wait immediately.
    pub async fn changed(&self) {
        self.changed.notified().await;
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether playback is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause playback.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
        self.changed.notify_one();
    }

    /// Resume playback.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.changed.notify_one();
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.changed.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record the reason the run ended.
    pub async fn set_end_reason(&self, reason: EndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// The reason the run ended, if it has.
    pub async fn end_reason(&self) -> Option<EndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Speed
    // -----------------------------------------------------------------------

    /// Requested speed multiplier.
    pub fn speed(&self) -> u32 {
        self.speed.load(Ordering::Acquire)
    }

    /// Request a new speed multiplier. Returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidSpeed`] for zero or values above the
    /// configured maximum; the current speed is kept.
    pub fn set_speed(&self, speed: u32) -> Result<u32, ClockError> {
        let speed = PlaybackSpeed::new(speed, self.max_speed)?;
        let prev = self.speed.swap(speed.get(), Ordering::AcqRel);
        self.changed.notify_one();
        Ok(prev)
    }

    // -----------------------------------------------------------------------
    // Seek
    // -----------------------------------------------------------------------

    /// Request a jump to `tick`. A later request replaces an earlier one
    /// the player has not picked up yet.
    pub async fn request_seek(&self, tick: u64) {
        let mut guard = self.pending_seek.lock().await;
        *guard = Some(tick);
        drop(guard);
        self.changed.notify_one();
    }

    /// Take the pending seek target, if any.
    pub async fn take_seek(&self) -> Option<u64> {
        self.pending_seek.lock().await.take()
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
