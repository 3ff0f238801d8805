//! Playback clock: maps wall-clock intervals onto a virtual tick cursor.
//!
//! The clock owns no timer. Whoever drives it (the [`Player`]) sleeps for
//! one tick interval and then calls [`PlaybackClock::on_interval`]; the
//! clock answers with a [`ClockSignal`] telling the driver what to hand
//! the dispatcher.
//!
//! # Design Principles
//!
//! - The cursor only moves forward during normal playback, by exactly
//!   `speed` ticks per interval, and never past `end_tick`.
//! - `seek` never interpolates. It repositions the cursor and requests a
//!   full replay, so seeking is as deterministic as playing.
//!
//! [`Player`]: crate::player::Player

use serde::{Deserialize, Serialize};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Speed multiplier outside `1..=max`.
    #[error("invalid speed {speed}: must be between 1 and {max}")]
    InvalidSpeed {
        /// Rejected multiplier.
        speed: u32,
        /// Highest accepted multiplier.
        max: u32,
    },
}

/// Validated speed multiplier: virtual ticks per wall-clock interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlaybackSpeed(u32);

impl PlaybackSpeed {
    /// Normal speed.
    pub const NORMAL: Self = Self(1);

    /// Validate a multiplier against the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidSpeed`] for zero or values above `max`.
    pub const fn new(speed: u32, max: u32) -> Result<Self, ClockError> {
        if speed == 0 || speed > max {
            return Err(ClockError::InvalidSpeed { speed, max });
        }
        Ok(Self(speed))
    }

    /// The raw multiplier.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Run state of the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    /// Not started yet.
    #[default]
    Stopped,
    /// Advancing on every interval.
    Running,
    /// Holding the cursor; intervals are ignored.
    Paused,
    /// The cursor reached `end_tick`.
    Finished,
}

/// What the driver should do after a clock operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    /// Nothing to dispatch.
    Hold,
    /// Dispatch events up to `to`.
    Advance {
        /// New cursor.
        to: u64,
    },
    /// Dispatch events up to `to`, then stop: the end was reached.
    Finished {
        /// Final cursor (`end_tick`).
        to: u64,
    },
    /// Discard all projection state and replay from tick 0 to `target`.
    FullReplay {
        /// Cursor after the seek.
        target: u64,
    },
}

/// Virtual tick cursor with speed, pause, and seek.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackClock {
    /// Current tick.
    cursor: u64,
    /// Last tick of the scenario.
    end_tick: u64,
    /// Ticks per interval.
    speed: PlaybackSpeed,
    /// Upper bound for `set_speed`.
    max_speed: u32,
    /// Run state.
    state: ClockState,
}

impl PlaybackClock {
    /// Create a stopped clock at tick 0.
    pub const fn new(end_tick: u64, max_speed: u32) -> Self {
        Self {
            cursor: 0,
            end_tick,
            speed: PlaybackSpeed::NORMAL,
            max_speed,
            state: ClockState::Stopped,
        }
    }

    /// Start (or restart) playback from tick 0 at the given speed.
    ///
    /// Returns a [`ClockSignal::FullReplay`] to tick 0 so any previous
    /// run's state is discarded and tick-0 events are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidSpeed`] if `speed` is out of range.
    pub fn start(&mut self, speed: u32) -> Result<ClockSignal, ClockError> {
        self.speed = PlaybackSpeed::new(speed, self.max_speed)?;
        self.cursor = 0;
        self.state = ClockState::Running;
        Ok(ClockSignal::FullReplay { target: 0 })
    }

    /// Pause playback. Returns `false` if the clock was not running.
    pub fn pause(&mut self) -> bool {
        if self.state != ClockState::Running {
            return false;
        }
        self.state = ClockState::Paused;
        true
    }

    /// Resume after [`pause`](Self::pause). The next interval continues
    /// from the held cursor, skipping nothing. Returns `false` if the
    /// clock was not paused.
    pub fn resume(&mut self) -> bool {
        if self.state != ClockState::Paused {
            return false;
        }
        self.state = ClockState::Running;
        true
    }

    /// Reposition the cursor (clamped to `end_tick`) and request a full
    /// replay. The run state is kept, except that a finished clock
    /// seeking before the end becomes paused.
    pub fn seek(&mut self, tick: u64) -> ClockSignal {
        self.cursor = tick.min(self.end_tick);
        if self.state == ClockState::Finished && self.cursor < self.end_tick {
            self.state = ClockState::Paused;
        }
        ClockSignal::FullReplay {
            target: self.cursor,
        }
    }

    /// Change the speed multiplier. Returns the previous speed.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidSpeed`] if `speed` is out of range; the
    /// current speed is kept.
    pub fn set_speed(&mut self, speed: u32) -> Result<PlaybackSpeed, ClockError> {
        let next = PlaybackSpeed::new(speed, self.max_speed)?;
        Ok(core::mem::replace(&mut self.speed, next))
    }

    /// Called by the driver once per elapsed tick interval.
    pub fn on_interval(&mut self) -> ClockSignal {
        if self.state != ClockState::Running {
            return ClockSignal::Hold;
        }
        self.cursor = self
            .cursor
            .saturating_add(u64::from(self.speed.get()))
            .min(self.end_tick);
        if self.cursor >= self.end_tick {
            self.state = ClockState::Finished;
            return ClockSignal::Finished { to: self.cursor };
        }
        ClockSignal::Advance { to: self.cursor }
    }

    /// Current tick.
    pub const fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Last tick of the scenario.
    pub const fn end_tick(&self) -> u64 {
        self.end_tick
    }

    /// Current speed.
    pub const fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    /// Current run state.
    pub const fn state(&self) -> ClockState {
        self.state
    }

    /// Whether the clock advances on intervals.
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }
}
