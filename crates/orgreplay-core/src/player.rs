//! Player loop: the single timer driving clock, dispatcher and render sink.
//!
//! [`Player::run`] owns every timer of a playback run:
//!
//! - **Tick interval**: each elapsed `tick_interval_ms` moves the clock
//!   forward by `speed` ticks and dispatches the crossed range
//! - **Frame coalescing**: the first change arms a `coalesce_window_ms`
//!   window, one frame is emitted when it closes; pause, seek and finish
//!   flush immediately
//! - **Focus debounce**: the latest [`FocusIntent`] schedules one expiry,
//!   restarted by every further raise and cancelled by pause, seek, stop
//!   and finish
//!
//! All deadlines live inside one `tokio::select!`. Nothing is spawned, so
//! returning from `run` drops every pending timer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use orgreplay_types::FocusIntent;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{ClockError, ClockSignal, ClockState, PlaybackClock};
use crate::config::ReplayConfig;
use crate::control::{EndReason, PlaybackControl};
use crate::dispatcher::{AdvanceReport, DispatchError, Dispatcher, ReplayFrame};
use crate::projection::StatRegression;

/// Errors that can occur during a playback run.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// The dispatcher rejected a target tick.
    #[error("dispatch error: {source}")]
    Dispatch {
        /// The underlying dispatch error.
        #[from]
        source: DispatchError,
    },

    /// The clock rejected a control request.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Receives frames and focus notifications from the player.
///
/// Sinks only ever see owned copies of projection state.
pub trait RenderSink: Send {
    /// Called with each coalesced frame.
    fn on_frame(&mut self, frame: &ReplayFrame);

    /// Called when the spawn pool raises a focus intent.
    fn on_focus_raised(&mut self, _intent: &FocusIntent) {}

    /// Called once when a focus intent's debounce elapses without being
    /// re-raised or cancelled.
    fn on_focus_expired(&mut self, intent: &FocusIntent);
}

/// A sink that ignores everything.
pub struct NoOpSink;

impl RenderSink for NoOpSink {
    fn on_frame(&mut self, _frame: &ReplayFrame) {}

    fn on_focus_expired(&mut self, _intent: &FocusIntent) {}
}

/// Outcome of a playback run.
#[derive(Debug, Clone)]
pub struct PlaybackResult {
    /// Identifier of this run, for log correlation.
    pub run_id: Uuid,
    /// Wall-clock start time.
    pub started_at: DateTime<Utc>,
    /// Why the run ended.
    pub end_reason: EndReason,
    /// Clock cursor when the run ended.
    pub final_tick: u64,
    /// Frames handed to the sink.
    pub frames_emitted: u64,
    /// Events applied, counting seek replays.
    pub events_applied: u64,
    /// Focus expiries delivered to the sink.
    pub focus_expirations: u64,
    /// Cumulative stat regressions met during forward playback.
    pub regressions: Vec<StatRegression>,
}

/// Per-run counters and pending deadlines.
struct RunState {
    run_id: Uuid,
    frames_emitted: u64,
    events_applied: u64,
    focus_expirations: u64,
    regressions: Vec<StatRegression>,
    next_tick: Option<Instant>,
    frame_due: Option<Instant>,
    focus: Option<(FocusIntent, Instant)>,
}

impl RunState {
    fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            frames_emitted: 0,
            events_applied: 0,
            focus_expirations: 0,
            regressions: Vec::new(),
            next_tick: None,
            frame_due: None,
            focus: None,
        }
    }

    fn focus_deadline(&self) -> Option<Instant> {
        self.focus.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Drop a pending focus. A frame is queued so the sink sees it cleared.
    fn cancel_focus(&mut self, why: &str) {
        if let Some((intent, _)) = self.focus.take() {
            debug!(pool_size = intent.pool_size, why, "Focus cancelled");
            self.frame_due.get_or_insert_with(Instant::now);
        }
    }
}

/// Drives one dispatcher through a playback run.
#[derive(Debug)]
pub struct Player {
    dispatcher: Dispatcher,
    clock: PlaybackClock,
    control: Arc<PlaybackControl>,
    tick_interval: Duration,
    coalesce_window: Duration,
}

impl Player {
    /// Create a player. The end tick is `playback.end_tick` or, when
    /// unset, the last tick of the dispatcher's timeline.
    pub fn new(dispatcher: Dispatcher, config: &ReplayConfig, control: Arc<PlaybackControl>) -> Self {
        let end_tick = config
            .playback
            .end_tick
            .or_else(|| dispatcher.timeline().last_tick())
            .unwrap_or(0);
        Self {
            clock: PlaybackClock::new(end_tick, config.playback.max_speed),
            dispatcher,
            control,
            tick_interval: Duration::from_millis(config.playback.tick_interval_ms),
            coalesce_window: Duration::from_millis(config.render.coalesce_window_ms),
        }
    }

    /// Play from tick 0 until the end tick is reached or a stop is
    /// requested.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Clock`] if the requested speed is invalid,
    /// or [`PlayerError::Dispatch`] if the dispatcher rejects a target.
    pub async fn run(&mut self, sink: &mut dyn RenderSink) -> Result<PlaybackResult, PlayerError> {
        let control = Arc::clone(&self.control);
        let mut run = RunState::new();

        info!(
            run_id = %run.run_id,
            end_tick = self.clock.end_tick(),
            speed = control.speed(),
            tick_interval_ms = u64::try_from(self.tick_interval.as_millis()).unwrap_or(u64::MAX),
            events = self.dispatcher.timeline().len(),
            "Playback starting"
        );

        let signal = self.clock.start(control.speed())?;
        self.execute(signal, &mut run, sink)?;
        run.next_tick = Instant::now().checked_add(self.tick_interval);

        loop {
            if control.is_stop_requested() {
                info!(tick = self.clock.cursor(), "Stop requested");
                return Ok(self.finish(EndReason::Stopped, run, sink).await);
            }

            if let Some(target) = control.take_seek().await {
                let signal = self.clock.seek(target);
                info!(requested = target, tick = self.clock.cursor(), "Seek");
                self.execute(signal, &mut run, sink)?;
            }

            self.sync_speed();
            self.sync_pause(&mut run, sink);

            if self.clock.state() == ClockState::Finished {
                return Ok(self.finish(EndReason::Finished, run, sink).await);
            }

            tokio::select! {
                biased;
                () = control.changed() => {}
                () = sleep_until(run.focus_deadline()) => {
                    if let Some((intent, _)) = run.focus.take() {
                        debug!(pool_size = intent.pool_size, "Focus expired");
                        sink.on_focus_expired(&intent);
                        run.focus_expirations = run.focus_expirations.saturating_add(1);
                        if run.frame_due.is_none() {
                            run.frame_due = Instant::now().checked_add(self.coalesce_window);
                        }
                    }
                }
                () = sleep_until(run.frame_due) => {
                    self.emit_frame(&mut run, sink);
                }
                () = sleep_until(run.next_tick) => {
                    run.next_tick = run
                        .next_tick
                        .and_then(|deadline| deadline.checked_add(self.tick_interval));
                    let signal = self.clock.on_interval();
                    self.execute(signal, &mut run, sink)?;
                }
            }
        }
    }

    /// The dispatcher and its projections.
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The playback clock.
    pub const fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Shared control state.
    pub fn control(&self) -> Arc<PlaybackControl> {
        Arc::clone(&self.control)
    }

    fn execute(
        &mut self,
        signal: ClockSignal,
        run: &mut RunState,
        sink: &mut dyn RenderSink,
    ) -> Result<(), PlayerError> {
        match signal {
            ClockSignal::Hold => {}
            ClockSignal::Advance { to } | ClockSignal::Finished { to } => {
                let report = self.dispatcher.advance(to)?;
                self.absorb(report, run, sink);
            }
            ClockSignal::FullReplay { target } => {
                let report = self.dispatcher.seek(target)?;
                run.events_applied = run.events_applied.saturating_add(count(report.applied));
                run.cancel_focus("seek");
                self.emit_frame(run, sink);
            }
        }
        Ok(())
    }

    fn absorb(&self, report: AdvanceReport, run: &mut RunState, sink: &mut dyn RenderSink) {
        run.events_applied = run.events_applied.saturating_add(count(report.applied));
        let changed = report.changed();
        run.regressions.extend(report.regressions);

        if let Some(intent) = report.focus {
            sink.on_focus_raised(&intent);
            let deadline = Instant::now().checked_add(Duration::from_millis(intent.expires_after_ms));
            debug!(
                pool_size = intent.pool_size,
                tick = intent.raised_at_tick,
                expires_after_ms = intent.expires_after_ms,
                "Focus raised"
            );
            run.focus = deadline.map(|deadline| (intent, deadline));
        }

        if changed && run.frame_due.is_none() {
            run.frame_due = Instant::now().checked_add(self.coalesce_window);
        }
    }

    fn sync_speed(&mut self) {
        let requested = self.control.speed();
        if requested == self.clock.speed().get() {
            return;
        }
        match self.clock.set_speed(requested) {
            Ok(prev) => info!(from = %prev, to = %self.clock.speed(), "Speed changed"),
            Err(e) => warn!(error = %e, "Speed change rejected"),
        }
    }

    fn sync_pause(&mut self, run: &mut RunState, sink: &mut dyn RenderSink) {
        if self.control.is_paused() {
            if self.clock.pause() {
                run.next_tick = None;
                run.cancel_focus("pause");
                self.flush(run, sink);
                info!(tick = self.clock.cursor(), "Playback paused");
            }
        } else if self.clock.resume() {
            run.next_tick = Instant::now().checked_add(self.tick_interval);
            info!(tick = self.clock.cursor(), "Playback resumed");
        }
    }

    fn flush(&self, run: &mut RunState, sink: &mut dyn RenderSink) {
        if run.frame_due.is_some() {
            self.emit_frame(run, sink);
        }
    }

    fn emit_frame(&self, run: &mut RunState, sink: &mut dyn RenderSink) {
        run.frame_due = None;
        let mut frame = self.dispatcher.frame();
        frame.focus = run.focus.as_ref().map(|(intent, _)| intent.clone());
        sink.on_frame(&frame);
        run.frames_emitted = run.frames_emitted.saturating_add(1);
    }

    async fn finish(
        &self,
        reason: EndReason,
        mut run: RunState,
        sink: &mut dyn RenderSink,
    ) -> PlaybackResult {
        run.cancel_focus("end");
        run.next_tick = None;
        self.flush(&mut run, sink);
        self.control.set_end_reason(reason).await;
        PlaybackResult {
            run_id: run.run_id,
            started_at: self.control.started_at(),
            end_reason: reason,
            final_tick: self.clock.cursor(),
            frames_emitted: run.frames_emitted,
            events_applied: run.events_applied,
            focus_expirations: run.focus_expirations,
            regressions: run.regressions,
        }
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

/// Log the end of a playback run.
pub fn log_playback_end(result: &PlaybackResult) {
    info!(
        run_id = %result.run_id,
        reason = ?result.end_reason,
        final_tick = result.final_tick,
        frames = result.frames_emitted,
        events = result.events_applied,
        focus_expirations = result.focus_expirations,
        "Playback ended"
    );

    if !result.regressions.is_empty() {
        warn!(
            count = result.regressions.len(),
            "Playback met cumulative stat regressions"
        );
    }
}
