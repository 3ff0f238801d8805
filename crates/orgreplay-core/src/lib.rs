//! Timeline, playback clock, dispatcher, projections and player loop for
//! the org replay engine.
//!
//! A scripted timeline of tick-indexed events is walked by a virtual
//! clock; every crossed range is folded into independent projections
//! whose state render adapters read back as frames.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `orgreplay-config.yaml` into
//!   strongly-typed structs.
//! - [`timeline`] -- Immutable, tick-ordered event store.
//! - [`clock`] -- Virtual tick cursor with speed, pause and seek.
//! - [`projection`] -- [`Projection`] trait and the six reducers.
//! - [`dispatcher`] -- Applies due event ranges; snapshots [`ReplayFrame`]s.
//! - [`control`] -- [`PlaybackControl`] shared between the player and its
//!   driver.
//! - [`player`] -- The single timer loop: ticks, frame coalescing, focus
//!   debounce.
//! - [`view`] -- Render adapters (org chart, feed, stats strip, progress).
//!
//! [`Projection`]: projection::Projection
//! [`ReplayFrame`]: dispatcher::ReplayFrame
//! [`PlaybackControl`]: control::PlaybackControl

pub mod clock;
pub mod config;
pub mod control;
pub mod dispatcher;
pub mod player;
pub mod projection;
pub mod timeline;
pub mod view;

pub use clock::{ClockError, ClockSignal, ClockState, PlaybackClock, PlaybackSpeed};
pub use config::{ConfigError, ReplayConfig, TickOrdering};
pub use control::{EndReason, PlaybackControl};
pub use dispatcher::{AdvanceReport, DispatchError, Dispatcher, ReplayFrame};
pub use player::{NoOpSink, PlaybackResult, Player, PlayerError, RenderSink, log_playback_end};
pub use timeline::{Timeline, TimelineError};
