//! The timeline store: an ordered, append-only script of replay events.
//!
//! Ticks never go backwards inside a [`Timeline`]. Ranges of due events
//! are located by binary search, so a dispatcher polling at low frequency
//! costs `O(log n)` per cycle plus the events it actually applies.

use orgreplay_types::ReplayEvent;
use tracing::warn;

use crate::config::TickOrdering;

/// Errors raised while building or extending a timeline.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// An event's tick is lower than the tick of the event before it.
    #[error("event {index} at tick {tick} follows an event at tick {previous}")]
    OutOfOrder {
        /// Position of the offending event.
        index: usize,
        /// Its tick.
        tick: u64,
        /// Tick of the preceding event.
        previous: u64,
    },

    /// The JSON input is not a list of replay events.
    #[error("failed to parse timeline JSON: {source}")]
    Json {
        /// The underlying parse error.
        #[from]
        source: serde_json::Error,
    },
}

/// Immutable, tick-ordered sequence of replay events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    events: Vec<ReplayEvent>,
}

impl Timeline {
    /// Build a timeline, enforcing tick monotonicity according to `ordering`.
    ///
    /// With [`TickOrdering::StableSort`] the events are sorted by tick and
    /// events sharing a tick keep their authored order.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::OutOfOrder`] for the first violation when
    /// `ordering` is [`TickOrdering::Reject`].
    pub fn new(mut events: Vec<ReplayEvent>, ordering: TickOrdering) -> Result<Self, TimelineError> {
        if let Some((index, tick, previous)) = first_violation(&events) {
            match ordering {
                TickOrdering::Reject => {
                    return Err(TimelineError::OutOfOrder {
                        index,
                        tick,
                        previous,
                    });
                }
                TickOrdering::StableSort => {
                    warn!(index, tick, previous, "Timeline out of order, stable-sorting by tick");
                    events.sort_by_key(|event| event.tick);
                }
            }
        }
        Ok(Self { events })
    }

    /// Parse a JSON array of events.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Json`] on malformed input, or the same
    /// errors as [`Timeline::new`].
    pub fn from_json(json: &str, ordering: TickOrdering) -> Result<Self, TimelineError> {
        let events: Vec<ReplayEvent> = serde_json::from_str(json)?;
        Self::new(events, ordering)
    }

    /// Append one event to the end of the script.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::OutOfOrder`] if the event's tick is below
    /// the current last tick.
    pub fn append(&mut self, event: ReplayEvent) -> Result<(), TimelineError> {
        if let Some(previous) = self.last_tick() {
            if event.tick < previous {
                return Err(TimelineError::OutOfOrder {
                    index: self.events.len(),
                    tick: event.tick,
                    previous,
                });
            }
        }
        self.events.push(event);
        Ok(())
    }

    /// Events with `after < tick <= up_to`, in timeline order, together
    /// with the absolute index of the first returned event.
    ///
    /// `after == None` means nothing has been applied yet, so events at
    /// tick 0 are included.
    pub fn due(&self, after: Option<u64>, up_to: u64) -> (usize, &[ReplayEvent]) {
        let start = after.map_or(0, |after| self.events.partition_point(|e| e.tick <= after));
        let end = self.events.partition_point(|e| e.tick <= up_to);
        let slice = self.events.get(start..end).unwrap_or_default();
        (start, slice)
    }

    /// Tick of the last event, if any.
    pub fn last_tick(&self) -> Option<u64> {
        self.events.last().map(|event| event.tick)
    }

    /// All events in order.
    pub fn events(&self) -> &[ReplayEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the timeline has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// First `(index, tick, previous)` where the tick decreases.
fn first_violation(events: &[ReplayEvent]) -> Option<(usize, u64, u64)> {
    events
        .windows(2)
        .enumerate()
        .find_map(|(i, pair)| match pair {
            [prev, next] if next.tick < prev.tick => {
                Some((i.saturating_add(1), next.tick, prev.tick))
            }
            _ => None,
        })
}
