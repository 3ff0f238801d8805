//! State projections: reducers folding replay events into read models.
//!
//! Each projection owns one slice of derived state and reacts only to the
//! event types it targets; every other event is a no-op for it. The
//! [`Projections`] bundle applies an event to all of them and records
//! which ones changed.
//!
//! All timestamps inside projections are scenario milliseconds
//! (`tick * tick_interval_ms`), never wall-clock time, so replaying the
//! same prefix always produces the same state.

pub mod act;
pub mod edges;
pub mod feed;
pub mod nodes;
pub mod spawn;
pub mod stats;

use std::collections::BTreeSet;

use orgreplay_types::{ActCatalog, FocusIntent, ProjectionKind, ReplayEvent};

use crate::config::ProjectionConfig;

pub use act::ActProjection;
pub use edges::EdgeProjection;
pub use feed::FeedProjection;
pub use nodes::NodeProjection;
pub use spawn::SpawnProjection;
pub use stats::{StatRegression, StatsProjection};

/// Where an event sits on the timeline when it is applied.
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    /// Absolute position of the event in the timeline.
    pub index: usize,
    /// Event tick converted to scenario milliseconds.
    pub scenario_ms: u64,
    /// Act names and narratives.
    pub catalog: &'a ActCatalog,
}

/// Side outputs of applying events, collected across one dispatch cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    /// Cumulative stat updates that tried to go backwards.
    pub regressions: Vec<StatRegression>,
    /// Latest focus intent raised by a growing spawn pool.
    pub focus: Option<FocusIntent>,
    /// Edge pulses dropped for exceeding their TTL.
    pub pruned_edges: usize,
}

/// A reducer over replay events.
pub trait Projection {
    /// Which projection this is.
    fn kind(&self) -> ProjectionKind;

    /// Fold one event into the state. Returns `true` if the state changed.
    ///
    /// Events this projection does not target must leave it untouched and
    /// return `false`.
    fn apply(&mut self, event: &ReplayEvent, ctx: &EventContext<'_>, effects: &mut Effects) -> bool;
}

/// The full set of projections driven by one dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projections {
    /// Per-participant status.
    pub nodes: NodeProjection,
    /// Edge pulses and reassigned edges.
    pub edges: EdgeProjection,
    /// Spawned participants.
    pub spawn: SpawnProjection,
    /// Aggregate statistics.
    pub stats: StatsProjection,
    /// Narrative act.
    pub act: ActProjection,
    /// Live feed lines.
    pub feed: FeedProjection,
}

impl Projections {
    /// Fresh projections in their initial state.
    pub fn new(config: &ProjectionConfig, catalog: &ActCatalog) -> Self {
        Self {
            nodes: NodeProjection::new(),
            edges: EdgeProjection::new(config.edge_ttl_ms),
            spawn: SpawnProjection::new(config.focus_expiry_ms),
            stats: StatsProjection::new(
                config.cumulative_stats.clone(),
                config.allow_cumulative_regression,
            ),
            act: ActProjection::new(catalog),
            feed: FeedProjection::new(),
        }
    }

    /// Apply one event to every projection, adding the kinds that changed
    /// to `touched`.
    pub fn apply(
        &mut self,
        event: &ReplayEvent,
        ctx: &EventContext<'_>,
        effects: &mut Effects,
        touched: &mut BTreeSet<ProjectionKind>,
    ) {
        let reducers: [&mut dyn Projection; 6] = [
            &mut self.nodes,
            &mut self.edges,
            &mut self.spawn,
            &mut self.stats,
            &mut self.act,
            &mut self.feed,
        ];
        for reducer in reducers {
            if reducer.apply(event, ctx, effects) {
                touched.insert(reducer.kind());
            }
        }
    }
}
