//! Event dispatcher: applies due timeline ranges to the projections.
//!
//! The dispatcher keeps a `last_applied` watermark. [`Dispatcher::advance`]
//! applies every event in `(last_applied, to_tick]` in timeline order and
//! moves the watermark; nothing is ever applied twice and nothing due is
//! ever skipped, however rarely the caller polls. Going backwards is only
//! possible through [`Dispatcher::seek`], which rebuilds all projections
//! from tick 0 through the same `advance` path.

use std::collections::{BTreeMap, BTreeSet};

use orgreplay_types::{
    ActCatalog, ActState, EdgeAnimation, FeedMessage, FocusIntent, NodeState, ParticipantId,
    PoolAggregates, ProjectionKind, ReassignedEdge, SpawnedAgent, StatsSnapshot,
};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::debug;

use crate::config::ProjectionConfig;
use crate::projection::{Effects, EventContext, Projections, StatRegression};
use crate::timeline::Timeline;

/// Errors that can occur while dispatching.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The target tick is below the watermark; use `seek` instead.
    #[error("cannot advance to tick {requested}: already applied up to tick {applied}")]
    Rewind {
        /// Tick passed to `advance`.
        requested: u64,
        /// Current watermark.
        applied: u64,
    },
}

/// What one `advance` call did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvanceReport {
    /// Watermark before the call.
    pub from: Option<u64>,
    /// Watermark after the call.
    pub to: u64,
    /// Number of events applied.
    pub applied: usize,
    /// Projections whose state changed.
    pub touched: BTreeSet<ProjectionKind>,
    /// Cumulative stat regressions detected.
    pub regressions: Vec<StatRegression>,
    /// Latest focus intent raised in this range.
    pub focus: Option<FocusIntent>,
    /// Edge pulses pruned for age.
    pub pruned_edges: usize,
}

impl AdvanceReport {
    /// Whether any projection changed.
    pub fn changed(&self) -> bool {
        !self.touched.is_empty()
    }
}

/// Read-only copy of every projection at one watermark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayFrame {
    /// Watermark the frame reflects. `None` before anything was applied.
    pub tick: Option<u64>,
    /// Status per tracked participant, with the queue badge folded in.
    pub nodes: BTreeMap<ParticipantId, NodeState>,
    /// Live edge pulses, oldest first.
    pub edges: Vec<EdgeAnimation>,
    /// Durable reassigned edges.
    pub reassigned_edges: Vec<ReassignedEdge>,
    /// Spawn pool members in spawn order.
    pub spawned: Vec<SpawnedAgent>,
    /// Pool size and throughput.
    pub pool: PoolAggregates,
    /// Focus intent whose debounce is still pending. Projections keep no
    /// focus state, so [`Dispatcher::frame`] leaves this `None`; the
    /// player fills it in while its focus timer runs.
    pub focus: Option<FocusIntent>,
    /// Aggregate statistics.
    pub stats: StatsSnapshot,
    /// Current act.
    pub act: ActState,
    /// Feed lines, oldest first.
    pub feed: Vec<FeedMessage>,
}

/// Owns the projections and feeds them due events.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    timeline: Timeline,
    catalog: ActCatalog,
    config: ProjectionConfig,
    tick_interval_ms: u64,
    projections: Projections,
    last_applied: Option<u64>,
}

impl Dispatcher {
    /// Create a dispatcher with fresh projections and no watermark.
    pub fn new(
        timeline: Timeline,
        catalog: ActCatalog,
        config: ProjectionConfig,
        tick_interval_ms: u64,
    ) -> Self {
        let projections = Projections::new(&config, &catalog);
        Self {
            timeline,
            catalog,
            config,
            tick_interval_ms,
            projections,
            last_applied: None,
        }
    }

    /// Apply every event with `last_applied < tick <= to_tick`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Rewind`] if `to_tick` is below the
    /// watermark.
    pub fn advance(&mut self, to_tick: u64) -> Result<AdvanceReport, DispatchError> {
        if let Some(applied) = self.last_applied {
            if to_tick < applied {
                return Err(DispatchError::Rewind {
                    requested: to_tick,
                    applied,
                });
            }
        }

        let from = self.last_applied;
        let mut effects = Effects::default();
        let mut touched = BTreeSet::new();
        let (start, due) = self.timeline.due(from, to_tick);

        for (offset, event) in due.iter().enumerate() {
            let ctx = EventContext {
                index: start.saturating_add(offset),
                scenario_ms: self.scenario_ms(event.tick),
                catalog: &self.catalog,
            };
            self.projections.apply(event, &ctx, &mut effects, &mut touched);
        }

        let pruned = self.projections.edges.prune(self.scenario_ms(to_tick));
        if pruned > 0 {
            touched.insert(ProjectionKind::Edges);
        }
        effects.pruned_edges = effects.pruned_edges.saturating_add(pruned);
        self.last_applied = Some(to_tick);

        let report = AdvanceReport {
            from,
            to: to_tick,
            applied: due.len(),
            touched,
            regressions: effects.regressions,
            focus: effects.focus,
            pruned_edges: effects.pruned_edges,
        };
        debug!(
            from = ?report.from,
            to = report.to,
            applied = report.applied,
            pruned_edges = report.pruned_edges,
            "Advanced"
        );
        Ok(report)
    }

    /// Reset every projection and replay from tick 0 up to `tick`.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the error type is shared with
    /// [`advance`](Self::advance).
    pub fn seek(&mut self, tick: u64) -> Result<AdvanceReport, DispatchError> {
        self.projections = Projections::new(&self.config, &self.catalog);
        self.last_applied = None;
        self.advance(tick)
    }

    /// Snapshot every projection into an owned frame.
    pub fn frame(&self) -> ReplayFrame {
        let p = &self.projections;
        let mut nodes: BTreeMap<ParticipantId, NodeState> = p
            .nodes
            .tracked()
            .iter()
            .map(|(id, &status)| {
                (
                    id.clone(),
                    NodeState {
                        status,
                        queue_badge: None,
                    },
                )
            })
            .collect();

        if let Some(owner) = &self.config.queue_owner {
            let queue = p
                .stats
                .snapshot()
                .get(&self.config.queue_stat)
                .and_then(|value| value.trunc().to_u64())
                .filter(|&value| value > 0);
            if let Some(queue) = queue {
                let owner = ParticipantId::new(owner.as_str());
                let status = p.nodes.status(&owner);
                nodes
                    .entry(owner)
                    .or_insert(NodeState {
                        status,
                        queue_badge: None,
                    })
                    .queue_badge = Some(queue);
            }
        }

        ReplayFrame {
            tick: self.last_applied,
            nodes,
            edges: p.edges.animations(),
            reassigned_edges: p.edges.reassigned().to_vec(),
            spawned: p.spawn.agents().to_vec(),
            pool: p.spawn.aggregates(&p.nodes),
            focus: None,
            stats: p.stats.snapshot().clone(),
            act: p.act.state().clone(),
            feed: p.feed.messages().to_vec(),
        }
    }

    /// Current watermark.
    pub const fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }

    /// The script being played.
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Live projection state.
    pub const fn projections(&self) -> &Projections {
        &self.projections
    }

    /// Milliseconds per tick.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    fn scenario_ms(&self, tick: u64) -> u64 {
        tick.saturating_mul(self.tick_interval_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orgreplay_types::{
        ActDef, EventBody, NodeStatus, NodeStatusData, ReplayEvent, SpawnData, StatUpdateData,
        TransferData,
    };
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::TickOrdering;

    fn timeline() -> Timeline {
        let events = vec![
            ReplayEvent::new(0, EventBody::Message(TransferData::said("plankton", "order"))),
            ReplayEvent::new(
                2,
                EventBody::NodeStatus(NodeStatusData {
                    agent: ParticipantId::new("mr-krabs"),
                    status: NodeStatus::Working,
                }),
            ),
            ReplayEvent::new(
                4,
                EventBody::Delegation(TransferData::between("mr-krabs", "spongebob-squarepants", "go")),
            ),
            ReplayEvent::new(
                5,
                EventBody::StatUpdate(StatUpdateData::from_pairs([("queueSize", dec!(1450))])),
            ),
            ReplayEvent::new(
                6,
                EventBody::Spawn(SpawnData {
                    spawn_agent: SpawnedAgent {
                        id: ParticipantId::new("sous-chef-1"),
                        parent_id: ParticipantId::new("spongebob-squarepants"),
                        name: "Sous Chef #1".to_owned(),
                        emoji: "⭐".to_owned(),
                        avatar_url: None,
                    },
                }),
            ),
        ];
        Timeline::new(events, TickOrdering::Reject).unwrap()
    }

    fn dispatcher(config: ProjectionConfig) -> Dispatcher {
        let catalog = ActCatalog::new(vec![ActDef {
            name: "Act I".to_owned(),
            narrative: "Start".to_owned(),
        }]);
        Dispatcher::new(timeline(), catalog, config, 500)
    }

    #[test]
    fn first_advance_applies_tick_zero() {
        let mut d = dispatcher(ProjectionConfig::default());
        let report = d.advance(0).unwrap();
        assert_eq!(report.from, None);
        assert_eq!(report.applied, 1);
        assert!(report.touched.contains(&ProjectionKind::Feed));
        assert_eq!(d.last_applied(), Some(0));
    }

    #[test]
    fn advancing_to_the_watermark_applies_nothing() {
        let mut d = dispatcher(ProjectionConfig::default());
        let _ = d.advance(4).unwrap();
        let report = d.advance(4).unwrap();
        assert_eq!(report.applied, 0);
    }

    #[test]
    fn advance_below_watermark_is_a_rewind_error() {
        let mut d = dispatcher(ProjectionConfig::default());
        let _ = d.advance(5).unwrap();
        assert!(matches!(
            d.advance(3),
            Err(DispatchError::Rewind {
                requested: 3,
                applied: 5
            })
        ));
    }

    #[test]
    fn seek_rebuilds_from_scratch() {
        let mut d = dispatcher(ProjectionConfig::default());
        let _ = d.advance(6).unwrap();
        let report = d.seek(2).unwrap();
        assert_eq!(report.applied, 2);
        let frame = d.frame();
        assert!(frame.spawned.is_empty());
        assert_eq!(frame.feed.len(), 1);
        assert_eq!(frame.tick, Some(2));
    }

    #[test]
    fn sparse_polling_loses_nothing() {
        let mut stepwise = dispatcher(ProjectionConfig::default());
        for tick in 0..=6 {
            let _ = stepwise.advance(tick).unwrap();
        }
        let mut jump = dispatcher(ProjectionConfig::default());
        let report = jump.advance(6).unwrap();
        assert_eq!(report.applied, 5);
        assert_eq!(
            serde_json::to_string(&stepwise.frame()).unwrap(),
            serde_json::to_string(&jump.frame()).unwrap()
        );
    }

    #[test]
    fn stale_pulses_are_pruned_at_the_target_tick() {
        let mut d = dispatcher(ProjectionConfig::default());
        let _ = d.advance(4).unwrap();
        assert_eq!(d.frame().edges.len(), 1);
        // Tick 4 pulse is 2000ms; at tick 7 (3500ms) it is 1500ms old.
        // The tick 6 spawn pulse is only 500ms old and survives.
        let report = d.advance(7).unwrap();
        assert_eq!(report.pruned_edges, 1);
        let edges = d.frame().edges;
        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges.first().map(|e| e.to.as_str()),
            Some("sous-chef-1")
        );
    }

    #[test]
    fn a_long_jump_prunes_pulses_no_frame_has_seen() {
        let mut d = dispatcher(ProjectionConfig::default());
        let _ = d.advance(3).unwrap();
        // One interval at high speed: the tick 4 and tick 6 pulses are
        // born and already past their TTL at tick 12 (6000ms).
        let _ = d.advance(12).unwrap();
        let frame = d.frame();
        assert!(frame.edges.is_empty());
        assert_eq!(frame.pool.count, 1);
    }

    #[test]
    fn queue_badge_lands_on_configured_owner() {
        let config = ProjectionConfig {
            queue_owner: Some("squidward-tentacles".to_owned()),
            ..ProjectionConfig::default()
        };
        let mut d = dispatcher(config);
        let _ = d.advance(5).unwrap();
        let frame = d.frame();
        let badge = frame
            .nodes
            .get(&ParticipantId::new("squidward-tentacles"))
            .and_then(|n| n.queue_badge);
        assert_eq!(badge, Some(1450));
        assert_eq!(
            frame
                .nodes
                .get(&ParticipantId::new("squidward-tentacles"))
                .map(|n| n.status),
            Some(NodeStatus::Idle)
        );
    }

    #[test]
    fn spawn_reports_focus_intent() {
        let mut d = dispatcher(ProjectionConfig::default());
        let report = d.advance(6).unwrap();
        let focus = report.focus.unwrap();
        assert_eq!(focus.pool_size, 1);
        assert_eq!(focus.raised_at_tick, 6);
        let frame = d.frame();
        assert_eq!(frame.pool.count, 1);
        assert!(frame.focus.is_none());
    }
}
