//! Spawn pool projection.
//!
//! Tracks temporary participants created by `spawn` and removed by
//! `despawn`. Growth of the pool raises a [`FocusIntent`] as a side
//! output only; the pool keeps no record of it. Turning intents into a
//! debounced timer is the player's job.

use orgreplay_types::{
    EventBody, FocusIntent, ParticipantId, PoolAggregates, ProjectionKind, ReplayEvent,
    SpawnedAgent,
};
use rust_decimal::Decimal;
use tracing::warn;

use super::nodes::NodeProjection;
use super::{Effects, EventContext, Projection};

/// Spawned participants in spawn order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnProjection {
    focus_expiry_ms: u64,
    agents: Vec<SpawnedAgent>,
}

impl SpawnProjection {
    /// Empty pool whose focus intents expire after `focus_expiry_ms`.
    pub fn new(focus_expiry_ms: u64) -> Self {
        Self {
            focus_expiry_ms,
            ..Self::default()
        }
    }

    /// Pool members in spawn order.
    pub fn agents(&self) -> &[SpawnedAgent] {
        &self.agents
    }

    /// Whether a participant is currently in the pool.
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.agents.iter().any(|agent| &agent.id == id)
    }

    /// Number of pool members.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Pool size and the fraction of members working or busy.
    pub fn aggregates(&self, nodes: &NodeProjection) -> PoolAggregates {
        let count = self.agents.len();
        let productive = self
            .agents
            .iter()
            .filter(|agent| nodes.status(&agent.id).is_productive())
            .count();
        let throughput = Decimal::from(productive)
            .checked_div(Decimal::from(count))
            .unwrap_or(Decimal::ZERO)
            .round_dp(4);
        PoolAggregates {
            count: u64::try_from(count).unwrap_or(u64::MAX),
            throughput,
        }
    }
}

impl Projection for SpawnProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::SpawnPool
    }

    fn apply(&mut self, event: &ReplayEvent, _ctx: &EventContext<'_>, effects: &mut Effects) -> bool {
        match &event.body {
            EventBody::Spawn(data) => {
                let agent = &data.spawn_agent;
                if self.contains(&agent.id) {
                    warn!(tick = event.tick, agent = %agent.id, "Duplicate spawn ignored");
                    return false;
                }
                self.agents.push(agent.clone());
                effects.focus = Some(FocusIntent {
                    pool_size: u64::try_from(self.agents.len()).unwrap_or(u64::MAX),
                    raised_at_tick: event.tick,
                    expires_after_ms: self.focus_expiry_ms,
                });
                true
            }
            EventBody::Despawn(data) => {
                let before = self.agents.len();
                self.agents.retain(|agent| agent.id != data.agent);
                if self.agents.len() == before {
                    warn!(tick = event.tick, agent = %data.agent, "Despawn of unknown agent ignored");
                    return false;
                }
                true
            }
            EventBody::Message(_)
            | EventBody::Delegation(_)
            | EventBody::Escalation(_)
            | EventBody::Completion(_)
            | EventBody::Reassign(_)
            | EventBody::StatUpdate(_)
            | EventBody::ActChange(_)
            | EventBody::NodeStatus(_) => false,
        }
    }
}
