//! Edge animation projection.
//!
//! Transfers between two participants create short-lived pulses. Pulses
//! are grouped in lanes keyed by the unordered participant pair, so
//! traffic in both directions shares one lane. Pulses older than the TTL
//! are pruned before each event and at the end of each dispatch cycle.
//! The TTL is measured in scenario milliseconds, not wall-clock time, so
//! at high playback speeds one dispatch cycle can prune a pulse before
//! any frame carries it to the renderer.
//!
//! Reassign events additionally record a durable [`ReassignedEdge`],
//! which is never pruned.

use std::collections::BTreeMap;

use orgreplay_types::{
    EdgeAnimation, EventBody, ParticipantId, ProjectionKind, ReassignedEdge, ReplayEvent,
};

use super::{Effects, EventContext, Projection};

/// Pulse color for delegation, reassign, and spawn.
pub const COLOR_CYAN: &str = "#22d3ee";
/// Pulse color for escalation.
pub const COLOR_RED: &str = "#ef4444";
/// Pulse color for completion.
pub const COLOR_GREEN: &str = "#22c55e";
/// Pulse color for plain messages.
pub const COLOR_WHITE: &str = "#ffffff";

type LaneKey = (ParticipantId, ParticipantId);

/// In-flight pulses and durable reassigned edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeProjection {
    ttl_ms: u64,
    lanes: BTreeMap<LaneKey, Vec<EdgeAnimation>>,
    reassigned: Vec<ReassignedEdge>,
}

impl EdgeProjection {
    /// Empty projection pruning pulses older than `ttl_ms`.
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            ..Self::default()
        }
    }

    /// Drop pulses whose age at `now_ms` exceeds the TTL and remove empty
    /// lanes. Returns the number of pulses dropped.
    pub fn prune(&mut self, now_ms: u64) -> usize {
        let ttl_ms = self.ttl_ms;
        let mut dropped: usize = 0;
        for pulses in self.lanes.values_mut() {
            let before = pulses.len();
            pulses.retain(|pulse| now_ms.saturating_sub(pulse.timestamp) <= ttl_ms);
            dropped = dropped.saturating_add(before.saturating_sub(pulses.len()));
        }
        self.lanes.retain(|_, pulses| !pulses.is_empty());
        dropped
    }

    /// Pulses travelling between `a` and `b`, in either direction.
    pub fn lane(&self, a: &ParticipantId, b: &ParticipantId) -> &[EdgeAnimation] {
        self.lanes
            .get(&(a.clone(), b.clone()))
            .or_else(|| self.lanes.get(&(b.clone(), a.clone())))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every live pulse, oldest first.
    pub fn animations(&self) -> Vec<EdgeAnimation> {
        let mut all: Vec<EdgeAnimation> = self.lanes.values().flatten().cloned().collect();
        all.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        all
    }

    /// Number of live pulses.
    pub fn len(&self) -> usize {
        self.lanes.values().map(Vec::len).sum()
    }

    /// Whether no pulse is live.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Durable team relations created by reassign events, in creation order.
    pub fn reassigned(&self) -> &[ReassignedEdge] {
        &self.reassigned
    }

    /// Store a pulse in the lane for its pair, reusing a lane keyed in
    /// the opposite direction.
    fn push(&mut self, pulse: EdgeAnimation) {
        let forward = (pulse.from.clone(), pulse.to.clone());
        let key = if self.lanes.contains_key(&forward) {
            forward
        } else {
            let reverse = (pulse.to.clone(), pulse.from.clone());
            if self.lanes.contains_key(&reverse) {
                reverse
            } else {
                forward
            }
        };
        self.lanes.entry(key).or_default().push(pulse);
    }
}

/// Sender, receiver, and color of the pulse an event produces, if any.
fn pulse_route(body: &EventBody) -> Option<(&ParticipantId, &ParticipantId, &'static str)> {
    match body {
        EventBody::Message(data) => data.endpoints().map(|(f, t)| (f, t, COLOR_WHITE)),
        EventBody::Delegation(data) | EventBody::Reassign(data) => {
            data.endpoints().map(|(f, t)| (f, t, COLOR_CYAN))
        }
        EventBody::Escalation(data) => data.endpoints().map(|(f, t)| (f, t, COLOR_RED)),
        EventBody::Completion(data) => data.endpoints().map(|(f, t)| (f, t, COLOR_GREEN)),
        EventBody::Spawn(data) => Some((
            &data.spawn_agent.parent_id,
            &data.spawn_agent.id,
            COLOR_CYAN,
        )),
        EventBody::StatUpdate(_)
        | EventBody::ActChange(_)
        | EventBody::NodeStatus(_)
        | EventBody::Despawn(_) => None,
    }
}

impl Projection for EdgeProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Edges
    }

    fn apply(&mut self, event: &ReplayEvent, ctx: &EventContext<'_>, effects: &mut Effects) -> bool {
        let pruned = self.prune(ctx.scenario_ms);
        effects.pruned_edges = effects.pruned_edges.saturating_add(pruned);
        let mut changed = pruned > 0;

        if let Some((from, to, color)) = pulse_route(&event.body) {
            let pulse = EdgeAnimation {
                id: format!("ea-{}-{from}-{to}-{}", event.tick, ctx.index),
                from: from.clone(),
                to: to.clone(),
                color: color.to_owned(),
                timestamp: ctx.scenario_ms,
            };
            self.push(pulse);
            changed = true;
        }

        if let EventBody::Reassign(data) = &event.body {
            let lead = data.team_lead.as_ref().or(data.from.as_ref());
            if let (Some(lead), Some(member)) = (lead, data.to.as_ref()) {
                let relation = ReassignedEdge {
                    from: lead.clone(),
                    to: member.clone(),
                };
                if !self.reassigned.contains(&relation) {
                    self.reassigned.push(relation);
                    changed = true;
                }
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use orgreplay_types::{ActCatalog, SpawnData, SpawnedAgent, TransferData};

    use super::*;

    fn apply_at(projection: &mut EdgeProjection, event: &ReplayEvent, index: usize) -> Effects {
        let catalog = ActCatalog::default();
        let ctx = EventContext {
            index,
            scenario_ms: event.tick.saturating_mul(500),
            catalog: &catalog,
        };
        let mut effects = Effects::default();
        let _ = projection.apply(event, &ctx, &mut effects);
        effects
    }

    fn id(raw: &str) -> ParticipantId {
        ParticipantId::new(raw)
    }

    #[test]
    fn delegation_creates_cyan_pulse_with_stable_id() {
        let mut projection = EdgeProjection::new(1_200);
        let event = ReplayEvent::new(
            4,
            EventBody::Delegation(TransferData::between("mr-krabs", "spongebob-squarepants", "Go!")),
        );
        let _ = apply_at(&mut projection, &event, 6);
        let pulses = projection.animations();
        assert_eq!(pulses.len(), 1);
        let pulse = pulses.first();
        assert_eq!(
            pulse.map(|p| p.id.as_str()),
            Some("ea-4-mr-krabs-spongebob-squarepants-6")
        );
        assert_eq!(pulse.map(|p| p.color.as_str()), Some(COLOR_CYAN));
        assert_eq!(pulse.map(|p| p.timestamp), Some(2_000));
    }

    #[test]
    fn opposite_directions_share_one_lane() {
        let mut projection = EdgeProjection::new(1_200);
        let down = ReplayEvent::new(
            13,
            EventBody::Delegation(TransferData::between("mr-krabs", "spongebob-squarepants", "a")),
        );
        let up = ReplayEvent::new(
            13,
            EventBody::Escalation(TransferData::between("spongebob-squarepants", "mr-krabs", "b")),
        );
        let _ = apply_at(&mut projection, &down, 0);
        let _ = apply_at(&mut projection, &up, 1);
        let lane = projection.lane(&id("spongebob-squarepants"), &id("mr-krabs"));
        assert_eq!(lane.len(), 2);
        assert_eq!(lane.last().map(|p| p.color.as_str()), Some(COLOR_RED));
        assert_eq!(projection.lanes.len(), 1);
    }

    #[test]
    fn unaddressed_message_creates_no_pulse() {
        let mut projection = EdgeProjection::new(1_200);
        let event = ReplayEvent::new(1, EventBody::Message(TransferData::said("plankton", "hi")));
        let _ = apply_at(&mut projection, &event, 0);
        assert!(projection.is_empty());
    }

    #[test]
    fn expired_pulses_are_pruned_and_lanes_dropped() {
        let mut projection = EdgeProjection::new(1_200);
        let event = ReplayEvent::new(
            6,
            EventBody::Delegation(TransferData::between("mr-krabs", "squidward-tentacles", "Move!")),
        );
        let _ = apply_at(&mut projection, &event, 0);
        // 6 * 500 = 3000; still alive at exactly ttl.
        assert_eq!(projection.prune(4_200), 0);
        assert_eq!(projection.prune(4_201), 1);
        assert!(projection.is_empty());
        assert!(projection.lanes.is_empty());
    }

    #[test]
    fn reassign_records_durable_edge_under_team_lead() {
        let mut projection = EdgeProjection::new(1_200);
        let event = ReplayEvent::new(
            95,
            EventBody::Reassign(
                TransferData::between("mr-krabs", "pearl-krabs", "Pearl reassigned")
                    .joining("squidward-tentacles"),
            ),
        );
        let _ = apply_at(&mut projection, &event, 0);
        let _ = apply_at(&mut projection, &event, 0);
        assert_eq!(
            projection.reassigned(),
            &[ReassignedEdge {
                from: id("squidward-tentacles"),
                to: id("pearl-krabs"),
            }]
        );
        let _ = projection.prune(u64::MAX);
        assert_eq!(projection.reassigned().len(), 1);
    }

    #[test]
    fn reassign_without_team_lead_joins_sender() {
        let mut projection = EdgeProjection::new(1_200);
        let event = ReplayEvent::new(
            96,
            EventBody::Reassign(TransferData::between("mr-krabs", "fred-1", "Fred reassigned")),
        );
        let _ = apply_at(&mut projection, &event, 0);
        assert_eq!(
            projection.reassigned().first().map(|e| e.from.as_str()),
            Some("mr-krabs")
        );
    }

    #[test]
    fn spawn_pulses_from_parent_to_child() {
        let mut projection = EdgeProjection::new(1_200);
        let event = ReplayEvent::new(
            19,
            EventBody::Spawn(SpawnData {
                spawn_agent: SpawnedAgent {
                    id: id("sous-chef-1"),
                    parent_id: id("spongebob-squarepants"),
                    name: "Sous Chef #1".to_owned(),
                    emoji: "⭐".to_owned(),
                    avatar_url: None,
                },
            }),
        );
        let _ = apply_at(&mut projection, &event, 0);
        assert_eq!(
            projection
                .lane(&id("spongebob-squarepants"), &id("sous-chef-1"))
                .len(),
            1
        );
    }

    #[test]
    fn pruning_before_each_event_counts_in_effects() {
        let mut projection = EdgeProjection::new(1_200);
        let first = ReplayEvent::new(
            1,
            EventBody::Delegation(TransferData::between("a", "b", "x")),
        );
        let later = ReplayEvent::new(
            20,
            EventBody::Delegation(TransferData::between("b", "a", "y")),
        );
        let _ = apply_at(&mut projection, &first, 0);
        let effects = apply_at(&mut projection, &later, 1);
        assert_eq!(effects.pruned_edges, 1);
        // The old lane was dropped, so the new pulse opened a lane in its
        // own direction.
        assert!(projection.lanes.contains_key(&(id("b"), id("a"))));
    }
}
