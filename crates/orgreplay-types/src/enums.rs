//! Enumeration types for the replay engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// The closed set of event types a timeline can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// A participant says something, optionally addressed to someone.
    Message,
    /// Work handed down from one participant to another.
    Delegation,
    /// A problem pushed up to a manager.
    Escalation,
    /// A unit of work reported as done.
    Completion,
    /// A partial update of the aggregate statistics.
    StatUpdate,
    /// The scenario moves to a new narrative act.
    ActChange,
    /// A participant's visible status changes.
    NodeStatus,
    /// A participant is moved onto another team.
    Reassign,
    /// A temporary participant is created.
    Spawn,
    /// A temporary participant is removed.
    Despawn,
}

impl EventKind {
    /// Stable lowercase name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Delegation => "delegation",
            Self::Escalation => "escalation",
            Self::Completion => "completion",
            Self::StatUpdate => "stat_update",
            Self::ActChange => "act_change",
            Self::NodeStatus => "node_status",
            Self::Reassign => "reassign",
            Self::Spawn => "spawn",
            Self::Despawn => "despawn",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Node status
// ---------------------------------------------------------------------------

/// Visible load status of one participant.
///
/// Transitions are never inferred: every change comes from an explicit
/// `node_status` event.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NodeStatus {
    /// Nothing to do.
    #[default]
    Idle,
    /// Actively working.
    Working,
    /// Working under pressure.
    Busy,
    /// Past capacity.
    Overwhelmed,
}

impl NodeStatus {
    /// Whether the participant counts toward pool throughput.
    pub const fn is_productive(self) -> bool {
        matches!(self, Self::Working | Self::Busy)
    }
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// Category of a live feed line. Drives the accent the feed renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FeedCategory {
    /// Plain chatter.
    Message,
    /// Work handed down.
    Delegation,
    /// Problem pushed up.
    Escalation,
    /// Work finished.
    Completion,
    /// Team change.
    Reassign,
}

impl FeedCategory {
    /// Map an event kind to its feed category, if the kind is feed-visible.
    pub const fn from_kind(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Message => Some(Self::Message),
            EventKind::Delegation => Some(Self::Delegation),
            EventKind::Escalation => Some(Self::Escalation),
            EventKind::Completion => Some(Self::Completion),
            EventKind::Reassign => Some(Self::Reassign),
            EventKind::StatUpdate
            | EventKind::ActChange
            | EventKind::NodeStatus
            | EventKind::Spawn
            | EventKind::Despawn => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// Names the projection a dispatch cycle touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ProjectionKind {
    /// Per-participant status.
    Nodes,
    /// In-flight edge pulses and reassigned edges.
    Edges,
    /// Spawned participants.
    SpawnPool,
    /// Aggregate statistics.
    Stats,
    /// Narrative act.
    Act,
    /// Live feed.
    Feed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_status_defaults_to_idle() {
        assert_eq!(NodeStatus::default(), NodeStatus::Idle);
    }

    #[test]
    fn productive_statuses() {
        assert!(!NodeStatus::Idle.is_productive());
        assert!(NodeStatus::Working.is_productive());
        assert!(NodeStatus::Busy.is_productive());
        assert!(!NodeStatus::Overwhelmed.is_productive());
    }

    #[test]
    fn only_transfers_and_reassigns_reach_the_feed() {
        let all = [
            EventKind::Message,
            EventKind::Delegation,
            EventKind::Escalation,
            EventKind::Completion,
            EventKind::StatUpdate,
            EventKind::ActChange,
            EventKind::NodeStatus,
            EventKind::Reassign,
            EventKind::Spawn,
            EventKind::Despawn,
        ];
        let shown: Vec<EventKind> = all
            .into_iter()
            .filter(|kind| FeedCategory::from_kind(*kind).is_some())
            .collect();
        assert_eq!(
            shown,
            [
                EventKind::Message,
                EventKind::Delegation,
                EventKind::Escalation,
                EventKind::Completion,
                EventKind::Reassign,
            ]
        );
    }

    #[test]
    fn event_kind_display_matches_serde() {
        let json = serde_json::to_string(&EventKind::StatUpdate).ok();
        assert_eq!(json.as_deref(), Some("\"stat_update\""));
        assert_eq!(EventKind::StatUpdate.to_string(), "stat_update");
    }
}
