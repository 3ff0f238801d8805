//! Replay events: the immutable script a timeline is made of.
//!
//! The serialized form matches the authored scenario format used by the
//! dashboard:
//!
//! ```json
//! { "tick": 4, "type": "delegation",
//!   "data": { "from": "mr-krabs", "to": "spongebob-squarepants", "text": "..." } }
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{EventKind, NodeStatus};
use crate::ids::ParticipantId;
use crate::model::SpawnedAgent;

/// One scripted occurrence on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEvent {
    /// Scenario tick at which the event fires.
    pub tick: u64,
    /// Type tag and payload.
    #[serde(flatten)]
    pub body: EventBody,
}

impl ReplayEvent {
    /// Create an event at the given tick.
    pub const fn new(tick: u64, body: EventBody) -> Self {
        Self { tick, body }
    }

    /// The event's type.
    pub const fn kind(&self) -> EventKind {
        self.body.kind()
    }
}

/// Event payload, tagged by event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventBody {
    /// Chatter, optionally addressed.
    Message(TransferData),
    /// Work handed down.
    Delegation(TransferData),
    /// Problem pushed up.
    Escalation(TransferData),
    /// Work reported done.
    Completion(TransferData),
    /// Participant moved onto another team.
    Reassign(TransferData),
    /// Partial statistics update.
    StatUpdate(StatUpdateData),
    /// Narrative act change.
    ActChange(ActChangeData),
    /// Explicit status change for one participant.
    NodeStatus(NodeStatusData),
    /// Temporary participant created.
    Spawn(SpawnData),
    /// Temporary participant removed.
    Despawn(DespawnData),
}

impl EventBody {
    /// The event type this payload belongs to.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Message(_) => EventKind::Message,
            Self::Delegation(_) => EventKind::Delegation,
            Self::Escalation(_) => EventKind::Escalation,
            Self::Completion(_) => EventKind::Completion,
            Self::Reassign(_) => EventKind::Reassign,
            Self::StatUpdate(_) => EventKind::StatUpdate,
            Self::ActChange(_) => EventKind::ActChange,
            Self::NodeStatus(_) => EventKind::NodeStatus,
            Self::Spawn(_) => EventKind::Spawn,
            Self::Despawn(_) => EventKind::Despawn,
        }
    }

    /// The transfer payload, for the feed-visible event types.
    pub const fn transfer(&self) -> Option<&TransferData> {
        match self {
            Self::Message(data)
            | Self::Delegation(data)
            | Self::Escalation(data)
            | Self::Completion(data)
            | Self::Reassign(data) => Some(data),
            Self::StatUpdate(_)
            | Self::ActChange(_)
            | Self::NodeStatus(_)
            | Self::Spawn(_)
            | Self::Despawn(_) => None,
        }
    }
}

/// Payload shared by message, delegation, escalation, completion and
/// reassign events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferData {
    /// Speaking or sending participant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ParticipantId>,
    /// Receiving participant, when the event is addressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<ParticipantId>,
    /// Human-readable text shown in the feed.
    #[serde(default)]
    pub text: String,
    /// For reassign events: whose team the reassigned participant joins.
    /// Falls back to `from`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_lead: Option<ParticipantId>,
}

impl TransferData {
    /// Unaddressed message from `from`.
    pub fn said(from: impl Into<ParticipantId>, text: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: None,
            text: text.into(),
            team_lead: None,
        }
    }

    /// Addressed transfer from `from` to `to`.
    pub fn between(
        from: impl Into<ParticipantId>,
        to: impl Into<ParticipantId>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            text: text.into(),
            team_lead: None,
        }
    }

    /// Set the team lead a reassigned participant joins.
    #[must_use]
    pub fn joining(mut self, team_lead: impl Into<ParticipantId>) -> Self {
        self.team_lead = Some(team_lead.into());
        self
    }

    /// The sender/receiver pair, when both ends are known.
    pub const fn endpoints(&self) -> Option<(&ParticipantId, &ParticipantId)> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }
}

/// Partial statistics update. Only the listed fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatUpdateData {
    /// Field name to new value.
    #[serde(default)]
    pub stats: BTreeMap<String, Decimal>,
}

impl StatUpdateData {
    /// Build an update from `(field, value)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: Into<String>,
    {
        Self {
            stats: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Act change payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActChangeData {
    /// Act number to move to.
    pub act: u32,
    /// Overrides the catalog name for this act.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Overrides the catalog narrative for this act.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Explicit status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatusData {
    /// Participant whose status changes.
    pub agent: ParticipantId,
    /// New status. Missing means idle.
    #[serde(default)]
    pub status: NodeStatus,
}

/// Spawn payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnData {
    /// The participant being created.
    pub spawn_agent: SpawnedAgent,
}

/// Despawn payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DespawnData {
    /// Spawned participant to remove.
    pub agent: ParticipantId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parses_authored_delegation() {
        let json = r#"{ "tick": 4, "type": "delegation",
            "data": { "from": "mr-krabs", "to": "spongebob-squarepants", "text": "Fire up every grill!" } }"#;
        let event: ReplayEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.tick, 4);
        assert_eq!(event.kind(), EventKind::Delegation);
        let transfer = event.body.transfer().unwrap();
        let (from, to) = transfer.endpoints().unwrap();
        assert_eq!(from.as_str(), "mr-krabs");
        assert_eq!(to.as_str(), "spongebob-squarepants");
    }

    #[test]
    fn parses_partial_stat_update_with_fractional_values() {
        let json = r#"{ "tick": 38, "type": "stat_update",
            "data": { "stats": { "pattiesDelivered": 450, "margin": 4.2 } } }"#;
        let event: ReplayEvent = serde_json::from_str(json).unwrap();
        let EventBody::StatUpdate(update) = event.body else {
            panic!("expected stat update");
        };
        assert_eq!(update.stats.len(), 2);
        assert_eq!(update.stats.get("pattiesDelivered"), Some(&dec!(450)));
        assert_eq!(update.stats.get("margin"), Some(&dec!(4.2)));
    }

    #[test]
    fn parses_spawn_with_camel_case_fields() {
        let json = r#"{ "tick": 19, "type": "spawn", "data": { "spawnAgent": {
            "id": "sous-chef-1", "name": "Sous Chef #1", "emoji": "⭐",
            "avatarUrl": "/avatars/patrick.png", "parentId": "spongebob-squarepants" } } }"#;
        let event: ReplayEvent = serde_json::from_str(json).unwrap();
        let EventBody::Spawn(spawn) = event.body else {
            panic!("expected spawn");
        };
        assert_eq!(spawn.spawn_agent.id.as_str(), "sous-chef-1");
        assert_eq!(spawn.spawn_agent.parent_id.as_str(), "spongebob-squarepants");
    }

    #[test]
    fn node_status_without_status_means_idle() {
        let json = r#"{ "tick": 1, "type": "node_status", "data": { "agent": "gary" } }"#;
        let event: ReplayEvent = serde_json::from_str(json).unwrap();
        let EventBody::NodeStatus(data) = event.body else {
            panic!("expected node status");
        };
        assert_eq!(data.status, NodeStatus::Idle);
    }

    #[test]
    fn serialization_keeps_type_and_data_keys() {
        let event = ReplayEvent::new(
            2,
            EventBody::Message(TransferData::said("mr-krabs", "MONEY!")),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "message");
        assert_eq!(value["data"]["from"], "mr-krabs");
        assert_eq!(value["tick"], 2);
        let back: ReplayEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn unaddressed_message_has_no_endpoints() {
        let data = TransferData::said("plankton", "HAHAHA");
        assert!(data.endpoints().is_none());
    }
}
