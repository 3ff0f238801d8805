//! Read-model types produced by the projections.
//!
//! Everything here is plain data handed to render adapters. The
//! TypeScript render layer consumes the same shapes through the
//! generated `bindings/`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{FeedCategory, NodeStatus};
use crate::ids::ParticipantId;

/// Current visible state of one participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NodeState {
    /// Load status.
    pub status: NodeStatus,
    /// Pending work shown as a badge, when non-zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_badge: Option<u64>,
}

/// One in-flight pulse drawn along a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EdgeAnimation {
    /// Stable identifier, identical across incremental and full replays.
    pub id: String,
    /// Sending end.
    pub from: ParticipantId,
    /// Receiving end.
    pub to: ParticipantId,
    /// CSS color of the pulse.
    pub color: String,
    /// Scenario time of creation in milliseconds (`tick * tick_interval_ms`).
    pub timestamp: u64,
}

/// Durable "joined this team" relation created by a reassign event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ReassignedEdge {
    /// Team lead.
    pub from: ParticipantId,
    /// Reassigned participant.
    pub to: ParticipantId,
}

/// A participant created during playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SpawnedAgent {
    /// Identifier, unique within the pool.
    pub id: ParticipantId,
    /// Participant that spawned it.
    pub parent_id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Display glyph.
    #[serde(default)]
    pub emoji: String,
    /// Optional avatar image path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Aggregates derived from the spawn pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PoolAggregates {
    /// Number of spawned participants currently present.
    pub count: u64,
    /// Fraction of the pool that is working or busy, between 0 and 1.
    ///
    /// Only explicitly reported statuses count. A spawned participant with
    /// no status event is idle here, even though the org chart draws new
    /// spawns as working.
    #[ts(type = "string")]
    pub throughput: Decimal,
}

/// Transient request for the view to focus on the spawn pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FocusIntent {
    /// Pool size when the intent was raised.
    pub pool_size: u64,
    /// Tick of the spawn that raised it.
    pub raised_at_tick: u64,
    /// Wall-clock time after which the focus resets, unless re-raised.
    pub expires_after_ms: u64,
}

/// Latest known aggregate metrics.
///
/// Field names are authored by the scenario (`kitchenRate`,
/// `pattiesDelivered`, ...). Fields never set are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsSnapshot {
    /// Field name to value.
    pub fields: BTreeMap<String, Decimal>,
}

impl StatsSnapshot {
    /// Value of a field, if it has ever been set.
    pub fn get(&self, field: &str) -> Option<Decimal> {
        self.fields.get(field).copied()
    }

    /// Value of a field, or zero when unset.
    pub fn get_or_zero(&self, field: &str) -> Decimal {
        self.get(field).unwrap_or(Decimal::ZERO)
    }

    /// Whether no field has been set yet.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Current narrative phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ActState {
    /// Act number.
    pub num: u32,
    /// Banner title.
    pub name: String,
    /// One-line narrative.
    pub narrative: String,
}

/// One line of the live feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FeedMessage {
    /// Stable identifier.
    pub id: String,
    /// Tick of the originating event.
    pub tick: u64,
    /// Speaker, when the event named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<ParticipantId>,
    /// Message text.
    pub text: String,
    /// Feed category.
    pub category: FeedCategory,
}
