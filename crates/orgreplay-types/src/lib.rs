//! Shared type definitions for the org replay engine.
//!
//! This crate is the single source of truth for the event script format
//! and for the read-model handed to render adapters. Read-model types
//! flow to `TypeScript` via `ts-rs` for the dashboard's render layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe participant identifiers
//! - [`enums`] -- Event kinds, node status, feed categories, projection names
//! - [`event`] -- [`ReplayEvent`] and its typed payloads
//! - [`model`] -- Projection read-model (node states, edge pulses, stats, acts, feed)
//! - [`participant`] -- Injected participant registry and act catalog

pub mod enums;
pub mod event;
pub mod ids;
pub mod model;
pub mod participant;

// Re-export all public types at crate root for convenience.
pub use enums::{EventKind, FeedCategory, NodeStatus, ProjectionKind};
pub use event::{
    ActChangeData, DespawnData, EventBody, NodeStatusData, ReplayEvent, SpawnData, StatUpdateData,
    TransferData,
};
pub use ids::ParticipantId;
pub use model::{
    ActState, EdgeAnimation, FeedMessage, FocusIntent, NodeState, PoolAggregates, ReassignedEdge,
    SpawnedAgent, StatsSnapshot,
};
pub use participant::{
    ActCatalog, ActDef, PLACEHOLDER_EMOJI, ParticipantProfile, ParticipantRegistry,
    ResolvedParticipant,
};
