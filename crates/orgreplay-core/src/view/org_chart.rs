//! Org chart graph: registry tree plus spawned agents, with live pulses
//! attached to the edges they travel along.

use std::collections::{BTreeMap, BTreeSet};

use orgreplay_types::{EdgeAnimation, NodeStatus, ParticipantId, ParticipantRegistry};
use serde::Serialize;
use ts_rs::TS;

use crate::dispatcher::ReplayFrame;

/// One participant on the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ChartNode {
    /// Participant id.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Display glyph.
    pub emoji: String,
    /// Avatar path, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Status ring.
    pub status: NodeStatus,
    /// Queue badge, when non-zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_badge: Option<u64>,
    /// Whether the node comes from the spawn pool.
    pub spawned: bool,
}

/// One connection on the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ChartEdge {
    /// `e-{source}-{target}`.
    pub id: String,
    /// Upper end.
    pub source: ParticipantId,
    /// Lower end.
    pub target: ParticipantId,
    /// Pulses travelling this edge in either direction, oldest first.
    pub animations: Vec<EdgeAnimation>,
    /// Drawn highlighted as a reassignment.
    pub is_reassigned: bool,
}

/// Nodes and edges ready for a graph renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OrgChartGraph {
    /// Registry participants in registration order, then spawned agents.
    pub nodes: Vec<ChartNode>,
    /// Reporting lines, spawn lines, then reassignments outside the tree.
    pub edges: Vec<ChartEdge>,
}

type Lane = (ParticipantId, ParticipantId);

fn lane_key(a: &ParticipantId, b: &ParticipantId) -> Lane {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

impl OrgChartGraph {
    /// Build the chart for one frame.
    pub fn build(frame: &ReplayFrame, registry: &ParticipantRegistry) -> Self {
        let mut lanes: BTreeMap<Lane, Vec<EdgeAnimation>> = BTreeMap::new();
        for anim in &frame.edges {
            lanes
                .entry(lane_key(&anim.from, &anim.to))
                .or_default()
                .push(anim.clone());
        }
        let animations = |a: &ParticipantId, b: &ParticipantId| {
            lanes.get(&lane_key(a, b)).cloned().unwrap_or_default()
        };
        let reassigned: BTreeSet<Lane> = frame
            .reassigned_edges
            .iter()
            .map(|e| (e.from.clone(), e.to.clone()))
            .collect();

        let mut nodes = Vec::with_capacity(registry.len().saturating_add(frame.spawned.len()));
        let mut edges = Vec::new();

        for profile in registry.profiles() {
            let state = frame.nodes.get(&profile.id);
            nodes.push(ChartNode {
                id: profile.id.clone(),
                name: profile.name.clone(),
                emoji: profile.emoji.clone(),
                avatar_url: profile.avatar_url.clone(),
                status: state.map(|s| s.status).unwrap_or_default(),
                queue_badge: state.and_then(|s| s.queue_badge),
                spawned: false,
            });
            if let Some(parent) = &profile.reports_to {
                edges.push(ChartEdge {
                    id: edge_id(parent, &profile.id),
                    source: parent.clone(),
                    target: profile.id.clone(),
                    animations: animations(parent, &profile.id),
                    is_reassigned: reassigned.contains(&(parent.clone(), profile.id.clone())),
                });
            }
        }

        for agent in &frame.spawned {
            let state = frame.nodes.get(&agent.id);
            nodes.push(ChartNode {
                id: agent.id.clone(),
                name: agent.name.clone(),
                emoji: agent.emoji.clone(),
                avatar_url: agent.avatar_url.clone(),
                // Fresh spawns have not reported a status yet.
                status: state.map_or(NodeStatus::Working, |s| s.status),
                queue_badge: state.and_then(|s| s.queue_badge),
                spawned: true,
            });
            edges.push(ChartEdge {
                id: edge_id(&agent.parent_id, &agent.id),
                source: agent.parent_id.clone(),
                target: agent.id.clone(),
                animations: animations(&agent.parent_id, &agent.id),
                is_reassigned: false,
            });
        }

        for edge in &frame.reassigned_edges {
            let id = edge_id(&edge.from, &edge.to);
            if edges.iter().any(|e| e.id == id) {
                continue;
            }
            edges.push(ChartEdge {
                id,
                source: edge.from.clone(),
                target: edge.to.clone(),
                animations: animations(&edge.from, &edge.to),
                is_reassigned: true,
            });
        }

        Self { nodes, edges }
    }

    /// Look up a node.
    pub fn node(&self, id: &ParticipantId) -> Option<&ChartNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Look up an edge by its `e-{source}-{target}` id.
    pub fn edge(&self, id: &str) -> Option<&ChartEdge> {
        self.edges.iter().find(|e| e.id == id)
    }
}

fn edge_id(source: &ParticipantId, target: &ParticipantId) -> String {
    format!("e-{source}-{target}")
}
