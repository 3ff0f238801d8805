//! Node status projection.
//!
//! Status changes come only from explicit `node_status` events; last
//! write wins and nothing decays on its own.

use std::collections::BTreeMap;

use orgreplay_types::{EventBody, NodeStatus, ParticipantId, ProjectionKind, ReplayEvent};

use super::{Effects, EventContext, Projection};

/// Status per participant. Participants never mentioned read as idle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeProjection {
    statuses: BTreeMap<ParticipantId, NodeStatus>,
}

impl NodeProjection {
    /// Empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of a participant, idle if never set.
    pub fn status(&self, id: &ParticipantId) -> NodeStatus {
        self.statuses.get(id).copied().unwrap_or_default()
    }

    /// Every participant a `node_status` event has touched.
    pub const fn tracked(&self) -> &BTreeMap<ParticipantId, NodeStatus> {
        &self.statuses
    }
}

impl Projection for NodeProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Nodes
    }

    fn apply(&mut self, event: &ReplayEvent, _ctx: &EventContext<'_>, _effects: &mut Effects) -> bool {
        let EventBody::NodeStatus(data) = &event.body else {
            return false;
        };
        let previous = self.statuses.insert(data.agent.clone(), data.status);
        previous != Some(data.status)
    }
}
