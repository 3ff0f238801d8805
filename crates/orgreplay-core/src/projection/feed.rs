//! Feed projection: time-ordered lines for the live feed.

use orgreplay_types::{FeedCategory, FeedMessage, ProjectionKind, ReplayEvent};

use super::{Effects, EventContext, Projection};

/// Label used in feed ids when an event names no speaker.
pub const SYSTEM_SPEAKER: &str = "system";

/// Feed lines in timeline order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedProjection {
    messages: Vec<FeedMessage>,
}

impl FeedProjection {
    /// Empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines, oldest first.
    pub fn messages(&self) -> &[FeedMessage] {
        &self.messages
    }
}

impl Projection for FeedProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Feed
    }

    fn apply(&mut self, event: &ReplayEvent, ctx: &EventContext<'_>, _effects: &mut Effects) -> bool {
        let kind = event.kind();
        let (Some(category), Some(data)) = (FeedCategory::from_kind(kind), event.body.transfer()) else {
            return false;
        };
        let speaker = data.from.as_ref().map_or(SYSTEM_SPEAKER, |id| id.as_str());
        self.messages.push(FeedMessage {
            id: format!("{}-{kind}-{speaker}-{}", event.tick, ctx.index),
            tick: event.tick,
            participant: data.from.clone(),
            text: data.text.clone(),
            category,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use orgreplay_types::{ActCatalog, EventBody, NodeStatus, NodeStatusData, ParticipantId, TransferData};

    use super::*;

    fn apply(feed: &mut FeedProjection, event: &ReplayEvent, index: usize) -> bool {
        let catalog = ActCatalog::default();
        let ctx = EventContext {
            index,
            scenario_ms: 0,
            catalog: &catalog,
        };
        feed.apply(event, &ctx, &mut Effects::default())
    }

    #[test]
    fn escalation_becomes_feed_line() {
        let mut feed = FeedProjection::new();
        let event = ReplayEvent::new(
            70,
            EventBody::Escalation(TransferData::between(
                "squidward-tentacles",
                "mr-krabs",
                "THE QUEUE IS AT 2500!",
            )),
        );
        assert!(apply(&mut feed, &event, 88));
        let line = feed.messages().first();
        assert_eq!(
            line.map(|m| m.id.as_str()),
            Some("70-escalation-squidward-tentacles-88")
        );
        assert_eq!(line.map(|m| m.category), Some(FeedCategory::Escalation));
        assert_eq!(
            line.and_then(|m| m.participant.clone()),
            Some(ParticipantId::new("squidward-tentacles"))
        );
    }

    #[test]
    fn missing_speaker_reads_as_system() {
        let mut feed = FeedProjection::new();
        let event = ReplayEvent::new(3, EventBody::Completion(TransferData::default()));
        assert!(apply(&mut feed, &event, 2));
        let line = feed.messages().first();
        assert_eq!(line.map(|m| m.id.as_str()), Some("3-completion-system-2"));
        assert!(line.is_some_and(|m| m.participant.is_none()));
    }

    #[test]
    fn non_feed_events_are_skipped() {
        let mut feed = FeedProjection::new();
        let event = ReplayEvent::new(
            2,
            EventBody::NodeStatus(NodeStatusData {
                agent: ParticipantId::new("mr-krabs"),
                status: NodeStatus::Working,
            }),
        );
        assert!(!apply(&mut feed, &event, 0));
        assert!(feed.messages().is_empty());
    }
}
