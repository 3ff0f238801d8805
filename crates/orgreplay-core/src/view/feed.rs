//! Live feed list with resolved speakers and clock labels.

use orgreplay_types::{FeedCategory, PLACEHOLDER_EMOJI, ParticipantId, ParticipantRegistry};
use serde::Serialize;
use ts_rs::TS;

use crate::dispatcher::ReplayFrame;
use crate::projection::feed::SYSTEM_SPEAKER;

/// Left-border accent per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FeedAccent {
    /// No accent.
    Plain,
    /// Red.
    Alert,
    /// Green.
    Success,
    /// Amber.
    Notice,
}

impl FeedAccent {
    /// Accent for a feed category.
    pub const fn for_category(category: FeedCategory) -> Self {
        match category {
            FeedCategory::Escalation => Self::Alert,
            FeedCategory::Completion => Self::Success,
            FeedCategory::Reassign => Self::Notice,
            FeedCategory::Message | FeedCategory::Delegation => Self::Plain,
        }
    }

    /// CSS border color, `None` for plain lines.
    pub const fn color(self) -> Option<&'static str> {
        match self {
            Self::Plain => None,
            Self::Alert => Some("#ef4444"),
            Self::Success => Some("#10b981"),
            Self::Notice => Some("#f59e0b"),
        }
    }
}

/// One rendered feed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FeedEntry {
    /// Feed message id.
    pub id: String,
    /// Tick of the originating event.
    pub tick: u64,
    /// `m:ss` scenario time.
    pub clock: String,
    /// Speaker id, absent for system lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<ParticipantId>,
    /// Speaker display name.
    pub speaker_name: String,
    /// Speaker glyph.
    pub emoji: String,
    /// Message text.
    pub text: String,
    /// Category.
    pub category: FeedCategory,
    /// Border accent.
    pub accent: FeedAccent,
}

/// The feed panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FeedView {
    /// Lines, oldest first.
    pub entries: Vec<FeedEntry>,
}

impl FeedView {
    /// Resolve every feed message in the frame.
    pub fn build(frame: &ReplayFrame, registry: &ParticipantRegistry, tick_interval_ms: u64) -> Self {
        let entries = frame
            .feed
            .iter()
            .map(|message| {
                let (speaker_name, emoji) = message.participant.as_ref().map_or_else(
                    || (SYSTEM_SPEAKER.to_owned(), PLACEHOLDER_EMOJI.to_owned()),
                    |id| {
                        let resolved = registry.resolve(id);
                        (resolved.name.to_owned(), resolved.emoji.to_owned())
                    },
                );
                FeedEntry {
                    id: message.id.clone(),
                    tick: message.tick,
                    clock: clock_label(message.tick, tick_interval_ms),
                    speaker: message.participant.clone(),
                    speaker_name,
                    emoji,
                    text: message.text.clone(),
                    category: message.category,
                    accent: FeedAccent::for_category(message.category),
                }
            })
            .collect();
        Self { entries }
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scenario time of `tick` as `m:ss`, seconds rounded down.
pub fn clock_label(tick: u64, tick_interval_ms: u64) -> String {
    let secs = tick.saturating_mul(tick_interval_ms) / 1_000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
