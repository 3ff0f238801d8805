//! Render sink that turns frames into structured log lines.
//!
//! Stands in for the dashboard: every coalesced frame is run through the
//! render adapters and the parts that changed since the previous frame
//! are logged. New feed lines go out at info, the stats strip and org
//! chart summaries at debug, and the full org chart as JSON at trace.

use orgreplay_core::config::{ProjectionConfig, RenderConfig};
use orgreplay_core::view::{FeedView, OrgChartGraph, ProgressHeader, StatsStrip};
use orgreplay_core::{RenderSink, ReplayFrame};
use orgreplay_types::{FocusIntent, ParticipantRegistry};
use tracing::{debug, info, trace, warn};

/// Logs what a dashboard would draw.
pub struct LogRenderSink {
    registry: ParticipantRegistry,
    projections: ProjectionConfig,
    render: RenderConfig,
    tick_interval_ms: u64,
    feed_seen: usize,
    last_act: Option<u32>,
    frames: u64,
}

impl LogRenderSink {
    /// Create a sink resolving speakers through `registry`.
    pub const fn new(
        registry: ParticipantRegistry,
        projections: ProjectionConfig,
        render: RenderConfig,
        tick_interval_ms: u64,
    ) -> Self {
        Self {
            registry,
            projections,
            render,
            tick_interval_ms,
            feed_seen: 0,
            last_act: None,
            frames: 0,
        }
    }

    /// Frames received so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    fn log_feed(&mut self, frame: &ReplayFrame) {
        let view = FeedView::build(frame, &self.registry, self.tick_interval_ms);
        // A seek replays from scratch, so the feed may be shorter than
        // what was already logged.
        if view.entries.len() < self.feed_seen {
            self.feed_seen = 0;
        }
        for entry in view.entries.iter().skip(self.feed_seen) {
            info!(
                clock = %entry.clock,
                category = ?entry.category,
                speaker = %entry.speaker_name,
                "{} {}",
                entry.emoji,
                entry.text
            );
        }
        self.feed_seen = view.entries.len();
    }

    fn log_act(&mut self, frame: &ReplayFrame) {
        if self.last_act == Some(frame.act.num) {
            return;
        }
        self.last_act = Some(frame.act.num);
        let header = ProgressHeader::build(frame, &self.render);
        info!(
            act = header.act,
            name = %header.act_name,
            narrative = %header.narrative,
            percent = %header.percent,
            "Act"
        );
    }
}

impl RenderSink for LogRenderSink {
    fn on_frame(&mut self, frame: &ReplayFrame) {
        self.frames = self.frames.saturating_add(1);
        self.log_act(frame);
        self.log_feed(frame);

        let strip = StatsStrip::build(&frame.stats, &self.projections);
        let progress = ProgressHeader::build(frame, &self.render);
        debug!(
            tick = ?frame.tick,
            kitchen = %strip.kitchen_rate,
            delivery = %strip.delivery_rate,
            queue = %strip.queue_size,
            queue_level = ?strip.queue_level,
            revenue = %strip.revenue,
            margin = %strip.margin,
            budget = %strip.budget_used,
            progress = %progress.percent,
            "Stats"
        );

        let graph = OrgChartGraph::build(frame, &self.registry);
        let pulsing = graph.edges.iter().filter(|e| !e.animations.is_empty()).count();
        debug!(
            tick = ?frame.tick,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            pulsing,
            pool = frame.pool.count,
            throughput = %frame.pool.throughput,
            "Org chart"
        );
        match serde_json::to_string(&graph) {
            Ok(json) => trace!(tick = ?frame.tick, graph = %json, "Org chart graph"),
            Err(e) => warn!(error = %e, "Failed to serialize org chart"),
        }
    }

    fn on_focus_raised(&mut self, intent: &FocusIntent) {
        debug!(pool_size = intent.pool_size, tick = intent.raised_at_tick, "Camera focus on spawn pool");
    }

    fn on_focus_expired(&mut self, intent: &FocusIntent) {
        info!(pool_size = intent.pool_size, "Camera released from spawn pool");
    }
}

#[cfg(test)]
mod tests {
    use orgreplay_core::config::{ReplayConfig, TickOrdering};
    use orgreplay_core::{Dispatcher, Timeline};

    use super::*;

    fn sink() -> LogRenderSink {
        let config = ReplayConfig::default();
        LogRenderSink::new(
            orgreplay_scenarios::registry(),
            config.projections,
            config.render,
            config.playback.tick_interval_ms,
        )
    }

    fn frame_at(tick: u64) -> Option<ReplayFrame> {
        let config = ReplayConfig::default();
        let timeline = Timeline::new(orgreplay_scenarios::timeline(), TickOrdering::Reject).ok()?;
        let mut dispatcher = Dispatcher::new(
            timeline,
            orgreplay_scenarios::acts(),
            config.projections,
            config.playback.tick_interval_ms,
        );
        dispatcher.advance(tick).ok()?;
        Some(dispatcher.frame())
    }

    #[test]
    fn tracks_feed_and_act_across_frames() {
        let mut sink = sink();
        let early = frame_at(10);
        let late = frame_at(45);
        assert!(early.is_some() && late.is_some());
        if let (Some(early), Some(late)) = (early, late) {
            sink.on_frame(&early);
            assert_eq!(sink.feed_seen, early.feed.len());
            assert_eq!(sink.last_act, Some(0));

            sink.on_frame(&late);
            assert_eq!(sink.feed_seen, late.feed.len());
            assert_eq!(sink.last_act, Some(2));

            // Seek back: the shorter feed is logged again from the start.
            sink.on_frame(&early);
            assert_eq!(sink.feed_seen, early.feed.len());
            assert_eq!(sink.frames(), 3);
        }
    }
}
