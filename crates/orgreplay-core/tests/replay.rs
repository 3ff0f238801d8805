//! Integration tests for the replay engine, driven by the bundled
//! Krusty Krab scenario.
//!
//! Timer behaviour runs under paused tokio time, so the multi-second
//! focus debounce and full 150-tick playbacks finish instantly.

// Integration tests use unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::sync::Arc;

use orgreplay_core::config::{ProjectionConfig, ReplayConfig, TickOrdering};
use orgreplay_core::view::{FeedView, OrgChartGraph, ProgressHeader, QueueLevel, StatsStrip};
use orgreplay_core::{
    Dispatcher, EndReason, PlaybackControl, Player, RenderSink, ReplayFrame, Timeline,
};
use orgreplay_scenarios::{END_TICK, QUEUE_OWNER};
use orgreplay_types::{
    ActCatalog, EventBody, FocusIntent, NodeStatus, NodeStatusData, ParticipantId, ReplayEvent,
    SpawnData, SpawnedAgent,
};
use rust_decimal_macros::dec;
use tokio::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn scenario_config() -> ReplayConfig {
    let mut config = ReplayConfig::default();
    config.projections.queue_owner = Some(QUEUE_OWNER.to_owned());
    config
}

fn scenario_dispatcher(config: &ReplayConfig) -> Dispatcher {
    let timeline = Timeline::new(orgreplay_scenarios::timeline(), TickOrdering::Reject).unwrap();
    Dispatcher::new(
        timeline,
        orgreplay_scenarios::acts(),
        config.projections.clone(),
        config.playback.tick_interval_ms,
    )
}

fn json(frame: &ReplayFrame) -> String {
    serde_json::to_string(frame).unwrap()
}

fn sous_chef(tick: u64, n: u32) -> ReplayEvent {
    ReplayEvent::new(
        tick,
        EventBody::Spawn(SpawnData {
            spawn_agent: SpawnedAgent {
                id: ParticipantId::new(format!("sous-chef-{n}")),
                parent_id: ParticipantId::new("spongebob-squarepants"),
                name: format!("Sous Chef #{n}"),
                emoji: "⭐".to_owned(),
                avatar_url: None,
            },
        }),
    )
}

#[derive(Default)]
struct RecordingSink {
    frames: Vec<ReplayFrame>,
    raised: Vec<Instant>,
    expired: Vec<(FocusIntent, Instant)>,
}

impl RenderSink for RecordingSink {
    fn on_frame(&mut self, frame: &ReplayFrame) {
        self.frames.push(frame.clone());
    }

    fn on_focus_raised(&mut self, _intent: &FocusIntent) {
        self.raised.push(Instant::now());
    }

    fn on_focus_expired(&mut self, intent: &FocusIntent) {
        self.expired.push((intent.clone(), Instant::now()));
    }
}

fn spawn_player(events: Vec<ReplayEvent>, end_tick: u64) -> (Player, Arc<PlaybackControl>) {
    let mut config = ReplayConfig::default();
    config.playback.tick_interval_ms = 1;
    config.playback.end_tick = Some(end_tick);
    let timeline = Timeline::new(events, TickOrdering::Reject).unwrap();
    let dispatcher = Dispatcher::new(
        timeline,
        ActCatalog::default(),
        ProjectionConfig::default(),
        config.playback.tick_interval_ms,
    );
    let control = Arc::new(PlaybackControl::new(&config.playback));
    (Player::new(dispatcher, &config, Arc::clone(&control)), control)
}

// ---------------------------------------------------------------------------
// Dispatcher properties
// ---------------------------------------------------------------------------

#[test]
fn one_big_advance_matches_many_small_ones() {
    let config = scenario_config();
    let mut stepped = scenario_dispatcher(&config);
    for tick in 0..=END_TICK {
        stepped.advance(tick).unwrap();
    }
    let mut jumped = scenario_dispatcher(&config);
    jumped.advance(END_TICK).unwrap();

    assert_eq!(json(&stepped.frame()), json(&jumped.frame()));
}

#[test]
fn uneven_steps_match_one_jump_mid_scenario() {
    let config = scenario_config();
    let mut stepped = scenario_dispatcher(&config);
    for tick in [3, 19, 20, 44, 45, 46, 95, 97] {
        stepped.advance(tick).unwrap();
    }
    let mut jumped = scenario_dispatcher(&config);
    jumped.advance(97).unwrap();

    assert_eq!(json(&stepped.frame()), json(&jumped.frame()));
}

#[test]
fn seeking_twice_is_idempotent() {
    let config = scenario_config();
    let mut dispatcher = scenario_dispatcher(&config);
    dispatcher.advance(120).unwrap();

    dispatcher.seek(60).unwrap();
    let first = json(&dispatcher.frame());
    dispatcher.seek(60).unwrap();
    let second = json(&dispatcher.frame());

    assert_eq!(first, second);

    let mut fresh = scenario_dispatcher(&config);
    fresh.advance(60).unwrap();
    assert_eq!(first, json(&fresh.frame()));
}

#[test]
fn no_frame_holds_an_expired_edge() {
    let config = scenario_config();
    let ttl = config.projections.edge_ttl_ms;
    let interval = config.playback.tick_interval_ms;
    let mut dispatcher = scenario_dispatcher(&config);

    for tick in 0..=END_TICK {
        dispatcher.advance(tick).unwrap();
        let now = tick * interval;
        for edge in dispatcher.frame().edges {
            assert!(
                now.saturating_sub(edge.timestamp) <= ttl,
                "edge {} is {}ms old at tick {tick}",
                edge.id,
                now - edge.timestamp
            );
        }
    }
}

#[test]
fn spawn_pool_never_shrinks_without_despawn() {
    let config = scenario_config();
    let mut dispatcher = scenario_dispatcher(&config);
    let mut previous = 0;

    for tick in 0..=END_TICK {
        let report = dispatcher.advance(tick).unwrap();
        let size = dispatcher.frame().pool.count;
        let despawned = dispatcher
            .timeline()
            .events()
            .iter()
            .any(|e| e.tick == tick && matches!(e.body, EventBody::Despawn(_)));
        assert!(size >= previous || despawned, "pool shrank at tick {tick}");
        if size > previous {
            assert!(report.focus.is_some(), "growth at tick {tick} raised no focus");
        }
        previous = size;
    }
    assert_eq!(previous, 20);
}

#[test]
fn scenario_ends_delivered_and_quiet() {
    let config = scenario_config();
    let mut dispatcher = scenario_dispatcher(&config);
    dispatcher.advance(END_TICK).unwrap();
    let frame = dispatcher.frame();

    assert_eq!(frame.stats.get("pattiesDelivered"), Some(dec!(10000)));
    assert_eq!(frame.stats.get("queueSize"), Some(dec!(0)));
    assert_eq!(frame.act.num, 4);
    assert_eq!(frame.act.name, "Act V: Victory");
    assert!(!frame.nodes.is_empty());
    assert!(
        frame
            .nodes
            .values()
            .all(|node| node.status == NodeStatus::Idle && node.queue_badge.is_none())
    );
    assert_eq!(frame.reassigned_edges.len(), 2);

    let progress = ProgressHeader::build(&frame, &config.render);
    assert!(progress.is_complete());
}

#[test]
fn kitchen_is_at_full_rate_on_tick_26() {
    let config = scenario_config();

    let mut sequential = scenario_dispatcher(&config);
    for tick in 0..=26 {
        sequential.advance(tick).unwrap();
    }
    let mut seeked = scenario_dispatcher(&config);
    seeked.advance(80).unwrap();
    seeked.seek(26).unwrap();

    for dispatcher in [&sequential, &seeked] {
        let frame = dispatcher.frame();
        assert_eq!(frame.stats.get("kitchenRate"), Some(dec!(100)));
        assert_eq!(frame.pool.count, 20);
        assert_eq!(frame.act.num, 1);
    }
    assert_eq!(json(&sequential.frame()), json(&seeked.frame()));
}

#[test]
fn produced_count_regression_at_tick_45_is_clamped() {
    let config = scenario_config();
    let mut dispatcher = scenario_dispatcher(&config);
    dispatcher.advance(44).unwrap();

    let report = dispatcher.advance(45).unwrap();

    assert_eq!(report.regressions.len(), 1);
    let regression = &report.regressions[0];
    assert_eq!(regression.field, "pattiesProduced");
    assert_eq!(regression.previous, dec!(2500));
    assert_eq!(regression.attempted, dec!(2000));
    assert!(!regression.applied);
    let frame = dispatcher.frame();
    assert_eq!(frame.stats.get("pattiesProduced"), Some(dec!(2500)));
    // Non-cumulative fields take the new value.
    assert_eq!(frame.stats.get("queueSize"), Some(dec!(1200)));
}

#[test]
fn queue_badge_follows_the_queue_owner() {
    let config = scenario_config();
    let mut dispatcher = scenario_dispatcher(&config);
    dispatcher.advance(70).unwrap();
    let frame = dispatcher.frame();

    let squidward = &frame.nodes[&ParticipantId::new(QUEUE_OWNER)];
    assert_eq!(squidward.queue_badge, Some(2500));
    assert_eq!(squidward.status, NodeStatus::Overwhelmed);

    let strip = StatsStrip::build(&frame.stats, &config.projections);
    assert_eq!(strip.queue_level, QueueLevel::Critical);
}

#[test]
fn render_adapters_read_the_scenario() {
    let config = scenario_config();
    let registry = orgreplay_scenarios::registry();
    let mut dispatcher = scenario_dispatcher(&config);
    dispatcher.advance(96).unwrap();
    let frame = dispatcher.frame();

    let graph = OrgChartGraph::build(&frame, &registry);
    assert_eq!(graph.nodes.len(), 22 + 20);
    let pearl_edge = graph
        .edges
        .iter()
        .find(|e| e.target.as_str() == "pearl-krabs")
        .unwrap();
    assert!(pearl_edge.is_reassigned);

    let feed = FeedView::build(&frame, &registry, config.playback.tick_interval_ms);
    let last = feed.entries.last().unwrap();
    assert_eq!(last.speaker_name, "Mr. Krabs");
    assert_eq!(last.clock, "0:48");
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

async fn play_scenario(speed: u32) -> ReplayFrame {
    let mut config = scenario_config();
    config.playback.default_speed = speed;
    let dispatcher = scenario_dispatcher(&config);
    let control = Arc::new(PlaybackControl::new(&config.playback));
    let mut player = Player::new(dispatcher, &config, Arc::clone(&control));
    let mut sink = RecordingSink::default();

    let result = player.run(&mut sink).await.unwrap();

    assert_eq!(result.end_reason, EndReason::Finished);
    assert_eq!(result.final_tick, END_TICK);
    sink.frames.pop().unwrap()
}

#[tokio::test(start_paused = true)]
async fn final_state_does_not_depend_on_speed() {
    let normal = play_scenario(1).await;
    let fast = play_scenario(4).await;

    assert_eq!(normal.nodes, fast.nodes);
    assert_eq!(normal.stats, fast.stats);
    assert_eq!(normal.act, fast.act);
    assert_eq!(normal.tick, Some(END_TICK));
}

#[tokio::test(start_paused = true)]
async fn close_spawns_expire_focus_once() {
    let (mut player, _control) = spawn_player(vec![sous_chef(1, 1), sous_chef(2, 2)], 4_000);
    let mut sink = RecordingSink::default();
    let started = Instant::now();

    let result = player.run(&mut sink).await.unwrap();

    assert_eq!(result.end_reason, EndReason::Finished);
    assert_eq!(sink.raised.len(), 2);
    assert_eq!(sink.expired.len(), 1);
    assert_eq!(result.focus_expirations, 1);
    let (intent, fired_at) = &sink.expired[0];
    assert_eq!(intent.pool_size, 2);
    assert_eq!(intent.raised_at_tick, 2);
    // Scheduled from the second spawn, not the first.
    assert!(*fired_at >= started + Duration::from_millis(3_002));
}

#[tokio::test(start_paused = true)]
async fn pause_cancels_a_pending_focus_expiry() {
    let (mut player, control) = spawn_player(vec![sous_chef(1, 1)], 4_000);
    let mut sink = RecordingSink::default();

    let driver = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        control.pause();
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        control.request_stop();
    };
    let (result, ()) = tokio::join!(player.run(&mut sink), driver);
    let result = result.unwrap();

    assert_eq!(result.end_reason, EndReason::Stopped);
    assert_eq!(sink.raised.len(), 1);
    assert!(sink.expired.is_empty());
    assert!(result.final_tick < 4_000);
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_a_pending_focus_expiry() {
    let (mut player, control) = spawn_player(vec![sous_chef(1, 1)], 4_000);
    let mut sink = RecordingSink::default();

    let driver = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        control.request_stop();
        tokio::time::sleep(Duration::from_millis(5_000)).await;
    };
    let (result, ()) = tokio::join!(player.run(&mut sink), driver);
    let result = result.unwrap();

    assert_eq!(result.end_reason, EndReason::Stopped);
    assert_eq!(sink.raised.len(), 1);
    assert!(sink.expired.is_empty());
    assert_eq!(result.focus_expirations, 0);
    assert!(sink.frames.last().unwrap().focus.is_none());
}

#[tokio::test(start_paused = true)]
async fn frames_drop_the_focus_once_it_expires() {
    let late_status = ReplayEvent::new(
        3_500,
        EventBody::NodeStatus(NodeStatusData {
            agent: ParticipantId::new("sous-chef-1"),
            status: NodeStatus::Working,
        }),
    );
    let (mut player, _control) = spawn_player(vec![sous_chef(1, 1), late_status], 3_600);
    let mut sink = RecordingSink::default();

    let result = player.run(&mut sink).await.unwrap();

    assert_eq!(result.end_reason, EndReason::Finished);
    assert_eq!(sink.expired.len(), 1);
    // The spawn's window frame carries the pending focus.
    let first = sink.frames.iter().find(|f| f.pool.count == 1).unwrap();
    assert_eq!(first.focus.as_ref().map(|f| f.pool_size), Some(1));
    let last = sink.frames.last().unwrap();
    assert_eq!(last.tick, Some(3_600));
    assert!(last.focus.is_none());
    // A frame follows the expiry without waiting for another event.
    assert!(
        sink.frames
            .iter()
            .any(|f| f.focus.is_none() && f.pool.count == 1 && f.tick < Some(3_500))
    );
}

#[tokio::test(start_paused = true)]
async fn pause_clears_the_focus_in_the_next_frame() {
    let (mut player, control) = spawn_player(vec![sous_chef(1, 1)], 4_000);
    let mut sink = RecordingSink::default();

    let driver = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        control.pause();
        tokio::time::sleep(Duration::from_millis(100)).await;
        control.request_stop();
    };
    let (result, ()) = tokio::join!(player.run(&mut sink), driver);
    result.unwrap();

    assert!(sink.frames.iter().all(|f| f.focus.is_none()));
    assert!(sink.frames.iter().any(|f| f.pool.count == 1));
}

#[tokio::test(start_paused = true)]
async fn seek_while_paused_replays_to_the_target() {
    let config = scenario_config();
    let dispatcher = scenario_dispatcher(&config);
    let control = Arc::new(PlaybackControl::new(&config.playback));
    let mut player = Player::new(dispatcher, &config, Arc::clone(&control));
    let mut sink = RecordingSink::default();

    let driver = async {
        control.pause();
        tokio::time::sleep(Duration::from_millis(100)).await;
        control.request_seek(26).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        control.request_stop();
    };
    let (result, ()) = tokio::join!(player.run(&mut sink), driver);
    let result = result.unwrap();

    assert_eq!(result.end_reason, EndReason::Stopped);
    assert_eq!(result.final_tick, 26);
    let last = sink.frames.last().unwrap();
    assert_eq!(last.tick, Some(26));
    assert_eq!(last.stats.get("kitchenRate"), Some(dec!(100)));
    assert_eq!(last.pool.count, 20);
}
