//! Replay engine binary.
//!
//! Plays a scripted org timeline through the dispatcher and projections
//! and logs what the live dashboard would draw.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `orgreplay-config.yaml` (or the path in
//!    `ORGREPLAY_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Load the timeline: the JSON file named by `ORGREPLAY_SCENARIO`, or
//!    the bundled Krusty Krab scenario
//! 4. Build the dispatcher and playback control
//! 5. Wire Ctrl-C to a clean stop
//! 6. Run the player until the end tick or a stop
//! 7. Log the result

mod error;
mod log_sink;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use orgreplay_core::{Dispatcher, PlaybackControl, Player, ReplayConfig, Timeline, log_playback_end};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_sink::LogRenderSink;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "orgreplay-config.yaml";

/// Application entry point for the replay engine.
///
/// # Errors
///
/// Returns an error if configuration, the timeline or playback fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config);
    info!("orgreplay-engine starting");
    info!(
        path = ?config_path,
        tick_interval_ms = config.playback.tick_interval_ms,
        speed = config.playback.default_speed,
        max_speed = config.playback.max_speed,
        end_tick = config.playback.end_tick,
        "Configuration loaded"
    );

    // 3. Load the timeline.
    let scenario = orgreplay_scenarios::bundled();
    let timeline = load_timeline(&config, scenario.timeline)?;
    info!(
        events = timeline.len(),
        last_tick = timeline.last_tick(),
        participants = scenario.registry.len(),
        acts = scenario.acts.len(),
        "Timeline loaded"
    );

    // 4. Build the dispatcher and playback control.
    let dispatcher = Dispatcher::new(
        timeline,
        scenario.acts,
        config.projections.clone(),
        config.playback.tick_interval_ms,
    );
    let control = Arc::new(PlaybackControl::new(&config.playback));

    // 5. Ctrl-C requests a clean stop.
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping playback");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run the player.
    let mut sink = LogRenderSink::new(
        scenario.registry,
        config.projections.clone(),
        config.render.clone(),
        config.playback.tick_interval_ms,
    );
    let mut player = Player::new(dispatcher, &config, Arc::clone(&control));
    let result = player.run(&mut sink).await.map_err(EngineError::from)?;

    // 7. Log results.
    log_playback_end(&result);
    info!(
        end_reason = ?result.end_reason,
        final_tick = result.final_tick,
        frames = sink.frames(),
        "orgreplay-engine shutdown complete"
    );

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(config: &ReplayConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load the replay configuration.
///
/// Reads `ORGREPLAY_CONFIG` if set, else `orgreplay-config.yaml` in the
/// working directory. A missing file means defaults plus environment
/// overrides. Returns the path actually read, if any.
fn load_config() -> Result<(ReplayConfig, Option<PathBuf>), EngineError> {
    let path = std::env::var_os("ORGREPLAY_CONFIG")
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    if path.exists() {
        let config = ReplayConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }
    let mut config = ReplayConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok((config, None))
}

/// The timeline named by `ORGREPLAY_SCENARIO`, or `bundled`.
fn load_timeline(
    config: &ReplayConfig,
    bundled: Vec<orgreplay_types::ReplayEvent>,
) -> Result<Timeline, EngineError> {
    match std::env::var_os("ORGREPLAY_SCENARIO") {
        Some(path) => read_timeline(Path::new(&path), config),
        None => Ok(Timeline::new(bundled, config.timeline.ordering)?),
    }
}

fn read_timeline(path: &Path, config: &ReplayConfig) -> Result<Timeline, EngineError> {
    info!(path = %path.display(), "Loading scenario file");
    let json = std::fs::read_to_string(path).map_err(|source| EngineError::ScenarioRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Timeline::from_json(&json, config.timeline.ordering)?)
}
