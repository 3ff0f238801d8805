//! Configuration loading and typed config structures for the replay engine.
//!
//! The canonical configuration lives in `orgreplay-config.yaml` at the
//! project root. Every section is optional; a missing key takes the
//! default documented on its field.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable engine.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level replay configuration.
///
/// Mirrors the structure of `orgreplay-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplayConfig {
    /// Tick duration and speed bounds.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// How the timeline store treats out-of-order input.
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Projection tuning (edge expiry, focus debounce, stat validation).
    #[serde(default)]
    pub projections: ProjectionConfig,

    /// Render-side batching and progress header settings.
    #[serde(default)]
    pub render: RenderConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReplayConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `ORGREPLAY_SPEED` overrides `playback.default_speed`
    /// - `ORGREPLAY_LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Unparseable values
    /// are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(speed) = lookup("ORGREPLAY_SPEED").and_then(|v| v.trim().parse::<u32>().ok()) {
            self.playback.default_speed = speed;
        }
        if let Some(level) = lookup("ORGREPLAY_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if self.playback.tick_interval_ms == 0 {
            return invalid("playback.tick_interval_ms must be at least 1");
        }
        if self.playback.max_speed == 0 {
            return invalid("playback.max_speed must be at least 1");
        }
        if self.playback.default_speed == 0 || self.playback.default_speed > self.playback.max_speed {
            return invalid("playback.default_speed must be between 1 and playback.max_speed");
        }
        if self.render.coalesce_window_ms == 0 {
            return invalid("render.coalesce_window_ms must be at least 1");
        }
        if self.render.progress_target == 0 {
            return invalid("render.progress_target must be at least 1");
        }
        Ok(())
    }
}

/// Tick duration and speed bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    /// Real-time milliseconds per tick at speed 1.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Speed multiplier used when playback starts.
    #[serde(default = "default_speed")]
    pub default_speed: u32,

    /// Highest accepted speed multiplier.
    #[serde(default = "default_max_speed")]
    pub max_speed: u32,

    /// Tick at which playback finishes. `None` means the last event's tick.
    #[serde(default)]
    pub end_tick: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            default_speed: default_speed(),
            max_speed: default_max_speed(),
            end_tick: None,
        }
    }
}

/// What the timeline store does with events whose ticks go backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickOrdering {
    /// Refuse the timeline.
    #[default]
    Reject,
    /// Stable-sort by tick, keeping the authored order within a tick.
    StableSort,
}

/// Timeline store configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TimelineConfig {
    /// Handling of non-monotonic input.
    #[serde(default)]
    pub ordering: TickOrdering,
}

/// Projection tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectionConfig {
    /// Age in scenario milliseconds after which an edge pulse is pruned.
    #[serde(default = "default_edge_ttl_ms")]
    pub edge_ttl_ms: u64,

    /// Wall-clock debounce before a raised focus intent expires.
    #[serde(default = "default_focus_expiry_ms")]
    pub focus_expiry_ms: u64,

    /// Stat fields that must never decrease.
    #[serde(default = "default_cumulative_stats")]
    pub cumulative_stats: BTreeSet<String>,

    /// Apply decreasing cumulative updates instead of clamping them.
    #[serde(default)]
    pub allow_cumulative_regression: bool,

    /// Stat field shown as the queue badge.
    #[serde(default = "default_queue_stat")]
    pub queue_stat: String,

    /// Participant that carries the queue badge, if any.
    #[serde(default)]
    pub queue_owner: Option<String>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            edge_ttl_ms: default_edge_ttl_ms(),
            focus_expiry_ms: default_focus_expiry_ms(),
            cumulative_stats: default_cumulative_stats(),
            allow_cumulative_regression: false,
            queue_stat: default_queue_stat(),
            queue_owner: None,
        }
    }
}

/// Render-side settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    /// Frame coalescing window in milliseconds.
    #[serde(default = "default_coalesce_window_ms")]
    pub coalesce_window_ms: u64,

    /// Stat field driving the progress header.
    #[serde(default = "default_progress_stat")]
    pub progress_stat: String,

    /// Value of `progress_stat` that counts as 100%.
    #[serde(default = "default_progress_target")]
    pub progress_target: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            coalesce_window_ms: default_coalesce_window_ms(),
            progress_stat: default_progress_stat(),
            progress_target: default_progress_target(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_tick_interval_ms() -> u64 {
    500
}

const fn default_speed() -> u32 {
    1
}

const fn default_max_speed() -> u32 {
    16
}

const fn default_edge_ttl_ms() -> u64 {
    1_200
}

const fn default_focus_expiry_ms() -> u64 {
    3_000
}

fn default_cumulative_stats() -> BTreeSet<String> {
    ["pattiesProduced", "pattiesDelivered"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn default_queue_stat() -> String {
    "queueSize".to_owned()
}

const fn default_coalesce_window_ms() -> u64 {
    200
}

fn default_progress_stat() -> String {
    "pattiesDelivered".to_owned()
}

const fn default_progress_target() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_owned()
}
