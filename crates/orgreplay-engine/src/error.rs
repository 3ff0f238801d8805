//! Error types for the replay engine binary.

use std::path::PathBuf;

/// Top-level error for the replay engine binary.
///
/// Each variant wraps a specific subsystem error, so `main` can
/// propagate every failure with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: orgreplay_core::ConfigError,
    },

    /// The scenario file could not be read.
    #[error("failed to read scenario {}: {source}", path.display())]
    ScenarioRead {
        /// Path that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The timeline was rejected.
    #[error("timeline error: {source}")]
    Timeline {
        /// The underlying timeline error.
        #[from]
        source: orgreplay_core::TimelineError,
    },

    /// Playback failed.
    #[error("player error: {source}")]
    Player {
        /// The underlying player error.
        #[from]
        source: orgreplay_core::PlayerError,
    },
}
