//! Error types for the crate's external boundaries
//!
//! Gameplay itself never fails: unreachable tiers are repaired, pools grow,
//! and stale handles release as no-ops. Only configuration loading and the
//! leaderboard collaborator can report errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading game tuning
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure reported by a leaderboard backend
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),
    #[error("leaderboard storage error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("leaderboard data could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),
}
