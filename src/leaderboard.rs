//! Leaderboard collaborator
//!
//! Receives final scores once a run ends. Each player keeps a single
//! best-score entry on the ranked board plus lifetime stats. The game never
//! depends on a submission succeeding: [`submit_safely`] logs and swallows
//! any backend failure.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;

/// Default number of entries shown on a board
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// A finished run, as reported to the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub player_id: String,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub score: u64,
    pub tier_reached: u32,
    /// Unix timestamp (ms) of the submission
    pub timestamp_ms: u64,
}

/// A player's best run on the ranked board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub score: u64,
    pub tier_reached: u32,
    pub timestamp_ms: u64,
}

impl From<&ScoreSubmission> for LeaderboardEntry {
    fn from(s: &ScoreSubmission) -> Self {
        Self {
            player_id: s.player_id.clone(),
            display_name: s.display_name.clone(),
            avatar_ref: s.avatar_ref.clone(),
            score: s.score,
            tier_reached: s.tier_reached,
            timestamp_ms: s.timestamp_ms,
        }
    }
}

/// Lifetime stats for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub high_score: u64,
    pub highest_tier: u32,
    pub games_played: u32,
    pub created_at_ms: u64,
}

/// Backend that records final scores
pub trait Leaderboard {
    /// Record a finished run; returns true when it set a new personal best
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<bool, LeaderboardError>;

    /// Best entries, highest score first
    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    fn player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, LeaderboardError>;

    /// 1-based position on the ranked board
    fn rank(&self, player_id: &str) -> Result<Option<usize>, LeaderboardError>;
}

/// Submit a score, isolating the game from backend failures
///
/// Returns whether the score was recorded.
pub fn submit_safely(board: &mut dyn Leaderboard, submission: &ScoreSubmission) -> bool {
    match board.submit(submission) {
        Ok(new_best) => {
            log::info!(
                "Score {} recorded for {}{}",
                submission.score,
                submission.player_id,
                if new_best { " (new best)" } else { "" }
            );
            true
        }
        Err(e) => {
            log::warn!("Score not recorded: {}", e);
            false
        }
    }
}

/// Board contents shared by the concrete backends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardData {
    players: BTreeMap<String, PlayerStats>,
    /// Sorted descending by score, one entry per player
    entries: Vec<LeaderboardEntry>,
}

impl LeaderboardData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Update stats and the ranked entry; returns true on a new best score
    pub fn record(&mut self, submission: &ScoreSubmission) -> bool {
        let previous = self.players.get(&submission.player_id);
        let is_new_high_score = previous.is_none_or(|p| submission.score > p.high_score);
        let is_new_high_tier = previous.is_none_or(|p| submission.tier_reached > p.highest_tier);

        let stats = PlayerStats {
            display_name: submission.display_name.clone(),
            avatar_ref: submission.avatar_ref.clone(),
            high_score: match previous {
                Some(p) if !is_new_high_score => p.high_score,
                _ => submission.score,
            },
            highest_tier: match previous {
                Some(p) if !is_new_high_tier => p.highest_tier,
                _ => submission.tier_reached,
            },
            games_played: previous.map_or(0, |p| p.games_played) + 1,
            created_at_ms: previous.map_or(submission.timestamp_ms, |p| p.created_at_ms),
        };
        self.players.insert(submission.player_id.clone(), stats);

        if is_new_high_score {
            self.entries.retain(|e| e.player_id != submission.player_id);
            // Ties keep the earlier run ahead
            let pos = self
                .entries
                .iter()
                .position(|e| submission.score > e.score)
                .unwrap_or(self.entries.len());
            self.entries.insert(pos, LeaderboardEntry::from(submission));
        }
        is_new_high_score
    }

    pub fn top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn player_stats(&self, player_id: &str) -> Option<PlayerStats> {
        self.players.get(player_id).cloned()
    }

    pub fn rank(&self, player_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.player_id == player_id)
            .map(|i| i + 1)
    }
}

/// In-process board, lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    data: LeaderboardData,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Leaderboard for MemoryLeaderboard {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<bool, LeaderboardError> {
        Ok(self.data.record(submission))
    }

    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.data.top(limit))
    }

    fn player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, LeaderboardError> {
        Ok(self.data.player_stats(player_id))
    }

    fn rank(&self, player_id: &str) -> Result<Option<usize>, LeaderboardError> {
        Ok(self.data.rank(player_id))
    }
}

/// Board persisted as a JSON document, rewritten after every submission
#[derive(Debug, Clone)]
pub struct JsonFileLeaderboard {
    path: PathBuf,
    data: LeaderboardData,
}

impl JsonFileLeaderboard {
    /// Open a board file, starting empty if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LeaderboardError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No leaderboard at {}, starting fresh", path.display());
                LeaderboardData::new()
            }
            Err(source) => return Err(LeaderboardError::Io { path, source }),
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), LeaderboardError> {
        let json = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, json).map_err(|source| LeaderboardError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Leaderboard for JsonFileLeaderboard {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<bool, LeaderboardError> {
        let mut next = self.data.clone();
        let new_best = next.record(submission);
        let previous = std::mem::replace(&mut self.data, next);
        // Keep memory and disk in agreement when the write fails
        if let Err(e) = self.save() {
            self.data = previous;
            return Err(e);
        }
        Ok(new_best)
    }

    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.data.top(limit))
    }

    fn player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, LeaderboardError> {
        Ok(self.data.player_stats(player_id))
    }

    fn rank(&self, player_id: &str) -> Result<Option<usize>, LeaderboardError> {
        Ok(self.data.rank(player_id))
    }
}

/// Stand-in for offline play; every call fails
#[derive(Debug, Clone)]
pub struct UnavailableLeaderboard {
    reason: String,
}

impl UnavailableLeaderboard {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> LeaderboardError {
        LeaderboardError::Unavailable(self.reason.clone())
    }
}

impl Leaderboard for UnavailableLeaderboard {
    fn submit(&mut self, _submission: &ScoreSubmission) -> Result<bool, LeaderboardError> {
        Err(self.error())
    }

    fn top(&self, _limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Err(self.error())
    }

    fn player_stats(&self, _player_id: &str) -> Result<Option<PlayerStats>, LeaderboardError> {
        Err(self.error())
    }

    fn rank(&self, _player_id: &str) -> Result<Option<usize>, LeaderboardError> {
        Err(self.error())
    }
}
