//! Leaderboard rows as published by the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::submission::Scores;

/// One ranked row per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Dense, 1-based
    pub rank: u32,
    pub user_id: String,
    pub user_name: String,
    #[serde(flatten)]
    pub scores: Scores,
    pub last_submission_date: DateTime<Utc>,
    pub total_submissions: u32,
}
