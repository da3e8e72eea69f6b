//! Client-side leaderboard ordering

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use shared::LeaderboardEntry;

/// Attribute a leaderboard can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Rank,
    UserName,
    Bleu4,
    CustomBleu,
    EntityCoverage,
    TotalSubmissions,
    LastSubmission,
}

impl SortKey {
    /// Direction used when this key is first selected
    pub fn initial_direction(self) -> SortDirection {
        match self {
            SortKey::Rank | SortKey::UserName => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }

    fn compare(self, a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
        match self {
            SortKey::Rank => a.rank.cmp(&b.rank),
            SortKey::UserName => a.user_name.to_lowercase().cmp(&b.user_name.to_lowercase()),
            SortKey::Bleu4 => a.scores.bleu4_score.total_cmp(&b.scores.bleu4_score),
            SortKey::CustomBleu => a.scores.custom_bleu_score.total_cmp(&b.scores.custom_bleu_score),
            SortKey::EntityCoverage => a
                .scores
                .entity_coverage_score
                .total_cmp(&b.scores.entity_coverage_score),
            SortKey::TotalSubmissions => a.total_submissions.cmp(&b.total_submissions),
            SortKey::LastSubmission => a.last_submission_date.cmp(&b.last_submission_date),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "rank" => Ok(SortKey::Rank),
            "username" | "name" => Ok(SortKey::UserName),
            "bleu4" | "bleu4score" => Ok(SortKey::Bleu4),
            "custombleu" | "custombleuscore" => Ok(SortKey::CustomBleu),
            "entitycoverage" | "entitycoveragescore" | "ecs" => Ok(SortKey::EntityCoverage),
            "totalsubmissions" | "submissions" => Ok(SortKey::TotalSubmissions),
            "lastsubmission" | "lastsubmissiondate" => Ok(SortKey::LastSubmission),
            _ => Err(format!("Unknown sort key: {s}")),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Rank => "rank",
            SortKey::UserName => "userName",
            SortKey::Bleu4 => "bleu4",
            SortKey::CustomBleu => "customBleu",
            SortKey::EntityCoverage => "entityCoverage",
            SortKey::TotalSubmissions => "totalSubmissions",
            SortKey::LastSubmission => "lastSubmission",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// A sortable view over one leaderboard snapshot. Re-sorting always starts
/// from rank order, so ties keep their rank order.
#[derive(Debug, Clone)]
pub struct LeaderboardView {
    by_rank: Vec<LeaderboardEntry>,
    entries: Vec<LeaderboardEntry>,
    key: SortKey,
    direction: SortDirection,
}

impl LeaderboardView {
    pub fn new(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by_key(|e| e.rank);
        Self {
            by_rank: entries.clone(),
            entries,
            key: SortKey::Rank,
            direction: SortDirection::Ascending,
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn key(&self) -> SortKey {
        self.key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Header-click semantics: the active key flips, a new key starts in its
    /// initial direction
    pub fn toggle(&mut self, key: SortKey) {
        let direction = if key == self.key {
            self.direction.flipped()
        } else {
            key.initial_direction()
        };
        self.sort_by(key, direction);
    }

    pub fn sort_by(&mut self, key: SortKey, direction: SortDirection) {
        self.key = key;
        self.direction = direction;

        let mut entries = self.by_rank.clone();
        entries.sort_by(|a, b| match direction {
            SortDirection::Ascending => key.compare(a, b),
            SortDirection::Descending => key.compare(b, a),
        });
        self.entries = entries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::Scores;

    fn entry(rank: u32, name: &str, bleu4: f64, total: u32, day: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            user_id: format!("id-{name}"),
            user_name: name.to_string(),
            scores: Scores::new(bleu4, 0.5, 0.5).unwrap(),
            last_submission_date: Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap(),
            total_submissions: total,
        }
    }

    fn names(view: &LeaderboardView) -> Vec<&str> {
        view.entries().iter().map(|e| e.user_name.as_str()).collect()
    }

    fn sample() -> LeaderboardView {
        LeaderboardView::new(vec![
            entry(3, "carol", 0.6, 5, 3),
            entry(1, "alice", 0.9, 2, 1),
            entry(2, "Bob", 0.8, 5, 2),
        ])
    }

    #[test]
    fn test_defaults_to_rank_ascending() {
        let view = sample();
        assert_eq!(names(&view), ["alice", "Bob", "carol"]);
        assert_eq!(view.key(), SortKey::Rank);
        assert_eq!(view.direction(), SortDirection::Ascending);
    }

    #[test]
    fn test_toggle_semantics() {
        let mut view = sample();

        view.toggle(SortKey::TotalSubmissions);
        assert_eq!(view.direction(), SortDirection::Descending);
        // Ties keep rank order
        assert_eq!(names(&view), ["Bob", "carol", "alice"]);

        view.toggle(SortKey::TotalSubmissions);
        assert_eq!(view.direction(), SortDirection::Ascending);
        assert_eq!(names(&view), ["alice", "Bob", "carol"]);

        view.toggle(SortKey::UserName);
        assert_eq!(view.direction(), SortDirection::Ascending);

        view.toggle(SortKey::Rank);
        view.toggle(SortKey::Rank);
        assert_eq!(names(&view), ["carol", "Bob", "alice"]);
    }

    #[test]
    fn test_user_name_is_case_insensitive() {
        let mut view = sample();
        view.sort_by(SortKey::UserName, SortDirection::Descending);
        assert_eq!(names(&view), ["carol", "Bob", "alice"]);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("bleu4".parse::<SortKey>(), Ok(SortKey::Bleu4));
        assert_eq!("last-submission".parse::<SortKey>(), Ok(SortKey::LastSubmission));
        assert_eq!("ECS".parse::<SortKey>(), Ok(SortKey::EntityCoverage));
        assert!("speed".parse::<SortKey>().is_err());
    }
}
