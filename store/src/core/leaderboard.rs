//! Leaderboard aggregation
//!
//! One row per user with at least one completed submission. A user's scores
//! are those of their best completed submission by BLEU-4 (earlier submission
//! on equal BLEU-4). Rows are ordered by BLEU-4 descending, then by the
//! earlier last-submission timestamp, then by user id, and ranked 1..n in
//! that order.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

use shared::{LeaderboardEntry, Scores, Submission, SubmissionStatus};

struct UserTally<'a> {
    user_name: &'a str,
    best: Option<(&'a Scores, DateTime<Utc>)>,
    last_submission: DateTime<Utc>,
    total: u32,
}

/// Build the ranked leaderboard from every known submission
pub fn rank_submissions<'a, I>(submissions: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a Submission>,
{
    let mut tallies: HashMap<&'a str, UserTally<'a>> = HashMap::new();

    for submission in submissions {
        let tally = tallies.entry(submission.user_id.as_str()).or_insert(UserTally {
            user_name: &submission.user_name,
            best: None,
            last_submission: submission.submitted_at,
            total: 0,
        });

        tally.total += 1;
        if submission.submitted_at >= tally.last_submission {
            tally.last_submission = submission.submitted_at;
            tally.user_name = &submission.user_name;
        }

        if submission.status != SubmissionStatus::Completed {
            continue;
        }
        if let Some(scores) = submission.scores.as_ref() {
            let better = match tally.best {
                None => true,
                Some((best, best_at)) => match scores.bleu4_score.total_cmp(&best.bleu4_score) {
                    Ordering::Greater => true,
                    Ordering::Equal => submission.submitted_at < best_at,
                    Ordering::Less => false,
                },
            };
            if better {
                tally.best = Some((scores, submission.submitted_at));
            }
        }
    }

    let mut entries: Vec<LeaderboardEntry> = tallies
        .into_iter()
        .filter_map(|(user_id, tally)| {
            tally.best.map(|(scores, _)| LeaderboardEntry {
                rank: 0,
                user_id: user_id.to_string(),
                user_name: tally.user_name.to_string(),
                scores: *scores,
                last_submission_date: tally.last_submission,
                total_submissions: tally.total,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.scores
            .bleu4_score
            .total_cmp(&a.scores.bleu4_score)
            .then_with(|| a.last_submission_date.cmp(&b.last_submission_date))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
    entries
}
