use std::cmp::Reverse;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedScore {
    pub rank: u32,
    pub score: ScoreBreakdown,
    /// Share of the repository total, in percent.
    pub rate: f64,
}

impl RankedScore {
    pub fn rate_percent(&self) -> String {
        format!("{:.2}", self.rate)
    }
}

/// Participants of one repository ordered by total score, highest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryScoreTable {
    pub rows: Vec<RankedScore>,
    pub total_score: u64,
}

impl RepositoryScoreTable {
    /// Equal totals share a rank; the row after a tie is ranked by its position.
    pub fn new(scores: Vec<ScoreBreakdown>) -> Self {
        let total_score: u64 = scores.iter().map(|s| s.total as u64).sum();

        let mut rows: Vec<RankedScore> = Vec::with_capacity(scores.len());
        for (index, score) in scores
            .into_iter()
            .sorted_by_key(|s| Reverse(s.total))
            .enumerate()
        {
            let rank = match rows.last() {
                Some(previous) if previous.score.total == score.total => previous.rank,
                _ => index as u32 + 1,
            };
            let rate = if total_score > 0 {
                score.total as f64 / total_score as f64 * 100.0
            } else {
                0.0
            };
            rows.push(RankedScore { rank, score, rate });
        }

        Self { rows, total_score }
    }

    pub fn from_activity(activity: &RepositoryActivity) -> Self {
        Self::new(score_repository(activity))
    }

    pub fn average_score(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        Some(self.total_score as f64 / self.rows.len() as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown(participant: &str, total: u32) -> ScoreBreakdown {
        ScoreBreakdown {
            participant: participant.to_string(),
            pr_feature: total,
            pr_doc: 0,
            pr_typo: 0,
            issue_feature: 0,
            issue_doc: 0,
            total,
        }
    }

    #[test]
    fn ties_share_rank_and_next_rank_skips() {
        let table = RepositoryScoreTable::new(vec![
            breakdown("c", 5),
            breakdown("a", 10),
            breakdown("b", 10),
            breakdown("d", 1),
        ]);

        let ranks = table
            .rows
            .iter()
            .map(|r| (r.score.participant.as_str(), r.rank))
            .collect::<Vec<_>>();
        assert_eq!(ranks, vec![("a", 1), ("b", 1), ("c", 3), ("d", 4)]);
    }

    #[test]
    fn rates_sum_to_hundred() {
        let table = RepositoryScoreTable::new(vec![
            breakdown("a", 1),
            breakdown("b", 1),
            breakdown("c", 1),
        ]);

        assert_eq!(table.rows[0].rate_percent(), "33.33");
        let sum: f64 = table.rows.iter().map(|r| r.rate).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_gives_zero_rates() {
        let table = RepositoryScoreTable::new(vec![breakdown("a", 0), breakdown("b", 0)]);
        assert!(table.rows.iter().all(|r| r.rate_percent() == "0.00"));
        assert!(table.rows.iter().all(|r| r.rank == 1));
        assert_eq!(table.average_score(), Some(0.0));
    }

    #[test]
    fn empty_repository_has_no_average() {
        let table = RepositoryScoreTable::new(vec![]);
        assert!(table.is_empty());
        assert_eq!(table.average_score(), None);
    }

    #[test]
    fn from_activity_applies_the_score_engine() {
        let mut activity = RepositoryActivity::new();
        let mut record = ActivityRecord::default();
        record.record(Bucket::PrFeatureBug);
        activity.insert("alice".to_string(), record);
        activity.insert("bob".to_string(), ActivityRecord::default());

        let table = RepositoryScoreTable::from_activity(&activity);
        assert_eq!(table.total_score, 3);
        assert_eq!(table.rows[0].score.participant, "alice");
        assert_eq!(table.rows[0].rate_percent(), "100.00");
        assert_eq!(table.rows[1].rate_percent(), "0.00");
        assert_eq!(table.rows[1].rank, 2);
    }
}
