//! Score aggregation.
//!
//! Reduces the raw evaluations of one hackathon to per-team statistics:
//! mean, vote count and population standard deviation. Sums are kept as
//! integers so the result is bit-identical for any input ordering.

use std::collections::BTreeMap;

use podium_state::{Evaluation, HackathonId, Team, TeamId};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Score statistics for a single team.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamScores {
    pub team_id: TeamId,
    pub average_score: f64,
    pub votes_count: u32,
    /// Population standard deviation (divides by `n`).
    pub dispersion: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    count: u64,
    sum: u64,
    sum_sq: u64,
}

impl Accumulator {
    fn push(&mut self, score: u8) {
        let s = u64::from(score);
        self.count += 1;
        self.sum += s;
        self.sum_sq += s * s;
    }

    fn finish(self, team_id: TeamId) -> TeamScores {
        if self.count == 0 {
            return TeamScores {
                team_id,
                average_score: 0.0,
                votes_count: 0,
                dispersion: 0.0,
            };
        }
        let n = self.count as f64;
        // n * sum(x^2) - (sum x)^2 is n^2 times the population variance and
        // is never negative for integer samples.
        let spread = self.count * self.sum_sq - self.sum * self.sum;
        TeamScores {
            team_id,
            average_score: self.sum as f64 / n,
            votes_count: u32::try_from(self.count).unwrap_or(u32::MAX),
            dispersion: (spread as f64 / (n * n)).sqrt(),
        }
    }
}

/// Aggregate the scores of `hackathon_id`.
///
/// Returns one entry per team referenced by a valid evaluation plus one
/// zero-vote entry for every roster team nobody scored, ordered by team id.
/// Evaluations for other hackathons or with an out-of-range score are skipped.
pub fn aggregate_scores(
    hackathon_id: HackathonId,
    evaluations: &[Evaluation],
    roster: &[Team],
) -> Vec<TeamScores> {
    let mut per_team: BTreeMap<TeamId, Accumulator> = roster
        .iter()
        .map(|t| (t.team_id, Accumulator::default()))
        .collect();

    for evaluation in evaluations {
        if evaluation.hackathon_id != hackathon_id {
            warn!(
                hackathon_id = %hackathon_id,
                other = %evaluation.hackathon_id,
                team_id = %evaluation.team_id,
                "skipping evaluation from another hackathon"
            );
            continue;
        }
        if !evaluation.has_valid_score() {
            warn!(
                hackathon_id = %hackathon_id,
                team_id = %evaluation.team_id,
                judge_id = %evaluation.judge_id,
                score = evaluation.score,
                "skipping evaluation with out-of-range score"
            );
            continue;
        }
        per_team
            .entry(evaluation.team_id)
            .or_default()
            .push(evaluation.score);
    }

    per_team
        .into_iter()
        .map(|(team_id, acc)| acc.finish(team_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use podium_state::UserId;

    fn eval(judge: i64, team: i64, score: u8) -> Evaluation {
        Evaluation {
            judge_id: UserId(judge),
            team_id: TeamId(team),
            hackathon_id: HackathonId(1),
            score,
            submitted_at: Utc::now(),
        }
    }

    fn team(id: i64) -> Team {
        Team {
            team_id: TeamId(id),
            hackathon_id: HackathonId(1),
            name: format!("team-{}", id),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn mean_and_population_dispersion() {
        let scores = aggregate_scores(
            HackathonId(1),
            &[eval(1, 1, 7), eval(2, 1, 9), eval(1, 2, 8), eval(2, 2, 8)],
            &[],
        );
        assert_eq!(scores.len(), 2);

        assert_eq!(scores[0].team_id, TeamId(1));
        assert_eq!(scores[0].average_score, 8.0);
        assert_eq!(scores[0].votes_count, 2);
        assert_eq!(scores[0].dispersion, 1.0);

        assert_eq!(scores[1].average_score, 8.0);
        assert_eq!(scores[1].dispersion, 0.0);
    }

    #[test]
    fn roster_teams_without_votes_get_zero_aggregates() {
        let scores = aggregate_scores(HackathonId(1), &[eval(1, 1, 6)], &[team(1), team(5)]);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[1].team_id, TeamId(5));
        assert_eq!(scores[1].votes_count, 0);
        assert_eq!(scores[1].average_score, 0.0);
        assert_eq!(scores[1].dispersion, 0.0);
    }

    #[test]
    fn input_order_does_not_change_the_result() {
        let forward = vec![eval(1, 1, 3), eval(2, 1, 10), eval(3, 1, 4), eval(4, 1, 7)];
        let mut backward = forward.clone();
        backward.reverse();

        let a = aggregate_scores(HackathonId(1), &forward, &[]);
        let b = aggregate_scores(HackathonId(1), &backward, &[]);
        assert_eq!(a, b);
        assert_eq!(a[0].average_score.to_bits(), b[0].average_score.to_bits());
        assert_eq!(a[0].dispersion.to_bits(), b[0].dispersion.to_bits());
    }

    #[test]
    fn foreign_and_invalid_evaluations_are_skipped() {
        let mut foreign = eval(1, 1, 2);
        foreign.hackathon_id = HackathonId(2);
        let mut invalid = eval(2, 1, 10);
        invalid.score = 11;

        let scores = aggregate_scores(HackathonId(1), &[eval(3, 1, 9), foreign, invalid], &[]);
        assert_eq!(scores[0].votes_count, 1);
        assert_eq!(scores[0].average_score, 9.0);
    }

    #[test]
    fn single_vote_has_zero_dispersion() {
        let scores = aggregate_scores(HackathonId(1), &[eval(1, 1, 4)], &[]);
        assert_eq!(scores[0].dispersion, 0.0);
    }
}
