//! Completeness checking.
//!
//! Every registered judge must have scored every team of the hackathon. The
//! check builds a lookup set of scored `(judge, team)` pairs and walks the
//! judge × team grid once.

use std::collections::{BTreeSet, HashSet};

use podium_state::{Evaluation, HackathonId, Registration, Team, TeamId, UserId};
use serde::{Deserialize, Serialize};

/// Result of a completeness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub hackathon_id: HackathonId,
    /// Number of distinct judges times number of distinct teams.
    pub required_pairs: usize,
    /// Unscored `(judge, team)` pairs, sorted.
    pub missing: Vec<(UserId, TeamId)>,
}

impl CompletenessReport {
    pub fn missing_votes(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Compare the required `(judge, team)` pairs against the evaluations.
///
/// Only registrations tagged as judges count; duplicate registrations count
/// once. Evaluations for other hackathons or with an out-of-range score do
/// not count as votes, matching the aggregator. With no judges or no teams
/// nothing is required and the report is complete.
pub fn check_completeness(
    hackathon_id: HackathonId,
    registrations: &[Registration],
    teams: &[Team],
    evaluations: &[Evaluation],
) -> CompletenessReport {
    let judges: BTreeSet<UserId> = registrations
        .iter()
        .filter(|r| r.hackathon_id == hackathon_id && r.is_judge())
        .map(|r| r.user_id)
        .collect();
    let team_ids: BTreeSet<TeamId> = teams.iter().map(|t| t.team_id).collect();

    let scored: HashSet<(UserId, TeamId)> = evaluations
        .iter()
        .filter(|e| e.hackathon_id == hackathon_id && e.has_valid_score())
        .map(|e| (e.judge_id, e.team_id))
        .collect();

    let missing = judges
        .iter()
        .flat_map(|judge| team_ids.iter().map(move |team| (*judge, *team)))
        .filter(|pair| !scored.contains(pair))
        .collect();

    CompletenessReport {
        hackathon_id,
        required_pairs: judges.len() * team_ids.len(),
        missing,
    }
}

/// Boolean form of [`check_completeness`].
pub fn has_missing_votes(
    hackathon_id: HackathonId,
    registrations: &[Registration],
    teams: &[Team],
    evaluations: &[Evaluation],
) -> bool {
    check_completeness(hackathon_id, registrations, teams, evaluations).missing_votes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use podium_state::Role;

    const H: HackathonId = HackathonId(1);

    fn team(id: i64) -> Team {
        Team {
            team_id: TeamId(id),
            hackathon_id: H,
            name: format!("team-{}", id),
            created_at: Utc::now(),
        }
    }

    fn eval(judge: i64, team: i64) -> Evaluation {
        Evaluation::new(UserId(judge), TeamId(team), H, 5, Utc::now()).unwrap()
    }

    fn judges(ids: &[i64]) -> Vec<Registration> {
        ids.iter().map(|id| Registration::judge(H, UserId(*id))).collect()
    }

    #[test]
    fn full_grid_is_complete() {
        let report = check_completeness(
            H,
            &judges(&[1, 2]),
            &[team(10), team(20)],
            &[eval(1, 10), eval(1, 20), eval(2, 10), eval(2, 20)],
        );
        assert_eq!(report.required_pairs, 4);
        assert!(!report.missing_votes());
    }

    #[test]
    fn one_unscored_pair_is_reported() {
        let report = check_completeness(
            H,
            &judges(&[1, 2]),
            &[team(10), team(20)],
            &[eval(1, 10), eval(1, 20), eval(2, 10)],
        );
        assert!(report.missing_votes());
        assert_eq!(report.missing, vec![(UserId(2), TeamId(20))]);
    }

    #[test]
    fn non_judge_registrations_are_not_required_to_vote() {
        let mut regs = judges(&[1]);
        regs.push(Registration {
            hackathon_id: H,
            user_id: UserId(99),
            role: Role::Organizer,
        });
        regs.push(Registration {
            hackathon_id: H,
            user_id: UserId(98),
            role: Role::Participant,
        });
        assert!(!has_missing_votes(H, &regs, &[team(10)], &[eval(1, 10)]));
    }

    #[test]
    fn duplicate_registrations_and_repeat_votes_count_once() {
        let report = check_completeness(
            H,
            &judges(&[1, 1]),
            &[team(10)],
            &[eval(1, 10), eval(1, 10)],
        );
        assert_eq!(report.required_pairs, 1);
        assert!(!report.missing_votes());
    }

    #[test]
    fn no_judges_or_no_teams_means_nothing_is_missing() {
        assert!(!has_missing_votes(H, &[], &[team(10)], &[]));
        assert!(!has_missing_votes(H, &judges(&[1]), &[], &[]));
    }

    #[test]
    fn out_of_range_score_is_not_a_vote() {
        let mut invalid = eval(1, 10);
        invalid.score = 11;
        let report = check_completeness(H, &judges(&[1]), &[team(10)], &[invalid]);
        assert!(report.missing_votes());
        assert_eq!(report.missing, vec![(UserId(1), TeamId(10))]);
    }

    #[test]
    fn votes_from_other_hackathons_do_not_count() {
        let foreign =
            Evaluation::new(UserId(1), TeamId(10), HackathonId(2), 5, Utc::now()).unwrap();
        assert!(has_missing_votes(H, &judges(&[1]), &[team(10)], &[foreign]));
    }
}
