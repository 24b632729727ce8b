//! Tie-break resolution.
//!
//! Orders team aggregates with a fixed cascade, stopping at the first
//! decisive key:
//!
//! 0. teams with at least one vote before teams with none
//! 1. average score, descending
//! 2. dispersion, ascending (more consistent judging ranks higher)
//! 3. earliest reference time, ascending
//! 4. team name, ascending, case-insensitive
//! 5. team name, exact, then team id
//!
//! Key 5 only matters for names differing in case alone or duplicate names;
//! it makes the order strict so the result never depends on input order.

use std::cmp::Ordering;

use crate::domain::{RankingEntry, TeamAggregate};

/// Case-insensitive lexicographic comparison.
fn cmp_name_case_insensitive(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// The ranking comparator. `Less` means `a` ranks above `b`.
pub fn compare_aggregates(a: &TeamAggregate, b: &TeamAggregate) -> Ordering {
    b.has_votes()
        .cmp(&a.has_votes())
        .then_with(|| b.average_score.total_cmp(&a.average_score))
        .then_with(|| a.dispersion.total_cmp(&b.dispersion))
        .then_with(|| a.earliest_reference_time.cmp(&b.earliest_reference_time))
        .then_with(|| cmp_name_case_insensitive(&a.team_name, &b.team_name))
        .then_with(|| a.team_name.cmp(&b.team_name))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Sort aggregates into ranking order without assigning ranks.
pub fn order_aggregates(mut aggregates: Vec<TeamAggregate>) -> Vec<TeamAggregate> {
    aggregates.sort_by(compare_aggregates);
    aggregates
}

/// Order the aggregates and assign dense ranks `1..=N`.
///
/// `include_dispersion` copies each team's dispersion into its entry.
pub fn resolve_ranking(aggregates: Vec<TeamAggregate>, include_dispersion: bool) -> Vec<RankingEntry> {
    order_aggregates(aggregates)
        .into_iter()
        .enumerate()
        .map(|(idx, agg)| RankingEntry {
            rank: idx as u32 + 1,
            team_id: agg.team_id,
            team_name: agg.team_name,
            average_score: agg.average_score,
            votes_count: agg.votes_count,
            dispersion: include_dispersion.then_some(agg.dispersion),
        })
        .collect()
}
