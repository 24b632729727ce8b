//! Ranking values: per-team aggregates, ranked entries and previews.

use chrono::{DateTime, Utc};
use podium_state::{HackathonId, Team, TeamId};
use serde::{Deserialize, Serialize};

/// Per-team statistics enriched with the fields the tie-break needs.
///
/// Derived on every preview or publish; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAggregate {
    pub team_id: TeamId,
    pub team_name: String,
    /// Arithmetic mean of the team's scores; 0 with no votes.
    pub average_score: f64,
    pub votes_count: u32,
    /// Population standard deviation of the team's scores; 0 with no votes.
    pub dispersion: f64,
    /// Team creation time.
    pub earliest_reference_time: DateTime<Utc>,
}

impl TeamAggregate {
    /// An aggregate for a team nobody has scored yet.
    pub fn unscored(team: &Team) -> Self {
        Self {
            team_id: team.team_id,
            team_name: team.name.clone(),
            average_score: 0.0,
            votes_count: 0,
            dispersion: 0.0,
            earliest_reference_time: team.created_at,
        }
    }

    pub fn has_votes(&self) -> bool {
        self.votes_count > 0
    }
}

/// One ranked position. Field names follow the published payload format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// 1-based, dense, unique.
    pub rank: u32,
    pub team_id: TeamId,
    pub team_name: String,
    pub average_score: f64,
    pub votes_count: u32,
    /// Present only when dispersion detail was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispersion: Option<f64>,
}

/// A read-only ranking preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub hackathon_id: HackathonId,
    pub entries: Vec<RankingEntry>,
    /// True when at least one registered judge has not scored some team.
    pub missing_votes: bool,
}

impl Preview {
    pub fn team_order(&self) -> Vec<TeamId> {
        self.entries.iter().map(|e| e.team_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
