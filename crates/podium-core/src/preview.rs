//! Preview building.
//!
//! Fetches teams, evaluations and the judge roster, then runs aggregation,
//! completeness checking and tie-break resolution. Read-only: a preview never
//! allocates a version or writes a snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use podium_state::{
    Evaluation, EvaluationSource, HackathonId, JudgeRosterSource, Registration, Team, TeamId,
    TeamSource,
};
use tracing::{instrument, warn};

use crate::aggregate::aggregate_scores;
use crate::completeness::{check_completeness, CompletenessReport};
use crate::domain::error::Result;
use crate::domain::{Preview, TeamAggregate};
use crate::metrics::METRICS;
use crate::obs;
use crate::tiebreak::resolve_ranking;

/// Everything one preview is computed from.
struct HackathonInputs {
    teams: Vec<Team>,
    evaluations: Vec<Evaluation>,
    registrations: Vec<Registration>,
}

/// Computes ranking previews from the read-side stores.
#[derive(Clone)]
pub struct PreviewBuilder {
    evaluations: Arc<dyn EvaluationSource>,
    teams: Arc<dyn TeamSource>,
    roster: Arc<dyn JudgeRosterSource>,
}

impl PreviewBuilder {
    pub fn new(
        evaluations: Arc<dyn EvaluationSource>,
        teams: Arc<dyn TeamSource>,
        roster: Arc<dyn JudgeRosterSource>,
    ) -> Self {
        Self {
            evaluations,
            teams,
            roster,
        }
    }

    /// Use one backend for all three sources.
    pub fn from_source<S>(source: Arc<S>) -> Self
    where
        S: EvaluationSource + TeamSource + JudgeRosterSource + 'static,
    {
        Self {
            evaluations: source.clone(),
            teams: source.clone(),
            roster: source,
        }
    }

    /// Compute the current ranking of `hackathon_id`.
    ///
    /// With `include_dispersion_detail` each entry carries its dispersion.
    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn preview(
        &self,
        hackathon_id: HackathonId,
        include_dispersion_detail: bool,
    ) -> Result<Preview> {
        let inputs = self.load(hackathon_id).await?;

        let scores = aggregate_scores(hackathon_id, &inputs.evaluations, &inputs.teams);
        let aggregates: Vec<TeamAggregate> = scores
            .into_iter()
            .filter_map(|s| {
                let team = inputs.teams.iter().find(|t| t.team_id == s.team_id)?;
                Some(TeamAggregate {
                    average_score: s.average_score,
                    votes_count: s.votes_count,
                    dispersion: s.dispersion,
                    ..TeamAggregate::unscored(team)
                })
            })
            .collect();

        let report = check_completeness(
            hackathon_id,
            &inputs.registrations,
            &inputs.teams,
            &inputs.evaluations,
        );

        let preview = Preview {
            hackathon_id,
            entries: resolve_ranking(aggregates, include_dispersion_detail),
            missing_votes: report.missing_votes(),
        };

        obs::emit_preview_built(hackathon_id, preview.entries.len(), preview.missing_votes);
        METRICS.inc_previews();
        Ok(preview)
    }

    /// The completeness report on its own, with the unscored pairs listed.
    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn completeness(&self, hackathon_id: HackathonId) -> Result<CompletenessReport> {
        let inputs = self.load(hackathon_id).await?;
        Ok(check_completeness(
            hackathon_id,
            &inputs.registrations,
            &inputs.teams,
            &inputs.evaluations,
        ))
    }

    async fn load(&self, hackathon_id: HackathonId) -> Result<HackathonInputs> {
        let (teams, evaluations, registrations) = tokio::try_join!(
            self.teams.teams(hackathon_id),
            self.evaluations.evaluations(hackathon_id),
            self.roster.registrations(hackathon_id),
        )?;
        let teams = self
            .resolve_unlisted_teams(hackathon_id, teams, &evaluations)
            .await?;
        Ok(HackathonInputs {
            teams,
            evaluations,
            registrations,
        })
    }

    /// Extend the roster with teams that were scored but not listed.
    ///
    /// Such teams are looked up individually; unknown ids and teams of another
    /// hackathon are dropped with a warning.
    async fn resolve_unlisted_teams(
        &self,
        hackathon_id: HackathonId,
        roster: Vec<Team>,
        evaluations: &[Evaluation],
    ) -> Result<Vec<Team>> {
        let mut teams: BTreeMap<TeamId, Team> =
            roster.into_iter().map(|t| (t.team_id, t)).collect();

        let unlisted: Vec<TeamId> = evaluations
            .iter()
            .filter(|e| e.hackathon_id == hackathon_id)
            .map(|e| e.team_id)
            .filter(|id| !teams.contains_key(id))
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        for team_id in unlisted {
            match self.teams.team(team_id).await? {
                Some(team) if team.hackathon_id == hackathon_id => {
                    teams.insert(team_id, team);
                }
                Some(team) => {
                    warn!(
                        team_id = %team_id,
                        owner = %team.hackathon_id,
                        "scored team belongs to another hackathon, skipping"
                    );
                }
                None => {
                    warn!(team_id = %team_id, "scored team not found, skipping");
                }
            }
        }

        Ok(teams.into_values().collect())
    }
}
