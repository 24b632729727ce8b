//! Seed file import.
//!
//! A seed file is a JSON document with `teams`, `registrations` and
//! `evaluations` arrays. Scores are validated before anything is written.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use podium_state::{Evaluation, HackathonId, Registration, SurrealHandle, Team, TeamId, UserId};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SeedEvaluation {
    pub judge_id: UserId,
    pub team_id: TeamId,
    pub hackathon_id: HackathonId,
    /// Kept signed so out-of-range values reach validation instead of
    /// failing as a parse error.
    pub score: i64,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub registrations: Vec<Registration>,
    #[serde(default)]
    pub evaluations: Vec<SeedEvaluation>,
}

/// Rows imported by [`import_seed`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub teams: usize,
    pub registrations: usize,
    pub evaluations: usize,
}

pub fn load_seed(path: &Path) -> Result<SeedFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid seed JSON in {:?}", path))
}

pub async fn import_seed(handle: &SurrealHandle, seed: SeedFile) -> Result<SeedSummary> {
    let evaluations = seed
        .evaluations
        .into_iter()
        .map(|e| {
            Evaluation::new(
                e.judge_id,
                e.team_id,
                e.hackathon_id,
                e.score,
                e.submitted_at.unwrap_or_else(Utc::now),
            )
            .with_context(|| format!("Rejected evaluation of team {} by judge {}", e.team_id, e.judge_id))
        })
        .collect::<Result<Vec<_>>>()?;

    for team in &seed.teams {
        handle
            .save_team(team)
            .await
            .with_context(|| format!("Failed to save team {}", team.team_id))?;
    }
    for registration in &seed.registrations {
        handle
            .save_registration(registration)
            .await
            .context("Failed to save registration")?;
    }
    for evaluation in &evaluations {
        handle
            .save_evaluation(evaluation)
            .await
            .context("Failed to save evaluation")?;
    }

    let summary = SeedSummary {
        teams: seed.teams.len(),
        registrations: seed.registrations.len(),
        evaluations: evaluations.len(),
    };
    info!(
        teams = summary.teams,
        registrations = summary.registrations,
        evaluations = summary.evaluations,
        "seed imported"
    );
    Ok(summary)
}
