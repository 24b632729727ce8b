//! Podium - hackathon ranking CLI
//!
//! The `podium` command previews rankings and publishes versioned snapshots.
//!
//! ## Commands
//!
//! - `preview`: Show the current ranking without publishing
//! - `completeness`: List judge/team pairs that still lack a score
//! - `publish`: Publish a new snapshot version
//! - `latest` / `history`: Read published snapshots
//! - `verify`: Re-check payload digests and version sequence

mod seed;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use podium_core::{
    audit_record_for, HackathonId, HackathonSpan, PreviewBuilder, PublishRequest,
    PublisherConfig, SnapshotPublisher, UserId, METRICS,
};
use podium_state::{AuditLog, SurrealAuditLog, SurrealHandle, SurrealRoster, SurrealSnapshotStore};
use serde::Serialize;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "podium")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hackathon rankings and versioned result snapshots", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Import teams, registrations and evaluations from a JSON file first
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Snapshot insert attempts per publish (overrides PODIUM_PUBLISH_MAX_ATTEMPTS)
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current ranking without publishing
    Preview {
        #[arg(long)]
        hackathon: i64,

        /// Include each team's score dispersion
        #[arg(long)]
        dispersion: bool,
    },

    /// List registered judges that have not scored every team
    Completeness {
        #[arg(long)]
        hackathon: i64,
    },

    /// Publish the current ranking as a new snapshot version
    Publish {
        #[arg(long)]
        hackathon: i64,

        /// User id recorded as publisher
        #[arg(long)]
        publisher: i64,

        /// Publish even if some votes are missing
        #[arg(long = "override")]
        override_missing_votes: bool,

        /// Justification, required with --override when votes are missing
        #[arg(long, requires = "override_missing_votes")]
        reason: Option<String>,
    },

    /// Show the latest published snapshot
    Latest {
        #[arg(long)]
        hackathon: i64,
    },

    /// List every published snapshot, newest first
    History {
        #[arg(long)]
        hackathon: i64,
    },

    /// Re-check snapshot digests and version sequence
    Verify {
        #[arg(long)]
        hackathon: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    podium_core::init_tracing(cli.json, level);

    let config = publisher_config(cli.max_attempts)?;

    let handle = Arc::new(
        SurrealHandle::setup_from_env()
            .await
            .context("Failed to connect to Podium database")?,
    );

    if let Some(path) = &cli.seed {
        let seed = seed::load_seed(path)?;
        seed::import_seed(&handle, seed).await?;
    }

    let outcome = run(&handle, config, cli.command).await;
    METRICS.flush();
    outcome
}

async fn run(handle: &Arc<SurrealHandle>, config: PublisherConfig, command: Commands) -> Result<()> {
    let publisher = build_publisher(handle, config);
    match command {
        Commands::Preview {
            hackathon,
            dispersion,
        } => cmd_preview(&publisher, HackathonId(hackathon), dispersion).await,
        Commands::Completeness { hackathon } => {
            cmd_completeness(&publisher, HackathonId(hackathon)).await
        }
        Commands::Publish {
            hackathon,
            publisher: publisher_id,
            override_missing_votes,
            reason,
        } => {
            let mut request = PublishRequest::new(HackathonId(hackathon), UserId(publisher_id));
            request.override_missing_votes = override_missing_votes;
            request.override_reason = reason;
            let audit = SurrealAuditLog::new(handle.clone());
            cmd_publish(&publisher, &audit, &request).await
        }
        Commands::Latest { hackathon } => cmd_latest(&publisher, HackathonId(hackathon)).await,
        Commands::History { hackathon } => cmd_history(&publisher, HackathonId(hackathon)).await,
        Commands::Verify { hackathon } => cmd_verify(&publisher, HackathonId(hackathon)).await,
    }
}

/// The `--max-attempts` flag wins over the environment.
fn publisher_config(max_attempts: Option<u32>) -> Result<PublisherConfig> {
    match max_attempts {
        Some(n) => PublisherConfig::with_max_attempts(n),
        None => PublisherConfig::from_env(),
    }
    .context("Invalid publisher configuration")
}

fn build_publisher(handle: &Arc<SurrealHandle>, config: PublisherConfig) -> SnapshotPublisher {
    SnapshotPublisher::new(
        PreviewBuilder::from_source(Arc::new(SurrealRoster::new(handle.clone()))),
        Arc::new(SurrealSnapshotStore::new(handle.clone())),
        config,
    )
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_preview(
    publisher: &SnapshotPublisher,
    hackathon_id: HackathonId,
    dispersion: bool,
) -> Result<()> {
    let _span = HackathonSpan::enter(hackathon_id);
    let preview = publisher
        .previews()
        .preview(hackathon_id, dispersion)
        .await
        .context("Failed to build preview")?;
    print_json(&preview)
}

async fn cmd_completeness(publisher: &SnapshotPublisher, hackathon_id: HackathonId) -> Result<()> {
    let report = publisher
        .previews()
        .completeness(hackathon_id)
        .await
        .context("Failed to check completeness")?;
    print_json(&report)
}

/// Publish, print the result, record the audit decision, and fail the
/// command on any non-success code.
async fn cmd_publish(
    publisher: &SnapshotPublisher,
    audit: &dyn AuditLog,
    request: &PublishRequest,
) -> Result<()> {
    let _span = HackathonSpan::enter(request.hackathon_id);
    let result = publisher.publish(request).await.context("Publish failed")?;
    print_json(&result)?;

    if let Some(entry) = audit_record_for(request, &result) {
        audit
            .record(entry)
            .await
            .context("Failed to record audit entry")?;
    }

    if !result.success {
        if result.code.is_actionable() {
            bail!(
                "publish refused: {} (rerun with --override --reason <TEXT> to publish anyway)",
                result.code
            );
        }
        bail!("publish failed: {}", result.code);
    }
    info!(version = ?result.version, "published");
    Ok(())
}

async fn cmd_latest(publisher: &SnapshotPublisher, hackathon_id: HackathonId) -> Result<()> {
    match publisher.latest(hackathon_id).await? {
        Some(snapshot) => print_json(&snapshot),
        None => {
            println!("No snapshot published for hackathon {}", hackathon_id);
            Ok(())
        }
    }
}

async fn cmd_history(publisher: &SnapshotPublisher, hackathon_id: HackathonId) -> Result<()> {
    let history = publisher.history(hackathon_id).await?;
    if history.is_empty() {
        println!("No snapshot published for hackathon {}", hackathon_id);
        return Ok(());
    }
    for snapshot in &history {
        let reason = snapshot
            .payload
            .override_reason
            .as_deref()
            .map(|r| format!(" override: {}", r))
            .unwrap_or_default();
        println!(
            "v{} {} by {} [{}]{}",
            snapshot.version,
            snapshot.payload.published_at.format("%Y-%m-%d %H:%M:%S"),
            snapshot.payload.publisher_id,
            snapshot.payload_digest.short(),
            reason
        );
    }
    Ok(())
}

async fn cmd_verify(publisher: &SnapshotPublisher, hackathon_id: HackathonId) -> Result<()> {
    let checked = publisher
        .verify(hackathon_id)
        .await
        .with_context(|| format!("Snapshot verification failed for hackathon {}", hackathon_id))?;
    println!("{} snapshot(s) verified for hackathon {}", checked, hackathon_id);
    Ok(())
}
