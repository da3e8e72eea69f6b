//! Command-line front end for the submission lifecycle
//!
//! Identity comes from `--user-id/--user-name/--email` or the
//! `PROFILE_FORGE_USER_*` environment variables. Without one the session is
//! anonymous and every per-user command fails with `Unauthenticated`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use client::{
    Artifact, FileSubmissionCache, HttpSubmissionStore, IdentityHandle, LeaderboardView, LifecycleController,
    SortDirection, SortKey, UploadPolicy,
};
use shared::{ClientConfig, LeaderboardEntry, ProcessId, Submission, UserIdentity, logging, process_debug};

#[derive(Parser, Debug)]
#[command(name = "profile-forge")]
#[command(about = "Submit model archives and follow their evaluation")]
struct Cli {
    /// Submission store base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Local cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Signed-in user id
    #[arg(long)]
    user_id: Option<String>,

    /// Display name recorded on uploads
    #[arg(long)]
    user_name: Option<String>,

    /// Email, used as the owner name when no display name is given
    #[arg(long)]
    email: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload an archive (.zip or .tar.gz)
    Submit {
        path: PathBuf,
        /// Keep polling until evaluation finishes
        #[arg(long)]
        watch: bool,
    },
    /// Query the store for a submission's current status
    Status { id: String },
    /// Refresh unless the cached record is already final
    Refresh { id: String },
    /// Poll with backoff until the submission is final
    Watch {
        id: String,
        #[arg(long)]
        max_attempts: Option<u32>,
    },
    /// List your cached submissions
    List,
    /// Show the ranked leaderboard
    Leaderboard {
        #[arg(long, default_value = "rank")]
        sort_by: SortKey,
        #[arg(long)]
        descending: bool,
    },
}

impl Cli {
    fn identity(&self) -> Option<UserIdentity> {
        let uid = self
            .user_id
            .clone()
            .or_else(|| std::env::var("PROFILE_FORGE_USER_ID").ok())
            .filter(|uid| !uid.trim().is_empty())?;

        let mut identity = UserIdentity::new(uid);
        if let Some(name) = self.user_name.clone().or_else(|| std::env::var("PROFILE_FORGE_USER_NAME").ok()) {
            identity = identity.with_display_name(name);
        }
        if let Some(email) = self.email.clone().or_else(|| std::env::var("PROFILE_FORGE_USER_EMAIL").ok()) {
            identity = identity.with_email(email);
        }
        Some(identity)
    }

    fn config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::default()
            .with_overrides(|key| std::env::var(key).ok())
            .context("Reading PROFILE_FORGE_* environment")?;
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        config.validate().context("Invalid client configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    ProcessId::init_client();
    logging::init_tracing_with_level(Some(&cli.log_level));

    let config = cli.config()?;
    process_debug!(ProcessId::current(), "🔧 Using store at {}", config.api_base_url);

    let identity = IdentityHandle::new(cli.identity());
    let session = identity.session();

    let store = HttpSubmissionStore::from_config(&config)?;
    let cache = FileSubmissionCache::new(config.cache_dir.clone());
    let controller = LifecycleController::new(store, cache, UploadPolicy::from_config(&config));

    match cli.command {
        Command::Submit { path, watch } => {
            let artifact = Artifact::from_path(&path)
                .await
                .with_context(|| format!("Reading {}", path.display()))?;
            let mut record = controller.submit(&session, artifact).await?;
            if watch {
                record = controller.watch(&session, &record.id, &config.poll).await?;
            }
            print_submission(&record)?;
        }
        Command::Status { id } => print_submission(&controller.get_status(&session, &id).await?)?,
        Command::Refresh { id } => print_submission(&controller.refresh(&session, &id).await?)?,
        Command::Watch { id, max_attempts } => {
            let mut policy = config.poll.clone();
            if let Some(attempts) = max_attempts {
                policy.max_attempts = attempts;
            }
            print_submission(&controller.watch(&session, &id, &policy).await?)?;
        }
        Command::List => {
            let submissions = controller.list(&session).await?;
            println!("{}", serde_json::to_string_pretty(&submissions)?);
        }
        Command::Leaderboard { sort_by, descending } => {
            let mut view = LeaderboardView::new(controller.list_ranked().await?);
            let direction = if descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            view.sort_by(sort_by, direction);
            print_leaderboard(view.entries());
        }
    }

    Ok(())
}

fn print_submission(submission: &Submission) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(submission)?);
    Ok(())
}

fn print_leaderboard(entries: &[LeaderboardEntry]) {
    if entries.is_empty() {
        println!("No ranked submissions yet.");
        return;
    }

    println!(
        "{:>4}  {:<24} {:>7} {:>11} {:>7} {:>5}  {}",
        "rank", "user", "bleu4", "custom bleu", "ecs", "subs", "last submission"
    );
    for entry in entries {
        println!(
            "{:>4}  {:<24} {:>7.4} {:>11.4} {:>7.4} {:>5}  {}",
            entry.rank,
            entry.user_name,
            entry.scores.bleu4_score,
            entry.scores.custom_bleu_score,
            entry.scores.entity_coverage_score,
            entry.total_submissions,
            entry.last_submission_date.to_rfc3339()
        );
    }
}
