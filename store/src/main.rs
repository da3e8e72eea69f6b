//! Submission store entry point
//!
//! Configuration is layered: defaults, then `.env` / `PROFILE_FORGE_*`
//! environment variables, then command line flags.

use clap::Parser;
use std::path::PathBuf;

use shared::{ProcessId, StoreConfig, logging, process_info};
use store::{DiskArtifactStorage, SimulatedEvaluator, StoreResult, StoreServer};

#[derive(Parser, Debug)]
#[command(name = "store")]
#[command(about = "Profile Forge submission store and simulated evaluator")]
struct Args {
    /// Port for the HTTP API
    #[arg(long)]
    port: Option<u16>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Directory uploaded archives are written to
    #[arg(long)]
    uploads_dir: Option<PathBuf>,

    /// Front-end origin allowed by CORS
    #[arg(long)]
    allowed_origin: Option<String>,

    /// Upload ceiling in bytes
    #[arg(long)]
    max_upload_bytes: Option<u64>,

    /// Lower bound of the simulated evaluation delay
    #[arg(long)]
    min_delay_ms: Option<u64>,

    /// Upper bound of the simulated evaluation delay
    #[arg(long)]
    max_delay_ms: Option<u64>,

    /// Probability that a simulated evaluation succeeds
    #[arg(long)]
    success_rate: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn apply(self, mut config: StoreConfig) -> StoreConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(dir) = self.uploads_dir {
            config.uploads_dir = dir;
        }
        if let Some(origin) = self.allowed_origin {
            config.allowed_origin = origin;
        }
        if let Some(bytes) = self.max_upload_bytes {
            config.max_upload_bytes = bytes;
        }
        if let Some(ms) = self.min_delay_ms {
            config.min_evaluation_delay_ms = ms;
        }
        if let Some(ms) = self.max_delay_ms {
            config.max_evaluation_delay_ms = ms;
        }
        if let Some(rate) = self.success_rate {
            config.success_rate = rate;
        }
        config
    }
}

#[tokio::main]
async fn main() -> StoreResult<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    ProcessId::init_store();
    logging::init_tracing_with_level(Some(&args.log_level));

    let config = StoreConfig::default().with_overrides(|key| std::env::var(key).ok())?;
    let config = args.apply(config);
    config.validate()?;

    logging::log_startup(
        ProcessId::current(),
        &format!("submission store on {}", config.bind_address()),
    );
    process_info!(
        ProcessId::current(),
        "🎲 Simulated evaluation: {}-{} ms, success rate {:.2}",
        config.min_evaluation_delay_ms,
        config.max_evaluation_delay_ms,
        config.success_rate
    );

    let storage = DiskArtifactStorage::new(config.uploads_dir.clone());
    let evaluator = SimulatedEvaluator::from_config(&config);
    let server = StoreServer::new(config, storage, evaluator);

    if let Err(e) = server.run().await {
        logging::log_error(ProcessId::current(), "Submission store", &e);
        return Err(e);
    }

    logging::log_success(ProcessId::current(), "Submission store stopped gracefully");
    Ok(())
}
