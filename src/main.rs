use anyhow::Result;
use clap::{Parser, Subcommand};
use spikescout::{config::ServerConfig, refresh, rest, AppContext};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "spikescoutd",
    about = "SpikeScout — recruitment-tracking daemon",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// REST API port
    #[arg(long, env = "SPIKESCOUT_PORT")]
    port: Option<u16>,

    /// Data directory for config and the SQLite database
    #[arg(long, env = "SPIKESCOUT_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SPIKESCOUT_LOG")]
    log: Option<String>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "SPIKESCOUT_BIND")]
    bind_address: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the daemon server (default when no subcommand given).
    Serve,
    /// One-time data repair: stamp an owner id onto legacy rows that predate
    /// per-user scoping. Never runs as part of normal reads.
    Migrate {
        /// The user id to stamp onto unowned rows.
        #[arg(long)]
        user_id: String,
    },
}

fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::new(args.port, args.data_dir, args.log, args.bind_address);
    init_tracing(&config.log_level);

    match args.command {
        Some(Command::Migrate { user_id }) => migrate(config, &user_id).await,
        Some(Command::Serve) | None => serve(config).await,
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir.display(),
        "starting spikescoutd"
    );
    if config.draft.endpoint.is_empty() {
        warn!("no [draft] endpoint configured — message drafting is disabled");
    }

    let ctx = AppContext::new(config).await?;

    // One polling task owns all periodic snapshot refreshes.
    let refresher = refresh::spawn(ctx.clone());

    let result = tokio::select! {
        res = rest::start_rest_server(ctx.clone()) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    };

    refresher.abort();
    result
}

async fn migrate(config: ServerConfig, user_id: &str) -> Result<()> {
    let ctx = AppContext::new(config).await?;
    let stamped = ctx.storage.backfill_owner_ids(user_id).await?;
    info!(stamped, user_id, "ownership backfill complete");
    println!("stamped {stamped} rows with owner {user_id}");
    Ok(())
}
