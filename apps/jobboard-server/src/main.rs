use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use api_ingress::{ApiIngress, ApiIngressConfig};
use job_board::config::JobBoardConfig;
use job_board::JobBoard;
use runtime::{AppConfig, CliArgs};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Job Board Server - job postings, companies and applications over REST
#[derive(Parser)]
#[command(name = "jobboard-server")]
#[command(about = "Job Board Server - job postings, companies and applications over REST")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

/// Typed module sections pulled out of the config bag.
struct ModuleConfigs {
    api_ingress: ApiIngressConfig,
    job_board: JobBoardConfig,
}

impl ModuleConfigs {
    fn from_app(config: &AppConfig) -> Result<Self> {
        let mut api_ingress: ApiIngressConfig = config.module_config("api_ingress")?;
        if config.server.timeout_sec > 0 {
            api_ingress.request_timeout_secs = config.server.timeout_sec;
        }
        Ok(Self {
            api_ingress,
            job_board: config.module_config("job_board")?,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Job Board Server starting");

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");
    let modules = ModuleConfigs::from_app(&config)?;

    let job_board = JobBoard::from_config(&modules.job_board)?;
    let ingress = ApiIngress::new(modules.api_ingress).with_module(Arc::new(job_board));

    // Bound by name so hosts like "localhost" resolve
    let bind_addr = config.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = runtime::shutdown::wait_for_shutdown().await {
            tracing::error!("Failed to listen for shutdown signals: {e:#}");
        }
        signal_cancel.cancel();
    });

    ingress.serve_on(listener, cancel).await?;
    tracing::info!("Job Board Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // Module sections must parse and the job board must be constructible
    let modules = ModuleConfigs::from_app(&config)?;
    JobBoard::from_config(&modules.job_board)?;
    if modules.job_board.uses_default_secret() {
        println!("Warning: job_board.jwt_secret is the built-in default");
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
