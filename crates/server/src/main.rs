use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spiral_core::{load_config, validate_config, Config, LogFormat, MemoryStore, SqliteMemoryStore};
use spiral_server::api::{create_router, WsBroadcaster};
use spiral_server::cli::{self, Cli, Command, OutputOptions};
use spiral_server::state::AppState;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let quiet = cli.quiet;
    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        if !quiet {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn init_logging(config: &Config, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{},tower_http=debug", config.logging.level))
        })
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
    }
}

fn open_memory(config: &Config) -> Option<Arc<dyn MemoryStore>> {
    if !config.memory.enabled {
        info!("Memory store disabled in config");
        return None;
    }
    match SqliteMemoryStore::new(&config.memory.path) {
        Ok(store) => {
            info!("Memory store initialized at {:?}", config.memory.path);
            if let Err(e) =
                store.cleanup(config.memory.retention_days, config.memory.min_importance)
            {
                warn!("Memory cleanup failed: {}", e);
            }
            Some(Arc::new(store))
        }
        Err(e) => {
            error!("Failed to open memory store at {:?}: {}", config.memory.path, e);
            None
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    init_logging(&config, cli.quiet);
    info!("Configuration loaded from {:?}", cli.config);

    if let Some(mode) = cli.mode {
        config.pipeline.mode = mode;
    }

    validate_config(&config).context("Configuration validation failed")?;

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    match cli.command {
        Command::Validate => cli::validate(cli.format, &mut stdout),
        Command::Analyze { text, stats } => {
            let memory = open_memory(&config);
            let opts = OutputOptions {
                format: cli.format,
                quiet: cli.quiet,
                stats,
            };
            cli::analyze(
                &config,
                &text,
                opts,
                memory.as_deref(),
                &mut stdout,
                &mut stderr,
            )
        }
        Command::Batch { file, stats } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Batch file not found: {:?}", file))?;
            let memory = open_memory(&config);
            let opts = OutputOptions {
                format: cli.format,
                quiet: cli.quiet,
                stats,
            };
            cli::batch(
                &config,
                &contents,
                opts,
                memory.as_deref(),
                &mut stdout,
                &mut stderr,
            )
        }
        Command::Serve => serve(config).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let memory = open_memory(&config);
    let ws_broadcaster = WsBroadcaster::default();
    info!("WebSocket broadcaster initialized");

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, memory, ws_broadcaster));
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
