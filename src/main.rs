//! ChatRelay CLI - Credential-hiding relay between browser chat frontends and OpenRouter.

use chatrelay::api::{create_router_with_state, AppState};
use chatrelay::config::{is_well_formed_key, Config, LogVerbosity};
use chatrelay::logger::redact_credential;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(about = "Secure relay between browser chat frontends and OpenRouter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Log verbosity level
        #[arg(short, long, value_enum, default_value = "compact")]
        log_level: LogLevel,

        /// Config file path
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },

    /// Show current configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LogLevel {
    Minimal,
    Compact,
    Verbose,
}

impl From<LogLevel> for LogVerbosity {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Minimal => LogVerbosity::Minimal,
            LogLevel::Compact => LogVerbosity::Compact,
            LogLevel::Verbose => LogVerbosity::Verbose,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            port,
            log_level,
            config,
        }) => {
            run_server(port, log_level, config).await?;
        }
        Some(Commands::Config { path }) => {
            show_config(path)?;
        }
        None => {
            // Default: run server
            run_server(None, LogLevel::Compact, None).await?;
        }
    }

    Ok(())
}

async fn run_server(
    port_override: Option<u16>,
    log_level: LogLevel,
    config_path: Option<std::path::PathBuf>,
) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let mut config = config.with_env_overrides();

    let verbosity: LogVerbosity = log_level.into();
    config.app.log_verbosity = verbosity.clone();

    // Determine bind address
    let port = port_override.unwrap_or(config.gateway.port);
    let addr: SocketAddr = format!("{}:{}", config.gateway.host, port).parse()?;

    // Warn early on a misconfigured credential rather than at first request.
    match config.credential() {
        None => tracing::warn!("No upstream API key configured; relay requests will fail"),
        Some(key) if !is_well_formed_key(key) => {
            tracing::warn!(
                "Configured upstream API key looks malformed ({})",
                redact_credential(key)
            );
        }
        Some(_) => {}
    }

    // Print startup message
    match verbosity {
        LogVerbosity::Minimal => {
            println!("chatrelay:{}", port);
        }
        LogVerbosity::Compact => {
            println!("→ ChatRelay starting on http://{}", addr);
            println!("→ Relay endpoint: http://{}/api/chat", addr);
        }
        LogVerbosity::Verbose => {
            let key_line = config
                .credential()
                .map(redact_credential)
                .unwrap_or_else(|| "not configured".to_string());
            println!("────────────────────────────────────────");
            println!("ChatRelay v{}", env!("CARGO_PKG_VERSION"));
            println!("────────────────────────────────────────");
            println!("Relay:      http://{}/api/chat", addr);
            println!("Health:     http://{}/health", addr);
            println!("Upstream:   {}", config.relay.upstream_url);
            println!("Origins:    {} allow-listed", config.relay.allowed_origins.len());
            println!("Credential: {}", key_line);
            println!("────────────────────────────────────────");
        }
    }

    // Create app state and router
    let state = AppState::new(config);
    let app = create_router_with_state(state);

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Relay listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\nRelay stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

fn show_config(show_path: bool) -> anyhow::Result<()> {
    if show_path {
        println!("{}", Config::default_path().display());
        return Ok(());
    }

    let mut config = Config::load()?.with_env_overrides();
    // Never print the raw credential, even operator-side.
    if let Some(key) = config.api_keys.openrouter.take() {
        config.api_keys.openrouter = Some(redact_credential(&key));
    }
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
