use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use callbridge::core::twiml::VOICE_WEBHOOK_PATH;
use callbridge::{AppState, ServerConfig, routes};

/// Callbridge - Twilio voice to chat assistant bridge
#[derive(Parser, Debug)]
#[command(name = "callbridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a .env file to load before reading configuration
    #[arg(long = "env-file", value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Listen port, overriding the PORT environment variable
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load .env before config so its values are visible as environment
    // variables; an explicitly named file must exist, the default is optional
    if let Some(path) = &cli.env_file {
        dotenvy::from_path(path)
            .map_err(|e| anyhow!("failed to load env file {}: {e}", path.display()))?;
    } else {
        let _ = dotenvy::dotenv();
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration; fails fast when Twilio credentials are missing
    let mut config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let address = config.address();
    let assistant_name = config.default_assistant_name.clone();
    println!("Starting server on {address}");

    // Create application state (clients, conversation store, orchestrator)
    let app_state = AppState::new(config).map_err(|e| anyhow!(e.to_string()))?;

    let app = routes::create_router().with_state(app_state);

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    let listener = TcpListener::bind(&socket_addr).await?;
    println!("Server listening on http://{}", socket_addr);
    info!(
        assistant = %assistant_name,
        "configure the Twilio number's voice webhook to POST {VOICE_WEBHOOK_PATH}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("callbridge shut down");
    Ok(())
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT, shutting down"); }
        () = terminate => { info!("received SIGTERM, shutting down"); }
    }
}
