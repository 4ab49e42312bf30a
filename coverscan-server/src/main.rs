use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coverscan_server::{
    AppState, ServerConfig,
    history::HistoryStore,
    routes::create_router,
    runs::RunRegistry,
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "coverscan-server")]
#[command(about = "Artwork inventory reports for Emby-compatible media servers")]
struct Cli {
    /// Server host
    #[arg(long, env = "COVERSCAN_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "COVERSCAN_PORT", default_value_t = 1280)]
    port: u16,

    /// Directory for persisted settings/history
    #[arg(long, env = "COVERSCAN_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Directory generated reports are written to
    #[arg(long, env = "COVERSCAN_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenvy::dotenv().is_ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if env_loaded {
        info!("loaded .env file");
    }

    std::fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("creating {}", cli.data_dir.display()))?;
    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;

    let config = ServerConfig {
        host: cli.host.clone(),
        port: cli.port,
        data_dir: cli.data_dir.clone(),
        output_dir: cli.output_dir,
    };
    let history = HistoryStore::load(cli.data_dir.join("history.json"));
    let state = AppState {
        config: Arc::new(config),
        history: Arc::new(history),
        runs: Arc::new(RunRegistry::default()),
    };

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cli.host, cli.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "coverscan-server listening");

    axum::serve(listener, create_router(state))
        .await
        .context("server error")?;
    Ok(())
}
