//! PDF Toolbox API server.
//!
//! REST endpoints for user account/usage tracking and PDF transforms
//! (merge, split, compress), with an optional Telegram bot front-end
//! that deep-links into the web app.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use pdftoolbox_api::delivery::ArtifactStore;
use pdftoolbox_api::store::{AccountStore, JsonFileBackend};
use pdftoolbox_api::{bot, router, AppState};

#[derive(Parser, Debug)]
#[command(name = "pdftoolbox-api")]
#[command(about = "Backend API server for the PDF Toolbox web app")]
struct Args {
    /// Port to listen on (PORT env var wins when set)
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Account snapshot file
    #[arg(long, default_value = "data/users.json")]
    data_path: String,

    /// Directory for persisted artifacts
    #[arg(long, default_value = "data/artifacts")]
    artifacts_dir: String,

    /// Per-transform timeout in milliseconds
    #[arg(long, default_value = "30000")]
    timeout_ms: u64,

    /// Web app URL the bot deep-links to
    #[arg(long, default_value = "https://pdf-toolbox-client.onrender.com")]
    webapp_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pdftoolbox_api=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    let data_path = std::env::var("DATA_PATH").unwrap_or(args.data_path);
    info!("account snapshot at {data_path}");

    let store = Arc::new(AccountStore::open(JsonFileBackend::new(&data_path))?);
    let artifacts = Arc::new(ArtifactStore::new(&args.artifacts_dir));

    bot::spawn_if_configured(Arc::clone(&store), args.webapp_url);

    let state = AppState {
        store,
        artifacts,
        timeout_ms: args.timeout_ms,
    };
    let app = router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(args.port);
    let addr: SocketAddr = format!("{}:{}", args.host, port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("PDF Toolbox API listening on http://{addr}");
    info!("transform timeout: {}ms", args.timeout_ms);

    axum::serve(listener, app).await?;

    Ok(())
}
