use std::sync::Arc;

use anyhow::{Context, Result};
use chess_coach::{
    config::{RunRequest, Settings},
    data::Platform,
    ingest::ingest,
    platform::{chess_com, lichess, HttpTransport},
    report::{format_games, ratings_markdown},
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let json = std::env::var("CHESS_COACH_LOG_JSON").map_or(false, |v| v == "1");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "chess_coach=info".into()))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let identity = std::env::args()
        .nth(1)
        .context("usage: chess-coach <username>")?;
    let settings = Settings::from_env().context("Failed to load settings")?;
    let request = RunRequest::from_env(identity).context("Invalid run request")?;
    let transport = Arc::new(HttpTransport::new(&settings).context("Failed to build HTTP client")?);

    info!(platform = %request.platform, identity = %request.identity, "Ingesting games");
    let report = ingest(
        &settings,
        transport,
        request.platform,
        &request.identity,
        &request.query,
    )
    .await
    .with_context(|| format!("Failed to ingest games for {}", request.identity))?;

    let buckets = match report.platform {
        Platform::Lichess => lichess::RATING_BUCKETS,
        Platform::ChessCom => chess_com::RATING_BUCKETS,
    };
    println!("{}\n", ratings_markdown(&report.ratings, buckets));
    println!("{}", format_games(&report.games, &report.identity));
    Ok(())
}
