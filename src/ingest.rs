//! Fetch, parse and normalize one player's recent games.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::Settings,
    data::{CanonicalGame, Platform, RatingSnapshot},
    error::{IngestError, Result},
    normalize::normalize,
    platform::{
        chess_com::ChessComSource, lichess::LichessSource, GameQuery, GameSource, Transport,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub platform: Platform,
    pub identity: String,
    pub games: Vec<CanonicalGame>,
    pub ratings: RatingSnapshot,
}

/// Games in fetch order, newest first. Fetch failures propagate unchanged.
pub async fn run<S: GameSource>(
    source: &S,
    identity: &str,
    query: &GameQuery,
) -> Result<Vec<CanonicalGame>> {
    query.validate_for(source.platform())?;

    let raw = source.fetch_games(identity, query).await?;
    let parsed = source.parse_games(raw, identity);
    if parsed.is_empty() {
        return Err(IngestError::EmptyResult {
            identity: identity.to_string(),
        });
    }

    let games = parsed
        .iter()
        .map(|game| normalize(game, identity))
        .collect::<Result<Vec<_>>>()?;
    info!(
        platform = %source.platform(),
        identity,
        games = games.len(),
        "Games normalized"
    );
    Ok(games)
}

/// An unknown player is an error; any other failure gives an empty snapshot.
pub async fn lookup_ratings<S: GameSource>(source: &S, identity: &str) -> Result<RatingSnapshot> {
    match source.fetch_ratings(identity).await {
        Ok(snapshot) => Ok(snapshot),
        Err(err) if err.is_not_found() => Err(err),
        Err(err) => {
            warn!(platform = %source.platform(), identity, %err, "Ratings unavailable");
            Ok(RatingSnapshot::empty(source.rating_buckets()))
        }
    }
}

async fn ingest_from<S: GameSource>(
    source: &S,
    identity: &str,
    query: &GameQuery,
) -> Result<IngestReport> {
    query.validate_for(source.platform())?;
    let ratings = lookup_ratings(source, identity).await?;
    let games = run(source, identity, query).await?;
    Ok(IngestReport {
        platform: source.platform(),
        identity: identity.to_string(),
        games,
        ratings,
    })
}

pub async fn ingest(
    settings: &Settings,
    transport: Arc<dyn Transport>,
    platform: Platform,
    identity: &str,
    query: &GameQuery,
) -> Result<IngestReport> {
    match platform {
        Platform::Lichess => {
            ingest_from(&LichessSource::new(transport, settings), identity, query).await
        }
        Platform::ChessCom => {
            ingest_from(&ChessComSource::new(transport, settings), identity, query).await
        }
    }
}

