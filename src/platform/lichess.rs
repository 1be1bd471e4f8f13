//! Lichess: every game comes back in one PGN stream.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::{
    get_json,
    pgn::{self, PgnGame, PgnTags},
    GameQuery, GameSource, HttpRequest, Transport,
};
use crate::{
    config::Settings,
    data::{Outcome, ParsedGame, Platform, RatingEntry, RatingSnapshot, TimeClass},
    error::Result,
};

pub const PGN_MIME: &str = "application/x-chess-pgn";

pub const RATING_BUCKETS: &[TimeClass] = &[
    TimeClass::Bullet,
    TimeClass::Blitz,
    TimeClass::Rapid,
    TimeClass::Classical,
];

#[derive(Debug, Default, Deserialize)]
struct UserProfile {
    #[serde(default)]
    perfs: HashMap<String, Perf>,
}

#[derive(Debug, Default, Deserialize)]
struct Perf {
    #[serde(default)]
    games: u32,
    rating: Option<i32>,
    #[serde(default)]
    prog: i32,
}

pub struct LichessSource {
    transport: Arc<dyn Transport>,
    base: String,
    metadata_timeout: Duration,
    download_timeout: Duration,
}

impl LichessSource {
    pub fn new(transport: Arc<dyn Transport>, settings: &Settings) -> Self {
        Self {
            transport,
            base: settings.lichess_api.trim_end_matches('/').to_string(),
            metadata_timeout: settings.metadata_timeout,
            download_timeout: settings.download_timeout,
        }
    }

    fn games_request(&self, identity: &str, query: &GameQuery) -> HttpRequest {
        let mut request = HttpRequest::get(
            format!("{}/games/user/{}", self.base, identity.to_lowercase()),
            self.download_timeout,
        )
        .query("max", query.max_games)
        .query("moves", true)
        .query("tags", true)
        .query("opening", true)
        .accept(PGN_MIME);
        if let Some(time_class) = query.time_class {
            request = request.query("perfType", time_class.as_str());
        }
        request
    }
}

fn to_parsed(game: PgnGame) -> ParsedGame {
    let PgnGame { tags, sans } = game;
    ParsedGame {
        outcome: Outcome::Game(tags.result.clone()),
        opening: PgnTags::opt(&tags.opening),
        eco_url: PgnTags::opt(&tags.eco_url),
        time_control: PgnTags::opt(&tags.time_control),
        url: PgnTags::opt(&tags.site),
        white: tags.white,
        black: tags.black,
        sans,
    }
}

#[async_trait]
impl GameSource for LichessSource {
    type Raw = String;

    fn platform(&self) -> Platform {
        Platform::Lichess
    }

    fn rating_buckets(&self) -> &'static [TimeClass] {
        RATING_BUCKETS
    }

    async fn fetch_games(&self, identity: &str, query: &GameQuery) -> Result<String> {
        info!(identity, max = query.max_games, "Fetching lichess games");
        self.transport.get(self.games_request(identity, query)).await
    }

    fn parse_games(&self, raw: String, identity: &str) -> Vec<ParsedGame> {
        let batch = pgn::read_games(&raw);
        info!(
            identity,
            games = batch.games.len(),
            skipped = batch.skipped,
            "Parsed lichess games"
        );
        batch.games.into_iter().map(to_parsed).collect()
    }

    async fn fetch_ratings(&self, identity: &str) -> Result<RatingSnapshot> {
        let request = HttpRequest::get(
            format!("{}/user/{}", self.base, identity.to_lowercase()),
            self.metadata_timeout,
        );
        let profile: UserProfile = get_json(self.transport.as_ref(), request).await?;
        Ok(snapshot_from_profile(&profile))
    }
}

fn snapshot_from_profile(profile: &UserProfile) -> RatingSnapshot {
    RATING_BUCKETS
        .iter()
        .map(|&bucket| {
            let entry = profile
                .perfs
                .get(bucket.as_str())
                .map(|perf| RatingEntry::new(perf.rating, perf.games, perf.prog))
                .unwrap_or_default();
            (bucket, entry)
        })
        .collect()
}
