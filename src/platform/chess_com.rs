//! Chess.com: games are published as monthly archive pages.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use metrics::increment_counter;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{
    get_json,
    pgn::{self, PgnTags},
    GameQuery, GameSource, HttpRequest, Transport,
};
use crate::{
    config::Settings,
    data::{Outcome, ParsedGame, Platform, RatingEntry, RatingSnapshot, TimeClass},
    error::Result,
};

pub const RATING_BUCKETS: &[TimeClass] = &[
    TimeClass::Bullet,
    TimeClass::Blitz,
    TimeClass::Rapid,
    TimeClass::Daily,
];

/// Minimum gap between two archive page requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPacing {
    pub min_interval: Duration,
}

impl RequestPacing {
    pub const FAIR_USE_INTERVAL: Duration = Duration::from_millis(500);

    pub fn fair_use() -> Self {
        Self {
            min_interval: Self::FAIR_USE_INTERVAL,
        }
    }

    pub fn none() -> Self {
        Self {
            min_interval: Duration::ZERO,
        }
    }

    async fn pause(&self) {
        if !self.min_interval.is_zero() {
            sleep(self.min_interval).await;
        }
    }
}

impl Default for RequestPacing {
    fn default() -> Self {
        Self::fair_use()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArchivedPlayer {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub result: String,
}

/// One record of a monthly archive page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArchivedGame {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pgn: Option<String>,
    #[serde(default)]
    pub time_control: Option<String>,
    #[serde(default)]
    pub time_class: Option<String>,
    #[serde(default)]
    pub white: ArchivedPlayer,
    #[serde(default)]
    pub black: ArchivedPlayer,
}

impl ArchivedGame {
    fn is_time_class(&self, time_class: Option<TimeClass>) -> bool {
        match time_class {
            None => true,
            Some(wanted) => self
                .time_class
                .as_deref()
                .map_or(false, |tc| tc.eq_ignore_ascii_case(wanted.as_str())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveList {
    #[serde(default)]
    archives: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ArchivePage {
    #[serde(default)]
    games: Vec<ArchivedGame>,
}

#[derive(Debug, Default, Deserialize)]
struct Stats {
    chess_bullet: Option<ModeStats>,
    chess_blitz: Option<ModeStats>,
    chess_rapid: Option<ModeStats>,
    chess_daily: Option<ModeStats>,
}

#[derive(Debug, Default, Deserialize)]
struct ModeStats {
    last: Option<LastRating>,
    #[serde(default)]
    record: Record,
}

#[derive(Debug, Deserialize)]
struct LastRating {
    rating: i32,
}

#[derive(Debug, Default, Deserialize)]
struct Record {
    #[serde(default)]
    win: u32,
    #[serde(default)]
    loss: u32,
    #[serde(default)]
    draw: u32,
}

impl Stats {
    fn mode(&self, bucket: TimeClass) -> Option<&ModeStats> {
        match bucket {
            TimeClass::Bullet => self.chess_bullet.as_ref(),
            TimeClass::Blitz => self.chess_blitz.as_ref(),
            TimeClass::Rapid => self.chess_rapid.as_ref(),
            TimeClass::Daily => self.chess_daily.as_ref(),
            TimeClass::Classical => None,
        }
    }

    fn snapshot(&self) -> RatingSnapshot {
        RATING_BUCKETS
            .iter()
            .map(|&bucket| {
                let entry = self
                    .mode(bucket)
                    .map(|mode| {
                        let games = mode.record.win + mode.record.loss + mode.record.draw;
                        RatingEntry::new(mode.last.as_ref().map(|last| last.rating), games, 0)
                    })
                    .unwrap_or_default();
                (bucket, entry)
            })
            .collect()
    }
}

/// Month an archive URL such as `.../games/2026/01` covers.
pub fn archive_month(url: &str) -> Option<NaiveDate> {
    let mut segments = url.trim_end_matches('/').rsplit('/');
    let month: u32 = segments.next()?.parse().ok()?;
    let year: i32 = segments.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub struct ChessComSource {
    transport: Arc<dyn Transport>,
    base: String,
    metadata_timeout: Duration,
    download_timeout: Duration,
    pacing: RequestPacing,
}

impl ChessComSource {
    pub fn new(transport: Arc<dyn Transport>, settings: &Settings) -> Self {
        Self {
            transport,
            base: settings.chess_com_api.trim_end_matches('/').to_string(),
            metadata_timeout: settings.metadata_timeout,
            download_timeout: settings.download_timeout,
            pacing: RequestPacing {
                min_interval: settings.archive_interval,
            },
        }
    }

    pub fn with_pacing(mut self, pacing: RequestPacing) -> Self {
        self.pacing = pacing;
        self
    }

    fn player_url(&self, identity: &str) -> String {
        format!("{}/player/{}", self.base, identity.to_lowercase())
    }

    /// Archive pages to walk, newest first.
    async fn archive_pages(&self, identity: &str, query: &GameQuery) -> Result<Vec<String>> {
        if let (Some(year), Some(month)) = (query.year, query.month) {
            return Ok(vec![format!(
                "{}/games/{year}/{month:02}",
                self.player_url(identity)
            )]);
        }

        let request = HttpRequest::get(
            format!("{}/games/archives", self.player_url(identity)),
            self.metadata_timeout,
        );
        let list: ArchiveList = get_json(self.transport.as_ref(), request).await?;
        let mut archives = list.archives;
        if let Some(year) = query.year {
            archives.retain(|url| archive_month(url).map_or(false, |month| month.year() == year));
        }
        archives.reverse();
        debug!(identity, archives = archives.len(), "Archive list");
        Ok(archives)
    }
}

#[async_trait]
impl GameSource for ChessComSource {
    type Raw = Vec<ArchivedGame>;

    fn platform(&self) -> Platform {
        Platform::ChessCom
    }

    fn rating_buckets(&self) -> &'static [TimeClass] {
        RATING_BUCKETS
    }

    async fn fetch_games(&self, identity: &str, query: &GameQuery) -> Result<Vec<ArchivedGame>> {
        let pages = self.archive_pages(identity, query).await?;
        let mut games: Vec<ArchivedGame> = Vec::new();

        for (index, archive) in pages.iter().enumerate() {
            if games.len() >= query.max_games {
                break;
            }
            if index > 0 {
                self.pacing.pause().await;
            }
            info!(%archive, "Fetching archive page");
            let request = HttpRequest::get(archive.as_str(), self.download_timeout);
            let page: ArchivePage = get_json(self.transport.as_ref(), request).await?;
            increment_counter!("archive_pages_fetched");
            games.extend(
                page.games
                    .into_iter()
                    .rev()
                    .filter(|game| game.is_time_class(query.time_class)),
            );
        }

        games.truncate(query.max_games);
        info!(identity, games = games.len(), "Fetched chess.com games");
        Ok(games)
    }

    fn parse_games(&self, raw: Vec<ArchivedGame>, identity: &str) -> Vec<ParsedGame> {
        let mut parsed = Vec::with_capacity(raw.len());
        for record in raw {
            let Some(text) = record.pgn.as_deref().filter(|pgn| !pgn.trim().is_empty()) else {
                increment_counter!("games_skipped", "reason" => "missing_pgn");
                warn!(identity, url = %record.url, "Skipping game without PGN");
                continue;
            };
            let game = match pgn::read_game(text) {
                Ok(Some(game)) => game,
                Ok(None) => {
                    increment_counter!("games_skipped", "reason" => "pgn");
                    warn!(identity, url = %record.url, "Skipping game with empty PGN");
                    continue;
                }
                Err(err) => {
                    increment_counter!("games_skipped", "reason" => "notation");
                    warn!(identity, url = %record.url, %err, "Skipping unreadable game");
                    continue;
                }
            };
            increment_counter!("games_parsed");

            let tags = game.tags;
            let player = |name: String, fallback: &str| {
                if name.is_empty() {
                    fallback.to_string()
                } else {
                    name
                }
            };
            parsed.push(ParsedGame {
                white: player(record.white.username, &tags.white),
                black: player(record.black.username, &tags.black),
                outcome: Outcome::PerSide {
                    white: record.white.result,
                    black: record.black.result,
                },
                opening: PgnTags::opt(&tags.opening),
                eco_url: PgnTags::opt(&tags.eco_url),
                time_control: record
                    .time_control
                    .as_deref()
                    .and_then(PgnTags::opt)
                    .or_else(|| PgnTags::opt(&tags.time_control)),
                url: PgnTags::opt(&record.url).or_else(|| PgnTags::opt(&tags.site)),
                sans: game.sans,
            });
        }
        parsed
    }

    async fn fetch_ratings(&self, identity: &str) -> Result<RatingSnapshot> {
        let request = HttpRequest::get(
            format!("{}/stats", self.player_url(identity)),
            self.metadata_timeout,
        );
        let stats: Stats = get_json(self.transport.as_ref(), request).await?;
        Ok(stats.snapshot())
    }
}
