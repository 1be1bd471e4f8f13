mod case_insensitive_string;

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

pub use case_insensitive_string::CaseInsensitiveString;

pub const UNKNOWN_OPENING: &str = "Unknown opening";
pub const UNKNOWN_TIME_CONTROL: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Lichess,
    ChessCom,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Lichess => "lichess",
            Platform::ChessCom => "chess.com",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lichess" => Ok(Platform::Lichess),
            "chess.com" | "chesscom" => Ok(Platform::ChessCom),
            other => Err(IngestError::InvalidArgument(format!(
                "unknown platform '{other}' (expected 'lichess' or 'chess.com')"
            ))),
        }
    }
}

/// Coarse speed category used both as a fetch filter and as a ratings bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeClass {
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Daily,
}

impl TimeClass {
    /// Lowercase key shared by the Lichess `perfType` parameter and the Chess.com `time_class` field.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeClass::Bullet => "bullet",
            TimeClass::Blitz => "blitz",
            TimeClass::Rapid => "rapid",
            TimeClass::Classical => "classical",
            TimeClass::Daily => "daily",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeClass::Bullet => "Bullet",
            TimeClass::Blitz => "Blitz",
            TimeClass::Rapid => "Rapid",
            TimeClass::Classical => "Classical",
            TimeClass::Daily => "Daily",
        }
    }
}

impl fmt::Display for TimeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for TimeClass {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bullet" => Ok(TimeClass::Bullet),
            "blitz" => Ok(TimeClass::Blitz),
            "rapid" => Ok(TimeClass::Rapid),
            "classical" => Ok(TimeClass::Classical),
            "daily" => Ok(TimeClass::Daily),
            other => Err(IngestError::InvalidArgument(format!(
                "unknown time class '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Color::White => "White",
            Color::Black => "Black",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
    Unknown,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            GameResult::Win => "Win",
            GameResult::Loss => "Loss",
            GameResult::Draw => "Draw",
            GameResult::Unknown => "?",
        })
    }
}

/// A single game seen from the queried player's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalGame {
    pub color: Color,
    pub result: GameResult,
    pub opening: String,
    pub time_control: String,
    /// Plies played.
    pub move_count: usize,
    /// Numbered SAN, empty when no move was played.
    pub moves: String,
    pub opponent: String,
    pub url: String,
}

/// How a platform reports who won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// One game-level token such as the PGN `Result` tag (`1-0`, `0-1`, `1/2-1/2`, `*`).
    Game(String),
    /// Independent tokens per side, e.g. `win` / `checkmated`.
    PerSide { white: String, black: String },
}

/// A game after platform-specific parsing, before it is projected onto the queried player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGame {
    pub white: String,
    pub black: String,
    pub outcome: Outcome,
    pub opening: Option<String>,
    pub eco_url: Option<String>,
    pub time_control: Option<String>,
    pub url: Option<String>,
    pub sans: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RatingEntry {
    pub rating: Option<i32>,
    pub games: u32,
    pub trend: i32,
}

impl RatingEntry {
    /// An entry with no rating always carries zero games, and the other way round.
    pub fn new(rating: Option<i32>, games: u32, trend: i32) -> Self {
        match rating {
            Some(rating) if games > 0 => RatingEntry {
                rating: Some(rating),
                games,
                trend,
            },
            _ => RatingEntry::default(),
        }
    }

    pub fn is_played(&self) -> bool {
        self.rating.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RatingSnapshot {
    entries: BTreeMap<TimeClass, RatingEntry>,
}

impl RatingSnapshot {
    /// Every bucket present and unplayed.
    pub fn empty(buckets: &[TimeClass]) -> Self {
        buckets
            .iter()
            .map(|&bucket| (bucket, RatingEntry::default()))
            .collect()
    }

    pub fn get(&self, bucket: TimeClass) -> RatingEntry {
        self.entries.get(&bucket).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimeClass, RatingEntry)> + '_ {
        self.entries.iter().map(|(&bucket, &entry)| (bucket, entry))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|entry| !entry.is_played())
    }
}

impl FromIterator<(TimeClass, RatingEntry)> for RatingSnapshot {
    fn from_iter<I: IntoIterator<Item = (TimeClass, RatingEntry)>>(iter: I) -> Self {
        RatingSnapshot {
            entries: iter.into_iter().collect(),
        }
    }
}
