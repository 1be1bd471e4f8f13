use std::{env, str::FromStr, time::Duration};

use crate::{
    data::Platform,
    error::{IngestError, Result},
    platform::{chess_com::RequestPacing, GameQuery},
};

pub const DEFAULT_LICHESS_API: &str = "https://lichess.org/api";
pub const DEFAULT_CHESS_COM_API: &str = "https://api.chess.com/pub";
pub const DEFAULT_USER_AGENT: &str = concat!("chess-coach/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub lichess_api: String,
    pub chess_com_api: String,
    pub user_agent: String,
    /// Profile, stats and archive list requests.
    pub metadata_timeout: Duration,
    /// PGN stream and archive page downloads.
    pub download_timeout: Duration,
    pub archive_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lichess_api: DEFAULT_LICHESS_API.to_string(),
            chess_com_api: DEFAULT_CHESS_COM_API.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            metadata_timeout: Duration::from_secs(10),
            download_timeout: Duration::from_secs(30),
            archive_interval: RequestPacing::FAIR_USE_INTERVAL,
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|value| {
            value
                .parse()
                .map_err(|e| IngestError::Config(format!("{name}={value}: {e}")))
        })
        .transpose()
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let settings = Self {
            lichess_api: var("CHESS_COACH_LICHESS_API").unwrap_or(defaults.lichess_api),
            chess_com_api: var("CHESS_COACH_CHESS_COM_API").unwrap_or(defaults.chess_com_api),
            user_agent: var("CHESS_COACH_USER_AGENT").unwrap_or(defaults.user_agent),
            metadata_timeout: parse_var("CHESS_COACH_METADATA_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.metadata_timeout),
            download_timeout: parse_var("CHESS_COACH_DOWNLOAD_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.download_timeout),
            archive_interval: parse_var("CHESS_COACH_ARCHIVE_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.archive_interval),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.archive_interval < RequestPacing::FAIR_USE_INTERVAL {
            return Err(IngestError::Config(format!(
                "archive interval must be at least {} ms",
                RequestPacing::FAIR_USE_INTERVAL.as_millis()
            )));
        }
        if self.metadata_timeout.is_zero() || self.download_timeout.is_zero() {
            return Err(IngestError::Config("timeouts must be positive".to_string()));
        }
        if self.user_agent.is_empty() {
            return Err(IngestError::Config("user agent must not be empty".to_string()));
        }
        Ok(())
    }
}

/// One invocation: whose games, from where, and which ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub identity: String,
    pub platform: Platform,
    pub query: GameQuery,
}

impl RunRequest {
    pub fn from_env(identity: impl Into<String>) -> Result<Self> {
        let identity = identity.into().trim().to_string();
        if identity.is_empty() {
            return Err(IngestError::InvalidArgument(
                "username must not be empty".to_string(),
            ));
        }
        let platform = var("CHESS_COACH_PLATFORM")
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or(Platform::Lichess);
        let query = GameQuery {
            max_games: parse_var("CHESS_COACH_GAMES")?.unwrap_or(GameQuery::default().max_games),
            time_class: var("CHESS_COACH_TIME_CLASS")
                .map(|value| value.parse())
                .transpose()?,
            year: parse_var("CHESS_COACH_YEAR")?,
            month: parse_var("CHESS_COACH_MONTH")?,
        };
        query.validate_for(platform)?;
        Ok(Self {
            identity,
            platform,
            query,
        })
    }
}
