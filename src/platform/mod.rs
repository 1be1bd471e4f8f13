//! Platform adapters: one contract, one implementation per game server.

pub mod chess_com;
pub mod lichess;
pub mod pgn;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::Settings,
    data::{ParsedGame, Platform, RatingSnapshot, TimeClass},
    error::{IngestError, Result},
};

/// What to fetch for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameQuery {
    pub max_games: usize,
    pub time_class: Option<TimeClass>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl Default for GameQuery {
    fn default() -> Self {
        Self {
            max_games: 20,
            time_class: None,
            year: None,
            month: None,
        }
    }
}

impl GameQuery {
    pub fn validate_for(&self, platform: Platform) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> { Err(IngestError::InvalidArgument(msg.to_string())) };
        if self.max_games == 0 {
            return invalid("game count must be at least 1");
        }
        if self.month.is_some() && self.year.is_none() {
            return invalid("month requires year");
        }
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return invalid("month must be between 1 and 12");
            }
        }
        match platform {
            Platform::Lichess => {
                if self.year.is_some() {
                    return invalid("year and month are only supported for chess.com");
                }
                if self.time_class == Some(TimeClass::Daily) {
                    return invalid("Daily is only valid for chess.com, use Classical for lichess");
                }
            }
            Platform::ChessCom => {
                if self.time_class == Some(TimeClass::Classical) {
                    return invalid("Classical is only valid for lichess, use Daily for chess.com");
                }
            }
        }
        Ok(())
    }
}

/// A GET request against one of the platform APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(&'static str, String)>,
    pub accept: Option<&'static str>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            accept: None,
            timeout,
        }
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn accept(mut self, mime: &'static str) -> Self {
        self.accept = Some(mime);
        self
    }
}

/// Fetches response bodies. 404 maps to `NotFound`, any other non-2xx to
/// `Remote`. No retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: HttpRequest) -> Result<String>;
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: HttpRequest,
) -> Result<T> {
    let url = request.url.clone();
    let body = transport.get(request).await?;
    serde_json::from_str(&body).map_err(|source| IngestError::Decode { url, source })
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let user_agent = header::HeaderValue::from_str(&settings.user_agent)
            .map_err(|e| IngestError::Config(format!("invalid user agent: {e}")))?;
        headers.insert(header::USER_AGENT, user_agent);
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: HttpRequest) -> Result<String> {
        debug!(url = %request.url, "GET");
        let mut builder = self
            .client
            .get(&request.url)
            .query(&request.query)
            .timeout(request.timeout);
        if let Some(accept) = request.accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        let response = builder.send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.text().await?),
            StatusCode::NOT_FOUND => Err(IngestError::NotFound { url: request.url }),
            status => Err(IngestError::Remote {
                status: status.as_u16(),
                url: request.url,
            }),
        }
    }
}

/// Contract shared by every platform adapter.
#[async_trait]
pub trait GameSource: Send + Sync {
    /// Undecoded games as the platform delivers them.
    type Raw: Send;

    fn platform(&self) -> Platform;

    /// Rating buckets the platform exposes, in display order.
    fn rating_buckets(&self) -> &'static [TimeClass];

    /// Newest first, at most `query.max_games`.
    async fn fetch_games(&self, identity: &str, query: &GameQuery) -> Result<Self::Raw>;

    /// Keeps fetch order. Games that cannot be decoded are skipped.
    fn parse_games(&self, raw: Self::Raw, identity: &str) -> Vec<ParsedGame>;

    async fn fetch_ratings(&self, identity: &str) -> Result<RatingSnapshot>;
}
