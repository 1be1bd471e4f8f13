#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chess_coach::{
    error::{IngestError, Result},
    platform::{HttpRequest, Transport},
};
use serde_json::{json, Value};

pub const CHESS_COM: &str = "https://api.chess.com/pub";
pub const LICHESS: &str = "https://lichess.org/api";

enum Reply {
    Body(String),
    Status(u16),
}

/// Serves canned bodies by URL and records every request. Unknown URLs are 404.
#[derive(Default)]
pub struct FakeTransport {
    replies: HashMap<String, Reply>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.replies.insert(url.into(), Reply::Body(body.into()));
        self
    }

    pub fn json(self, url: impl Into<String>, value: Value) -> Self {
        self.body(url, value.to_string())
    }

    pub fn status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.replies.insert(url.into(), Reply::Status(status));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, request: HttpRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.get(&request.url) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Status(404)) | None => Err(IngestError::NotFound { url: request.url }),
            Some(Reply::Status(status)) => Err(IngestError::Remote {
                status: *status,
                url: request.url,
            }),
        }
    }
}

pub fn pgn(white: &str, black: &str, result: &str, moves: &str) -> String {
    format!(
        "[Event \"Live Chess\"]\n[White \"{white}\"]\n[Black \"{black}\"]\n[Result \"{result}\"]\n\n{moves} {result}\n"
    )
}

pub fn archive_url(identity: &str, year: i32, month: u32) -> String {
    format!("{CHESS_COM}/player/{identity}/games/{year}/{month:02}")
}

/// `count` rapid games, oldest first, with urls ending in `/{month}-{index}`.
pub fn archive_page(identity: &str, month: u32, count: usize, time_class: &str) -> Value {
    let games: Vec<Value> = (0..count)
        .map(|index| {
            json!({
                "url": format!("https://www.chess.com/game/live/{month}-{index}"),
                "pgn": pgn(identity, "opponent", "1-0", "1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7#"),
                "time_control": "600",
                "time_class": time_class,
                "rated": true,
                "white": {"username": identity, "rating": 1500, "result": "win"},
                "black": {"username": "opponent", "rating": 1490, "result": "checkmated"},
            })
        })
        .collect();
    json!({ "games": games })
}
