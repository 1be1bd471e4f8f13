//! Projects a parsed game onto the queried player.

use crate::{
    data::{
        CanonicalGame, CaseInsensitiveString, Color, GameResult, Outcome, ParsedGame,
        UNKNOWN_OPENING, UNKNOWN_TIME_CONTROL,
    },
    error::{IngestError, Result},
    notation::number_moves,
};

const DRAW_TOKENS: &[&str] = &[
    "agreed",
    "repetition",
    "stalemate",
    "insufficient",
    "50move",
    "timevsinsufficient",
];

const LOSS_TOKENS: &[&str] = &[
    "checkmated",
    "resigned",
    "timeout",
    "abandoned",
    "lose",
    "kingofthehill",
    "threecheck",
    "bughousepartnerlose",
];

fn is_known_token(token: &str) -> bool {
    token == "win" || DRAW_TOKENS.contains(&token) || LOSS_TOKENS.contains(&token)
}

pub fn resolve_color(game: &ParsedGame, identity: &str) -> Result<Color> {
    let identity = CaseInsensitiveString::from(identity);
    if identity.matches(&game.white) {
        Ok(Color::White)
    } else if identity.matches(&game.black) {
        Ok(Color::Black)
    } else {
        Err(IngestError::IdentityMismatch {
            identity: identity.to_string(),
            white: game.white.clone(),
            black: game.black.clone(),
        })
    }
}

/// Total: tokens outside the known vocabulary give `Unknown`.
pub fn resolve_result(outcome: &Outcome, color: Color) -> GameResult {
    match outcome {
        Outcome::Game(token) => match (token.trim(), color) {
            ("1-0", Color::White) | ("0-1", Color::Black) => GameResult::Win,
            ("1-0", Color::Black) | ("0-1", Color::White) => GameResult::Loss,
            ("1/2-1/2", _) => GameResult::Draw,
            _ => GameResult::Unknown,
        },
        Outcome::PerSide { white, black } => {
            let (own, theirs) = match color {
                Color::White => (white, black),
                Color::Black => (black, white),
            };
            let own = own.trim().to_ascii_lowercase();
            let theirs = theirs.trim().to_ascii_lowercase();
            if own == "win" {
                GameResult::Win
            } else if theirs == "win" {
                GameResult::Loss
            } else if is_known_token(&own) && is_known_token(&theirs) {
                GameResult::Draw
            } else {
                GameResult::Unknown
            }
        }
    }
}

/// Opening name, else the `ECOUrl` slug with hyphens as spaces.
pub fn resolve_opening(opening: Option<&str>, eco_url: Option<&str>) -> String {
    let named = opening.map(str::trim).filter(|name| !name.is_empty());
    let slug = || {
        eco_url
            .map(|url| url.trim().trim_end_matches('/'))
            .and_then(|url| url.rsplit('/').next())
            .map(|slug| slug.replace('-', " ").trim().to_string())
            .filter(|name| !name.is_empty())
    };
    named
        .map(str::to_string)
        .or_else(slug)
        .unwrap_or_else(|| UNKNOWN_OPENING.to_string())
}

pub fn normalize(game: &ParsedGame, identity: &str) -> Result<CanonicalGame> {
    let color = resolve_color(game, identity)?;
    let opponent = match color {
        Color::White => &game.black,
        Color::Black => &game.white,
    };
    Ok(CanonicalGame {
        color,
        result: resolve_result(&game.outcome, color),
        opening: resolve_opening(game.opening.as_deref(), game.eco_url.as_deref()),
        time_control: game
            .time_control
            .clone()
            .unwrap_or_else(|| UNKNOWN_TIME_CONTROL.to_string()),
        move_count: game.sans.len(),
        moves: number_moves(&game.sans),
        opponent: opponent.clone(),
        url: game.url.clone().unwrap_or_default(),
    })
}
