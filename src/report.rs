//! Plain-text renderings of an ingest run.

use std::fmt::Write;

use crate::data::{CanonicalGame, RatingSnapshot, TimeClass};

const MOVES_INDENT: &str = "         ";

/// One header per game followed by its indented move text.
pub fn format_games(games: &[CanonicalGame], identity: &str) -> String {
    let mut lines = vec![
        format!("Player: {identity}"),
        format!("Games provided: {}", games.len()),
        String::new(),
    ];
    for (i, game) in games.iter().enumerate() {
        lines.push(format!(
            "Game {:>2} | {:5} | {:4} | Moves: {:>3} | TC: {:>8} | Opening: {} | URL: {}",
            i + 1,
            game.color,
            game.result,
            game.move_count,
            game.time_control,
            game.opening,
            game.url,
        ));
        lines.push(format!("{MOVES_INDENT}{}", game.moves));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn trend(delta: i32) -> String {
    match delta {
        d if d > 0 => format!("↑ {d}"),
        d if d < 0 => format!("↓ {}", d.unsigned_abs()),
        _ => "—".to_string(),
    }
}

/// Markdown table with one row per bucket, in the order given.
pub fn ratings_markdown(snapshot: &RatingSnapshot, buckets: &[TimeClass]) -> String {
    let mut out = String::from("| Time Control | Rating | Trend | Games |\n|---|---|---|---|");
    for &bucket in buckets {
        let entry = snapshot.get(bucket);
        let _ = match entry.rating {
            Some(rating) => write!(
                out,
                "\n| {} | {} | {} | {} |",
                bucket.label(),
                rating,
                trend(entry.trend),
                entry.games
            ),
            None => write!(out, "\n| {} | — | — | 0 |", bucket.label()),
        };
    }
    out
}
