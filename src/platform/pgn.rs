use std::ops::ControlFlow;

use metrics::increment_counter;
use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};
use thiserror::Error;
use tracing::{debug, warn};

use crate::notation::{parse_variant, MoveDecoder, NotationError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameParseError {
    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error("missing {0} tag")]
    MissingTag(&'static str),
}

/// Header tags the pipeline reads. The first occurrence of a tag wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnTags {
    pub site: String,
    pub white: String,
    pub black: String,
    pub result: String,
    pub opening: String,
    pub eco_url: String,
    pub time_control: String,
    pub set_up: String,
    pub fen: String,
    pub variant: String,
}

impl PgnTags {
    fn set_known_tag(&mut self, key: &[u8], value: RawTag<'_>) {
        let slot: &mut String = match key {
            b"Site" => &mut self.site,
            b"White" => &mut self.white,
            b"Black" => &mut self.black,
            b"Result" => &mut self.result,
            b"Opening" => &mut self.opening,
            b"ECOUrl" => &mut self.eco_url,
            b"TimeControl" => &mut self.time_control,
            b"SetUp" => &mut self.set_up,
            b"FEN" => &mut self.fen,
            b"Variant" => &mut self.variant,
            _ => return,
        };

        if !slot.is_empty() {
            return;
        }

        let bytes = value.as_bytes();
        if bytes.is_empty() {
            return;
        }

        *slot = String::from_utf8_lossy(bytes).trim().to_string();
    }

    pub fn opt(field: &str) -> Option<String> {
        let field = field.trim();
        if field.is_empty() || field == "?" {
            None
        } else {
            Some(field.to_string())
        }
    }

    /// Board for the `Variant` tag, starting from `FEN` unless `SetUp` is 0.
    fn decoder(&self) -> Result<MoveDecoder, NotationError> {
        let (variant, mode) = parse_variant(&self.variant)?;
        if self.fen.is_empty() || self.set_up == "0" {
            return Ok(MoveDecoder::for_variant(variant));
        }
        MoveDecoder::from_fen(&self.fen, variant, mode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnGame {
    pub tags: PgnTags,
    pub sans: Vec<String>,
}

/// Mainline of one game being decoded.
pub struct Movetext {
    tags: PgnTags,
    decoder: Result<MoveDecoder, NotationError>,
}

impl Movetext {
    fn fail(&mut self, err: NotationError) {
        if self.decoder.is_ok() {
            self.decoder = Err(err);
        }
    }
}

/// Streaming visitor that resolves every mainline move against the board.
/// Variations are skipped; comments, NAGs and clock annotations are ignored.
#[derive(Default)]
pub struct GameVisitor;

impl Visitor for GameVisitor {
    type Tags = PgnTags;
    type Movetext = Movetext;
    type Output = Result<PgnGame, GameParseError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(PgnTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        tags.set_known_tag(key, value);
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        let decoder = tags.decoder();
        ControlFlow::Continue(Movetext { tags, decoder })
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        let played = match &mut movetext.decoder {
            Ok(decoder) => decoder.play_san(&san_plus.san),
            Err(_) => return ControlFlow::Continue(()),
        };
        if let Err(err) = played {
            movetext.fail(err);
        }
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        let Movetext { tags, decoder } = movetext;
        if tags.white.is_empty() {
            return Err(GameParseError::MissingTag("White"));
        }
        if tags.black.is_empty() {
            return Err(GameParseError::MissingTag("Black"));
        }
        let decoded = decoder?.finish();
        Ok(PgnGame {
            tags,
            sans: decoded.sans,
        })
    }
}

/// Games read from a multi-game stream, in source order.
#[derive(Debug, Default)]
pub struct PgnBatch {
    pub games: Vec<PgnGame>,
    pub skipped: usize,
}

/// Reads every game from `text`. A game that fails to decode is skipped;
/// a reader failure ends the stream but keeps what was already read.
pub fn read_games(text: &str) -> PgnBatch {
    let mut reader = Reader::new(text.as_bytes());
    let mut visitor = GameVisitor;
    let mut batch = PgnBatch::default();

    loop {
        let game_index = batch.games.len() + batch.skipped + 1;
        match reader.read_game(&mut visitor) {
            Ok(Some(Ok(game))) => {
                increment_counter!("games_parsed");
                batch.games.push(game);
            }
            Ok(Some(Err(err))) => {
                increment_counter!("games_skipped", "reason" => "notation");
                warn!(game_index, %err, "Skipping unreadable game");
                batch.skipped += 1;
            }
            Ok(None) => break,
            Err(err) => {
                increment_counter!("games_skipped", "reason" => "stream");
                warn!(game_index, %err, "PGN stream ended early");
                break;
            }
        }
    }

    debug!(
        games = batch.games.len(),
        skipped = batch.skipped,
        "PGN stream read"
    );
    batch
}

/// Reads the first game of `text`, `Ok(None)` if the text holds no game.
pub fn read_game(text: &str) -> Result<Option<PgnGame>, GameParseError> {
    let mut reader = Reader::new(text.as_bytes());
    match reader.read_game(&mut GameVisitor) {
        Ok(Some(game)) => game.map(Some),
        Ok(None) | Err(_) => Ok(None),
    }
}
