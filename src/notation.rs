//! Standard algebraic notation for a game's mainline.
//!
//! SAN depends on the position a move is played from (disambiguation,
//! check and mate suffixes), so decoding keeps one board and advances it
//! move by move. The board follows the rules of the game's variant, so
//! drops and explosions resolve the way the platform played them.

use shakmaty::{
    fen::Fen,
    san::{San, SanPlus},
    variant::{Variant, VariantPosition},
    CastlingMode, Move,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("illegal move {san} at ply {ply}: {reason}")]
    IllegalMove {
        ply: usize,
        san: String,
        reason: String,
    },

    #[error("invalid starting position '{fen}': {reason}")]
    InvalidPosition { fen: String, reason: String },

    #[error("unsupported variant '{0}'")]
    UnsupportedVariant(String),
}

/// Rules and castling mode named by a PGN `Variant` tag. An empty tag is
/// standard chess.
pub fn parse_variant(tag: &str) -> Result<(Variant, CastlingMode), NotationError> {
    let tag = tag.trim();
    let mode = if tag.contains("960") {
        CastlingMode::Chess960
    } else {
        CastlingMode::Standard
    };
    if tag.is_empty() {
        return Ok((Variant::Chess, mode));
    }
    if let Ok(variant) = Variant::from_ascii(tag.as_bytes()) {
        return Ok((variant, mode));
    }

    let key: String = tag
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    let variant = match key.as_str() {
        "standard" | "chess" | "chess960" | "fromposition" => Variant::Chess,
        "atomic" => Variant::Atomic,
        "antichess" => Variant::Antichess,
        "kingofthehill" => Variant::KingOfTheHill,
        "threecheck" | "3check" => Variant::ThreeCheck,
        "crazyhouse" => Variant::Crazyhouse,
        "racingkings" => Variant::RacingKings,
        "horde" => Variant::Horde,
        _ => return Err(NotationError::UnsupportedVariant(tag.to_string())),
    };
    Ok((variant, mode))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMoves {
    pub sans: Vec<String>,
    /// `"1.e4 e5 2.Nf3"`, empty for a game without moves.
    pub numbered: String,
}

/// Board plus the SAN of every ply played on it so far.
#[derive(Debug, Clone, Default)]
pub struct MoveDecoder {
    board: VariantPosition,
    sans: Vec<String>,
}

impl MoveDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_variant(variant: Variant) -> Self {
        Self::from_board(VariantPosition::new(variant))
    }

    pub fn from_board(board: impl Into<VariantPosition>) -> Self {
        Self {
            board: board.into(),
            sans: Vec::new(),
        }
    }

    /// Start from a `SetUp` position. Chess960 games need
    /// `CastlingMode::Chess960` so that castling rights are read from the
    /// rook files.
    pub fn from_fen(fen: &str, variant: Variant, mode: CastlingMode) -> Result<Self, NotationError> {
        let invalid = |reason: String| NotationError::InvalidPosition {
            fen: fen.to_string(),
            reason,
        };
        let setup: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        let board = VariantPosition::from_setup(variant, setup.into_setup(), mode)
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(Self::from_board(board))
    }

    pub fn board(&self) -> &VariantPosition {
        &self.board
    }

    pub fn ply(&self) -> usize {
        self.sans.len()
    }

    /// Plays a move that is legal in the current position.
    pub fn play(&mut self, m: Move) {
        let san = SanPlus::from_move_and_play_unchecked(&mut self.board, m);
        self.sans.push(san.to_string());
    }

    /// Resolves a SAN token against the current position, then plays it.
    /// The recorded SAN is recomputed from the board, so sloppy source
    /// notation (missing suffixes, over-disambiguation) comes out canonical.
    pub fn play_san(&mut self, san: &San) -> Result<(), NotationError> {
        let m = san
            .to_move(&self.board)
            .map_err(|e| NotationError::IllegalMove {
                ply: self.ply() + 1,
                san: san.to_string(),
                reason: e.to_string(),
            })?;
        self.play(m);
        Ok(())
    }

    pub fn finish(self) -> DecodedMoves {
        let numbered = number_moves(&self.sans);
        DecodedMoves {
            sans: self.sans,
            numbered,
        }
    }
}

/// Folds structured moves over `board`.
pub fn decode<I>(board: impl Into<VariantPosition>, moves: I) -> DecodedMoves
where
    I: IntoIterator<Item = Move>,
{
    moves
        .into_iter()
        .fold(MoveDecoder::from_board(board), |mut decoder, m| {
            decoder.play(m);
            decoder
        })
        .finish()
}

/// Groups plies in pairs: `"1.e4 e5 2.Nf3"`. A trailing half pair keeps
/// its number.
pub fn number_moves<S: AsRef<str>>(sans: &[S]) -> String {
    sans.chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let mut entry = format!("{}.{}", i + 1, pair[0].as_ref());
            if let Some(reply) = pair.get(1) {
                entry.push(' ');
                entry.push_str(reply.as_ref());
            }
            entry
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{Chess, Color, Position, Square};

    fn play_all(decoder: &mut MoveDecoder, tokens: &[&str]) {
        for token in tokens {
            let san: San = token.parse().unwrap();
            decoder.play_san(&san).unwrap();
        }
    }

    #[test]
    fn test_number_moves_odd_ply_count() {
        assert_eq!(
            number_moves(&["e4", "e5", "Nf3", "Nc6", "Bb5"]),
            "1.e4 e5 2.Nf3 Nc6 3.Bb5"
        );
    }

    #[test]
    fn test_number_moves_even_ply_count() {
        assert_eq!(number_moves(&["d4", "d5"]), "1.d4 d5");
    }

    #[test]
    fn test_number_moves_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(number_moves(&empty), "");
    }

    #[test]
    fn test_decoder_ruy_lopez() {
        let mut decoder = MoveDecoder::new();
        play_all(&mut decoder, &["e4", "e5", "Nf3", "Nc6", "Bb5"]);
        let decoded = decoder.finish();
        assert_eq!(decoded.sans, vec!["e4", "e5", "Nf3", "Nc6", "Bb5"]);
        assert_eq!(decoded.numbered, "1.e4 e5 2.Nf3 Nc6 3.Bb5");
    }

    #[test]
    fn test_decoder_adds_mate_suffix() {
        let mut decoder = MoveDecoder::new();
        play_all(
            &mut decoder,
            &["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7"],
        );
        let decoded = decoder.finish();
        assert_eq!(decoded.sans.last().map(String::as_str), Some("Qxf7#"));
        assert_eq!(decoded.numbered, "1.e4 e5 2.Bc4 Nc6 3.Qh5 Nf6 4.Qxf7#");
    }

    #[test]
    fn test_decoder_disambiguates_from_position() {
        let mut decoder = MoveDecoder::new();
        play_all(&mut decoder, &["d4", "d5", "Nf3", "Nf6"]);

        let knight_to_d2 = decoder
            .board()
            .legal_moves()
            .into_iter()
            .find(|m| m.from() == Some(Square::B1) && m.to() == Square::D2)
            .expect("Nb1-d2 should be legal");
        decoder.play(knight_to_d2);

        let decoded = decoder.finish();
        assert_eq!(decoded.sans.last().map(String::as_str), Some("Nbd2"));
    }

    #[test]
    fn test_decoder_rejects_illegal_move() {
        let mut decoder = MoveDecoder::new();
        play_all(&mut decoder, &["e4"]);

        let san: San = "e4".parse().unwrap();
        let err = decoder.play_san(&san).unwrap_err();
        assert!(matches!(err, NotationError::IllegalMove { ply: 2, .. }));
        assert_eq!(decoder.ply(), 1);
    }

    #[test]
    fn test_decoder_from_fen_black_to_move() {
        let mut decoder = MoveDecoder::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
            Variant::Chess,
            CastlingMode::Standard,
        )
        .unwrap();
        play_all(&mut decoder, &["c5"]);
        let decoded = decoder.finish();
        assert_eq!(decoded.numbered, "1.c5");
    }

    #[test]
    fn test_decoder_from_invalid_fen() {
        let err = MoveDecoder::from_fen("not a position", Variant::Chess, CastlingMode::Standard).unwrap_err();
        assert!(matches!(err, NotationError::InvalidPosition { .. }));
    }

    #[test]
    fn test_decode_folds_structured_moves() {
        let start = Chess::default();
        let first = start
            .legal_moves()
            .into_iter()
            .find(|m| m.from() == Some(Square::G1) && m.to() == Square::F3)
            .unwrap();
        let decoded = decode(start, [first]);
        assert_eq!(decoded.sans, vec!["Nf3"]);
        assert_eq!(decoded.numbered, "1.Nf3");
    }

    #[test]
    fn test_decoder_chess960_castling() {
        let mut decoder = MoveDecoder::from_fen(
            "bqnbrkrn/pppppppp/8/8/8/8/PPPPPPPP/BQNBRKRN w GEge - 0 1",
            Variant::Chess,
            CastlingMode::Chess960,
        )
        .unwrap();
        play_all(&mut decoder, &["O-O", "O-O"]);
        assert_eq!(decoder.board().board().king_of(Color::White), Some(Square::G1));
        assert_eq!(decoder.board().board().king_of(Color::Black), Some(Square::G8));
        assert_eq!(decoder.finish().numbered, "1.O-O O-O");
    }

    #[test]
    fn test_decoder_crazyhouse_drop() {
        let mut decoder = MoveDecoder::for_variant(Variant::Crazyhouse);
        play_all(
            &mut decoder,
            &["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5", "P@d5"],
        );
        let decoded = decoder.finish();
        assert_eq!(decoded.sans.len(), 7);
        assert_eq!(decoded.sans.last().map(String::as_str), Some("@d5"));
    }

    #[test]
    fn test_standard_board_rejects_drop() {
        let mut decoder = MoveDecoder::new();
        play_all(&mut decoder, &["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5"]);
        let san: San = "P@d5".parse().unwrap();
        assert!(decoder.play_san(&san).is_err());
    }

    #[test]
    fn test_decoder_atomic_capture_explodes() {
        let mut decoder = MoveDecoder::for_variant(Variant::Atomic);
        play_all(&mut decoder, &["e4", "d5", "exd5"]);
        assert_eq!(decoder.board().board().piece_at(Square::D5), None);

        let recapture: San = "Qxd5".parse().unwrap();
        assert!(decoder.play_san(&recapture).is_err());
        play_all(&mut decoder, &["Qd5"]);
        assert_eq!(decoder.ply(), 4);
    }

    #[test]
    fn test_parse_variant_tags() {
        assert_eq!(parse_variant("").unwrap(), (Variant::Chess, CastlingMode::Standard));
        assert_eq!(
            parse_variant("Chess960").unwrap(),
            (Variant::Chess, CastlingMode::Chess960)
        );
        assert_eq!(
            parse_variant("Crazyhouse").unwrap(),
            (Variant::Crazyhouse, CastlingMode::Standard)
        );
        assert_eq!(parse_variant("Three Check").unwrap().0, Variant::ThreeCheck);
        assert_eq!(parse_variant("King of the Hill").unwrap().0, Variant::KingOfTheHill);
        assert_eq!(parse_variant("From Position").unwrap().0, Variant::Chess);
        assert!(matches!(
            parse_variant("Bughouse"),
            Err(NotationError::UnsupportedVariant(_))
        ));
    }
}
