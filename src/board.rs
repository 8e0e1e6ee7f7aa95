//! Rules-aware board state for a single match.
//!
//! [`ChessBoard`] owns the only copy of the position. Every mutation goes
//! through [`ChessBoard::apply_move`], which either plays a legal move and
//! extends the history or leaves the position exactly as it was.

use crate::notation::MoveToken;
use derive_more::Display;
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Color, EnPassantMode, File, Move, Outcome, Position, Rank, Role, Square};
use tracing::{debug, info, instrument, warn};

/// Why a move token was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Rejection {
    /// The token does not name two squares on the board.
    #[display("{_0} does not name two board squares")]
    Malformed(String),
    /// The squares exist but the move is not legal here.
    #[display("{_0} is not legal in this position")]
    Illegal(String),
}

/// Result of [`ChessBoard::apply_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// The move was played; `fen` is the new position.
    Applied {
        /// Position after the move.
        fen: String,
    },
    /// The move was refused and the position is unchanged.
    Rejected(Rejection),
}

impl ApplyResult {
    /// True when the move was played.
    pub fn applied(&self) -> bool {
        matches!(self, ApplyResult::Applied { .. })
    }
}

/// The match position, its side to move and the moves that led to it.
#[derive(Debug, Clone, Default)]
pub struct ChessBoard {
    position: Chess,
    history: Vec<MoveToken>,
}

impl ChessBoard {
    /// Creates a board at the standard starting position.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to play `token` for the side to move.
    ///
    /// Rules-engine errors are folded into [`ApplyResult::Rejected`]; this
    /// method never panics and never leaves a half-applied move behind.
    #[instrument(skip(self), fields(token = %token, turn = ?self.position.turn()))]
    pub fn apply_move(&mut self, token: &MoveToken) -> ApplyResult {
        let uci = match to_uci(token) {
            Some(uci) => uci,
            None => {
                debug!("Token squares are off the board");
                return ApplyResult::Rejected(Rejection::Malformed(token.to_string()));
            }
        };

        let Some(legal) = self.resolve(&uci) else {
            warn!(uci = %uci, "Rules engine rejected move");
            return ApplyResult::Rejected(Rejection::Illegal(token.to_string()));
        };

        self.position.play_unchecked(&legal);
        self.history.push(token.clone());

        let fen = self.current_position();
        info!(fen = %fen, ply = self.history.len(), "Move applied");
        ApplyResult::Applied { fen }
    }

    /// Finds the legal move matching `uci`, promoting to a queen when the
    /// squares only make sense as a promotion.
    fn resolve(&self, uci: &UciMove) -> Option<Move> {
        if let Ok(m) = uci.to_move(&self.position) {
            return Some(m);
        }

        match uci {
            UciMove::Normal {
                from,
                to,
                promotion: None,
            } => {
                let queening = UciMove::Normal {
                    from: *from,
                    to: *to,
                    promotion: Some(Role::Queen),
                };
                let promoted = queening.to_move(&self.position).ok();
                if promoted.is_some() {
                    debug!(uci = %queening, "Promoting to queen");
                }
                promoted
            }
            _ => None,
        }
    }

    /// FEN of the current position.
    ///
    /// The en passant square is only written when a capture is actually legal.
    pub fn current_position(&self) -> String {
        Fen(self.position.clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    /// Text diagram of the board, rank 8 at the top, white pieces upper case.
    pub fn render(&self) -> String {
        let board = self.position.board();
        let mut out = String::from("   +------------------------+\n");

        for rank in (0..8u32).rev().map(Rank::new) {
            out.push(' ');
            out.push(rank.char());
            out.push_str(" |");
            for file in (0..8u32).map(File::new) {
                let symbol = board
                    .piece_at(Square::from_coords(file, rank))
                    .map(|piece| piece.char())
                    .unwrap_or('.');
                out.push(' ');
                out.push(symbol);
                out.push(' ');
            }
            out.push_str("|\n");
        }

        out.push_str("   +------------------------+\n");
        out.push_str("     a  b  c  d  e  f  g  h");
        out
    }

    /// Moves played so far, oldest first.
    pub fn history(&self) -> &[MoveToken] {
        &self.history
    }

    /// Color whose turn it is.
    pub fn side_to_move(&self) -> Color {
        self.position.turn()
    }

    /// Describes how the game ended, if it has.
    pub fn outcome(&self) -> Option<String> {
        let description = match self.position.outcome()? {
            Outcome::Decisive {
                winner: Color::White,
            } => "White wins by checkmate".to_string(),
            Outcome::Decisive {
                winner: Color::Black,
            } => "Black wins by checkmate".to_string(),
            Outcome::Draw if self.position.is_stalemate() => "Draw by stalemate".to_string(),
            Outcome::Draw => "Draw by insufficient material".to_string(),
        };
        Some(description)
    }

    /// True after checkmate, stalemate or insufficient material.
    pub fn is_game_over(&self) -> bool {
        self.position.is_game_over()
    }
}

/// Converts `e2-e4` (any case) into the UCI move `e2e4`.
fn to_uci(token: &MoveToken) -> Option<UciMove> {
    let compact = format!("{}{}", token.from_square(), token.to_square()).to_ascii_lowercase();
    compact.parse::<UciMove>().ok()
}
