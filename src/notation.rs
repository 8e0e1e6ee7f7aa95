//! Coordinate move notation (`e2-e4`) and extraction from free text.
//!
//! Extraction is purely syntactic: it finds the first `<letter><digit>-<letter><digit>`
//! group bounded by ASCII word boundaries and never consults the board. A
//! non-ASCII letter touching the token counts as a boundary. Because the
//! first match anywhere wins, prose such as "from a1-h8 diagonal" can yield a
//! token the model never meant as its move. Legality is decided later by
//! [`ChessBoard`](crate::ChessBoard).

use derive_more::Display;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, instrument};

static MOVE_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[A-Za-z][0-9]-[A-Za-z][0-9](?-u:\b)")
        .expect("move token pattern is valid")
});

static WHOLE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][0-9]-[A-Za-z][0-9]$").expect("whole token pattern is valid")
});

/// A two-square coordinate move such as `e2-e4`.
///
/// Only the shape is guaranteed. Whether the squares exist on the board or the
/// move is legal is up to the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("{_0}")]
#[serde(try_from = "String", into = "String")]
pub struct MoveToken(String);

impl TryFrom<String> for MoveToken {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| format!("not a move token: {raw:?}"))
    }
}

impl From<MoveToken> for String {
    fn from(token: MoveToken) -> Self {
        token.0
    }
}

impl MoveToken {
    /// Accepts `raw` only if the whole string is a single move token.
    #[instrument]
    pub fn parse(raw: &str) -> Option<Self> {
        WHOLE_TOKEN
            .is_match(raw)
            .then(|| Self(raw.to_string()))
    }

    /// The token exactly as it was written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Origin square text, e.g. `e2`.
    pub fn from_square(&self) -> &str {
        &self.0[..2]
    }

    /// Destination square text, e.g. `e4`.
    pub fn to_square(&self) -> &str {
        &self.0[3..]
    }
}

/// Returns the first move token found anywhere in `text`.
#[instrument(skip(text), fields(text_len = text.len()))]
pub fn extract_move_token(text: &str) -> Option<MoveToken> {
    let found = MOVE_IN_TEXT
        .find(text)
        .map(|m| MoveToken(m.as_str().to_string()));
    debug!(token = ?found, "Scanned text for move token");
    found
}
