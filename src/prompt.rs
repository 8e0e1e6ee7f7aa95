//! Oracle prompt construction.

use crate::notation::MoveToken;
use derive_getters::Getters;
use tracing::instrument;

/// System instruction sent with every request.
pub const SYSTEM_PERSONA: &str = "you are a chess playing engine, \
you will respond in start-end positions you will get the fen of the game";

/// The two messages of one oracle request.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct OraclePrompt {
    /// Role instruction.
    system: String,
    /// The human's move and the position after it.
    user: String,
}

impl OraclePrompt {
    /// Builds the prompt that follows the human playing `human_move`,
    /// leaving the board at `fen`.
    ///
    /// Output depends only on the arguments.
    #[instrument]
    pub fn after_human_move(human_move: &MoveToken, fen: &str) -> Self {
        Self {
            system: SYSTEM_PERSONA.to_string(),
            user: format!(
                "we are playing chess with start-end notations just give your start-end \
                 nothing else - Player move: {human_move}\nGame state: {fen}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_is_reproducible() {
        let token = MoveToken::parse("e2-e4").unwrap();
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let prompt = OraclePrompt::after_human_move(&token, fen);

        assert_eq!(prompt, OraclePrompt::after_human_move(&token, fen));
        assert_eq!(
            prompt.user(),
            "we are playing chess with start-end notations just give your start-end \
             nothing else - Player move: e2-e4\n\
             Game state: rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert_eq!(prompt.system(), SYSTEM_PERSONA);
    }
}
