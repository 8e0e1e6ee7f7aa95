//! Turn sequencing between the human and the oracle.
//!
//! A round is split in two halves so a UI can keep drawing while the oracle
//! thinks:
//!
//! 1. [`TurnCoordinator::submit_human_move`] checks the input, plays the human
//!    move and returns the prompt to send.
//! 2. [`TurnCoordinator::complete_oracle_turn`] takes whatever the oracle call
//!    produced and plays the extracted move, if any.
//!
//! [`TurnCoordinator::play_turn`] runs both halves around a single `await`.
//! Every error path leaves the board untouched and ends in
//! [`TurnPhase::AwaitingHumanInput`].

use crate::applier::{MoveOutcome, Notification, Notifier, Side, apply_and_report};
use crate::board::ChessBoard;
use crate::notation::{MoveToken, extract_move_token};
use crate::oracle::{Oracle, OracleError};
use crate::prompt::OraclePrompt;
use derive_more::{Display, Error};
use strum::Display as StrumDisplay;
use tracing::{debug, error, info, instrument, warn};

/// Where the coordinator is in the turn protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
pub enum TurnPhase {
    /// Not started.
    Idle,
    /// Ready for the next human move.
    AwaitingHumanInput,
    /// The human move is on the board; the prompt is being built.
    HumanMoveApplied,
    /// An oracle call is outstanding.
    AwaitingOracleResponse,
    /// The oracle move is on the board.
    OracleMoveApplied,
}

/// Why a human submission was turned away. None of these change the board.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TurnError {
    /// Input did not split into exactly two dash-separated parts.
    #[display("Invalid move format: {input:?}")]
    Format {
        /// The submitted text.
        input: String,
    },
    /// The squares are not a legal move in the current position.
    #[display("Illegal move: {token}")]
    IllegalMove {
        /// The refused move.
        token: MoveToken,
    },
    /// Two parts, but not two board squares.
    #[display("Not a move: {raw:?}")]
    MalformedToken {
        /// The submitted text.
        raw: String,
    },
    /// The previous oracle call has not come back yet.
    #[display("Still waiting for the oracle")]
    Busy,
    /// The game has already ended.
    #[display("Game over: {outcome}")]
    GameOver {
        /// How the game ended.
        outcome: String,
    },
}

/// What happens after an accepted human move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HumanTurn {
    /// The oracle must be asked with this prompt.
    OracleToMove(OraclePrompt),
    /// The human move ended the game; there is nothing to ask.
    GameFinished {
        /// How the game ended.
        outcome: String,
    },
}

/// How the oracle's half of a round went.
#[derive(Debug, Clone)]
pub enum OracleTurn {
    /// A move was found in the reply and played.
    Applied {
        /// The move played.
        token: MoveToken,
        /// The reply it came from.
        reply: String,
    },
    /// A move was found but the board refused it.
    Rejected {
        /// The refused move.
        token: MoveToken,
        /// The reply it came from.
        reply: String,
    },
    /// No move token anywhere in the reply; the oracle forfeits this round.
    Unparseable {
        /// The reply.
        reply: String,
    },
    /// The oracle could not be reached.
    Unreachable(OracleError),
    /// No oracle reply was expected; nothing was done.
    NotAwaiting,
}

impl OracleTurn {
    /// True when the oracle's move reached the board.
    pub fn is_applied(&self) -> bool {
        matches!(self, OracleTurn::Applied { .. })
    }
}

/// Result of a full round driven by [`TurnCoordinator::play_turn`].
#[derive(Debug, Clone)]
pub enum TurnReport {
    /// The human move ended the game.
    GameFinished {
        /// How the game ended.
        outcome: String,
    },
    /// The oracle was consulted.
    OracleReplied(OracleTurn),
}

/// Owns the board and drives the alternating turns.
pub struct TurnCoordinator {
    board: ChessBoard,
    phase: TurnPhase,
    notifier: Box<dyn Notifier>,
}

impl std::fmt::Debug for TurnCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnCoordinator")
            .field("phase", &self.phase)
            .field("history", &self.board.history())
            .finish_non_exhaustive()
    }
}

impl TurnCoordinator {
    /// Creates an idle coordinator with a fresh board.
    #[instrument(skip(notifier))]
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self {
            board: ChessBoard::new(),
            phase: TurnPhase::Idle,
            notifier,
        }
    }

    /// Current protocol phase.
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Read-only view of the board.
    pub fn board(&self) -> &ChessBoard {
        &self.board
    }

    /// Leaves `Idle` and shows the starting position.
    #[instrument(skip(self))]
    pub fn start(&mut self) {
        if self.phase != TurnPhase::Idle {
            debug!(phase = %self.phase, "Already started");
            return;
        }
        info!("Starting match");
        self.notifier
            .notify(Notification::BoardChanged(self.board.render()));
        self.notifier
            .notify(Notification::Status("Your move (e.g. e2-e4)".to_string()));
        self.phase = TurnPhase::AwaitingHumanInput;
    }

    /// Validates and plays a human move, then builds the oracle prompt.
    ///
    /// On success the coordinator waits in
    /// [`TurnPhase::AwaitingOracleResponse`] until
    /// [`complete_oracle_turn`](Self::complete_oracle_turn) is called.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn submit_human_move(&mut self, raw: &str) -> Result<HumanTurn, TurnError> {
        if self.phase == TurnPhase::AwaitingOracleResponse {
            warn!("Submission while the oracle is still thinking");
            self.notifier.notify(Notification::Alert(
                "Please wait for the oracle to reply".to_string(),
            ));
            return Err(TurnError::Busy);
        }
        self.start();

        if let Some(outcome) = self.board.outcome() {
            self.notifier
                .notify(Notification::Alert(format!("Game over: {outcome}")));
            return Err(TurnError::GameOver { outcome });
        }

        let input = raw.trim();
        if input.split('-').count() != 2 {
            warn!(input, "Move is not two dash-separated squares");
            self.notifier
                .notify(Notification::Alert("Invalid move format".to_string()));
            return Err(TurnError::Format {
                input: input.to_string(),
            });
        }

        let token = match apply_and_report(
            input,
            &mut self.board,
            Side::Human,
            self.notifier.as_mut(),
        ) {
            MoveOutcome::Applied { token, .. } => token,
            MoveOutcome::IllegalMove { token } => return Err(TurnError::IllegalMove { token }),
            MoveOutcome::MalformedToken { raw } => return Err(TurnError::MalformedToken { raw }),
        };
        self.phase = TurnPhase::HumanMoveApplied;

        if let Some(outcome) = self.board.outcome() {
            info!(outcome = %outcome, "Human move ended the game");
            self.notifier.notify(Notification::Status(outcome.clone()));
            self.phase = TurnPhase::AwaitingHumanInput;
            return Ok(HumanTurn::GameFinished { outcome });
        }

        let prompt = OraclePrompt::after_human_move(&token, &self.board.current_position());
        self.notifier
            .notify(Notification::Status("Oracle is thinking...".to_string()));
        self.phase = TurnPhase::AwaitingOracleResponse;
        debug!(token = %token, "Waiting for oracle");
        Ok(HumanTurn::OracleToMove(prompt))
    }

    /// Plays the oracle's half of the round from the result of the oracle call.
    #[instrument(skip(self, reply), fields(phase = %self.phase))]
    pub fn complete_oracle_turn(&mut self, reply: Result<String, OracleError>) -> OracleTurn {
        if self.phase != TurnPhase::AwaitingOracleResponse {
            warn!("Oracle reply arrived when none was expected");
            return OracleTurn::NotAwaiting;
        }

        let turn = self.resolve_reply(reply);
        self.phase = TurnPhase::AwaitingHumanInput;

        if let Some(outcome) = self.board.outcome() {
            info!(outcome = %outcome, "Game over");
            self.notifier.notify(Notification::Status(outcome));
        } else {
            self.notifier
                .notify(Notification::Status("Your move".to_string()));
        }
        turn
    }

    fn resolve_reply(&mut self, reply: Result<String, OracleError>) -> OracleTurn {
        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Oracle unreachable; human move stays on the board");
                self.notifier.notify(Notification::Alert(format!(
                    "Could not reach the oracle: {}",
                    e.message
                )));
                return OracleTurn::Unreachable(e);
            }
        };

        let Some(token) = extract_move_token(&reply) else {
            warn!(reply = %reply, "Oracle reply has no move; turn forfeited");
            return OracleTurn::Unparseable { reply };
        };

        match apply_and_report(
            token.as_str(),
            &mut self.board,
            Side::Oracle,
            self.notifier.as_mut(),
        ) {
            MoveOutcome::Applied { token, .. } => {
                self.phase = TurnPhase::OracleMoveApplied;
                info!(token = %token, "Oracle move applied");
                OracleTurn::Applied { token, reply }
            }
            MoveOutcome::IllegalMove { token } => OracleTurn::Rejected { token, reply },
            MoveOutcome::MalformedToken { .. } => OracleTurn::Rejected { token, reply },
        }
    }

    /// Runs a whole round: human move, one oracle call, oracle move.
    #[instrument(skip(self, oracle))]
    pub async fn play_turn(
        &mut self,
        raw: &str,
        oracle: &dyn Oracle,
    ) -> Result<TurnReport, TurnError> {
        match self.submit_human_move(raw)? {
            HumanTurn::GameFinished { outcome } => Ok(TurnReport::GameFinished { outcome }),
            HumanTurn::OracleToMove(prompt) => {
                let reply = oracle.complete(&prompt).await;
                Ok(TurnReport::OracleReplied(self.complete_oracle_turn(reply)))
            }
        }
    }
}
