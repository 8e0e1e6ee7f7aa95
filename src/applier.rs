//! The one synchronous boundary through which every move reaches the board.
//!
//! Human and oracle moves both pass through [`apply_and_report`], so they are
//! validated the same way and failures produce the same notification.

use crate::board::{ApplyResult, ChessBoard, Rejection};
use crate::notation::MoveToken;
use std::sync::{Arc, Mutex};
use strum::Display;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Who produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Side {
    /// The person at the keyboard.
    Human,
    /// The chat-completion model.
    Oracle,
}

/// Something the user interface should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A non-fatal problem the user should see.
    Alert(String),
    /// The board changed; carries the freshly rendered diagram.
    BoardChanged(String),
    /// Informational status line.
    Status(String),
}

/// Receives notifications from the applier and the turn coordinator.
pub trait Notifier: Send {
    /// Delivers one notification.
    fn notify(&mut self, notification: Notification);
}

/// Forwards notifications over a channel to a UI loop.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Wraps the sending half of a notification channel.
    pub fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&mut self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            debug!("Notification receiver dropped");
        }
    }
}

/// Keeps every notification in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        match self.log.lock() {
            Ok(mut log) => std::mem::take(&mut *log),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Alerts recorded so far, without draining.
    pub fn alerts(&self) -> Vec<String> {
        let log = match self.log.lock() {
            Ok(log) => log,
            Err(poisoned) => poisoned.into_inner(),
        };
        log.iter()
            .filter_map(|n| match n {
                Notification::Alert(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notification: Notification) {
        match self.log.lock() {
            Ok(mut log) => log.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

/// Outcome of routing a move through the applier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was played.
    Applied {
        /// The move as played.
        token: MoveToken,
        /// Position after the move.
        fen: String,
    },
    /// The rules engine refused the move.
    IllegalMove {
        /// The refused move.
        token: MoveToken,
    },
    /// The text is not a move token on this board.
    MalformedToken {
        /// The text as submitted.
        raw: String,
    },
}

impl MoveOutcome {
    /// True when the board changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveOutcome::Applied { .. })
    }
}

/// Validates `raw` and plays it on `board`.
///
/// Failures raise a [`Notification::Alert`] with the same text regardless of
/// `side`; success pushes a [`Notification::BoardChanged`] with the new diagram.
#[instrument(skip(board, notifier), fields(side = %side))]
pub fn apply_and_report(
    raw: &str,
    board: &mut ChessBoard,
    side: Side,
    notifier: &mut dyn Notifier,
) -> MoveOutcome {
    let Some(token) = MoveToken::parse(raw) else {
        warn!(raw, "Move is not a coordinate token");
        notifier.notify(Notification::Alert(invalid_move_alert(raw)));
        return MoveOutcome::MalformedToken {
            raw: raw.to_string(),
        };
    };

    match board.apply_move(&token) {
        ApplyResult::Applied { fen } => {
            info!(token = %token, "Move accepted");
            notifier.notify(Notification::BoardChanged(board.render()));
            MoveOutcome::Applied { token, fen }
        }
        ApplyResult::Rejected(Rejection::Malformed(_)) => {
            warn!(token = %token, "Move names squares off the board");
            notifier.notify(Notification::Alert(invalid_move_alert(raw)));
            MoveOutcome::MalformedToken {
                raw: raw.to_string(),
            }
        }
        ApplyResult::Rejected(Rejection::Illegal(_)) => {
            warn!(token = %token, "Move is illegal");
            notifier.notify(Notification::Alert(invalid_move_alert(raw)));
            MoveOutcome::IllegalMove { token }
        }
    }
}

fn invalid_move_alert(raw: &str) -> String {
    format!("Invalid move: {raw}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_refreshes_board() {
        let mut board = ChessBoard::new();
        let mut notifier = RecordingNotifier::new();
        let outcome = apply_and_report("e2-e4", &mut board, Side::Human, &mut notifier);

        assert!(outcome.is_applied());
        assert_eq!(
            notifier.drain(),
            vec![Notification::BoardChanged(board.render())]
        );
    }

    #[test]
    fn failures_alert_identically_for_both_sides() {
        let mut board = ChessBoard::new();
        let human = RecordingNotifier::new();
        let oracle = RecordingNotifier::new();

        apply_and_report("e2-e5", &mut board, Side::Human, &mut human.clone());
        apply_and_report("e2-e5", &mut board, Side::Oracle, &mut oracle.clone());

        assert_eq!(human.alerts(), oracle.alerts());
        assert_eq!(human.alerts(), vec!["Invalid move: e2-e5".to_string()]);
    }

    #[test]
    fn non_token_text_is_malformed() {
        let mut board = ChessBoard::new();
        let mut notifier = RecordingNotifier::new();
        let outcome = apply_and_report("foo-bar", &mut board, Side::Human, &mut notifier);

        assert_eq!(
            outcome,
            MoveOutcome::MalformedToken {
                raw: "foo-bar".to_string()
            }
        );
        assert!(board.history().is_empty());
    }
}
