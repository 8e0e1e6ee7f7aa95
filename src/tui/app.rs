//! Application state for the terminal UI.

use chess_oracle::{Notification, OracleTurn};
use std::collections::VecDeque;
use tracing::debug;

const MAX_ALERTS: usize = 5;

/// What the terminal UI shows between frames.
pub struct App {
    board_text: String,
    status_message: String,
    alerts: VecDeque<String>,
    input: String,
    oracle_pending: bool,
    should_quit: bool,
}

impl App {
    /// Creates an empty application state.
    pub fn new() -> Self {
        Self {
            board_text: String::new(),
            status_message: "Waiting for game to start...".to_string(),
            alerts: VecDeque::new(),
            input: String::new(),
            oracle_pending: false,
            should_quit: false,
        }
    }

    /// Gets the rendered board.
    pub fn board_text(&self) -> &str {
        &self.board_text
    }

    /// Gets the current status message.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Recent alerts, newest last.
    pub fn alerts(&self) -> impl Iterator<Item = &str> {
        self.alerts.iter().map(String::as_str)
    }

    /// Text typed so far.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// True while an oracle call is outstanding.
    pub fn oracle_pending(&self) -> bool {
        self.oracle_pending
    }

    /// True once the user asked to leave.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Applies a notification from the coordinator.
    pub fn handle_notification(&mut self, notification: Notification) {
        debug!(?notification, "Handling notification");

        match notification {
            Notification::Alert(text) => {
                if self.alerts.len() == MAX_ALERTS {
                    self.alerts.pop_front();
                }
                self.alerts.push_back(text);
            }
            Notification::BoardChanged(board) => self.board_text = board,
            Notification::Status(text) => self.status_message = text,
        }
    }

    /// Marks an oracle call as started.
    pub fn oracle_started(&mut self) {
        self.oracle_pending = true;
    }

    /// Records how the oracle's half of the round went.
    pub fn oracle_finished(&mut self, turn: &OracleTurn) {
        self.oracle_pending = false;
        if let OracleTurn::Applied { token, .. } = turn {
            self.status_message = format!("Oracle played {}. Your move.", token);
        }
    }

    /// Appends a typed character.
    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Removes the last typed character.
    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    /// Takes the typed line, leaving the input empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    /// Replaces the status line.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = text.into();
    }

    /// Requests shutdown.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
