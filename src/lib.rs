//! Chess Oracle library - play chess against a chat-completion model
//!
//! The human types coordinate moves (`e2-e4`); the model answers in free text
//! and the first move token found in its reply is played for it.
//!
//! # Architecture
//!
//! - **Board**: rules-aware position backed by `shakmaty`
//! - **Notation**: move-token syntax and extraction from prose
//! - **Applier**: the single boundary through which every move is validated
//! - **Coordinator**: turn protocol, prompts and error recovery
//! - **Oracle**: chat-completion client and a scripted stand-in
//! - **Credentials**: where the API key lives between calls
//!
//! # Example
//!
//! ```no_run
//! use chess_oracle::{RecordingNotifier, ScriptedOracle, TurnCoordinator};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let oracle = ScriptedOracle::new(["I recommend e7-e5"]);
//! let mut coordinator = TurnCoordinator::new(Box::new(RecordingNotifier::new()));
//! coordinator.start();
//! coordinator.play_turn("e2-e4", &oracle).await?;
//! println!("{}", coordinator.board().render());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod applier;
mod board;
mod config;
mod coordinator;
mod credentials;
mod notation;
mod oracle;
mod prompt;

// Crate-level exports - Board state
pub use board::{ApplyResult, ChessBoard, Rejection};

// Crate-level exports - Notation
pub use notation::{MoveToken, extract_move_token};

// Crate-level exports - Move applier
pub use applier::{
    ChannelNotifier, MoveOutcome, Notification, Notifier, RecordingNotifier, Side,
    apply_and_report,
};

// Crate-level exports - Turn protocol
pub use coordinator::{HumanTurn, OracleTurn, TurnCoordinator, TurnError, TurnPhase, TurnReport};

// Crate-level exports - Oracle
pub use oracle::{ChatCompletionOracle, Oracle, OracleError, ScriptedOracle};
pub use prompt::{OraclePrompt, SYSTEM_PERSONA};

// Crate-level exports - Configuration and credentials
pub use config::{ConfigError, OracleConfig};
pub use credentials::{
    Credential, CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore,
};
