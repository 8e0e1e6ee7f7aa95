//! Command-line interface for chess_oracle.

use clap::{Parser, Subcommand};

/// Chess Oracle - play chess against a chat-completion model
#[derive(Parser, Debug)]
#[command(name = "chess_oracle")]
#[command(about = "Play chess against a chat-completion model", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "chess_oracle.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal UI
    Tui {
        /// File that receives the log output
        #[arg(long, default_value = "chess_oracle_tui.log")]
        log_file: std::path::PathBuf,
    },

    /// Play line by line on stdin/stdout
    Console,

    /// Save the oracle API key in the credential store
    SetKey {
        /// The API key
        value: String,
    },
}

/// Usage hint shown for a `/key` line without a value.
pub const KEY_USAGE: &str = "Usage: /key <api key>";

/// One line typed into the console or the TUI input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCommand<'a> {
    /// Nothing but whitespace.
    Empty,
    /// `/quit`
    Quit,
    /// `/fen`
    Fen,
    /// `/key <value>` with the trimmed value.
    SetKey(&'a str),
    /// `/key` with no value.
    KeyUsage,
    /// Anything else is submitted as a move.
    Move(&'a str),
}

impl<'a> LineCommand<'a> {
    /// Classifies a typed line.
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => return Self::Empty,
            "/quit" => return Self::Quit,
            "/fen" => return Self::Fen,
            _ => {}
        }

        match line.strip_prefix("/key") {
            Some(rest) if rest.is_empty() => Self::KeyUsage,
            Some(rest) if rest.starts_with(char::is_whitespace) => match rest.trim() {
                "" => Self::KeyUsage,
                value => Self::SetKey(value),
            },
            _ => Self::Move(line),
        }
    }
}
