//! Line-oriented front end: one move per stdin line.

use crate::cli::{KEY_USAGE, LineCommand};
use anyhow::Result;
use chess_oracle::{
    ChatCompletionOracle, Credential, CredentialStore, Notification, Notifier, OracleConfig,
    OracleTurn, TurnCoordinator, TurnReport,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

/// Prints notifications straight to stdout.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification {
            Notification::Alert(text) => println!("! {}", text),
            Notification::BoardChanged(board) => println!("{}\n", board),
            Notification::Status(text) => println!("{}", text),
        }
    }
}

/// Runs the match on stdin/stdout until EOF or `/quit`.
#[instrument(skip_all, fields(model = %config.model()))]
pub async fn run_console(config: OracleConfig, credentials: Arc<dyn CredentialStore>) -> Result<()> {
    let oracle = ChatCompletionOracle::new(config.clone(), Arc::clone(&credentials));
    let mut coordinator = TurnCoordinator::new(Box::new(ConsoleNotifier));
    coordinator.start();
    println!("Commands: /key <api key>, /fen, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            info!("Input closed");
            break;
        };
        let line = match LineCommand::parse(&line) {
            LineCommand::Empty => continue,
            LineCommand::Quit => break,
            LineCommand::Fen => {
                println!("{}", coordinator.board().current_position());
                continue;
            }
            LineCommand::KeyUsage => {
                println!("{}", KEY_USAGE);
                continue;
            }
            LineCommand::SetKey(value) => {
                credentials
                    .set(config.credential_key(), Credential::new(value))
                    .await;
                println!("Credential saved");
                continue;
            }
            LineCommand::Move(line) => line,
        };

        match coordinator.play_turn(line, &oracle).await {
            Ok(TurnReport::OracleReplied(OracleTurn::Applied { token, reply })) => {
                println!("Oracle plays {} ({})", token, reply);
            }
            Ok(report) => debug!(?report, "Round finished"),
            // The coordinator has already alerted the user.
            Err(e) => debug!(error = %e, "Submission rejected"),
        }
    }

    info!(moves = coordinator.board().history().len(), "Console session ended");
    Ok(())
}
