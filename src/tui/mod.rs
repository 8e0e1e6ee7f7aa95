//! Terminal UI for Chess Oracle

mod app;
mod ui;

use crate::cli::{KEY_USAGE, LineCommand};
use anyhow::Result;
use chess_oracle::{
    ChannelNotifier, ChatCompletionOracle, Credential, CredentialStore, HumanTurn, Oracle,
    OracleConfig, OracleError, TurnCoordinator,
};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use app::App;

/// Run the TUI client
#[instrument(skip_all, fields(model = %config.model()))]
pub async fn run_tui(config: OracleConfig, credentials: Arc<dyn CredentialStore>) -> Result<()> {
    info!("Starting Chess Oracle TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_match(&mut terminal, config, credentials).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

/// Event loop: keyboard input, coordinator notifications and oracle replies.
///
/// The coordinator lives on this task only. Oracle calls run on spawned tasks
/// and hand their reply back over a channel.
#[instrument(skip_all)]
async fn run_match(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: OracleConfig,
    credentials: Arc<dyn CredentialStore>,
) -> Result<()> {
    let oracle: Arc<dyn Oracle> = Arc::new(ChatCompletionOracle::new(
        config.clone(),
        Arc::clone(&credentials),
    ));

    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<Result<String, OracleError>>();

    let mut app = App::new();
    let mut coordinator = TurnCoordinator::new(Box::new(ChannelNotifier::new(notify_tx)));
    coordinator.start();

    while !app.should_quit() {
        while let Ok(reply) = reply_rx.try_recv() {
            let turn = coordinator.complete_oracle_turn(reply);
            debug!(?turn, "Oracle turn resolved");
            while let Ok(notification) = notify_rx.try_recv() {
                app.handle_notification(notification);
            }
            app.oracle_finished(&turn);
        }
        while let Ok(notification) = notify_rx.try_recv() {
            app.handle_notification(notification);
        }

        terminal.draw(|frame| ui::draw(frame, &app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc => {
                info!("User quit");
                app.quit();
            }
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Char(c) => app.push_char(c),
            KeyCode::Enter => {
                let line = app.take_input();
                submit_line(
                    line.trim(),
                    &mut app,
                    &mut coordinator,
                    &oracle,
                    &credentials,
                    &config,
                    &reply_tx,
                );
            }
            _ => {}
        }
    }

    info!(moves = coordinator.board().history().len(), "TUI session ended");
    Ok(())
}

/// Handles one submitted line: a slash command or a move.
#[instrument(skip(app, coordinator, oracle, credentials, config, reply_tx))]
fn submit_line(
    line: &str,
    app: &mut App,
    coordinator: &mut TurnCoordinator,
    oracle: &Arc<dyn Oracle>,
    credentials: &Arc<dyn CredentialStore>,
    config: &OracleConfig,
    reply_tx: &mpsc::UnboundedSender<Result<String, OracleError>>,
) {
    let line = match LineCommand::parse(line) {
        LineCommand::Empty => return,
        LineCommand::Quit => {
            app.quit();
            return;
        }
        LineCommand::Fen => {
            app.set_status(coordinator.board().current_position());
            return;
        }
        LineCommand::KeyUsage => {
            app.set_status(KEY_USAGE);
            return;
        }
        LineCommand::SetKey(value) => {
            let store = Arc::clone(credentials);
            let key = config.credential_key().clone();
            let value = Credential::new(value);
            tokio::spawn(async move { store.set(&key, value).await });
            app.set_status("Credential saved");
            return;
        }
        LineCommand::Move(line) => line,
    };

    match coordinator.submit_human_move(line) {
        Ok(HumanTurn::OracleToMove(prompt)) => {
            app.oracle_started();
            let oracle = Arc::clone(oracle);
            let reply_tx = reply_tx.clone();
            tokio::spawn(async move {
                let reply = oracle.complete(&prompt).await;
                if reply_tx.send(reply).is_err() {
                    debug!("UI closed before the oracle replied");
                }
            });
        }
        Ok(HumanTurn::GameFinished { outcome }) => {
            info!(outcome = %outcome, "Game finished on the human move");
        }
        // The coordinator has already raised an alert.
        Err(e) => debug!(error = %e, "Submission rejected"),
    }
}
