//! Stateless UI rendering for the match.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use super::app::App;

/// Draws the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title
            Constraint::Min(13),    // Board
            Constraint::Length(3),  // Status
            Constraint::Length(7),  // Alerts
            Constraint::Length(3),  // Input
        ])
        .split(frame.area());

    let title = Paragraph::new("Chess Oracle")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    draw_board(frame, chunks[1], app.board_text());

    let status_style = if app.oracle_pending() {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let status = Paragraph::new(app.status_message())
        .style(status_style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, chunks[2]);

    let alerts: Vec<Line> = app.alerts().map(Line::from).collect();
    let alerts = Paragraph::new(alerts)
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title("Alerts"));
    frame.render_widget(alerts, chunks[3]);

    let input = Paragraph::new(format!("> {}", app.input()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Move (e2-e4) | /key <api key> | /fen | Esc: Quit"),
        );
    frame.render_widget(input, chunks[4]);
}

fn draw_board(frame: &mut Frame, area: Rect, board_text: &str) {
    let board = Paragraph::new(board_text)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("Board"));
    frame.render_widget(board, area);
}
