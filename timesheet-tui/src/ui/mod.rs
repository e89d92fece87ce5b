use crate::app::{App, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Padding, Paragraph, Row, Table, Wrap},
    Frame,
};
use time::OffsetDateTime;

mod entry_form;
pub(super) mod utils;
mod week_view;
pub(super) mod widgets;

pub fn render(frame: &mut Frame, app: &App, now: OffsetDateTime) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_status_bar(frame, root[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(66), Constraint::Length(44)])
        .split(root[1]);

    let today = app.engine.reference().today(now);
    let grid = app.grid(now);
    let summaries = app.summaries(now);
    week_view::render_week_grid(frame, body[0], app, &grid, today);
    if let Some(summary) = summaries.get(app.cursor.day) {
        week_view::render_day_panel(frame, body[1], summary);
    }

    if app.current_view == View::Entry {
        if let Some(form) = &app.form {
            entry_form::render_entry_form(frame, root[1], form);
        }
    }

    render_key_hints(frame, root[2], app.current_view);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        " timesheet ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(message) = &app.status_message {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(message.clone(), Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_key_hints(frame: &mut Frame, area: Rect, view: View) {
    let hints = match view {
        View::Week => "←↓↑→/hjkl move · Enter new entry at slot · n new entry · t now · r refresh · q quit",
        View::Entry => "↑↓ field · ←→ change · Enter choose · Ctrl+S save · Esc back/close",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        area,
    );
}
