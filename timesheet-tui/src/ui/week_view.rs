use std::iter;

use time::Date;
use timesheet_core::clock::{format_wall_time, time_at_minute};
use timesheet_core::grid::{DaySummary, WeekGrid};

use super::utils::{day_header, scroll_window};
use super::widgets::{entry_line, placeholder, slot_cell};
use super::*;
use crate::app::GridCursor;

pub fn render_week_grid(frame: &mut Frame, area: Rect, app: &App, grid: &WeekGrid, today: Date) {
    let window = grid.window();
    let title = if app.is_loading {
        format!(" Week {} to {} (loading) ", window.monday(), window.sunday())
    } else {
        format!(" Week {} to {} ", window.monday(), window.sunday())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Magenta))
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header = Row::new(iter::once(Cell::from("")).chain(window.days().into_iter().map(|day| {
        let style = if day == today {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(day_header(day)).style(style)
    })));

    // One line goes to the header.
    let visible = inner.height.saturating_sub(1) as usize;
    let range = scroll_window(app.cursor.row, grid.rows().len(), visible);
    let rows = grid.rows()[range.clone()]
        .iter()
        .zip(range)
        .map(|(row, row_idx)| {
            let label = time_at_minute(row.minute)
                .map(format_wall_time)
                .unwrap_or_default();
            let cells = row.cells.iter().enumerate().map(|(day, cell)| {
                slot_cell(cell.state, app.cursor == GridCursor { row: row_idx, day })
            });
            Row::new(iter::once(Cell::from(label).style(Style::default().fg(Color::DarkGray))).chain(cells))
        });

    let widths: Vec<Constraint> = iter::once(Constraint::Length(6))
        .chain(iter::repeat(Constraint::Length(7)).take(7))
        .collect();
    let table = Table::new(rows, widths).header(header).column_spacing(1);
    frame.render_widget(table, inner);
}

/// Entries of the day under the cursor, with the day's total.
pub fn render_day_panel(frame: &mut Frame, area: Rect, summary: &DaySummary) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} {} ", summary.date.weekday(), summary.date))
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = if summary.entries.is_empty() {
        vec![Line::from(placeholder("No entries"))]
    } else {
        summary.entries.iter().map(entry_line).collect()
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Total ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{:.2}h", summary.total_hours),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}
