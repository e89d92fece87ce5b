use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Cell,
};
use timesheet_core::grid::SlotState;
use timesheet_core::models::TimeEntry;

use super::utils::entry_range;

/// One grid cell. Occupied slots are filled, future slots dimmed, and the
/// cursor is drawn reversed.
pub fn slot_cell(state: SlotState, is_cursor: bool) -> Cell<'static> {
    let (text, mut style) = if state.occupied {
        ("██████", Style::default().fg(Color::Cyan))
    } else if state.future {
        ("  ·   ", Style::default().fg(Color::DarkGray))
    } else {
        ("      ", Style::default())
    };
    if is_cursor {
        style = style.add_modifier(Modifier::REVERSED);
        if state.selectable {
            return Cell::from("  +   ").style(style.fg(Color::Green));
        }
    }
    Cell::from(text).style(style)
}

/// A row in the day panel: time range, hours and what it was booked on.
pub fn entry_line(entry: &TimeEntry) -> Line<'static> {
    Line::from(vec![
        Span::styled(entry_range(entry), Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            format!("{:>5.2}h", entry.hours),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw(" "),
        Span::styled(entry.label(), Style::default().fg(Color::Cyan)),
    ])
}

/// `› Label: value` in the entry form, highlighted when focused.
pub fn field_line(label: &str, value: Vec<Span<'static>>, focused: bool) -> Line<'static> {
    let marker = if focused { "› " } else { "  " };
    let label_style = if focused {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::styled(marker, label_style),
        Span::styled(format!("{:<9}", format!("{label}:")), label_style),
    ];
    spans.extend(value);
    Line::from(spans)
}

/// `< value >` for a picker that the arrows cycle through.
pub fn cycling_value(value: String, focused: bool) -> Vec<Span<'static>> {
    if focused {
        vec![
            Span::styled("< ", Style::default().fg(Color::DarkGray)),
            Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(" >", Style::default().fg(Color::DarkGray)),
        ]
    } else {
        vec![Span::raw(value)]
    }
}

pub fn placeholder(text: &str) -> Vec<Span<'static>> {
    vec![Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )]
}

pub fn error_value(text: String) -> Vec<Span<'static>> {
    vec![Span::styled(text, Style::default().fg(Color::Red))]
}
