use ratatui::layout::{Constraint, Direction, Layout, Rect};
use time::Date;
use timesheet_core::clock::format_wall_time;
use timesheet_core::models::TimeEntry;

/// Helper function to create a centered rectangle
pub fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height.saturating_sub(height)) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((r.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((r.width.saturating_sub(width)) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// "Mon 10" style column header.
pub fn day_header(date: Date) -> String {
    let weekday = date.weekday().to_string();
    format!("{} {:02}", &weekday[..3], date.day())
}

/// "09:00-10:30" for an entry.
pub fn entry_range(entry: &TimeEntry) -> String {
    format!(
        "{}-{}",
        format_wall_time(entry.start_time),
        format_wall_time(entry.end_time)
    )
}

/// Rows `[start, start + visible)` to draw so that `cursor` stays on screen.
pub fn scroll_window(cursor: usize, total: usize, visible: usize) -> std::ops::Range<usize> {
    if visible == 0 {
        return 0..0;
    }
    let start = cursor
        .saturating_sub(visible - 1)
        .min(total.saturating_sub(visible));
    start..(start + visible).min(total)
}
