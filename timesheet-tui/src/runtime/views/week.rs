use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent};
use time::OffsetDateTime;

use super::super::action_queue::{Action, ActionTx};
use super::enqueue_action;

pub(super) fn handle_week_key(
    key: KeyEvent,
    app: &mut App,
    action_tx: &ActionTx,
    now: OffsetDateTime,
) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.quit(),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1, 0, now),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1, 0, now),
        KeyCode::Left | KeyCode::Char('h') => app.move_cursor(0, -1, now),
        KeyCode::Right | KeyCode::Char('l') => app.move_cursor(0, 1, now),
        KeyCode::Char('t') => app.focus_now(now),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if !app.activate_cursor(now) {
                app.set_status("Slot is taken or still in the future");
            }
        }
        KeyCode::Char('n') => app.open_new_entry(now),
        KeyCode::Char('r') => {
            app.clear_status();
            enqueue_action(action_tx, Action::LoadWeek);
        }
        _ => {}
    }
}
