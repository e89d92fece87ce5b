use crate::app::{App, View};
use crossterm::event::KeyEvent;
use time::OffsetDateTime;

use super::action_queue::{Action, ActionTx};

mod entry;
mod week;

fn enqueue_action(action_tx: &ActionTx, action: Action) {
    let _ = action_tx.send(action);
}

pub(super) fn handle_view_key(
    key: KeyEvent,
    app: &mut App,
    action_tx: &ActionTx,
    now: OffsetDateTime,
) {
    match app.current_view {
        View::Week => week::handle_week_key(key, app, action_tx, now),
        View::Entry => entry::handle_entry_key(key, app, now),
    }
}
