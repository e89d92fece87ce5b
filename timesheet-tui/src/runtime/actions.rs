use time::OffsetDateTime;
use timesheet_core::grid::WeekWindow;
use timesheet_core::models::TimeEntry;
use timesheet_core::workflow::SessionEvent;
use timesheet_core::{BackendError, LoadError, LookupKind, TimesheetBackend};
use tracing::{debug, info, warn};

use crate::app::App;

use super::action_queue::{Action, ActionRx, ActionTx};

/// Run every queued action without waiting on the backend.
pub(super) fn drain_actions(
    app: &mut App,
    action_tx: &ActionTx,
    action_rx: &mut ActionRx,
    now: OffsetDateTime,
) {
    while let Ok(action) = action_rx.try_recv() {
        run_action(action, app, action_tx, now);
    }
}

fn run_action(action: Action, app: &mut App, action_tx: &ActionTx, now: OffsetDateTime) {
    match action {
        Action::LoadWeek => spawn_week_load(app, action_tx, now),
        Action::WeekLoaded { week, result } => apply_week(app, week, result, now),
    }
}

fn spawn_week_load(app: &mut App, action_tx: &ActionTx, now: OffsetDateTime) {
    let week = app.engine.week_window(now);
    let backend = app.backend();
    let tx = action_tx.clone();
    app.is_loading = true;
    debug!(monday = %week.monday(), "loading week entries");

    tokio::spawn(async move {
        let result = backend.fetch_week_entries(week).await;
        // The receiver is gone once the app has quit.
        let _ = tx.send(Action::WeekLoaded { week, result });
    });
}

fn apply_week(
    app: &mut App,
    week: WeekWindow,
    result: Result<Vec<TimeEntry>, BackendError>,
    now: OffsetDateTime,
) {
    if week != app.engine.week_window(now) {
        debug!(monday = %week.monday(), "dropping entries for a week no longer shown");
        return;
    }
    app.is_loading = false;
    match result {
        Ok(entries) => {
            info!(monday = %week.monday(), count = entries.len(), "loaded week entries");
            app.update_entries(week, entries);
        }
        Err(error) => {
            let error = LoadError::new(LookupKind::Entries, error);
            warn!(%error, "week load failed");
            app.set_status(error.to_string());
        }
    }
}

/// React to completions the entry form applied this tick.
pub(super) fn handle_session_events(events: Vec<SessionEvent>, app: &mut App, action_tx: &ActionTx) {
    for event in events {
        match event {
            SessionEvent::Saved(entry) => {
                app.close_form();
                app.set_status(format!("Entry {entry} saved"));
                let _ = action_tx.send(Action::LoadWeek);
            }
            // The form shows save and load failures itself.
            SessionEvent::SaveFailed(error) => debug!(%error, "save failed"),
            SessionEvent::LookupApplied(kind) => debug!(%kind, "lookup applied"),
            SessionEvent::LookupDiscarded(kind) => debug!(%kind, "stale lookup dropped"),
        }
    }
}
