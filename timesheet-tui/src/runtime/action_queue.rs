use timesheet_core::grid::WeekWindow;
use timesheet_core::models::TimeEntry;
use timesheet_core::BackendError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug)]
pub(super) enum Action {
    /// Fetch the entries of the week containing "now" in the background.
    LoadWeek,
    /// A background week fetch finished.
    WeekLoaded {
        week: WeekWindow,
        result: Result<Vec<TimeEntry>, BackendError>,
    },
}

pub(super) type ActionTx = UnboundedSender<Action>;
pub(super) type ActionRx = UnboundedReceiver<Action>;

pub(super) fn channel() -> (ActionTx, ActionRx) {
    mpsc::unbounded_channel()
}
