use crate::app::{App, View};
use crate::ui;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};
use time::OffsetDateTime;

use super::action_queue::{channel, Action};
use super::actions::{drain_actions, handle_session_events};
use super::views::handle_view_key;

pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    // Background polling: refresh the week every 60 seconds.
    let mut last_week_refresh = Instant::now();
    const WEEK_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

    let (action_tx, mut action_rx) = channel();
    let _ = action_tx.send(Action::LoadWeek);

    loop {
        let now = OffsetDateTime::now_utc();
        terminal.draw(|f| ui::render(f, app, now))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_view_key(key, app, &action_tx, now);
                }
            }
        }

        if let Some(form) = app.form.as_mut() {
            let events = form.pump();
            handle_session_events(events, app, &action_tx);
        }

        if last_week_refresh.elapsed() >= WEEK_REFRESH_INTERVAL && app.current_view == View::Week {
            let _ = action_tx.send(Action::LoadWeek);
            last_week_refresh = Instant::now();
        }

        drain_actions(app, &action_tx, &mut action_rx, now);

        if !app.running {
            break;
        }
    }

    Ok(())
}
