use crate::app::{App, FormField};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use time::OffsetDateTime;
use timesheet_core::WorkflowError;

pub(super) fn handle_entry_key(key: KeyEvent, app: &mut App, now: OffsetDateTime) {
    let today = app.engine.reference().today(now);
    let Some(form) = app.form.as_mut() else {
        return;
    };

    let result: Result<(), WorkflowError> = match key.code {
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => form.submit(),
        KeyCode::Esc => match form.back() {
            Ok(true) => Ok(()),
            Ok(false) => {
                app.close_form();
                return;
            }
            Err(error) => Err(error),
        },
        KeyCode::Up | KeyCode::BackTab => {
            form.focus_prev();
            Ok(())
        }
        KeyCode::Down | KeyCode::Tab => {
            form.focus_next();
            Ok(())
        }
        KeyCode::Left => form.cycle(-1, today),
        KeyCode::Right => form.cycle(1, today),
        KeyCode::Enter => form.confirm(),
        KeyCode::Backspace if form.focus() == FormField::Notes => form.backspace(),
        KeyCode::Char(c)
            if form.focus() == FormField::Notes && !key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            form.input_char(c)
        }
        _ => Ok(()),
    };

    match result {
        Ok(()) => app.clear_status(),
        // Validation problems are already on the form's status line.
        Err(WorkflowError::Validation(_)) => app.clear_status(),
        Err(error) => app.set_status(error.to_string()),
    }
}
