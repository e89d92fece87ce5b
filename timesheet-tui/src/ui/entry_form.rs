use timesheet_core::clock::format_12h;
use timesheet_core::workflow::{Category, Lookup};

use super::utils::centered_rect;
use super::widgets::{cycling_value, error_value, field_line, placeholder};
use super::*;
use crate::app::{EntryForm, FormField, CATEGORIES};

pub fn render_entry_form(frame: &mut Frame, area: Rect, form: &EntryForm) {
    let fields = form.fields();
    let height = fields.len() as u16 + 6;
    let popup = centered_rect(64, height, area);
    frame.render_widget(Clear, popup);

    let workflow = form.workflow();
    let title = if workflow.is_submitting() {
        " New entry (saving) "
    } else {
        " New entry "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Magenta))
        .padding(Padding::uniform(1));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines: Vec<Line> = fields
        .iter()
        .map(|field| field_line(field.label(), field_value(form, *field), form.focus() == *field))
        .collect();

    lines.push(Line::from(""));
    if let Some(status) = workflow.status() {
        lines.push(Line::from(error_value(status.to_string())));
    } else if form.is_busy() {
        lines.push(Line::from(placeholder("Working...")));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn category_name(category: Category) -> &'static str {
    match category {
        Category::None => "None",
        Category::Project => "Project",
        Category::Internal => "Internal Meeting",
    }
}

fn field_value(form: &EntryForm, field: FormField) -> Vec<Span<'static>> {
    let workflow = form.workflow();
    let focused = form.focus() == field;
    let cursor = form.cursor(field);

    match field {
        FormField::Category => {
            if focused {
                cycling_value(category_name(CATEGORIES[cursor]).to_string(), true)
            } else if workflow.category() == Category::None {
                placeholder("Project or Internal Meeting")
            } else {
                vec![Span::raw(category_name(workflow.category()))]
            }
        }
        FormField::Project => lookup_value(
            workflow.projects(),
            cursor,
            focused,
            workflow.selected_project(),
            |p| (p.id, p.name.as_str()),
            "projects",
        ),
        FormField::Phase => lookup_value(
            workflow.phases(),
            cursor,
            focused,
            workflow.selected_phase(),
            |p| (p.id, p.name.as_str()),
            "phases",
        ),
        FormField::Task => lookup_value(
            workflow.tasks(),
            cursor,
            focused,
            workflow.selected_task(),
            |t| (t.id, t.name.as_str()),
            "tasks",
        ),
        FormField::Date => {
            let date = workflow.work_date();
            cycling_value(format!("{} ({})", date, date.date().weekday()), focused)
        }
        FormField::Start => match workflow.start_time() {
            Some(start) => cycling_value(format_12h(start), focused),
            None => placeholder("Choose a start time"),
        },
        FormField::End => match workflow.end_time() {
            Some(end) => {
                let mut spans = cycling_value(format_12h(end), focused);
                if let Some(hours) = workflow.duration_hours() {
                    spans.push(Span::styled(
                        format!("  {hours:.2}h"),
                        Style::default().fg(Color::Magenta),
                    ));
                }
                spans
            }
            None => placeholder("No end time left today"),
        },
        FormField::Notes => {
            let notes = workflow.notes().to_string();
            if focused {
                vec![Span::raw(notes), Span::raw("█")]
            } else if notes.is_empty() {
                placeholder("optional")
            } else {
                vec![Span::raw(notes)]
            }
        }
        FormField::Save => {
            let style = if focused {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Green)
            };
            let label = if workflow.is_submitting() {
                "[ Saving... ]"
            } else {
                "[ Save ]"
            };
            vec![Span::styled(label, style)]
        }
    }
}

/// A dependent picker: loading and failure states, the highlighted item
/// while focused, otherwise the chosen item.
fn lookup_value<K, T, I>(
    lookup: Option<&Lookup<K, T>>,
    cursor: usize,
    focused: bool,
    selected: Option<I>,
    id_name: impl Fn(&T) -> (I, &str),
    noun: &str,
) -> Vec<Span<'static>>
where
    K: Copy + PartialEq,
    I: PartialEq,
{
    let Some(lookup) = lookup else {
        return placeholder("");
    };
    if lookup.is_loading() {
        return placeholder(&format!("Loading {noun}..."));
    }
    if let Some(error) = lookup.error() {
        return error_value(format!("{error} (Enter on the parent to retry)"));
    }

    let items = lookup.items();
    if items.is_empty() {
        return placeholder(&format!("No {noun}"));
    }
    if focused {
        let name = items.get(cursor).map_or("", |item| id_name(item).1);
        return cycling_value(format!("{name} ({}/{})", cursor + 1, items.len()), true);
    }

    match selected.and_then(|id| items.iter().find(|item| id_name(item).0 == id)) {
        Some(item) => vec![Span::raw(id_name(item).1.to_string())],
        None => placeholder("Press Enter to choose"),
    }
}
