#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Week,
    Entry,
}

/// Field focused in the entry form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    Category,
    Project,
    Phase,
    Task,
    Date,
    Start,
    End,
    Notes,
    Save,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Category => "Category",
            FormField::Project => "Project",
            FormField::Phase => "Phase",
            FormField::Task => "Task",
            FormField::Date => "Date",
            FormField::Start => "Start",
            FormField::End => "End",
            FormField::Notes => "Notes",
            FormField::Save => "Save",
        }
    }
}

/// Position in the week grid: row by time of day, column Monday..Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridCursor {
    pub row: usize,
    pub day: usize,
}

impl GridCursor {
    pub fn moved(self, rows: usize, d_row: isize, d_day: isize) -> Self {
        let clamp = |value: usize, delta: isize, len: usize| {
            value
                .saturating_add_signed(delta)
                .min(len.saturating_sub(1))
        };
        Self {
            row: clamp(self.row, d_row, rows),
            day: clamp(self.day, d_day, 7),
        }
    }
}
