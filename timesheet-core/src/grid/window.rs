use time::{Date, Duration, OffsetDateTime};

use crate::clock::{DateKey, TimeReference};

/// The Monday-to-Sunday week that contains a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekWindow {
    monday: Date,
}

impl WeekWindow {
    pub fn containing(date: Date) -> Self {
        let back = i64::from(date.weekday().number_days_from_monday());
        Self {
            monday: date.saturating_sub(Duration::days(back)),
        }
    }

    pub fn monday(&self) -> Date {
        self.monday
    }

    pub fn sunday(&self) -> Date {
        self.monday.saturating_add(Duration::days(6))
    }

    /// The seven dates of the week, Monday first.
    pub fn days(&self) -> [Date; 7] {
        std::array::from_fn(|offset| self.monday.saturating_add(Duration::days(offset as i64)))
    }

    pub fn keys(&self) -> [DateKey; 7] {
        self.days().map(DateKey::new)
    }

    pub fn contains(&self, date: Date) -> bool {
        self.monday <= date && date <= self.sunday()
    }

    /// Zero-based weekday column of `date`, if it is in this week.
    pub fn index_of(&self, date: Date) -> Option<usize> {
        self.days().iter().position(|day| *day == date)
    }
}

/// The week containing `now`, as seen in `reference`.
pub fn compute_week_window(now: OffsetDateTime, reference: TimeReference) -> WeekWindow {
    WeekWindow::containing(reference.today(now))
}
