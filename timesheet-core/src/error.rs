use std::fmt;

use thiserror::Error;
use time::Time;

use crate::clock::DateKey;
use crate::models::{EntryId, PhaseId, ProjectId, TaskId};

/// Errors raised while parsing or validating clock values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("granularity of {0} minutes does not divide an hour")]
    InvalidGranularity(u16),
    #[error("visible day range {start}..{end} is empty or exceeds 24 hours")]
    InvalidDayRange { start: u8, end: u8 },
}

/// A time entry that violates the same-day `start < end` invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("entry {id} ends at {end} which is not after its start at {start}")]
pub struct EntryError {
    pub id: EntryId,
    pub start: Time,
    pub end: Time,
}

/// Failure reported by a backend adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("not authorized, check the configured API token")]
    Unauthorized,
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

/// The dependent lists the entry form loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Entries,
    Projects,
    Phases,
    Tasks,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Entries => write!(f, "entries"),
            LookupKind::Projects => write!(f, "projects"),
            LookupKind::Phases => write!(f, "phases"),
            LookupKind::Tasks => write!(f, "tasks"),
        }
    }
}

/// A dependent-list fetch failed. Shown next to the affected control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to load {kind}: {source}")]
pub struct LoadError {
    pub kind: LookupKind,
    pub source: BackendError,
}

impl LoadError {
    pub fn new(kind: LookupKind, source: BackendError) -> Self {
        Self { kind, source }
    }
}

/// The draft cannot be submitted yet. Only the first failing rule is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please choose Project or Internal Meeting.")]
    CategoryRequired,
    #[error("Please select a project.")]
    ProjectRequired,
    #[error("Please wait for {0} to finish loading.")]
    LookupIncomplete(LookupKind),
    #[error("Please select a phase.")]
    PhaseRequired,
    #[error("Please select a task.")]
    TaskRequired,
    #[error("Please select start and end times.")]
    TimeRangeRequired,
    #[error("End time must be at least {0} minutes after start time.")]
    DurationTooShort(u16),
}

/// The create-entry call failed. The draft is kept so the user can retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to save entry: {0}")]
pub struct SubmitError(#[from] pub BackendError);

/// A transition that is not legal in the workflow's current stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("choose the Project category first")]
    NotInProjectCategory,
    #[error("{0} are not loaded yet")]
    NotLoaded(LookupKind),
    #[error("unknown project {0}")]
    UnknownProject(ProjectId),
    #[error("choose a project first")]
    NoProjectChosen,
    #[error("unknown or disabled phase {0}")]
    UnknownPhase(PhaseId),
    #[error("choose a phase first")]
    NoPhaseChosen,
    #[error("unknown or disabled task {0}")]
    UnknownTask(TaskId),
    #[error("work date {0} is in the future")]
    FutureWorkDate(DateKey),
    #[error("an entry is already being saved")]
    SubmitInFlight,
    #[error("this entry has already been saved")]
    AlreadySubmitted,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
