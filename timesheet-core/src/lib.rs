//! Weekly scheduling grid and entry workflow for a time-entry client.
//!
//! The grid side ([`grid`]) is pure: slot state is derived from the entry
//! list and "now" on every call. The workflow side ([`workflow`]) is a state
//! machine that asks its caller to run dependent lookups and guards their
//! results by parent key and ticket. [`workflow::EntrySession`] wires it to
//! a [`ports::TimesheetBackend`].

pub mod clock;
pub mod error;
pub mod grid;
pub mod models;
pub mod ports;
pub mod settings;
pub mod workflow;

pub use clock::{DateKey, Granularity, TimeReference};
pub use error::{
    BackendError, ClockError, EntryError, LoadError, LookupKind, SubmitError, ValidationError,
    WorkflowError,
};
pub use grid::{WeekGrid, WeekGridEngine, WeekWindow};
pub use ports::TimesheetBackend;
pub use settings::{GridSettings, WorkflowSettings};
pub use workflow::{EntrySession, EntryWorkflow};
