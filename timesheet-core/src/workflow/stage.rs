use time::Time;

use super::lookup::Lookup;
use crate::clock::DateKey;
use crate::models::{CreateEntryCommand, EntryId, Phase, PhaseId, Project, ProjectId, Task, TaskId};

/// Top-level choice of the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    None,
    Project,
    Internal,
}

/// Where the form currently is.
///
/// A phase can only be chosen inside a chosen project and a task only inside
/// a chosen phase; each child lookup carries the parent it was fetched for.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Internal,
    Project(ProjectPath),
    Submitted {
        entry: EntryId,
        command: CreateEntryCommand,
    },
}

impl Stage {
    pub fn category(&self) -> Category {
        match self {
            Stage::Idle => Category::None,
            Stage::Internal => Category::Internal,
            Stage::Project(_) => Category::Project,
            Stage::Submitted { command, .. } if command.is_internal() => Category::Internal,
            Stage::Submitted { .. } => Category::Project,
        }
    }

    pub fn project_path(&self) -> Option<&ProjectPath> {
        match self {
            Stage::Project(path) => Some(path),
            _ => None,
        }
    }

    pub(crate) fn project_path_mut(&mut self) -> Option<&mut ProjectPath> {
        match self {
            Stage::Project(path) => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPath {
    pub(crate) projects: Lookup<(), Project>,
    pub(crate) chosen: Option<ProjectBranch>,
}

impl ProjectPath {
    pub(crate) fn new(projects: Lookup<(), Project>) -> Self {
        Self {
            projects,
            chosen: None,
        }
    }

    pub fn projects(&self) -> &Lookup<(), Project> {
        &self.projects
    }

    pub fn chosen(&self) -> Option<&ProjectBranch> {
        self.chosen.as_ref()
    }

    pub fn phase_branch(&self) -> Option<&PhaseBranch> {
        self.chosen.as_ref().and_then(|branch| branch.chosen.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectBranch {
    pub(crate) project: ProjectId,
    pub(crate) phases: Lookup<ProjectId, Phase>,
    pub(crate) chosen: Option<PhaseBranch>,
}

impl ProjectBranch {
    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn phases(&self) -> &Lookup<ProjectId, Phase> {
        &self.phases
    }

    pub fn chosen(&self) -> Option<&PhaseBranch> {
        self.chosen.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseBranch {
    pub(crate) phase: PhaseId,
    pub(crate) tasks: Lookup<PhaseId, Task>,
    pub(crate) chosen: Option<TaskId>,
}

impl PhaseBranch {
    pub fn phase(&self) -> PhaseId {
        self.phase
    }

    pub fn tasks(&self) -> &Lookup<PhaseId, Task> {
        &self.tasks
    }

    pub fn chosen(&self) -> Option<TaskId> {
        self.chosen
    }
}

/// Flat snapshot of the form, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftEntry {
    pub work_date: DateKey,
    pub category: Category,
    pub project_id: Option<ProjectId>,
    pub phase_id: Option<PhaseId>,
    pub task_id: Option<TaskId>,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub notes: String,
}
