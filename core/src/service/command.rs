use crate::model::task::{TaskDraft, TaskId};

/// A mutation requested by a display or input collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    Add(TaskDraft),
    Remove(TaskId),
    ToggleComplete(TaskId),
}
