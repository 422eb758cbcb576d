use crate::model::{Phase, TaskDefinition};
use time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    OpenTask { task_id: String },
    ShowCompleted,
    ShowCooldown { remaining: Duration },
}

/// Only available tasks react to a gesture.
pub fn interactable(phase: Phase) -> bool {
    match phase {
        Phase::Available => true,
        Phase::Completed | Phase::Cooldown { .. } => false,
    }
}

pub fn action_for(definition: &TaskDefinition, phase: Phase) -> TaskAction {
    match phase {
        Phase::Available => TaskAction::OpenTask {
            task_id: definition.id.clone(),
        },
        Phase::Completed => TaskAction::ShowCompleted,
        Phase::Cooldown { remaining } => TaskAction::ShowCooldown { remaining },
    }
}

/// Runs `open` for an interactable task and returns its result. Anything
/// else is informational and `open` is never called.
pub fn activate<F, R>(definition: &TaskDefinition, phase: Phase, open: F) -> Option<R>
where
    F: FnOnce(&TaskDefinition) -> R,
{
    if interactable(phase) {
        Some(open(definition))
    } else {
        None
    }
}
