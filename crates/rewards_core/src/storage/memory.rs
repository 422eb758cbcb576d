use crate::error::AppError;
use crate::model::TaskState;
use crate::storage::TaskStateStore;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: Mutex<HashMap<String, TaskState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStateStore for InMemoryStateStore {
    fn get(&self, task_id: &str) -> Result<TaskState, AppError> {
        let states = self
            .states
            .lock()
            .map_err(|_| AppError::io("state store lock poisoned"))?;
        Ok(states
            .get(task_id)
            .cloned()
            .unwrap_or_else(|| TaskState::never_completed(task_id)))
    }

    fn set(&self, state: &TaskState) -> Result<(), AppError> {
        let mut states = self
            .states
            .lock()
            .map_err(|_| AppError::io("state store lock poisoned"))?;
        states.insert(state.task_id.clone(), state.clone());
        Ok(())
    }

    fn update(
        &self,
        task_id: &str,
        apply: &mut dyn FnMut(&TaskState) -> Option<TaskState>,
    ) -> Result<Option<TaskState>, AppError> {
        let mut states = self
            .states
            .lock()
            .map_err(|_| AppError::io("state store lock poisoned"))?;
        let current = states
            .get(task_id)
            .cloned()
            .unwrap_or_else(|| TaskState::never_completed(task_id));

        let next = apply(&current);
        if let Some(next) = &next {
            states.insert(next.task_id.clone(), next.clone());
        }
        Ok(next)
    }
}
