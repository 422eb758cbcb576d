pub mod json_store;
pub mod memory;

use crate::error::AppError;
use crate::model::TaskState;

pub use json_store::JsonStateStore;
pub use memory::InMemoryStateStore;

/// Completion records keyed by task id.
///
/// `set` replaces the whole record for one id in a single step; concurrent
/// writers to the same id resolve as last writer wins.
pub trait TaskStateStore: Send + Sync {
    /// Returns a never-completed record when nothing is stored for `task_id`.
    fn get(&self, task_id: &str) -> Result<TaskState, AppError>;

    fn set(&self, state: &TaskState) -> Result<(), AppError>;

    /// Reads the record for `task_id` and writes whatever `apply` returns, with
    /// no other writer in between. `None` leaves the record untouched.
    fn update(
        &self,
        task_id: &str,
        apply: &mut dyn FnMut(&TaskState) -> Option<TaskState>,
    ) -> Result<Option<TaskState>, AppError>;
}

impl<T: TaskStateStore + ?Sized> TaskStateStore for std::sync::Arc<T> {
    fn get(&self, task_id: &str) -> Result<TaskState, AppError> {
        (**self).get(task_id)
    }

    fn set(&self, state: &TaskState) -> Result<(), AppError> {
        (**self).set(state)
    }

    fn update(
        &self,
        task_id: &str,
        apply: &mut dyn FnMut(&TaskState) -> Option<TaskState>,
    ) -> Result<Option<TaskState>, AppError> {
        (**self).update(task_id, apply)
    }
}
