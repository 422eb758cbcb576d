mod phase;
mod task;

pub use phase::Phase;
pub use task::{TaskCategory, TaskDefinition, TaskState};
