use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Earning,
    Sharing,
}

impl TaskCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Earning => "earning",
            Self::Sharing => "sharing",
        }
    }
}

/// A task as declared in the catalog. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefinition {
    pub id: String,
    pub title: String,
    pub reward_amount: u64,
    pub category: TaskCategory,
    pub repeatable: bool,
    /// Only consulted when `repeatable` is set.
    pub cooldown: Duration,
}

/// Per-user completion record for one task id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskState {
    pub task_id: String,
    pub completed_at: Option<OffsetDateTime>,
}

impl TaskState {
    pub fn never_completed(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            completed_at: None,
        }
    }
}
