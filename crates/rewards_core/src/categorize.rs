use crate::model::{Phase, TaskCategory, TaskDefinition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub definition: TaskDefinition,
    pub phase: Phase,
}

/// Presentation buckets. Each list keeps catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBuckets {
    pub earning: Vec<TaskView>,
    pub sharing: Vec<TaskView>,
    pub completed: Vec<TaskView>,
}

impl TaskBuckets {
    /// The completed section is hidden entirely when it has nothing in it.
    pub fn show_completed(&self) -> bool {
        !self.completed.is_empty()
    }

    /// Sum of rewards for tasks that can be completed right now.
    pub fn claimable_reward(&self) -> u64 {
        self.earning
            .iter()
            .chain(self.sharing.iter())
            .filter(|view| view.phase == Phase::Available)
            .fold(0u64, |total, view| {
                total.saturating_add(view.definition.reward_amount)
            })
    }
}

/// Splits (definition, phase) pairs into buckets.
///
/// Completed sharing tasks are dropped from every bucket: once a one-time
/// share is done it is not listed among accomplishments.
pub fn categorize<'a, I>(entries: I) -> TaskBuckets
where
    I: IntoIterator<Item = (&'a TaskDefinition, Phase)>,
{
    let mut buckets = TaskBuckets::default();

    for (definition, phase) in entries {
        let view = TaskView {
            definition: definition.clone(),
            phase,
        };
        match (definition.category, phase) {
            (TaskCategory::Earning, Phase::Completed) => buckets.completed.push(view),
            (TaskCategory::Sharing, Phase::Completed) => {}
            (TaskCategory::Earning, Phase::Available | Phase::Cooldown { .. }) => {
                buckets.earning.push(view)
            }
            (TaskCategory::Sharing, Phase::Available | Phase::Cooldown { .. }) => {
                buckets.sharing.push(view)
            }
        }
    }

    buckets
}
