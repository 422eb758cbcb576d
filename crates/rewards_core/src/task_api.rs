use crate::action::{self, TaskAction};
use crate::catalog::{self, TaskCatalog};
use crate::categorize::{self, TaskBuckets};
use crate::clock::{Clock, SystemClock};
use crate::cooldown;
use crate::error::AppError;
use crate::model::{Phase, TaskDefinition, TaskState};
use crate::storage::{JsonStateStore, TaskStateStore};
use std::path::Path;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetail {
    pub definition: TaskDefinition,
    pub state: TaskState,
    pub phase: Phase,
    pub action: TaskAction,
}

impl TaskDetail {
    pub fn interactable(&self) -> bool {
        action::interactable(self.phase)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub task_id: String,
    pub reward_amount: u64,
    pub completed_at: OffsetDateTime,
}

/// Catalog joined with per-user state, evaluated against a clock.
pub struct TaskBoard<S, C> {
    catalog: TaskCatalog,
    store: S,
    clock: C,
}

impl<S: TaskStateStore, C: Clock> TaskBoard<S, C> {
    pub fn new(catalog: TaskCatalog, store: S, clock: C) -> Self {
        Self {
            catalog,
            store,
            clock,
        }
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn buckets(&self) -> Result<TaskBuckets, AppError> {
        let now = self.clock.now();
        let mut entries = Vec::with_capacity(self.catalog.len());
        for definition in self.catalog.iter() {
            let state = self.store.get(&definition.id)?;
            entries.push((definition, cooldown::phase(definition, &state, now)));
        }

        Ok(categorize::categorize(entries))
    }

    pub fn detail(&self, id: &str) -> Result<TaskDetail, AppError> {
        let definition = self.definition(id)?;
        let state = self.store.get(&definition.id)?;
        let phase = cooldown::phase(definition, &state, self.clock.now());

        Ok(TaskDetail {
            definition: definition.clone(),
            action: action::action_for(definition, phase),
            state,
            phase,
        })
    }

    /// Records a completion for an available task. Completed and cooling
    /// down tasks are refused by the action gate and nothing is written. The
    /// gate is checked against the stored record inside the same store update
    /// as the write, so a one-time reward is granted once.
    pub fn complete(&self, id: &str) -> Result<Completion, AppError> {
        let definition = self.definition(id)?;
        let now = self.clock.now();

        let mut refused = None;
        let written = self.store.update(&definition.id, &mut |state| {
            let phase = cooldown::phase(definition, state, now);
            let next = action::activate(definition, phase, |definition| TaskState {
                task_id: definition.id.clone(),
                completed_at: Some(now),
            });
            if next.is_none() {
                refused = Some(phase);
            }
            next
        })?;

        if written.is_none() {
            return Err(match refused {
                Some(Phase::Cooldown { remaining }) => AppError::invalid_input(format!(
                    "task is cooling down for another {} seconds",
                    remaining.whole_seconds().max(1)
                )),
                Some(Phase::Completed | Phase::Available) | None => {
                    AppError::invalid_input("task already completed")
                }
            });
        }

        tracing::info!(
            task_id = %definition.id,
            reward = definition.reward_amount,
            "task completed"
        );

        Ok(Completion {
            task_id: definition.id.clone(),
            reward_amount: definition.reward_amount,
            completed_at: now,
        })
    }

    fn definition(&self, id: &str) -> Result<&TaskDefinition, AppError> {
        let trimmed_id = id.trim();
        if trimmed_id.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }

        self.catalog
            .get(trimmed_id)
            .ok_or_else(|| AppError::not_found(format!("task not found: {trimmed_id}")))
    }
}

pub fn open_board(
    catalog_path: &Path,
    store_path: &Path,
) -> Result<TaskBoard<JsonStateStore, SystemClock>, AppError> {
    let catalog = catalog::load_catalog(catalog_path)?;
    Ok(TaskBoard::new(
        catalog,
        JsonStateStore::new(store_path),
        SystemClock,
    ))
}
