use crate::error::AppError;
use crate::model::{TaskCategory, TaskDefinition};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use time::Duration;

const CATALOG_FILE_NAME: &str = "catalog.json";
const CATALOG_ENV_VAR: &str = "REWARDS_CATALOG_PATH";

#[derive(Debug, Deserialize)]
struct CatalogFile {
    tasks: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    title: String,
    reward_amount: u64,
    category: TaskCategory,
    #[serde(default)]
    repeatable: bool,
    #[serde(default)]
    cooldown_seconds: u64,
}

/// Every task the board can show, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCatalog {
    tasks: Vec<TaskDefinition>,
}

impl TaskCatalog {
    pub fn from_definitions(tasks: Vec<TaskDefinition>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for task in &tasks {
            if task.id.trim().is_empty() {
                return Err(AppError::invalid_data("task id is required"));
            }
            if !seen.insert(task.id.as_str()) {
                return Err(AppError::invalid_data(format!(
                    "duplicate task id: {}",
                    task.id
                )));
            }
            if task.reward_amount == 0 {
                return Err(AppError::invalid_data(format!(
                    "reward_amount must be positive for {}",
                    task.id
                )));
            }
            if task.cooldown.is_negative() {
                return Err(AppError::invalid_data(format!(
                    "cooldown must not be negative for {}",
                    task.id
                )));
            }
        }

        Ok(Self { tasks })
    }

    pub fn get(&self, id: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

pub fn catalog_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CATALOG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    crate::config::app_dir().map(|dir| dir.join(CATALOG_FILE_NAME))
}

pub fn load_catalog(path: &Path) -> Result<TaskCatalog, AppError> {
    if !path.exists() {
        return Err(AppError::not_found(format!(
            "catalog not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    parse_catalog(&content).map_err(|err| match err {
        AppError::InvalidData(message) => {
            AppError::invalid_data(format!("{}: {}", path.display(), message))
        }
        other => other,
    })
}

pub fn parse_catalog(content: &str) -> Result<TaskCatalog, AppError> {
    let file: CatalogFile =
        serde_json::from_str(content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    let definitions = file
        .tasks
        .into_iter()
        .map(|entry| {
            let cooldown_seconds = i64::try_from(entry.cooldown_seconds).map_err(|_| {
                AppError::invalid_data(format!("cooldown_seconds too large for {}", entry.id))
            })?;
            Ok(TaskDefinition {
                id: entry.id.trim().to_string(),
                title: entry.title,
                reward_amount: entry.reward_amount,
                category: entry.category,
                repeatable: entry.repeatable,
                cooldown: Duration::seconds(cooldown_seconds),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    TaskCatalog::from_definitions(definitions)
}
