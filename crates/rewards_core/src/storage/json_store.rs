use crate::error::AppError;
use crate::model::TaskState;
use crate::storage::TaskStateStore;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "state.json";
const STORE_ENV_VAR: &str = "REWARDS_STORE_PATH";
const LOCK_SUFFIX: &str = ".lock";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredStates {
    schema_version: u32,
    #[serde(default)]
    states: Vec<StoredState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredState {
    task_id: String,
    #[serde(default)]
    completed_at: Option<String>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    crate::config::app_dir().map(|dir| dir.join(STORE_FILE_NAME))
}

/// Sidecar file holding the cross-process write lock for `path`.
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from(STORE_FILE_NAME));
    name.push(LOCK_SUFFIX);
    path.with_file_name(name)
}

/// Exclusive OS lock on the sidecar file, released on drop.
struct StoreLock {
    file: File,
}

impl StoreLock {
    fn acquire(path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(parent_dir(path)).map_err(|err| AppError::io(err.to_string()))?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path(path))
            .map_err(|err| AppError::io(err.to_string()))?;
        FileExt::lock_exclusive(&file).map_err(|err| AppError::io(err.to_string()))?;
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// File-backed store. Every read-modify-write runs under an exclusive lock
/// shared by all processes using the same path, and each write lands in a
/// fresh temp file that is renamed over the target, so readers never see a
/// half-written timestamp.
#[derive(Debug)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn load_all(&self) -> Result<Vec<TaskState>, AppError> {
        load_states(&self.path)?
            .states
            .iter()
            .map(decode_state)
            .collect()
    }
}

impl TaskStateStore for JsonStateStore {
    fn get(&self, task_id: &str) -> Result<TaskState, AppError> {
        let stored = load_states(&self.path)?;
        match stored.states.iter().find(|state| state.task_id == task_id) {
            Some(state) => decode_state(state),
            None => Ok(TaskState::never_completed(task_id)),
        }
    }

    fn set(&self, state: &TaskState) -> Result<(), AppError> {
        self.update(&state.task_id, &mut |_| Some(state.clone()))
            .map(|_| ())
    }

    fn update(
        &self,
        task_id: &str,
        apply: &mut dyn FnMut(&TaskState) -> Option<TaskState>,
    ) -> Result<Option<TaskState>, AppError> {
        let _lock = StoreLock::acquire(&self.path)?;

        let mut stored = load_states(&self.path)?;
        let current = match stored.states.iter().find(|state| state.task_id == task_id) {
            Some(state) => decode_state(state)?,
            None => TaskState::never_completed(task_id),
        };

        let Some(next) = apply(&current) else {
            return Ok(None);
        };

        let encoded = encode_state(&next)?;
        match stored
            .states
            .iter_mut()
            .find(|existing| existing.task_id == next.task_id)
        {
            Some(existing) => *existing = encoded,
            None => stored.states.push(encoded),
        }

        save_states(&self.path, &stored)?;
        tracing::debug!(task_id = %next.task_id, path = %self.path.display(), "task state written");
        Ok(Some(next))
    }
}

fn decode_state(stored: &StoredState) -> Result<TaskState, AppError> {
    let completed_at = match stored.completed_at.as_deref() {
        Some(value) => Some(OffsetDateTime::parse(value, &Rfc3339).map_err(|_| {
            AppError::invalid_data(format!(
                "completed_at must be RFC3339 for {}",
                stored.task_id
            ))
        })?),
        None => None,
    };

    Ok(TaskState {
        task_id: stored.task_id.clone(),
        completed_at,
    })
}

fn encode_state(state: &TaskState) -> Result<StoredState, AppError> {
    let completed_at = match state.completed_at {
        Some(at) => Some(
            at.format(&Rfc3339)
                .map_err(|err| AppError::invalid_data(err.to_string()))?,
        ),
        None => None,
    };

    Ok(StoredState {
        task_id: state.task_id.clone(),
        completed_at,
    })
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn load_states(path: &Path) -> Result<StoredStates, AppError> {
    if !path.exists() {
        return Ok(StoredStates {
            schema_version: SCHEMA_VERSION,
            states: Vec::new(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredStates =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(stored)
}

fn save_states(path: &Path, stored: &StoredStates) -> Result<(), AppError> {
    let stored = StoredStates {
        schema_version: SCHEMA_VERSION,
        states: stored.states.clone(),
    };

    let mut temp =
        NamedTempFile::new_in(parent_dir(path)).map_err(|err| AppError::io(err.to_string()))?;
    serde_json::to_writer_pretty(&mut temp, &stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    temp.as_file()
        .sync_all()
        .map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(temp.path(), permissions)
            .map_err(|err| AppError::io(err.to_string()))?;
    }

    temp.persist(path)
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(())
}
