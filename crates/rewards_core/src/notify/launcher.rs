use crate::error::AppError;
use crate::notify::RootLauncher;
use std::process::{Child, Command};
use std::sync::Mutex;

const ROOT_COMMAND: &str = "board";

/// Opens the root view by re-running the current executable with the board
/// command. While that process is alive further requests do nothing.
#[derive(Default)]
pub struct ExecutableLauncher {
    child: Mutex<Option<Child>>,
}

impl ExecutableLauncher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RootLauncher for ExecutableLauncher {
    fn open_root(&self) -> Result<(), AppError> {
        let mut child = self
            .child
            .lock()
            .map_err(|_| AppError::io("launcher lock poisoned"))?;

        if let Some(running) = child.as_mut()
            && matches!(running.try_wait(), Ok(None))
        {
            tracing::debug!(pid = running.id(), "root view already open");
            return Ok(());
        }

        let exe = std::env::current_exe().map_err(|err| AppError::io(err.to_string()))?;
        let spawned = Command::new(exe)
            .arg(ROOT_COMMAND)
            .spawn()
            .map_err(|err| AppError::io(err.to_string()))?;
        *child = Some(spawned);
        Ok(())
    }
}
