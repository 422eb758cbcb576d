use crate::error::AppError;
use crate::notify::PushEvent;
use std::io::{self, BufRead, BufReader};
use std::sync::{Mutex, OnceLock};

/// Source of push events. The registration handshake with the remote
/// service is the provider's own business.
pub trait PushProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Blocks, feeding every received event to `sink`, until the provider
    /// has nothing more to deliver.
    fn run(&self, sink: &mut dyn FnMut(PushEvent)) -> Result<(), AppError>;
}

static PROVIDER: OnceLock<Box<dyn PushProvider>> = OnceLock::new();

/// Installs the process-wide provider. There is no teardown; a second
/// install is refused.
pub fn install_provider(
    provider: Box<dyn PushProvider>,
) -> Result<&'static dyn PushProvider, AppError> {
    let name = provider.name().to_string();
    if PROVIDER.set(provider).is_err() {
        return Err(AppError::invalid_input("push provider already initialized"));
    }
    tracing::debug!(provider = %name, "push provider installed");
    installed_provider().ok_or_else(|| AppError::io("push provider missing after install"))
}

pub fn installed_provider() -> Option<&'static dyn PushProvider> {
    PROVIDER.get().map(|provider| provider.as_ref())
}

pub struct NoopPushProvider;

impl PushProvider for NoopPushProvider {
    fn name(&self) -> &str {
        "noop"
    }

    fn run(&self, _sink: &mut dyn FnMut(PushEvent)) -> Result<(), AppError> {
        Ok(())
    }
}

/// Reads one JSON push event per line. Blank lines are skipped; lines that
/// are not JSON still produce an event, which then uses default text.
pub struct LinePushProvider {
    reader: Mutex<Box<dyn BufRead + Send>>,
}

impl LinePushProvider {
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            reader: Mutex::new(Box::new(reader)),
        }
    }

    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl PushProvider for LinePushProvider {
    fn name(&self) -> &str {
        "lines"
    }

    fn run(&self, sink: &mut dyn FnMut(PushEvent)) -> Result<(), AppError> {
        let mut reader = self
            .reader
            .lock()
            .map_err(|_| AppError::io("push reader lock poisoned"))?;
        let mut line = String::new();

        loop {
            line.clear();
            let bytes = reader
                .read_line(&mut line)
                .map_err(|err| AppError::io(err.to_string()))?;
            if bytes == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            sink(PushEvent::parse(trimmed));
        }

        Ok(())
    }
}
