use time::Duration;

/// Lifecycle phase derived from a definition, its stored state and the
/// current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Available,
    Completed,
    Cooldown { remaining: Duration },
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Completed => "completed",
            Self::Cooldown { .. } => "cooldown",
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Self::Cooldown { remaining } => Some(*remaining),
            Self::Available | Self::Completed => None,
        }
    }
}
