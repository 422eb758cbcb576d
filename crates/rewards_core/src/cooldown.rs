use crate::model::{Phase, TaskDefinition, TaskState};
use time::OffsetDateTime;

/// Derives the phase of a task at `now`. Pure: nothing is written back, so
/// an expired cooldown is simply observed as `Available` again.
pub fn phase(definition: &TaskDefinition, state: &TaskState, now: OffsetDateTime) -> Phase {
    let Some(completed_at) = state.completed_at else {
        return Phase::Available;
    };

    if !definition.repeatable {
        return Phase::Completed;
    }

    // A completion stamped after `now` has not happened yet from the
    // caller's point of view.
    if now < completed_at {
        return Phase::Available;
    }

    let elapsed = now - completed_at;
    if elapsed >= definition.cooldown {
        Phase::Available
    } else {
        Phase::Cooldown {
            remaining: definition.cooldown - elapsed,
        }
    }
}
