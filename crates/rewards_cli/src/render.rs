use rewards_core::action;
use rewards_core::categorize::{TaskBuckets, TaskView};
use rewards_core::model::Phase;
use rewards_core::task_api::{Completion, TaskDetail};
use tabled::{Table, Tabled};
use time::Duration;
use time::format_description::well_known::Rfc3339;

#[derive(Tabled)]
struct BoardRow {
    id: String,
    title: String,
    reward: u64,
    status: String,
}

/// Compact remaining-time label such as `23h 5m` or `42s`. Partial seconds
/// count as a whole one so a task that is still cooling down never reads `0s`.
pub fn format_remaining(remaining: Duration) -> String {
    let mut total = remaining.whole_seconds();
    if remaining.subsec_nanoseconds() > 0 {
        total += 1;
    }
    let total = total.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

pub fn phase_status(phase: Phase) -> String {
    match phase {
        Phase::Cooldown { remaining } => {
            format!("cooldown ({} left)", format_remaining(remaining))
        }
        Phase::Available | Phase::Completed => phase.label().to_string(),
    }
}

fn section(title: &str, views: &[TaskView]) -> String {
    if views.is_empty() {
        return format!("{title}\n(none)");
    }

    let rows = views.iter().map(|view| BoardRow {
        id: view.definition.id.clone(),
        title: view.definition.title.clone(),
        reward: view.definition.reward_amount,
        status: phase_status(view.phase),
    });
    format!("{title}\n{}", Table::new(rows))
}

pub fn board_plain(buckets: &TaskBuckets) -> String {
    let mut sections = vec![
        section("Earning tasks", &buckets.earning),
        section("Sharing tasks", &buckets.sharing),
    ];
    if buckets.show_completed() {
        sections.push(section("Completed", &buckets.completed));
    }
    sections.push(format!("Claimable reward: {}", buckets.claimable_reward()));
    sections.join("\n\n")
}

fn view_json(view: &TaskView) -> serde_json::Value {
    serde_json::json!({
        "id": view.definition.id,
        "title": view.definition.title,
        "reward_amount": view.definition.reward_amount,
        "category": view.definition.category.label(),
        "phase": view.phase.label(),
        "remaining_seconds": view.phase.remaining().map(|remaining| remaining.whole_seconds()),
        "interactable": action::interactable(view.phase),
    })
}

pub fn board_json(buckets: &TaskBuckets) -> serde_json::Value {
    let list = |views: &[TaskView]| views.iter().map(view_json).collect::<Vec<_>>();
    serde_json::json!({
        "earning": list(&buckets.earning),
        "sharing": list(&buckets.sharing),
        "completed": list(&buckets.completed),
        "claimable_reward": buckets.claimable_reward(),
    })
}

pub fn detail_plain(detail: &TaskDetail) -> String {
    let definition = &detail.definition;
    let completed_at = detail
        .state
        .completed_at
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_else(|| "-".to_string());
    let cooldown = if definition.repeatable {
        format_remaining(definition.cooldown)
    } else {
        "-".to_string()
    };

    [
        format!("ID: {}", definition.id),
        format!("Title: {}", definition.title),
        format!("Reward: {}", definition.reward_amount),
        format!("Category: {}", definition.category.label()),
        format!("Repeatable: {}", if definition.repeatable { "yes" } else { "no" }),
        format!("Cooldown: {cooldown}"),
        format!("Status: {}", phase_status(detail.phase)),
        format!("Last completed: {completed_at}"),
        format!(
            "Interactable: {}",
            if detail.interactable() { "yes" } else { "no" }
        ),
    ]
    .join("\n")
}

pub fn detail_json(detail: &TaskDetail) -> serde_json::Value {
    let definition = &detail.definition;
    serde_json::json!({
        "id": definition.id,
        "title": definition.title,
        "reward_amount": definition.reward_amount,
        "category": definition.category.label(),
        "repeatable": definition.repeatable,
        "cooldown_seconds": definition.cooldown.whole_seconds(),
        "phase": detail.phase.label(),
        "remaining_seconds": detail.phase.remaining().map(|remaining| remaining.whole_seconds()),
        "completed_at": detail.state.completed_at.and_then(|at| at.format(&Rfc3339).ok()),
        "interactable": detail.interactable(),
    })
}

pub fn completion_json(completion: &Completion) -> serde_json::Value {
    serde_json::json!({
        "id": completion.task_id,
        "reward_amount": completion.reward_amount,
        "completed_at": completion.completed_at.format(&Rfc3339).ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::{board_json, board_plain, format_remaining, phase_status};
    use rewards_core::categorize::categorize;
    use rewards_core::model::{Phase, TaskCategory, TaskDefinition};
    use time::Duration;

    fn task(id: &str, category: TaskCategory) -> TaskDefinition {
        TaskDefinition {
            id: id.to_string(),
            title: format!("{id} title"),
            reward_amount: 10,
            category,
            repeatable: true,
            cooldown: Duration::hours(24),
        }
    }

    #[test]
    fn format_remaining_picks_largest_units() {
        assert_eq!(format_remaining(Duration::hours(23)), "23h 0m");
        assert_eq!(format_remaining(Duration::seconds(305)), "5m 5s");
        assert_eq!(format_remaining(Duration::seconds(42)), "42s");
        assert_eq!(format_remaining(Duration::seconds(-3)), "0s");
    }

    #[test]
    fn format_remaining_rounds_partial_seconds_up() {
        assert_eq!(format_remaining(Duration::milliseconds(400)), "1s");
        assert_eq!(format_remaining(Duration::milliseconds(59_500)), "1m 0s");
        assert_eq!(format_remaining(Duration::ZERO), "0s");
    }

    #[test]
    fn phase_status_includes_remaining_time() {
        assert_eq!(phase_status(Phase::Available), "available");
        assert_eq!(
            phase_status(Phase::Cooldown {
                remaining: Duration::minutes(90)
            }),
            "cooldown (1h 30m left)"
        );
    }

    #[test]
    fn board_plain_hides_empty_completed_section() {
        let daily = task("daily", TaskCategory::Earning);
        let buckets = categorize([(&daily, Phase::Available)]);

        let rendered = board_plain(&buckets);

        assert!(rendered.contains("Earning tasks"));
        assert!(rendered.contains("daily title"));
        assert!(rendered.contains("Sharing tasks\n(none)"));
        assert!(!rendered.contains("Completed"));
        assert!(rendered.ends_with("Claimable reward: 10"));
    }

    #[test]
    fn board_json_reports_phase_and_interactable() {
        let daily = task("daily", TaskCategory::Earning);
        let share = task("share", TaskCategory::Sharing);
        let buckets = categorize([
            (
                &daily,
                Phase::Cooldown {
                    remaining: Duration::hours(2),
                },
            ),
            (&share, Phase::Available),
        ]);

        let json = board_json(&buckets);

        assert_eq!(json["earning"][0]["phase"], "cooldown");
        assert_eq!(json["earning"][0]["remaining_seconds"], 7200);
        assert_eq!(json["earning"][0]["interactable"], false);
        assert_eq!(json["sharing"][0]["interactable"], true);
        assert_eq!(json["completed"].as_array().map(Vec::len), Some(0));
        assert_eq!(json["claimable_reward"], 10);
    }
}
