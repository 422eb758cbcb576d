mod common;

use common::{Workspace, stdout_json};

#[test]
fn complete_records_timestamp_and_prints_reward() {
    let workspace = Workspace::new("complete-ok");

    let output = workspace.run(&["complete", "verify-email"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Completed task: Verify email (verify-email), earned 40"));

    let stored = workspace.read_states();
    assert_eq!(stored["schema_version"], 1);
    assert_eq!(stored["states"][0]["task_id"], "verify-email");
    assert!(stored["states"][0]["completed_at"].is_string());
}

#[test]
fn complete_json_outputs_completion() {
    let workspace = Workspace::new("complete-json");

    let output = workspace.run(&["complete", "daily-checkin", "--json"]);

    assert!(output.status.success());
    let completion = stdout_json(&output);
    assert_eq!(completion["id"], "daily-checkin");
    assert_eq!(completion["reward_amount"], 5);
    assert!(completion["completed_at"].is_string());
}

#[test]
fn complete_twice_is_rejected_and_keeps_first_timestamp() {
    let workspace = Workspace::new("complete-twice");
    workspace.write_states(serde_json::json!([
        { "task_id": "verify-email", "completed_at": "2025-12-20T00:00:00Z" }
    ]));

    let output = workspace.run(&["complete", "verify-email"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - task already completed"));
    let stored = workspace.read_states();
    assert_eq!(stored["states"][0]["completed_at"], "2025-12-20T00:00:00Z");
}

#[test]
fn complete_rejects_task_on_cooldown() {
    let workspace = Workspace::new("complete-cooldown");

    assert!(workspace.run(&["complete", "daily-checkin"]).status.success());
    let output = workspace.run(&["complete", "daily-checkin"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cooling down"));
}

#[test]
fn complete_unknown_task_reports_not_found() {
    let workspace = Workspace::new("complete-unknown");

    let output = workspace.run(&["complete", "missing-task"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: not_found - task not found: missing-task"));
    assert!(!workspace.store.exists());
}
