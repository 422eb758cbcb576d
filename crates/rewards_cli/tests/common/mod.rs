#![allow(dead_code)]

use rewards_core::storage::json_store;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rewards-{nanos}-{file_name}"))
}

pub struct Workspace {
    pub catalog: PathBuf,
    pub store: PathBuf,
    pub config: PathBuf,
}

impl Workspace {
    pub fn new(name: &str) -> Self {
        let workspace = Self {
            catalog: temp_path(&format!("{name}-catalog.json")),
            store: temp_path(&format!("{name}-state.json")),
            config: temp_path(&format!("{name}-config.json")),
        };
        write_json(
            &workspace.catalog,
            serde_json::json!({
                "tasks": [
                    {
                        "id": "daily-checkin",
                        "title": "Daily check-in",
                        "reward_amount": 5,
                        "category": "earning",
                        "repeatable": true,
                        "cooldown_seconds": 86400
                    },
                    {
                        "id": "share-link",
                        "title": "Share your link",
                        "reward_amount": 25,
                        "category": "sharing"
                    },
                    {
                        "id": "verify-email",
                        "title": "Verify email",
                        "reward_amount": 40,
                        "category": "earning"
                    }
                ]
            }),
        );
        workspace
    }

    pub fn write_states(&self, states: serde_json::Value) {
        write_json(
            &self.store,
            serde_json::json!({
                "schema_version": 1,
                "states": states
            }),
        );
    }

    pub fn read_states(&self) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(&self.store).unwrap()).unwrap()
    }

    pub fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_rewards"));
        command
            .args(args)
            .env("REWARDS_CATALOG_PATH", &self.catalog)
            .env("REWARDS_STORE_PATH", &self.store)
            .env("REWARDS_CONFIG_PATH", &self.config)
            .env("REWARDS_DISABLE_NOTIFICATIONS", "1")
            .env_remove("RUST_LOG");
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("failed to run rewards")
    }

    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn rewards");
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        child.wait_with_output().expect("failed to wait for rewards")
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        std::fs::remove_file(&self.catalog).ok();
        std::fs::remove_file(&self.store).ok();
        std::fs::remove_file(json_store::lock_path(&self.store)).ok();
        std::fs::remove_file(&self.config).ok();
    }
}

pub fn write_json(path: &Path, value: serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap()
}
