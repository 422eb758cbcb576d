use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "rewards";
const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "REWARDS_CONFIG_PATH";

pub const DEFAULT_NOTIFICATION_TITLE: &str = "Rewards";
pub const DEFAULT_NOTIFICATION_BODY: &str = "You have a new update waiting.";
pub const DEFAULT_NOTIFICATION_ICON: &str = "rewards";
pub const DEFAULT_NOTIFICATION_TAG: &str = "rewards-announcement";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub default_title: String,
    pub default_body: String,
    pub icon: String,
    pub tag: String,
    pub open_label: String,
    pub close_label: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            default_body: DEFAULT_NOTIFICATION_BODY.to_string(),
            icon: DEFAULT_NOTIFICATION_ICON.to_string(),
            tag: DEFAULT_NOTIFICATION_TAG.to_string(),
            open_label: "Open".to_string(),
            close_label: "Close".to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default)]
    pub store_path: Option<String>,
    #[serde(default)]
    pub log_filter: Option<String>,
    #[serde(default)]
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NotificationOverrides {
    pub default_title: Option<String>,
    pub default_body: Option<String>,
    pub icon: Option<String>,
    pub tag: Option<String>,
    pub open_label: Option<String>,
    pub close_label: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub catalog_path: Option<String>,
    pub store_path: Option<String>,
    pub log_filter: Option<String>,
    pub notification: NotificationOverrides,
}

/// Per-user directory holding config, catalog and state files.
pub fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    app_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    Ok(normalize_config(config))
}

fn normalize_config(mut config: Config) -> Config {
    config.catalog_path = non_blank(config.catalog_path);
    config.store_path = non_blank(config.store_path);
    config.log_filter = non_blank(config.log_filter);
    config
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();

    if let Some(path) = non_blank(overrides.catalog_path.clone()) {
        merged.catalog_path = Some(path);
    }
    if let Some(path) = non_blank(overrides.store_path.clone()) {
        merged.store_path = Some(path);
    }
    if let Some(filter) = non_blank(overrides.log_filter.clone()) {
        merged.log_filter = Some(filter);
    }

    let notification = &overrides.notification;
    let target = &mut merged.notification;
    for (value, slot) in [
        (&notification.default_title, &mut target.default_title),
        (&notification.default_body, &mut target.default_body),
        (&notification.icon, &mut target.icon),
        (&notification.tag, &mut target.tag),
        (&notification.open_label, &mut target.open_label),
        (&notification.close_label, &mut target.close_label),
    ] {
        if let Some(value) = value {
            *slot = value.clone();
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, DEFAULT_NOTIFICATION_TAG, NotificationConfig,
        NotificationOverrides, load_config_from_path, load_config_with_fallback_from_path,
        merge_overrides,
    };
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("rewards-{nanos}-{file_name}"))
    }

    #[test]
    fn load_config_missing_returns_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
    }

    #[test]
    fn load_config_invalid_returns_defaults_and_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert_eq!(result.error.map(|err| err.code()), Some("invalid_data"));
    }

    #[test]
    fn load_config_reads_valid_file_and_fills_defaults() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "catalog_path": " /srv/rewards/catalog.json ",
            "store_path": "",
            "notification": {
                "default_title": "Heads up"
            }
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(
            loaded.catalog_path.as_deref(),
            Some("/srv/rewards/catalog.json")
        );
        assert_eq!(loaded.store_path, None);
        assert_eq!(loaded.notification.default_title, "Heads up");
        assert_eq!(loaded.notification.tag, DEFAULT_NOTIFICATION_TAG);
    }

    #[test]
    fn merge_overrides_updates_paths_and_notification_fields() {
        let base = Config {
            catalog_path: Some("a.json".into()),
            ..Config::default()
        };
        let overrides = ConfigOverrides {
            catalog_path: Some("b.json".into()),
            log_filter: Some("rewards=debug".into()),
            notification: NotificationOverrides {
                default_body: Some("Fresh tasks are up".into()),
                ..NotificationOverrides::default()
            },
            ..ConfigOverrides::default()
        };

        let merged = merge_overrides(&base, &overrides);

        assert_eq!(base.catalog_path.as_deref(), Some("a.json"));
        assert_eq!(merged.catalog_path.as_deref(), Some("b.json"));
        assert_eq!(merged.log_filter.as_deref(), Some("rewards=debug"));
        assert_eq!(merged.notification.default_body, "Fresh tasks are up");
        assert_eq!(
            merged.notification.default_title,
            NotificationConfig::default().default_title
        );
    }

    #[test]
    fn merge_overrides_with_empty_overrides_returns_clone() {
        let base = Config {
            store_path: Some("state.json".into()),
            ..Config::default()
        };

        let merged = merge_overrides(&base, &ConfigOverrides::default());

        assert_eq!(merged, base);
    }
}
