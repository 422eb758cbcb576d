use clap::{Parser, Subcommand};
use rewards_core::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the task board
    ///
    /// Example: rewards board
    Board,
    /// Show one task with its current phase
    ///
    /// Example: rewards show daily-checkin
    Show { id: String },
    /// Complete an available task and collect its reward
    ///
    /// Example: rewards complete daily-checkin
    Complete { id: String },
    /// Deliver one push event and wait for the user to act on it
    ///
    /// Example: rewards push '{"notification":{"title":"Bonus week"}}'
    Push { payload: Option<String> },
    /// Deliver push events read as JSON lines from stdin
    ///
    /// Example: provider-bridge | rewards listen
    Listen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationField {
    DefaultTitle,
    DefaultBody,
    Icon,
    Tag,
    OpenLabel,
    CloseLabel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    CatalogPath,
    StorePath,
    LogFilter,
    Notification(NotificationField),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "catalog_path" | "catalog" => top_level(ConfigOverrideTarget::CatalogPath, remainder)?,
        "store_path" | "store" => top_level(ConfigOverrideTarget::StorePath, remainder)?,
        "log_filter" | "log" => top_level(ConfigOverrideTarget::LogFilter, remainder)?,
        "notification" => {
            let sub = remainder
                .and_then(canonicalize_flag_name)
                .ok_or_else(|| "notification override requires a field name".to_string())?;
            ConfigOverrideTarget::Notification(notification_field(&sub)?)
        }
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry)?;
        let value = Some(parsed.value);
        let notification = &mut overrides.notification;
        match parsed.target {
            ConfigOverrideTarget::CatalogPath => overrides.catalog_path = value,
            ConfigOverrideTarget::StorePath => overrides.store_path = value,
            ConfigOverrideTarget::LogFilter => overrides.log_filter = value,
            ConfigOverrideTarget::Notification(field) => match field {
                NotificationField::DefaultTitle => notification.default_title = value,
                NotificationField::DefaultBody => notification.default_body = value,
                NotificationField::Icon => notification.icon = value,
                NotificationField::Tag => notification.tag = value,
                NotificationField::OpenLabel => notification.open_label = value,
                NotificationField::CloseLabel => notification.close_label = value,
            },
        }
    }

    Ok(overrides)
}

fn top_level(
    target: ConfigOverrideTarget,
    remainder: Option<&str>,
) -> Result<ConfigOverrideTarget, String> {
    if remainder.is_some() {
        Err("override cannot have subfields".to_string())
    } else {
        Ok(target)
    }
}

fn notification_field(name: &str) -> Result<NotificationField, String> {
    match name {
        "default_title" | "title" => Ok(NotificationField::DefaultTitle),
        "default_body" | "body" => Ok(NotificationField::DefaultBody),
        "icon" => Ok(NotificationField::Icon),
        "tag" => Ok(NotificationField::Tag),
        "open_label" => Ok(NotificationField::OpenLabel),
        "close_label" => Ok(NotificationField::CloseLabel),
        other => Err(format!("unknown notification field '{other}'")),
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
