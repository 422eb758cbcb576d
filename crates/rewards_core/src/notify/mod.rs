use crate::config::NotificationConfig;
use crate::error::AppError;
use serde::Serialize;
use serde_json::Value;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxSurface;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsSurface;

pub mod launcher;
pub mod provider;
pub mod worker;

pub use launcher::ExecutableLauncher;
pub use provider::{LinePushProvider, NoopPushProvider, PushProvider};
pub use worker::{DispatcherEvent, DispatcherWorker};

pub const OPEN_ACTION: &str = "open";
pub const CLOSE_ACTION: &str = "close";

/// The `notification` block of a push event. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationPayload {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// A push event as delivered by the provider. Only `notification.title`
/// and `notification.body` are read; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushEvent {
    pub notification: Option<NotificationPayload>,
}

impl PushEvent {
    pub fn from_value(value: &Value) -> Self {
        let notification = value.get("notification").map(|block| NotificationPayload {
            title: block.get("title").and_then(Value::as_str).map(String::from),
            body: block.get("body").and_then(Value::as_str).map(String::from),
        });
        Self { notification }
    }

    /// Never fails: text that is not JSON yields an event without payload.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                tracing::warn!(error = %err, "push event is not valid JSON, using defaults");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedNotification {
    pub title: String,
    pub body: String,
}

/// Fills in missing or blank fields from the configured defaults.
pub fn resolve_payload(
    payload: Option<&NotificationPayload>,
    defaults: &NotificationConfig,
) -> ResolvedNotification {
    fn pick(value: Option<&String>, fallback: &str) -> String {
        match value.map(|text| text.trim()) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => fallback.to_string(),
        }
    }

    ResolvedNotification {
        title: pick(payload.and_then(|p| p.title.as_ref()), &defaults.default_title),
        body: pick(payload.and_then(|p| p.body.as_ref()), &defaults.default_body),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub id: String,
    pub label: String,
}

/// What gets handed to the OS notification surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub tag: String,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
}

pub fn build_request(
    resolved: ResolvedNotification,
    config: &NotificationConfig,
) -> NotificationRequest {
    NotificationRequest {
        title: resolved.title,
        body: resolved.body,
        icon: config.icon.clone(),
        tag: config.tag.clone(),
        require_interaction: true,
        actions: vec![
            NotificationAction {
                id: OPEN_ACTION.to_string(),
                label: config.open_label.clone(),
            },
            NotificationAction {
                id: CLOSE_ACTION.to_string(),
                label: config.close_label.clone(),
            },
        ],
    }
}

/// A user interaction with a delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub tag: String,
    pub action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    Open,
    Close,
    /// Click on the notification body, no button chosen.
    Body,
}

impl ClickAction {
    pub fn from_id(action: Option<&str>) -> Option<Self> {
        match action.map(str::trim) {
            None | Some("") | Some("default") => Some(Self::Body),
            Some(OPEN_ACTION) => Some(Self::Open),
            Some(CLOSE_ACTION) => Some(Self::Close),
            Some(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    OpenedRoot,
    Closed,
    Ignored,
}

pub type ClickHandler = Box<dyn FnOnce(ClickEvent) + Send + 'static>;

/// OS-facing side of the dispatcher.
pub trait NotificationSurface: Send + Sync {
    /// Displays `request`, replacing any notification with the same tag.
    /// `on_click` runs at most once, from whatever thread the platform
    /// reports the interaction on.
    fn show(&self, request: &NotificationRequest, on_click: ClickHandler) -> Result<(), AppError>;

    fn dismiss(&self, tag: &str) -> Result<(), AppError>;
}

/// Brings up the application root view. Repeated calls while the root is
/// already open are no-ops.
pub trait RootLauncher: Send + Sync {
    fn open_root(&self) -> Result<(), AppError>;
}

pub struct NoopSurface;

impl NotificationSurface for NoopSurface {
    fn show(&self, request: &NotificationRequest, _on_click: ClickHandler) -> Result<(), AppError> {
        tracing::debug!(tag = %request.tag, "notifications disabled, skipping display");
        Ok(())
    }

    fn dismiss(&self, _tag: &str) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct NotificationDispatcher {
    config: NotificationConfig,
    surface: Box<dyn NotificationSurface>,
    launcher: Box<dyn RootLauncher>,
}

impl NotificationDispatcher {
    pub fn new(
        config: NotificationConfig,
        surface: Box<dyn NotificationSurface>,
        launcher: Box<dyn RootLauncher>,
    ) -> Self {
        Self {
            config,
            surface,
            launcher,
        }
    }

    /// Resolves the payload and asks the surface to show it. A display
    /// failure is returned as-is; nothing is retried.
    pub fn deliver(
        &self,
        event: &PushEvent,
        on_click: ClickHandler,
    ) -> Result<NotificationRequest, AppError> {
        let resolved = resolve_payload(event.notification.as_ref(), &self.config);
        let request = build_request(resolved, &self.config);

        self.surface
            .show(&request, on_click)
            .map_err(|err| match err {
                AppError::Notification(message) => AppError::Notification(message),
                other => AppError::notification(other.message().to_string()),
            })?;

        tracing::info!(tag = %request.tag, title = %request.title, "notification delivered");
        Ok(request)
    }

    /// Dismisses first, then routes. Dismissal failures are logged and do
    /// not stop routing.
    pub fn handle_click(&self, event: &ClickEvent) -> Result<ClickOutcome, AppError> {
        if let Err(err) = self.surface.dismiss(&event.tag) {
            tracing::warn!(tag = %event.tag, error = %err, "failed to dismiss notification");
        }

        match ClickAction::from_id(event.action.as_deref()) {
            Some(ClickAction::Open | ClickAction::Body) => {
                self.launcher.open_root()?;
                tracing::info!(tag = %event.tag, "notification opened application root");
                Ok(ClickOutcome::OpenedRoot)
            }
            Some(ClickAction::Close) => Ok(ClickOutcome::Closed),
            None => {
                tracing::warn!(action = ?event.action, "unknown notification action");
                Ok(ClickOutcome::Ignored)
            }
        }
    }
}

pub fn surface_from_env() -> Result<Box<dyn NotificationSurface>, AppError> {
    if std::env::var("REWARDS_DISABLE_NOTIFICATIONS").is_ok() {
        return Ok(Box::new(NoopSurface));
    }

    match platform_surface() {
        Ok(surface) => Ok(surface),
        Err(err) => match err {
            AppError::InvalidData(_) => Ok(Box::new(NoopSurface)),
            other => Err(other),
        },
    }
}

#[cfg(target_os = "linux")]
pub fn platform_surface() -> Result<Box<dyn NotificationSurface>, AppError> {
    Ok(Box::new(LinuxSurface::new()))
}

#[cfg(windows)]
pub fn platform_surface() -> Result<Box<dyn NotificationSurface>, AppError> {
    Ok(Box::new(WindowsSurface))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_surface() -> Result<Box<dyn NotificationSurface>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
