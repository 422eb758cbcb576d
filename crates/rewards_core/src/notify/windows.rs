use crate::error::AppError;
use crate::notify::{ClickEvent, ClickHandler, NotificationRequest, NotificationSurface};
use std::sync::Mutex;
use tauri_winrt_notification::{Duration, Scenario, Toast};

pub struct WindowsSurface;

impl NotificationSurface for WindowsSurface {
    fn show(&self, request: &NotificationRequest, on_click: ClickHandler) -> Result<(), AppError> {
        let mut toast = Toast::new(Toast::POWERSHELL_APP_ID)
            .title(&request.title)
            .text1(&request.body);
        if request.require_interaction {
            // Reminder toasts stay on screen until the user picks an action.
            toast = toast.duration(Duration::Long).scenario(Scenario::Reminder);
        }
        for action in &request.actions {
            toast = toast.add_button(&action.label, &action.id);
        }

        let tag = request.tag.clone();
        let handler = Mutex::new(Some(on_click));
        toast
            .on_activated(move |args| {
                let pending = handler.lock().ok().and_then(|mut slot| slot.take());
                if let Some(on_click) = pending {
                    on_click(ClickEvent {
                        tag: tag.clone(),
                        action: args.filter(|value| !value.trim().is_empty()),
                    });
                }
                Ok(())
            })
            .show()
            .map_err(|err| AppError::notification(err.to_string()))?;
        Ok(())
    }

    fn dismiss(&self, _tag: &str) -> Result<(), AppError> {
        // Activated toasts leave the screen on their own.
        Ok(())
    }
}
