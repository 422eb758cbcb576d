use crate::error::AppError;
use crate::notify::{ClickEvent, ClickHandler, NotificationRequest, NotificationSurface};
use notify_rust::{Notification, Timeout};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const CLOSED_SIGNAL: &str = "__closed";

/// Click handlers waiting for an interaction, one per tag. Showing a new
/// notification under a tag drops the previous handler, so a waiter left
/// behind by a replaced notification finds a newer generation and does
/// nothing.
#[derive(Default)]
struct PendingClicks {
    next_generation: u64,
    slots: HashMap<String, (u64, ClickHandler)>,
}

impl PendingClicks {
    fn register(&mut self, tag: &str, handler: ClickHandler) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.slots.insert(tag.to_string(), (generation, handler));
        generation
    }

    fn take(&mut self, tag: &str, generation: u64) -> Option<ClickHandler> {
        match self.slots.get(tag) {
            Some((current, _)) if *current == generation => {
                self.slots.remove(tag).map(|(_, handler)| handler)
            }
            _ => None,
        }
    }
}

#[derive(Default)]
struct TagRegistry {
    ids: HashMap<String, u32>,
    pending: PendingClicks,
}

/// Desktop notifications over the freedesktop D-Bus interface.
#[derive(Default)]
pub struct LinuxSurface {
    registry: Arc<Mutex<TagRegistry>>,
}

impl LinuxSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSurface for LinuxSurface {
    fn show(&self, request: &NotificationRequest, on_click: ClickHandler) -> Result<(), AppError> {
        let mut notification = Notification::new();
        notification
            .appname("rewards")
            .summary(&request.title)
            .body(&request.body)
            .icon(&request.icon);
        if request.require_interaction {
            notification.timeout(Timeout::Never);
        }
        for action in &request.actions {
            notification.action(&action.id, &action.label);
        }

        let mut registry = self
            .registry
            .lock()
            .map_err(|_| AppError::io("notification registry lock poisoned"))?;
        if let Some(id) = registry.ids.get(&request.tag) {
            notification.id(*id);
        }

        let handle = notification
            .show()
            .map_err(|err| AppError::notification(err.to_string()))?;
        registry.ids.insert(request.tag.clone(), handle.id());
        let generation = registry.pending.register(&request.tag, on_click);
        drop(registry);

        let tag = request.tag.clone();
        let registry = Arc::clone(&self.registry);
        std::thread::spawn(move || {
            handle.wait_for_action(|selected| {
                let handler = registry
                    .lock()
                    .ok()
                    .and_then(|mut registry| registry.pending.take(&tag, generation));
                // A closed notification just releases its handler.
                if let Some(on_click) = handler
                    && selected != CLOSED_SIGNAL
                {
                    on_click(ClickEvent {
                        tag,
                        action: Some(selected.to_string()),
                    });
                }
            });
        });

        Ok(())
    }

    fn dismiss(&self, tag: &str) -> Result<(), AppError> {
        // Non-resident notifications are closed by the server as soon as an
        // action is invoked; only the replacement id needs forgetting.
        self.registry
            .lock()
            .map_err(|_| AppError::io("notification registry lock poisoned"))?
            .ids
            .remove(tag);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PendingClicks;
    use crate::notify::{ClickEvent, ClickHandler};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recording(log: &Log, name: &'static str) -> ClickHandler {
        let log = Arc::clone(log);
        Box::new(move |_: ClickEvent| log.lock().unwrap().push(name))
    }

    fn click() -> ClickEvent {
        ClickEvent {
            tag: "rewards-announcement".to_string(),
            action: Some("open".to_string()),
        }
    }

    #[test]
    fn replaced_notification_handler_never_fires() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pending = PendingClicks::default();

        let first = pending.register("rewards-announcement", recording(&log, "first"));
        let second = pending.register("rewards-announcement", recording(&log, "second"));

        assert!(pending.take("rewards-announcement", first).is_none());
        let handler = pending.take("rewards-announcement", second).unwrap();
        handler(click());

        assert_eq!(*log.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn replacing_releases_previous_handler() {
        let holder = Arc::new(());
        let mut pending = PendingClicks::default();

        let captured = Arc::clone(&holder);
        pending.register(
            "rewards-announcement",
            Box::new(move |_: ClickEvent| drop(captured)),
        );
        assert_eq!(Arc::strong_count(&holder), 2);

        pending.register("rewards-announcement", Box::new(|_: ClickEvent| {}));
        assert_eq!(Arc::strong_count(&holder), 1);
    }

    #[test]
    fn handler_is_taken_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pending = PendingClicks::default();

        let generation = pending.register("rewards-announcement", recording(&log, "only"));

        assert!(pending.take("rewards-announcement", generation).is_some());
        assert!(pending.take("rewards-announcement", generation).is_none());
    }

    #[test]
    fn tags_do_not_share_handlers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pending = PendingClicks::default();

        let promo = pending.register("promo", recording(&log, "promo"));
        let news = pending.register("news", recording(&log, "news"));

        pending.take("promo", promo).unwrap()(click());
        pending.take("news", news).unwrap()(click());

        assert_eq!(*log.lock().unwrap(), vec!["promo", "news"]);
    }
}
