use crate::error::AppError;
use crate::notify::{ClickEvent, NotificationDispatcher, PushEvent};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

#[derive(Debug)]
pub enum DispatcherEvent {
    Push(PushEvent),
    Click(ClickEvent),
    /// Stop accepting pushes; keep routing clicks for notifications that
    /// are still on screen.
    Drain,
    Shutdown,
}

/// Runs a [`NotificationDispatcher`] on its own thread so deliveries and
/// clicks are handled without any foreground window.
pub struct DispatcherWorker {
    sender: Sender<DispatcherEvent>,
    handle: JoinHandle<()>,
}

impl DispatcherWorker {
    pub fn spawn(dispatcher: NotificationDispatcher) -> Result<Self, AppError> {
        let (sender, receiver) = mpsc::channel();
        let forwarder = sender.clone();
        let handle = thread::Builder::new()
            .name("notification-dispatcher".to_string())
            .spawn(move || run(dispatcher, receiver, Some(forwarder)))
            .map_err(|err| AppError::io(err.to_string()))?;

        Ok(Self { sender, handle })
    }

    pub fn push(&self, event: PushEvent) -> Result<(), AppError> {
        self.send(DispatcherEvent::Push(event))
    }

    pub fn click(&self, event: ClickEvent) -> Result<(), AppError> {
        self.send(DispatcherEvent::Click(event))
    }

    /// Waits until every delivered notification has been acted on (or its
    /// click handler dropped by the surface), then stops the worker.
    pub fn drain(self) -> Result<(), AppError> {
        self.send(DispatcherEvent::Drain)?;
        drop(self.sender);
        self.handle
            .join()
            .map_err(|_| AppError::io("notification dispatcher panicked"))
    }

    /// Stops immediately; clicks arriving later are dropped.
    pub fn shutdown(self) -> Result<(), AppError> {
        self.send(DispatcherEvent::Shutdown)?;
        self.handle
            .join()
            .map_err(|_| AppError::io("notification dispatcher panicked"))
    }

    fn send(&self, event: DispatcherEvent) -> Result<(), AppError> {
        self.sender
            .send(event)
            .map_err(|_| AppError::io("notification dispatcher is not running"))
    }
}

fn run(
    dispatcher: NotificationDispatcher,
    receiver: Receiver<DispatcherEvent>,
    mut forwarder: Option<Sender<DispatcherEvent>>,
) {
    for event in receiver {
        match event {
            DispatcherEvent::Push(push) => {
                let Some(sender) = forwarder.clone() else {
                    tracing::warn!("dispatcher draining, push event dropped");
                    continue;
                };
                let on_click = Box::new(move |click: ClickEvent| {
                    let _ = sender.send(DispatcherEvent::Click(click));
                });
                if let Err(err) = dispatcher.deliver(&push, on_click) {
                    tracing::warn!(error = %err, "notification delivery failed");
                }
            }
            DispatcherEvent::Click(click) => {
                if let Err(err) = dispatcher.handle_click(&click) {
                    tracing::warn!(error = %err, "notification click routing failed");
                }
            }
            DispatcherEvent::Drain => forwarder = None,
            DispatcherEvent::Shutdown => break,
        }
    }

    tracing::debug!("notification dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::DispatcherWorker;
    use crate::config::NotificationConfig;
    use crate::notify::testing::{Effect, EffectLog, RecordingLauncher, RecordingSurface, click};
    use crate::notify::{ClickHandler, NotificationDispatcher, PushEvent};
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn worker(log: &EffectLog) -> (DispatcherWorker, Arc<Mutex<Vec<ClickHandler>>>) {
        let surface = RecordingSurface::new(log);
        let handlers = Arc::clone(&surface.handlers);
        let dispatcher = NotificationDispatcher::new(
            NotificationConfig::default(),
            Box::new(surface),
            Box::new(RecordingLauncher { log: log.clone() }),
        );
        (DispatcherWorker::spawn(dispatcher).unwrap(), handlers)
    }

    #[test]
    fn click_from_surface_is_routed_on_worker_thread() {
        let log = EffectLog::default();
        let (worker, handlers) = worker(&log);

        worker.push(PushEvent::default()).unwrap();
        let surface_thread = thread::spawn({
            let handlers = Arc::clone(&handlers);
            move || loop {
                let handler = handlers.lock().unwrap().pop();
                if let Some(handler) = handler {
                    handler(click("rewards-announcement", Some("open")));
                    break;
                }
                thread::yield_now();
            }
        });
        surface_thread.join().unwrap();
        worker.drain().unwrap();

        assert_eq!(
            log.snapshot(),
            vec![
                Effect::Shown("rewards-announcement".into()),
                Effect::Dismissed("rewards-announcement".into()),
                Effect::RootOpened,
            ]
        );
    }

    #[test]
    fn drain_waits_for_outstanding_handlers_to_drop() {
        let log = EffectLog::default();
        let (worker, handlers) = worker(&log);

        worker.push(PushEvent::default()).unwrap();
        let dropper = thread::spawn({
            let handlers = Arc::clone(&handlers);
            move || loop {
                let mut guard = handlers.lock().unwrap();
                if !guard.is_empty() {
                    guard.clear();
                    break;
                }
                drop(guard);
                thread::yield_now();
            }
        });
        dropper.join().unwrap();
        worker.drain().unwrap();

        assert_eq!(
            log.snapshot(),
            vec![Effect::Shown("rewards-announcement".into())]
        );
    }

    #[test]
    fn shutdown_does_not_wait_for_clicks() {
        let log = EffectLog::default();
        let (worker, handlers) = worker(&log);

        worker.push(PushEvent::default()).unwrap();
        worker.shutdown().unwrap();

        assert_eq!(
            log.snapshot(),
            vec![Effect::Shown("rewards-announcement".into())]
        );
        assert_eq!(handlers.lock().unwrap().len(), 1);
    }

    #[test]
    fn direct_click_is_routed() {
        let log = EffectLog::default();
        let (worker, _handlers) = worker(&log);

        worker.click(click("rewards-announcement", Some("close"))).unwrap();
        worker.shutdown().unwrap();

        assert_eq!(
            log.snapshot(),
            vec![Effect::Dismissed("rewards-announcement".into())]
        );
    }
}
