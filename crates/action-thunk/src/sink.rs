// sink.rs — Places notifications can go.
//
// A thunk dispatches into one `Dispatch`. The types here fill that slot
// when there is no store, or sit beside one:
// - ActionRecorder keeps every notification in memory (mock-store style)
// - JsonlSink appends notifications to a JSONL file
// - NotificationDispatcher fans a notification out to several sinks
//
// Sink errors are logged and never reach the thunk: a broken log file must
// not change the lifecycle of the work being observed.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::Dispatch;
use crate::error::ThunkError;
use crate::notification::Notification;

/// A fallible receiver of notifications.
pub trait NotificationSink: Send + Sync {
    fn send(&self, notification: &Notification) -> Result<(), ThunkError>;
}

/// One line of a JSONL notification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedNotification {
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub notification: Notification,
}

/// Appends notifications as JSONL to a file.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every logged notification, oldest first. Blank lines are
    /// skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<LoggedNotification>, ThunkError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ThunkError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(ThunkError::from))
            .collect()
    }
}

impl NotificationSink for JsonlSink {
    fn send(&self, notification: &Notification) -> Result<(), ThunkError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ThunkError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| ThunkError::IoError {
                path: self.path.display().to_string(),
                source,
            })?;

        let line = LoggedNotification {
            recorded_at: Utc::now(),
            notification: notification.clone(),
        };
        let json = serde_json::to_string(&line)?;
        writeln!(file, "{}", json).map_err(|source| ThunkError::IoError {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}

/// Records every dispatched notification in memory.
///
/// Useful as the dispatcher in tests and for callers that inspect the
/// lifecycle after the fact.
#[derive(Debug, Default)]
pub struct ActionRecorder {
    actions: Mutex<Vec<Notification>>,
}

impl ActionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in dispatch order.
    pub fn actions(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// Just the identifiers, in dispatch order.
    pub fn types(&self) -> Vec<String> {
        self.lock().iter().map(|n| n.kind.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        // A panic while recording can't leave the Vec half-written.
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Dispatch for ActionRecorder {
    fn dispatch(&self, notification: Notification) {
        self.lock().push(notification);
    }
}

impl NotificationSink for ActionRecorder {
    fn send(&self, notification: &Notification) -> Result<(), ThunkError> {
        self.lock().push(notification.clone());
        Ok(())
    }
}

/// Dispatches notifications to multiple sinks.
///
/// Errors from individual sinks are logged (via tracing) but don't
/// prevent other sinks from receiving the notification.
#[derive(Default)]
pub struct NotificationDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    /// Add a sink and return self.
    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Dispatch for NotificationDispatcher {
    fn dispatch(&self, notification: Notification) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(&notification) {
                tracing::warn!(kind = %notification.kind, "notification sink error: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    use crate::context::ThunkContext;
    use crate::thunk::ActionThunk;

    #[test]
    fn recorder_keeps_dispatch_order() {
        let recorder = ActionRecorder::new();
        assert!(recorder.is_empty());
        recorder.dispatch(Notification::new("A"));
        recorder.dispatch(Notification::new("B"));
        assert_eq!(recorder.types(), vec!["A", "B"]);

        recorder.clear();
        assert_eq!(recorder.len(), 0);
    }

    #[test]
    fn jsonl_sink_appends_one_line_per_notification() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("actions.jsonl");
        let sink = JsonlSink::new(&path);

        sink.send(&Notification::new("FETCH_STARTED").with_payload(json!([])))
            .unwrap();
        sink.send(&Notification::new("FETCH_ENDED").with_payload(json!({ "elapsed": 1 })))
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"recorded_at\""));

        let logged = JsonlSink::read_all(&path).unwrap();
        assert_eq!(logged[0].notification.kind, "FETCH_STARTED");
        assert_eq!(logged[1].notification.elapsed_ms(), Some(1));
    }

    #[test]
    fn read_all_reports_missing_file() {
        let dir = tempdir().unwrap();
        let result = JsonlSink::read_all(dir.path().join("absent.jsonl"));
        assert!(matches!(result, Err(ThunkError::IoError { .. })));
    }

    #[test]
    fn dispatcher_sends_to_all_sinks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sink.jsonl");

        let dispatcher = NotificationDispatcher::new()
            .with_sink(Box::new(JsonlSink::new(&path)))
            .with_sink(Box::new(ActionRecorder::new()));
        assert_eq!(dispatcher.sink_count(), 2);

        dispatcher.dispatch(Notification::new("PING"));
        assert!(fs::read_to_string(&path).unwrap().contains("PING"));
    }

    #[test]
    fn failing_sink_does_not_stop_the_others() {
        struct Broken;
        impl NotificationSink for Broken {
            fn send(&self, _: &Notification) -> Result<(), ThunkError> {
                Err(ThunkError::EmptyName)
            }
        }

        let dir = tempdir().unwrap();
        let path = dir.path().join("after.jsonl");
        let dispatcher = NotificationDispatcher::new()
            .with_sink(Box::new(Broken))
            .with_sink(Box::new(JsonlSink::new(&path)));

        dispatcher.dispatch(Notification::new("PING"));
        assert!(path.exists());
    }

    #[test]
    fn thunk_lifecycle_lands_in_jsonl_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let dispatcher = NotificationDispatcher::new().with_sink(Box::new(JsonlSink::new(&path)));
        let ctx = ThunkContext::stateless(Arc::new(dispatcher));

        let fetch =
            ActionThunk::new("FETCH", |_, _: &ThunkContext<()>| Ok(json!(3).into())).unwrap();
        let _ = fetch.bind([]).run(&ctx);

        let kinds: Vec<String> = JsonlSink::read_all(&path)
            .unwrap()
            .into_iter()
            .map(|l| l.notification.kind)
            .collect();
        assert_eq!(kinds, vec!["FETCH_STARTED", "FETCH_SUCCEEDED", "FETCH_ENDED"]);
    }
}
