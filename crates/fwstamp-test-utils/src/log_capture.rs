//! Captured log output for assertions.
//!
//! [`LogCapture`] is a `tracing` layer that records each event's level and
//! message. Install it with [`LogCapture::install`] for the current thread
//! and query the returned [`LogReader`] once the code under test has run.

use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// A single captured event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
}

/// A `tracing` layer that records events into a shared list.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reader(&self) -> LogReader {
        LogReader {
            events: Arc::clone(&self.events),
        }
    }

    /// Capture every event on this thread until the guard is dropped.
    pub fn install() -> (LogReader, DefaultGuard) {
        let capture = Self::new();
        let reader = capture.reader();
        let guard = tracing_subscriber::registry().with(capture).set_default();
        (reader, guard)
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.message,
            });
        }
    }
}

/// Read handle for captured events.
#[derive(Debug, Clone)]
pub struct LogReader {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogReader {
    /// Snapshot of everything captured so far.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Whether any event message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.events().iter().any(|e| e.message.contains(needle))
    }

    /// Number of events at `level` whose message contains `needle`.
    pub fn count(&self, level: Level, needle: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.level == level && e.message.contains(needle))
            .count()
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_level_and_message() {
        let (logs, _guard) = LogCapture::install();

        tracing::info!("version_auto.h already up to date");
        tracing::warn!(tag = "v1.0.1", "Failed to push tag");

        let events = logs.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level, Level::INFO);
        assert!(logs.contains("already up to date"));
        assert_eq!(logs.count(Level::WARN, "push"), 1);
    }

    #[test]
    fn test_reader_starts_empty() {
        let capture = LogCapture::new();
        assert!(capture.reader().events().is_empty());
    }
}
