//! Progress reporting for long-running pipelines.

use std::sync::Mutex;

/// Progress message emitted before resolution starts.
pub const RESOLVING: &str = "Resolving...";

/// Progress message emitted before the download starts.
pub const DOWNLOADING: &str = "Downloading...";

/// Receiver of human-readable progress text.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Sink that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _message: &str) {}
}

/// Sink that keeps every message in order.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far.
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |message: &str| seen.lock().unwrap().push(message.to_string());
        sink.report(RESOLVING);
        sink.report(DOWNLOADING);
        assert_eq!(*seen.lock().unwrap(), vec![RESOLVING, DOWNLOADING]);
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingProgress::new();
        sink.report("a");
        sink.report("b");
        NoProgress.report("ignored");
        assert_eq!(sink.events(), vec!["a", "b"]);
    }
}
