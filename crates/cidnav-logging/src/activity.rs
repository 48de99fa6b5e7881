//! User-facing activity log
//!
//! An append-only, timestamped trail of what the browser did: nodes created,
//! peers discovered, content fetched. Timestamps are the time elapsed since
//! the log was created, formatted `HH:MM:SS:CC`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::info;

/// Format an elapsed duration as `HH:MM:SS:CC`
///
/// Hours wrap at 24 and are always printed with two digits (`00:` for the
/// first hour). Centiseconds are truncated, not rounded.
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let hours = (millis / 3_600_000) % 24;
    let minutes = (millis / 60_000) % 60;
    let seconds = (millis / 1_000) % 60;
    let centis = (millis % 1_000) / 10;
    format!("{hours:02}:{minutes:02}:{seconds:02}:{centis:02}")
}

/// One line of the activity log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Time since the log was created
    pub elapsed: Duration,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", format_elapsed(self.elapsed), self.message)
    }
}

/// Receives every appended entry, e.g. to mirror it onto a display region
pub trait LogSink: Send + Sync {
    fn write_entry(&self, entry: &LogEntry);
}

/// Handle for removing a sink added with [`ActivityLog::add_sink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

struct Inner {
    entries: Vec<LogEntry>,
    sinks: Vec<(SinkId, Arc<dyn LogSink>)>,
    next_sink: u64,
}

/// Append-only activity log
///
/// Unbounded and in-memory; entries are lost with the process. Entries are
/// stamped, stored and delivered to sinks under one lock, so every sink sees
/// them in storage order. Sinks must not append to the log they observe.
pub struct ActivityLog {
    started: Instant,
    inner: Mutex<Inner>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    /// Create a log whose clock starts now
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    /// Create a log whose clock started at `started`
    pub fn started_at(started: Instant) -> Self {
        Self {
            started,
            inner: Mutex::new(Inner {
                entries: Vec::new(),
                sinks: Vec::new(),
                next_sink: 0,
            }),
        }
    }

    /// Mirror every subsequent entry to `sink`
    pub fn add_sink(&self, sink: Arc<dyn LogSink>) -> SinkId {
        let mut inner = self.inner.lock();
        let id = SinkId(inner.next_sink);
        inner.next_sink += 1;
        inner.sinks.push((id, sink));
        id
    }

    /// Stop mirroring to a sink; returns false if it was already gone
    pub fn remove_sink(&self, id: SinkId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.sinks.len();
        inner.sinks.retain(|(sink_id, _)| *sink_id != id);
        inner.sinks.len() != before
    }

    pub fn sink_count(&self) -> usize {
        self.inner.lock().sinks.len()
    }

    /// Append a message stamped with the current elapsed time
    pub fn append(&self, message: impl Into<String>) -> LogEntry {
        let mut inner = self.inner.lock();
        let entry = LogEntry {
            elapsed: self.started.elapsed(),
            message: message.into(),
        };

        info!(target: "cidnav::activity", elapsed = %format_elapsed(entry.elapsed), "{}", entry.message);

        inner.entries.push(entry.clone());
        for (_, sink) in &inner.sinks {
            sink.write_entry(&entry);
        }
        entry
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner.lock().entries.clone()
    }

    /// All entries formatted as display lines
    pub fn lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Number of entries whose message contains `needle`
    pub fn count_matching(&self, needle: &str) -> usize {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.message.contains(needle))
            .count()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00:00:00");
    }

    #[test]
    fn test_format_truncates_centiseconds() {
        assert_eq!(format_elapsed(Duration::from_millis(1_999)), "00:00:01:99");
        assert_eq!(format_elapsed(Duration::from_millis(9)), "00:00:00:00");
        assert_eq!(format_elapsed(Duration::from_millis(65_430)), "00:01:05:43");
    }

    #[test]
    fn test_format_hours() {
        let elapsed = Duration::from_secs(3 * 3600 + 2 * 60 + 1);
        assert_eq!(format_elapsed(elapsed), "03:02:01:00");

        let elapsed = Duration::from_secs(13 * 3600);
        assert_eq!(format_elapsed(elapsed), "13:00:00:00");
    }

    #[test]
    fn test_format_hours_wrap_at_day() {
        let elapsed = Duration::from_secs(25 * 3600);
        assert_eq!(format_elapsed(elapsed), "01:00:00:00");
    }

    #[test]
    fn test_entry_display() {
        let entry = LogEntry {
            elapsed: Duration::from_millis(1_250),
            message: "Created node instance".to_string(),
        };
        assert_eq!(entry.to_string(), "00:00:01:25 - Created node instance");
    }

    struct CollectingSink(Mutex<Vec<String>>);

    impl LogSink for CollectingSink {
        fn write_entry(&self, entry: &LogEntry) {
            self.0.lock().push(entry.message.clone());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_append_is_ordered_and_stamped() {
        let log = ActivityLog::new();
        let sink = Arc::new(CollectingSink(Mutex::new(Vec::new())));
        log.add_sink(sink.clone());

        log.append("first");
        tokio::time::advance(Duration::from_millis(1_500)).await;
        let second = log.append("second");

        assert_eq!(second.elapsed, Duration::from_millis(1_500));
        assert_eq!(log.len(), 2);
        assert_eq!(
            log.lines(),
            vec!["00:00:00:00 - first".to_string(), "00:00:01:50 - second".to_string()]
        );
        assert_eq!(*sink.0.lock(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(log.count_matching("sec"), 1);
    }

    #[test]
    fn test_removed_sink_stops_receiving() {
        let log = ActivityLog::new();
        let kept = Arc::new(CollectingSink(Mutex::new(Vec::new())));
        let dropped = Arc::new(CollectingSink(Mutex::new(Vec::new())));
        log.add_sink(kept.clone());
        let id = log.add_sink(dropped.clone());

        log.append("one");
        assert!(log.remove_sink(id));
        assert!(!log.remove_sink(id));
        log.append("two");

        assert_eq!(log.sink_count(), 1);
        assert_eq!(*kept.0.lock(), vec!["one".to_string(), "two".to_string()]);
        assert_eq!(*dropped.0.lock(), vec!["one".to_string()]);
    }

    #[test]
    fn test_concurrent_appends_reach_sinks_in_stored_order() {
        let log = Arc::new(ActivityLog::new());
        let sink = Arc::new(CollectingSink(Mutex::new(Vec::new())));
        log.add_sink(sink.clone());

        let writers: Vec<_> = (0..4)
            .map(|writer| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        log.append(format!("writer {writer} entry {i}"));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let stored: Vec<_> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(stored.len(), 200);
        assert_eq!(*sink.0.lock(), stored);
        assert!(log.entries().windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
    }
}
