use crate::models::RecencyEntry;
use std::collections::VecDeque;
use std::sync::Mutex;

/// How many entries the activity feed retains and serves
pub const RECENT_CAPACITY: usize = 10;

/// Bounded ring of the most recent accepted uploads. Process-local and
/// volatile: lost on restart, never authoritative. Owned by the app state
/// and passed to handlers explicitly.
pub struct RecentUploads {
    entries: Mutex<VecDeque<RecencyEntry>>,
}

impl Default for RecentUploads {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentUploads {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(RECENT_CAPACITY)),
        }
    }

    /// Appends one entry, evicting the oldest once the ring is full.
    /// Append order reflects upload completion order.
    pub fn record(&self, entry: RecencyEntry) {
        let mut entries = self.entries.lock().expect("recency lock poisoned");
        if entries.len() == RECENT_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The retained trailing window, oldest first
    pub fn snapshot(&self) -> Vec<RecencyEntry> {
        let entries = self.entries.lock().expect("recency lock poisoned");
        entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(filename: &str) -> RecencyEntry {
        RecencyEntry {
            filename: filename.to_string(),
            folder: String::new(),
            url: format!("http://localhost:3000/uploads/{}", filename),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_keeps_insertion_order() {
        let recent = RecentUploads::new();
        recent.record(entry("a"));
        recent.record(entry("b"));
        recent.record(entry("c"));

        let names: Vec<_> = recent.snapshot().iter().map(|e| e.filename.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ring_is_bounded_to_capacity() {
        let recent = RecentUploads::new();
        for i in 0..25 {
            recent.record(entry(&format!("file-{i}")));
        }

        let snapshot = recent.snapshot();
        assert_eq!(snapshot.len(), RECENT_CAPACITY);
        assert_eq!(snapshot.first().unwrap().filename, "file-15");
        assert_eq!(snapshot.last().unwrap().filename, "file-24");
    }

    #[test]
    fn test_concurrent_appends_do_not_lose_the_lock() {
        let recent = std::sync::Arc::new(RecentUploads::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let recent = recent.clone();
            handles.push(std::thread::spawn(move || {
                recent.record(entry(&format!("t-{i}")));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(recent.snapshot().len(), 8);
    }
}
