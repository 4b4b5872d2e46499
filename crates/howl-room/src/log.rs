//! The room's append-only message log.

use howl_protocol::LogEntry;

/// Append-only log with periodic compaction.
///
/// Entries are addressed by absolute offset: `base` is the offset of the
/// first retained entry, so cursors held by log syncers stay valid across
/// compaction. When the retained length exceeds `cap`, the front half is
/// dropped.
#[derive(Debug)]
pub(crate) struct GameLog {
    entries: Vec<LogEntry>,
    base: u64,
    cap: usize,
}

impl GameLog {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            base: 0,
            cap,
        }
    }

    /// The offset one past the newest entry.
    pub(crate) fn end(&self) -> u64 {
        self.base + self.entries.len() as u64
    }

    pub(crate) fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
        if self.entries.len() > self.cap {
            let dropped = self.entries.len() / 2;
            self.entries.drain(..dropped);
            self.base += dropped as u64;
        }
    }

    /// Entries at or after `from`, clamped to what is still retained.
    /// Returns the offset to resume from.
    pub(crate) fn since(&self, from: u64) -> (u64, &[LogEntry]) {
        let start = from.clamp(self.base, self.end());
        let idx = (start - self.base) as usize;
        (self.end(), &self.entries[idx..])
    }
}
