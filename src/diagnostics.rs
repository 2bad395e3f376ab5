//! Runtime diagnostics.
//!
//! [`DiagnosticLog`] keeps the most recent [`AppEvent`]s in a fixed-size
//! ring (no heap growth on a long-running controller).  Entries carry a
//! sequence number and a timestamp that never goes backwards, and the
//! whole ring can be dumped as JSON lines for the serial console.
//!
//! A panic hook logs the reason before the default handler resets the
//! board.

use heapless::Deque;
use serde::Serialize;

use crate::app::events::AppEvent;

/// Events kept before the oldest is overwritten.
pub const DIAGNOSTIC_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticEntry {
    /// Position in the overall event stream, starting at 0.
    pub seq: u32,
    /// Event time, forced non-decreasing across entries.
    pub at_ms: u64,
    pub event: AppEvent,
}

pub struct DiagnosticLog {
    entries: Deque<DiagnosticEntry, DIAGNOSTIC_CAPACITY>,
    next_seq: u32,
    last_ms: u64,
    dropped: u32,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticLog {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            next_seq: 0,
            last_ms: 0,
            dropped: 0,
        }
    }

    /// Append `event`, evicting the oldest entry when full.
    pub fn record(&mut self, event: &AppEvent) {
        self.last_ms = self.last_ms.max(event.timestamp_ms());

        if self.entries.is_full() {
            self.entries.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }

        let entry = DiagnosticEntry {
            seq: self.next_seq,
            at_ms: self.last_ms,
            event: event.clone(),
        };
        // Cannot fail: a slot was freed above.
        let _ = self.entries.push_back(entry);
        self.next_seq = self.next_seq.wrapping_add(1);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted because the ring was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Latest timestamp recorded.
    pub fn last_ms(&self) -> u64 {
        self.last_ms
    }

    /// One JSON object per line, oldest first.
    pub fn write_json_lines(&self, out: &mut impl core::fmt::Write) -> core::fmt::Result {
        for entry in self.entries.iter() {
            let line = serde_json::to_string(entry).map_err(|_| core::fmt::Error)?;
            out.write_str(&line)?;
            out.write_char('\n')?;
        }
        Ok(())
    }

    pub fn dump_json_lines(&self) -> String {
        let mut out = String::new();
        // String sink: infallible.
        let _ = self.write_json_lines(&mut out);
        out
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook
// ───────────────────────────────────────────────────────────────

/// Log the panic reason and location before the default handler runs.
pub fn install_panic_handler() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };

        match info.location() {
            Some(loc) => log::error!("PANIC: {} at {}:{}", reason, loc.file(), loc.line()),
            None => log::error!("PANIC: {}", reason),
        }
        default_hook(info);
    }));
}
