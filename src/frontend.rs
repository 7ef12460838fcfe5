//! The boundary between the engine and whatever chat/console/network layer
//! is actually delivering commands and receiving narration. The core never
//! depends on a concrete transport; it only ever talks to a `ResponseSink`.

use std::sync::Mutex;

use tracing::warn;

/// A single sink for outbound response lines, already grouped and prefixed
/// by the controller. Implementations decide where a line actually goes
/// (stdout, a chat connection, a UDP reply socket that has none).
///
/// `send` returns whether the line was delivered; a `false` return is logged
/// by the caller but never halts dispatch — a dropped narration line is not
/// a reason to stop a player's game.
pub trait ResponseSink: Send + Sync {
    fn send(&self, line: &str) -> bool;
}

/// Sends every line to stdout. What `main.rs` wires up by default and what
/// the local CLI commander shares with the event timer's own narration.
pub struct StdoutSink;

impl ResponseSink for StdoutSink {
    fn send(&self, line: &str) -> bool {
        println!("{line}");
        true
    }
}

/// Buffers every line in memory instead of writing anywhere, for tests that
/// need to assert on what the controller would have said.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_lines(&self) -> Vec<String> {
        std::mem::take(&mut self.lines.lock().expect("recording sink mutex poisoned"))
    }
}

impl ResponseSink for RecordingSink {
    fn send(&self, line: &str) -> bool {
        self.lines
            .lock()
            .expect("recording sink mutex poisoned")
            .push(line.to_string());
        true
    }
}

/// Logs a dropped response line. Kept as a free function since both
/// commanders and the controller's own timer-driven sends go through it.
pub fn log_undelivered(line: &str) {
    warn!(line, "response sink reported delivery failure");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_captures_and_drains_lines() {
        let sink = RecordingSink::new();
        sink.send("@alice: hello");
        sink.send("@alice: world");
        assert_eq!(sink.take_lines(), vec!["@alice: hello", "@alice: world"]);
        assert!(sink.take_lines().is_empty());
    }
}
