//! Listen gate: decides whether an utterance reaches the dispatcher.
//!
//! Kill words end the session from any state. While listening, a short
//! pause phrase suspends the assistant; while suspended, everything is
//! ignored until a wake word is heard.

use seven_common::normalize;
use tracing::debug;

pub const WAKE_WORDS: &[&str] = &["wake up", "seven", "hey seven", "listen", "online", "resume"];

pub const PAUSE_WORDS: &[&str] = &[
    "not you",
    "hold it",
    "hold on",
    "just a moment",
    "wait",
    "pause",
    "stop listening",
    "sleep",
    "silence",
];

pub const KILL_WORDS: &[&str] = &["shut down", "shutdown", "kill system", "go to sleep", "terminate"];

/// Longest utterance still treated as a control phrase
const CONTROL_MAX_TOKENS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// Forward to the dispatcher
    Pass,
    /// Just went quiet
    Paused,
    /// Woke up from a pause
    Resumed,
    /// Heard while paused
    Ignored,
    /// End the session
    Shutdown,
}

#[derive(Debug, Default)]
pub struct ListenGate {
    paused: bool,
}

impl ListenGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn check(&mut self, raw: &str) -> GateEvent {
        let u = normalize(raw);
        let short = !u.is_empty() && u.len() <= CONTROL_MAX_TOKENS;

        let event = if short && u.has_any_phrase(KILL_WORDS) {
            GateEvent::Shutdown
        } else if self.paused {
            if u.has_any_phrase(WAKE_WORDS) {
                self.paused = false;
                GateEvent::Resumed
            } else {
                GateEvent::Ignored
            }
        } else if short && u.has_any_phrase(PAUSE_WORDS) {
            self.paused = true;
            GateEvent::Paused
        } else {
            GateEvent::Pass
        };

        if event != GateEvent::Pass {
            debug!(?event, "listen gate");
        }
        event
    }
}
