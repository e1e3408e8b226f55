//! Per-speaker conversational state.
//!
//! Each speaker gets a rolling history and a recent-question log, created
//! on first use and guarded by its own lock so independent speakers can be
//! served in parallel. The only cross-speaker state is the display-name
//! table and the last resolved device domain, each behind one mutex.

use crate::commands::device::DeviceDomain;
use seven_shared::UNIDENTIFIED_SPEAKER;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// Turns kept for the inference prompt
pub const HISTORY_CAP: usize = 4;

/// Normalized utterances kept for repetition detection
pub const RECENT_QUESTIONS_CAP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One line of conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Rolling state for one speaker
#[derive(Debug, Clone, Default)]
pub struct SpeakerSession {
    history: VecDeque<Turn>,
    recent_questions: VecDeque<String>,
}

impl SpeakerSession {
    pub fn history(&self) -> &VecDeque<Turn> {
        &self.history
    }

    pub fn recent_questions(&self) -> &VecDeque<String> {
        &self.recent_questions
    }

    /// Append a turn, evicting the oldest past the cap
    pub fn push_turn(&mut self, role: Role, text: impl Into<String>) {
        self.history.push_back(Turn {
            role,
            text: text.into(),
        });
        while self.history.len() > HISTORY_CAP {
            self.history.pop_front();
        }
    }

    /// Append a user line followed by the assistant's reply
    pub fn record_exchange(&mut self, user: &str, assistant: &str) {
        self.push_turn(Role::User, user);
        self.push_turn(Role::Assistant, assistant);
    }

    /// Log a normalized utterance, FIFO past the cap
    pub fn log_question(&mut self, text: &str) {
        self.recent_questions.push_back(text.to_string());
        while self.recent_questions.len() > RECENT_QUESTIONS_CAP {
            self.recent_questions.pop_front();
        }
    }

    /// How many logged entries equal this text
    pub fn times_asked(&self, text: &str) -> usize {
        self.recent_questions.iter().filter(|q| *q == text).count()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.recent_questions.clear();
    }
}

/// Session state service shared by every dispatch
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<Mutex<SpeakerSession>>>>,
    names: Mutex<HashMap<String, String>>,
    default_name: Mutex<Option<String>>,
    domain_context: Mutex<Option<DeviceDomain>>,
}

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl SessionStore {
    pub fn new(default_name: Option<String>) -> Self {
        Self {
            default_name: Mutex::new(default_name.filter(|n| !n.trim().is_empty())),
            ..Self::default()
        }
    }

    /// Handle to a speaker's session, created on first use
    pub fn session(&self, speaker: &str) -> Arc<Mutex<SpeakerSession>> {
        let mut sessions = lock(&self.sessions);
        sessions
            .entry(speaker.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SpeakerSession::default())))
            .clone()
    }

    /// Run a closure with exclusive access to a speaker's session
    pub fn with_session<R>(&self, speaker: &str, f: impl FnOnce(&mut SpeakerSession) -> R) -> R {
        let handle = self.session(speaker);
        let mut session = lock(&handle);
        f(&mut session)
    }

    /// Clear one speaker's session
    pub fn reset(&self, speaker: &str) {
        if let Some(handle) = lock(&self.sessions).get(speaker).cloned() {
            lock(&handle).clear();
        }
    }

    /// Drop every session
    pub fn reset_all(&self) {
        lock(&self.sessions).clear();
    }

    pub fn speaker_count(&self) -> usize {
        lock(&self.sessions).len()
    }

    /// Name the speaker goes by, if known
    pub fn display_name(&self, speaker: &str) -> Option<String> {
        if let Some(name) = lock(&self.names).get(speaker) {
            return Some(name.clone());
        }
        if speaker == UNIDENTIFIED_SPEAKER {
            return lock(&self.default_name).clone();
        }
        None
    }

    pub fn set_display_name(&self, speaker: &str, name: &str) {
        lock(&self.names).insert(speaker.to_string(), name.to_string());
        if speaker == UNIDENTIFIED_SPEAKER {
            *lock(&self.default_name) = Some(name.to_string());
        }
    }

    /// Last device domain resolved by any speaker
    pub fn domain_context(&self) -> Option<DeviceDomain> {
        *lock(&self.domain_context)
    }

    pub fn set_domain_context(&self, domain: DeviceDomain) {
        *lock(&self.domain_context) = Some(domain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_capped() {
        let mut s = SpeakerSession::default();
        for i in 0..10 {
            s.record_exchange(&format!("q{}", i), &format!("a{}", i));
        }
        assert_eq!(s.history().len(), HISTORY_CAP);
        assert_eq!(s.history().front().unwrap().text, "q8");
        assert_eq!(s.history().back().unwrap().role, Role::Assistant);
    }

    #[test]
    fn test_recent_questions_fifo() {
        let mut s = SpeakerSession::default();
        for i in 0..25 {
            s.log_question(&format!("question {}", i));
        }
        assert_eq!(s.recent_questions().len(), RECENT_QUESTIONS_CAP);
        assert_eq!(s.recent_questions().front().unwrap(), "question 15");
        assert_eq!(s.times_asked("question 3"), 0);
    }

    #[test]
    fn test_times_asked() {
        let mut s = SpeakerSession::default();
        s.log_question("who made you");
        s.log_question("who made you");
        assert_eq!(s.times_asked("who made you"), 2);
    }

    #[test]
    fn test_lazy_creation_and_reset() {
        let store = SessionStore::new(None);
        assert_eq!(store.speaker_count(), 0);
        store.with_session("alice", |s| s.log_question("hi"));
        assert_eq!(store.speaker_count(), 1);
        store.reset("alice");
        store.with_session("alice", |s| assert!(s.recent_questions().is_empty()));
        store.reset("nobody");
        store.reset_all();
        assert_eq!(store.speaker_count(), 0);
    }

    #[test]
    fn test_display_names() {
        let store = SessionStore::new(Some("Admin".to_string()));
        assert_eq!(store.display_name(UNIDENTIFIED_SPEAKER), Some("Admin".to_string()));
        assert_eq!(store.display_name("bob"), None);

        store.set_display_name("bob", "Bob");
        assert_eq!(store.display_name("bob"), Some("Bob".to_string()));

        store.set_display_name(UNIDENTIFIED_SPEAKER, "Mani");
        assert_eq!(store.display_name(UNIDENTIFIED_SPEAKER), Some("Mani".to_string()));
    }

    #[test]
    fn test_blank_default_name_ignored() {
        let store = SessionStore::new(Some("  ".to_string()));
        assert_eq!(store.display_name(UNIDENTIFIED_SPEAKER), None);
    }

    #[test]
    fn test_domain_context_overwritten() {
        let store = SessionStore::new(None);
        assert_eq!(store.domain_context(), None);
        store.set_domain_context(DeviceDomain::Volume);
        store.set_domain_context(DeviceDomain::Brightness);
        assert_eq!(store.domain_context(), Some(DeviceDomain::Brightness));
    }
}
