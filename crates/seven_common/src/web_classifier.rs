//! Keyword classifier for live web lookups.
//!
//! Decides without a model call whether a question needs current data.
//! Rules are checked in order: never-search phrases veto, then explicit
//! search requests, then time-sensitive, real-time and news vocabulary.

use crate::collaborators::WebNeedClassifier;
use crate::lexicon::NEWS_WORDS;
use crate::normalize::{normalize, Utterance};

/// Words asking for current information
const TIME_SENSITIVE: &[&str] = &[
    "today", "right now", "currently", "latest", "recent", "this week", "this month",
    "this year", "yesterday", "tomorrow", "tonight",
];

/// Topics whose answer changes by the minute
const REALTIME_DATA: &[&str] = &[
    "weather", "temperature", "forecast", "price", "stock", "market", "crypto", "bitcoin",
    "score", "match", "game result", "who won", "trending", "viral", "popular right now",
];

/// Explicit requests; stripped from the query that gets sent
const SEARCH_TRIGGERS: &[&str] = &[
    "search for", "search about", "look up", "google", "find out", "search online",
    "what is the latest", "tell me about the latest", "whats happening",
];

/// Personal, identity and command phrasing; answered locally
const NO_SEARCH_TRIGGERS: &[&str] = &[
    "my name", "your name", "who are you", "who am i", "remember", "you know", "i told you",
    "my favorite", "open", "close", "launch", "start", "kill", "how are you", "thank you",
    "hello", "hi", "bye", "introduce yourself", "what can you do", "what you can do",
    "tell me what you", "your capabilities", "what are you", "you wont", "can you", "do you",
    "will you", "are you able",
];

/// Default web-need classifier
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordWebClassifier;

impl KeywordWebClassifier {
    fn classify(u: &Utterance) -> (bool, String) {
        if u.is_empty() || u.has_any_phrase(NO_SEARCH_TRIGGERS) {
            return (false, String::new());
        }

        if u.has_any_phrase(SEARCH_TRIGGERS) {
            let mut query = format!(" {} ", u.text);
            for trigger in SEARCH_TRIGGERS {
                query = query.replace(&format!(" {} ", trigger), " ");
            }
            let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
            if query.is_empty() {
                return (true, u.text.clone());
            }
            return (true, query);
        }

        if u.has_any_phrase(TIME_SENSITIVE) || u.has_any_phrase(REALTIME_DATA) || u.has_any_phrase(NEWS_WORDS) {
            return (true, u.text.clone());
        }

        (false, String::new())
    }
}

impl WebNeedClassifier for KeywordWebClassifier {
    fn needs_search(&self, text: &str) -> (bool, String) {
        Self::classify(&normalize(text))
    }
}

/// Whether a query should use the news variant of a lookup
pub fn wants_news(query: &str) -> bool {
    normalize(query).has_any_phrase(NEWS_WORDS)
}
