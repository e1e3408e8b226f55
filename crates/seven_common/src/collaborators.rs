//! Interfaces to the components the dispatcher calls but does not own.
//!
//! Memory, mood, web lookup and window discovery live outside this crate.
//! Each gets a narrow trait here plus a small local implementation that
//! keeps the pipeline usable on its own (the console front-end and the
//! tests both run against these).

use crate::session::lock;
use anyhow::Result;
use std::sync::Mutex;

/// Persistent fact and conversation storage
pub trait FactStore: Send + Sync {
    fn store_fact(&self, text: &str, category: &str, speaker_id: &str) -> Result<()>;
    fn store_conversation(&self, user_text: &str, assistant_text: &str, speaker_id: &str) -> Result<()>;
}

/// Similarity search over stored memories
pub trait MemorySearch: Send + Sync {
    /// Formatted context block, or `None` when nothing relevant is stored
    fn search(&self, query: &str, speaker_id: &str) -> Result<Option<String>>;
}

/// Decides whether an utterance carries a storable fact and stores it
pub trait FactExtractor: Send + Sync {
    fn extract_and_store(&self, text: &str, speaker_id: &str) -> Result<bool>;
}

/// Affect tracker
pub trait Mood: Send + Sync {
    fn analyze(&self, text: &str);
    fn style_directive(&self) -> String;
    fn on_command_result(&self, success: bool);
}

/// Judges whether a question needs live web data
pub trait WebNeedClassifier: Send + Sync {
    /// Returns the decision and the query to send
    fn needs_search(&self, text: &str) -> (bool, String);
}

/// Web lookup returning a formatted context block
pub trait WebFetcher: Send + Sync {
    fn search(&self, query: &str) -> Result<String>;
    fn news(&self, query: &str) -> Result<String>;
}

/// Finds an open window by (partial) name
pub trait WindowLocator: Send + Sync {
    /// Title of the matching window
    fn find(&self, name: &str) -> Option<String>;
}

/// A stored fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub text: String,
    pub category: String,
    pub speaker_id: String,
}

/// Words too common to make two texts related
const STOPWORDS: &[&str] = &[
    "what", "whats", "which", "who", "when", "where", "does", "that", "this", "with", "have",
    "your", "about", "there", "they", "them", "from", "tell", "know",
];

/// In-process memory: facts and conversations kept in vectors.
///
/// Search matches facts of the same speaker that share a content word
/// (four letters or more) with the query. Extraction stores first-person
/// statements; questions are never stored.
#[derive(Debug, Default)]
pub struct InMemoryMemory {
    facts: Mutex<Vec<Fact>>,
    conversations: Mutex<Vec<(String, String, String)>>,
    fact_writes: Mutex<usize>,
}

impl InMemoryMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facts(&self) -> Vec<Fact> {
        lock(&self.facts).clone()
    }

    /// Number of `store_fact` calls, duplicates included
    pub fn fact_writes(&self) -> usize {
        *lock(&self.fact_writes)
    }

    /// Stored `(user, assistant, speaker)` exchanges
    pub fn conversations(&self) -> Vec<(String, String, String)> {
        lock(&self.conversations).clone()
    }

    fn content_words(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 4 && !STOPWORDS.contains(w))
            .map(str::to_string)
            .collect()
    }
}

impl FactStore for InMemoryMemory {
    fn store_fact(&self, text: &str, category: &str, speaker_id: &str) -> Result<()> {
        *lock(&self.fact_writes) += 1;
        lock(&self.facts).push(Fact {
            text: text.to_string(),
            category: category.to_string(),
            speaker_id: speaker_id.to_string(),
        });
        Ok(())
    }

    fn store_conversation(&self, user_text: &str, assistant_text: &str, speaker_id: &str) -> Result<()> {
        lock(&self.conversations).push((
            user_text.to_string(),
            assistant_text.to_string(),
            speaker_id.to_string(),
        ));
        Ok(())
    }
}

impl MemorySearch for InMemoryMemory {
    fn search(&self, query: &str, speaker_id: &str) -> Result<Option<String>> {
        let words = Self::content_words(query);
        if words.is_empty() {
            return Ok(None);
        }
        let facts = lock(&self.facts);
        let hits: Vec<&str> = facts
            .iter()
            .filter(|f| f.speaker_id == speaker_id)
            .filter(|f| {
                let fact_words = Self::content_words(&f.text);
                words.iter().any(|w| fact_words.contains(w))
            })
            .map(|f| f.text.as_str())
            .collect();
        if hits.is_empty() {
            return Ok(None);
        }
        let lines: Vec<String> = hits.iter().map(|h| format!("- {}", h)).collect();
        Ok(Some(format!("RECALLED MEMORIES:\n{}", lines.join("\n"))))
    }
}

impl FactExtractor for InMemoryMemory {
    fn extract_and_store(&self, text: &str, speaker_id: &str) -> Result<bool> {
        let lower = text.trim().to_lowercase();
        if lower.ends_with('?') {
            return Ok(false);
        }
        let statement = ["i ", "i'm ", "im ", "my "].iter().any(|p| lower.starts_with(p));
        if !statement || lower.split_whitespace().count() < 3 {
            return Ok(false);
        }
        self.store_fact(text.trim(), "personal", speaker_id)?;
        Ok(true)
    }
}

/// Mood that never changes
#[derive(Debug, Default)]
pub struct NeutralMood {
    results: Mutex<Vec<bool>>,
    analyzed: Mutex<usize>,
}

impl NeutralMood {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command outcomes reported so far
    pub fn results(&self) -> Vec<bool> {
        lock(&self.results).clone()
    }

    pub fn analyzed(&self) -> usize {
        *lock(&self.analyzed)
    }
}

impl Mood for NeutralMood {
    fn analyze(&self, _text: &str) {
        *lock(&self.analyzed) += 1;
    }

    fn style_directive(&self) -> String {
        "Be calm, direct and friendly.".to_string()
    }

    fn on_command_result(&self, success: bool) {
        lock(&self.results).push(success);
    }
}

/// Web fetcher for offline use; every lookup comes back empty
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineWeb;

impl WebFetcher for OfflineWeb {
    fn search(&self, _query: &str) -> Result<String> {
        Ok(String::new())
    }

    fn news(&self, _query: &str) -> Result<String> {
        Ok(String::new())
    }
}

/// Locator that treats every name as an open window
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyWindow;

impl WindowLocator for AnyWindow {
    fn find(&self, name: &str) -> Option<String> {
        Some(name.to_string())
    }
}

/// Locator over a fixed list of window titles, matched case-insensitively
/// by substring
#[derive(Debug, Default, Clone)]
pub struct KnownWindows {
    titles: Vec<String>,
}

impl KnownWindows {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }
}

impl WindowLocator for KnownWindows {
    fn find(&self, name: &str) -> Option<String> {
        let needle = name.to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.titles
            .iter()
            .find(|t| t.to_lowercase().contains(&needle))
            .cloned()
    }
}
