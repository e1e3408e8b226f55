//! Prompt assembly for the generative fallback.
//!
//! Layout, top to bottom: persona preamble, style directive, behavioral
//! rules, web results, recalled memories, the conversation log and a
//! trailing role marker for the assistant's turn. Memories come after web
//! results so they sit closer to the question and win on conflicts.

use crate::config::InferenceConfig;
use crate::lexicon::EXPLANATION_TRIGGERS;
use crate::normalize::Utterance;
use crate::session::{Role, Turn};

/// Longest history line carried into the prompt, in characters
const MAX_LINE_CHARS: usize = 400;

/// Output length class for one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Short,
    Medium,
    Long,
}

impl Budget {
    /// Pick a budget from the utterance shape
    pub fn choose(u: &Utterance, capability: bool, has_web: bool) -> Self {
        if capability || u.has_any_phrase(EXPLANATION_TRIGGERS) {
            Budget::Long
        } else if has_web {
            Budget::Medium
        } else {
            Budget::Short
        }
    }

    pub fn tokens(self, config: &InferenceConfig) -> u32 {
        match self {
            Budget::Short => config.short_budget,
            Budget::Medium => config.medium_budget,
            Budget::Long => config.long_budget,
        }
    }
}

/// Everything that goes into one prompt
#[derive(Debug, Clone, Default)]
pub struct PromptParts<'a> {
    pub persona: &'a str,
    pub creator: &'a str,
    pub speaker_name: Option<&'a str>,
    pub style: &'a str,
    pub web: Option<&'a str>,
    pub memory: Option<&'a str>,
    pub history: &'a [Turn],
    /// The user asked something close to an earlier question
    pub rephrase: bool,
    /// Current user line (or the capability instruction that replaced it)
    pub user_line: &'a str,
}

/// Sequences that end the assistant's turn
pub fn stop_sequences(persona: &str) -> Vec<String> {
    vec!["User:".to_string(), "System:".to_string(), format!("{}:", persona)]
}

fn rules(parts: &PromptParts) -> String {
    let mut rules = vec![
        "Answer in 1-2 short sentences unless the user asks you to explain or list something.".to_string(),
        "Never ask follow-up questions.".to_string(),
        "Never mention or explain the ### tag syntax.".to_string(),
        "Only output ###OPEN: app or ###CLOSE: app when the user's first word is Open, Close, Start, Kill or Launch. Output ###SEARCH: query only when the user asks you to search.".to_string(),
        "RECALLED MEMORIES are facts about the user. Use them, prefer them over web results, and never invent personal facts that are not there.".to_string(),
        "If WEB RESULTS are given, answer from them. If they don't contain the answer, say you couldn't find it.".to_string(),
        format!(
            "You run 100% locally on the user's PC. You were created by {}.",
            parts.creator
        ),
    ];
    if parts.rephrase {
        rules.push("The user asked something similar a moment ago. Phrase this answer differently.".to_string());
    }
    rules.iter().map(|r| format!("- {}", r)).collect::<Vec<_>>().join("\n")
}

fn clip(text: &str) -> String {
    match text.char_indices().nth(MAX_LINE_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Build the full prompt text
pub fn assemble(parts: &PromptParts) -> String {
    let mut out = String::new();

    out.push_str(&format!("You are {}, a personal voice assistant.", parts.persona));
    if let Some(name) = parts.speaker_name {
        out.push_str(&format!(" You are talking to {}.", name));
    }
    out.push('\n');
    if !parts.style.trim().is_empty() {
        out.push_str(&format!("STYLE: {}\n", parts.style.trim()));
    }
    out.push_str("RULES:\n");
    out.push_str(&rules(parts));
    out.push_str("\n\n");

    if let Some(web) = parts.web.filter(|w| !w.trim().is_empty()) {
        out.push_str("WEB RESULTS:\n");
        out.push_str(web.trim());
        out.push_str("\n\n");
    }
    if let Some(memory) = parts.memory.filter(|m| !m.trim().is_empty()) {
        out.push_str(memory.trim());
        out.push_str("\n\n");
    }

    out.push_str("LOG:\n");
    for turn in parts.history {
        let speaker = match turn.role {
            Role::User => "User",
            Role::Assistant => parts.persona,
        };
        out.push_str(&format!("{}: {}\n", speaker, clip(&turn.text)));
    }
    out.push_str(&format!("User: {}\n", parts.user_line.trim()));
    out.push_str(&format!("{}:", parts.persona));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn parts<'a>(history: &'a [Turn]) -> PromptParts<'a> {
        PromptParts {
            persona: "Seven",
            creator: "Mani",
            style: "Be calm.",
            history,
            user_line: "what is rust",
            ..PromptParts::default()
        }
    }

    #[test]
    fn test_budget_choice() {
        assert_eq!(Budget::choose(&normalize("explain black holes"), false, false), Budget::Long);
        assert_eq!(Budget::choose(&normalize("what can you do"), true, false), Budget::Long);
        assert_eq!(Budget::choose(&normalize("weather today"), false, true), Budget::Medium);
        assert_eq!(Budget::choose(&normalize("how are you"), false, false), Budget::Short);
        assert_eq!(Budget::Long.tokens(&InferenceConfig::default()), 160);
    }

    #[test]
    fn test_memory_follows_web() {
        let history = [];
        let mut p = parts(&history);
        p.web = Some("It is sunny.");
        p.memory = Some("RECALLED MEMORIES:\n- I live in Oslo");
        let prompt = assemble(&p);
        let web_at = prompt.find("WEB RESULTS").unwrap();
        let mem_at = prompt.find("RECALLED MEMORIES:\n").unwrap();
        assert!(web_at < mem_at);
        assert!(prompt.ends_with("User: what is rust\nSeven:"));
    }

    #[test]
    fn test_empty_blocks_skipped() {
        let history = [];
        let mut p = parts(&history);
        p.web = Some("   ");
        let prompt = assemble(&p);
        assert!(!prompt.contains("WEB RESULTS:"));
        assert!(prompt.contains("created by Mani"));
        assert!(!prompt.contains("Phrase this answer differently"));
    }

    #[test]
    fn test_history_and_rephrase() {
        let history = [
            Turn { role: Role::User, text: "hi".to_string() },
            Turn { role: Role::Assistant, text: "Hello.".to_string() },
        ];
        let mut p = parts(&history);
        p.rephrase = true;
        p.speaker_name = Some("Alice");
        let prompt = assemble(&p);
        assert!(prompt.contains("LOG:\nUser: hi\nSeven: Hello.\nUser: what is rust"));
        assert!(prompt.contains("talking to Alice"));
        assert!(prompt.contains("Phrase this answer differently"));
    }

    #[test]
    fn test_long_lines_clipped() {
        let long = "x".repeat(MAX_LINE_CHARS + 50);
        assert_eq!(clip(&long).chars().count(), MAX_LINE_CHARS + 3);
        assert_eq!(clip("short"), "short");
    }

    #[test]
    fn test_stop_sequences() {
        assert_eq!(stop_sequences("Seven"), vec!["User:", "System:", "Seven:"]);
    }
}
