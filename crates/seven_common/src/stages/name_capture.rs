//! "My name is ..." capture. Runs before everything else so the identity
//! stage never sees the substring "my name" in an introduction.

use super::{Flow, Outcome, Services, Stage, TurnContext};
use crate::phrases::{capitalize, Phrase, NAME_MISSING};
use regex::Regex;
use std::sync::LazyLock;

static NAME_IS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmy\s+name\s+is\b(.*)").expect("valid regex"));

const FACT_CATEGORY: &str = "identity";

/// Name as spoken after "my name is", each word capitalized
pub fn extract_name(raw: &str) -> Option<String> {
    let tail = NAME_IS.captures(raw)?.get(1)?.as_str();
    let cleaned: Vec<String> = tail
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '\''))
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join(" "))
    }
}

pub struct NameCaptureStage;

impl Stage for NameCaptureStage {
    fn name(&self) -> &'static str {
        "name_capture"
    }

    fn run(&self, ctx: &mut TurnContext, services: &Services) -> Flow {
        if !ctx.utterance.has_phrase("my name is") {
            return Flow::Continue;
        }
        let Some(name) = extract_name(&ctx.utterance.raw) else {
            return Flow::Stop(Outcome::DirectAnswer(NAME_MISSING.to_string()));
        };

        let fact = format!("User's name is {}", name);
        if let Err(e) = services.facts.store_fact(&fact, FACT_CATEGORY, &ctx.speaker_id) {
            tracing::warn!(error = %e, speaker = %ctx.speaker_id, "failed to store name");
        }
        services.sessions.set_display_name(&ctx.speaker_id, &name);
        tracing::info!(speaker = %ctx.speaker_id, name = %name, "display name set");

        Flow::Stop(Outcome::DirectAnswer(services.picker.say(Phrase::NameAck, &[("name", &name)])))
    }
}
