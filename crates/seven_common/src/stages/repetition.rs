//! Repetition guard.
//!
//! Exact repeats of a logged question get a fixed answer unless memory has
//! something to add. Questions that only mean the same thing as a logged
//! one pass through with a request to phrase the answer differently.
//! Commands, greetings and explicit requests are never blocked or logged.

use super::{Flow, Outcome, Services, Stage, TurnContext};
use crate::lexicon;
use crate::normalize::{normalize, Utterance};
use crate::phrases::{Phrase, ASKED_BEFORE, JUST_ASKED, NAME_UNKNOWN};

/// Questions that ask the same thing in different words
const SYNONYM_GROUPS: &[&[&str]] = &[
    &[
        "who are you",
        "whats your name",
        "what is your name",
        "what should i call you",
        "what do i call you",
    ],
    &["who made you", "who created you", "who built you", "who is your creator"],
    &[
        "what can you do",
        "what are your capabilities",
        "what are you capable of",
        "how can you help",
    ],
    &["how are you", "how are you doing", "hows it going", "how do you feel"],
    &["whats my name", "who am i", "do you know my name"],
];

fn synonym_group(u: &Utterance) -> Option<usize> {
    SYNONYM_GROUPS
        .iter()
        .position(|group| group.iter().any(|p| u.has_phrase(p)))
}

/// Never blocked and never logged
fn is_exempt(u: &Utterance) -> bool {
    u.is_empty() || lexicon::is_command_verb(u) || lexicon::is_greeting_opener(u) || lexicon::is_request(u)
}

pub struct RepetitionStage;

impl RepetitionStage {
    /// Canonical answer for a repeated identity question
    fn identity_repeat(u: &Utterance, ctx: &TurnContext, services: &Services) -> Option<String> {
        let persona = services.persona();
        if lexicon::is_creator_question(u) {
            return Some(services.picker.say(Phrase::RepeatCreator, &[("creator", &services.config.persona.creator)]));
        }
        if lexicon::is_self_identity(u) {
            return Some(services.picker.say(Phrase::RepeatSelf, &[("persona", persona)]));
        }
        if lexicon::is_user_identity(u) {
            return Some(match services.sessions.display_name(&ctx.speaker_id) {
                Some(name) => services.picker.say(Phrase::RepeatUser, &[("name", &name)]),
                None => NAME_UNKNOWN.to_string(),
            });
        }
        None
    }
}

impl Stage for RepetitionStage {
    fn name(&self) -> &'static str {
        "repetition"
    }

    fn run(&self, ctx: &mut TurnContext, services: &Services) -> Flow {
        let u = ctx.utterance.clone();
        if is_exempt(&u) {
            return Flow::Continue;
        }

        let (times, similar) = services.sessions.with_session(&ctx.speaker_id, |session| {
            let times = session.times_asked(&u.text);
            let similar = match synonym_group(&u) {
                Some(group) => session
                    .recent_questions()
                    .iter()
                    .any(|q| *q != u.text && synonym_group(&normalize(q)) == Some(group)),
                None => false,
            };
            session.log_question(&u.text);
            (times, similar)
        });

        if times == 0 {
            if similar {
                tracing::debug!("similar question asked recently, asking for a rephrase");
                ctx.rephrase = true;
            }
            return Flow::Continue;
        }

        if let Some(answer) = Self::identity_repeat(&u, ctx, services) {
            return Flow::Stop(Outcome::DirectAnswer(answer));
        }

        if let Some(fresh) = services.search_memory(&u.raw, &ctx.speaker_id) {
            tracing::debug!(times, "repeat with memory context, letting it through");
            ctx.memory = Some(fresh);
            return Flow::Continue;
        }

        let answer = if times >= 2 { ASKED_BEFORE } else { JUST_ASKED };
        tracing::debug!(times, "repeat blocked");
        Flow::Stop(Outcome::DirectAnswer(answer.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::collaborators::{FactStore, InMemoryMemory};
    use crate::session::RECENT_QUESTIONS_CAP;
    use std::sync::Arc;

    fn run(text: &str, s: &Services) -> (Flow, TurnContext) {
        let mut c = ctx(text, "spk", s);
        let flow = RepetitionStage.run(&mut c, s);
        (flow, c)
    }

    fn answer(flow: Flow) -> Option<String> {
        match flow {
            Flow::Stop(Outcome::DirectAnswer(text)) => Some(text),
            _ => None,
        }
    }

    #[test]
    fn test_escalation() {
        let s = services(Arc::new(InMemoryMemory::new()));
        assert!(answer(run("what is the capital of peru", &s).0).is_none());
        assert_eq!(answer(run("What is the capital of Peru?", &s).0).as_deref(), Some(JUST_ASKED));
        assert_eq!(answer(run("what is the capital of peru", &s).0).as_deref(), Some(ASKED_BEFORE));
    }

    #[test]
    fn test_commands_never_logged() {
        let s = services(Arc::new(InMemoryMemory::new()));
        for _ in 0..3 {
            assert!(answer(run("open chrome", &s).0).is_none());
            assert!(answer(run("hello", &s).0).is_none());
            assert!(answer(run("tell me a joke", &s).0).is_none());
        }
        s.sessions.with_session("spk", |session| assert!(session.recent_questions().is_empty()));
    }

    #[test]
    fn test_identity_repeat_bypasses_memory() {
        let memory = Arc::new(InMemoryMemory::new());
        memory.store_fact("your name came up before", "misc", "spk").unwrap();
        let s = services(memory);
        assert!(answer(run("what is your name", &s).0).is_none());
        let text = answer(run("what is your name", &s).0).unwrap();
        assert!(text.contains("Seven"));
    }

    #[test]
    fn test_user_identity_repeat_without_name() {
        let s = services(Arc::new(InMemoryMemory::new()));
        run("whats my name", &s);
        assert_eq!(answer(run("whats my name", &s).0).as_deref(), Some(NAME_UNKNOWN));
    }

    #[test]
    fn test_fresh_memory_lets_repeat_through() {
        let memory = Arc::new(InMemoryMemory::new());
        let s = services(memory.clone());
        run("what sport do i play", &s);
        memory.store_fact("I play cricket on weekends", "personal", "spk").unwrap();
        let (flow, c) = run("what sport do i play", &s);
        assert!(matches!(flow, Flow::Continue));
        assert!(c.memory.unwrap().contains("cricket"));
    }

    #[test]
    fn test_similar_question_sets_rephrase() {
        let s = services(Arc::new(InMemoryMemory::new()));
        let (_, first) = run("who made you", &s);
        assert!(!first.rephrase);
        let (flow, second) = run("who created you", &s);
        assert!(matches!(flow, Flow::Continue));
        assert!(second.rephrase);
    }

    #[test]
    fn test_log_capped() {
        let s = services(Arc::new(InMemoryMemory::new()));
        for i in 0..30 {
            run(&format!("question number {}", i), &s);
        }
        s.sessions
            .with_session("spk", |session| assert_eq!(session.recent_questions().len(), RECENT_QUESTIONS_CAP));
    }
}
