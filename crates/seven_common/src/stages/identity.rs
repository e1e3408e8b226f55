//! Deterministic small talk: who the assistant is, who the speaker is,
//! who built it, greetings and farewells. Never touches memory or the model.

use super::{Flow, Outcome, Services, Stage, TurnContext};
use crate::clock::TimeOfDay;
use crate::lexicon;
use crate::phrases::{Phrase, NAME_UNKNOWN};

pub struct IdentityStage;

impl IdentityStage {
    fn answer(ctx: &TurnContext, services: &Services) -> Option<String> {
        let u = &ctx.utterance;
        let picker = &services.picker;
        let persona = services.persona();
        let name = services.sessions.display_name(&ctx.speaker_id);

        if lexicon::is_self_identity(u) {
            return Some(picker.say(Phrase::SelfIdentity, &[("persona", persona)]));
        }

        if lexicon::is_user_identity(u) {
            return Some(match &name {
                Some(name) => picker.say(Phrase::UserIdentity, &[("name", name)]),
                None => NAME_UNKNOWN.to_string(),
            });
        }

        if lexicon::is_creator_question(u) {
            return Some(picker.say(Phrase::Creator, &[("creator", &services.config.persona.creator)]));
        }

        let bare = lexicon::without_name(u, persona);
        if lexicon::GREETINGS.contains(&bare.as_str()) {
            let greeting = TimeOfDay::at(services.clock.now()).greeting_prefix();
            return Some(match &name {
                Some(name) => picker.say(Phrase::Greeting, &[("greeting", greeting), ("name", name)]),
                None => picker.say(Phrase::GreetingAnon, &[("greeting", greeting)]),
            });
        }
        if lexicon::FAREWELLS.contains(&bare.as_str()) {
            return Some(match &name {
                Some(name) => picker.say(Phrase::Farewell, &[("name", name)]),
                None => picker.say(Phrase::FarewellAnon, &[]),
            });
        }

        if bare == "what are you" {
            return Some(picker.say(Phrase::WhatAreYou, &[("persona", persona)]));
        }
        if u.has_any_phrase(&["call you", "should i call"]) {
            return Some(picker.say(Phrase::CallMe, &[("persona", persona)]));
        }
        None
    }
}

impl Stage for IdentityStage {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn run(&self, ctx: &mut TurnContext, services: &Services) -> Flow {
        match Self::answer(ctx, services) {
            Some(text) => Flow::Stop(Outcome::DirectAnswer(text)),
            None => Flow::Continue,
        }
    }
}
