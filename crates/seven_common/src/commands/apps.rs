//! Application lifecycle: open and close.
//!
//! The first token picks the verb (open/start/launch or close/kill); the
//! rest is split on "and", commas and ampersands into one tag per app.
//! "close all chrome" style modifiers mark the target with the close-all
//! prefix.

use super::{CommandDomain, CommandEnv, Compiled};
use crate::normalize::{normalize, Utterance};
use crate::phrases::Phrase;
use seven_shared::{CommandTag, TagKind, CLOSE_ALL_PREFIX};

const OPEN_VERBS: &[&str] = &["open", "start", "launch"];
const CLOSE_VERBS: &[&str] = &["close", "kill"];

/// Words dropped from app names
const FILLER: &[&str] = &[
    "the", "app", "application", "program", "please", "up", "for", "me", "my", "windows", "instances",
    "instance", "of", "now",
];

/// Close-all modifiers, longest first
const ALL_MODIFIERS: &[&str] = &["all instances of", "all of the", "all of", "all the", "every", "all"];

/// Split a spoken list into items.
///
/// Commas and ampersands in the raw text count like "and"; filler words
/// are dropped from each item and empty items are skipped.
pub fn list_items(raw: &str, filler: &[&str]) -> Vec<String> {
    let spaced = raw.replace(['&', ','], " and ");
    let u = normalize(&spaced);
    u.tokens
        .split(|t| t == "and")
        .map(|group| {
            group
                .iter()
                .map(String::as_str)
                .filter(|t| !filler.contains(t))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|item| !item.is_empty())
        .collect()
}

/// Token count of a leading close-all modifier that still leaves a target
fn modifier_len(rest: &[String]) -> Option<usize> {
    ALL_MODIFIERS
        .iter()
        .map(|m| m.split(' ').collect::<Vec<_>>())
        .find(|m| rest.len() > m.len() && rest.iter().zip(m).all(|(t, w)| t == w))
        .map(|m| m.len())
}

/// Application open/close domain
pub struct AppDomain;

impl CommandDomain for AppDomain {
    fn name(&self) -> &'static str {
        "apps"
    }

    fn detect(&self, u: &Utterance, _env: &CommandEnv) -> bool {
        OPEN_VERBS.contains(&u.first_token()) || CLOSE_VERBS.contains(&u.first_token())
    }

    fn compile(&self, u: &Utterance, env: &CommandEnv) -> Compiled {
        let opening = OPEN_VERBS.contains(&u.first_token());

        // list separators survive as "and" tokens
        let listed = normalize(&u.raw.replace(['&', ','], " and "));
        let start = listed
            .tokens
            .iter()
            .position(|t| t == u.first_token())
            .map_or(listed.tokens.len(), |i| i + 1);
        let mut rest = &listed.tokens[start..];
        while rest.first().is_some_and(|t| t == "and") {
            rest = &rest[1..];
        }

        let mut close_all = false;
        if !opening {
            if let Some(n) = modifier_len(rest) {
                close_all = true;
                rest = &rest[n..];
            }
        }

        let targets = list_items(&rest.join(" "), FILLER);
        if targets.is_empty() {
            let verb = if opening { "open" } else { "close" };
            return Compiled::Clarify(format!("What should I {}?", verb));
        }

        let kind = if opening { TagKind::Open } else { TagKind::Close };
        let tags: Vec<CommandTag> = targets
            .iter()
            .map(|t| {
                if close_all {
                    CommandTag::with_target(kind, &format!("{}{}", CLOSE_ALL_PREFIX, t))
                } else {
                    CommandTag::with_target(kind, t)
                }
            })
            .collect();

        let spoken = spoken_list(&targets);
        let phrase = match (opening, close_all) {
            (true, _) => Phrase::Open,
            (false, true) => Phrase::CloseAll,
            (false, false) => Phrase::Close,
        };
        let speech = env.picker.say(phrase, &[("target", &spoken)]);
        tracing::debug!(count = tags.len(), close_all, "app command compiled");
        Compiled::tags(speech, tags)
    }
}

/// "a", "a and b", "a, b and c"
pub fn spoken_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
