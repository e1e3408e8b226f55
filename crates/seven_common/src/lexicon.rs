//! Word lists shared by the rule stages.
//!
//! One list per concept. Stages that need different exemption behavior
//! combine these lists differently instead of keeping private copies.

use crate::normalize::Utterance;

/// First tokens that mark an utterance as a command to act on
pub const COMMAND_VERBS: &[&str] = &[
    "open", "close", "start", "kill", "launch", "minimize", "minimise", "maximize", "maximise",
    "restore", "snap", "switch", "focus", "center", "centre", "put", "pin", "unpin", "move",
    "swap", "split", "tile", "arrange", "undo", "mute", "unmute", "set", "turn", "make", "send",
    "play", "pause", "resume", "skip", "remind", "wake", "cancel", "schedule",
];

/// Words that open a greeting or farewell
pub const GREETING_OPENERS: &[&str] = &["hi", "hey", "hello", "yo", "hiya", "bye", "goodbye"];

/// Second words that turn "good" into a greeting ("good morning")
const GOOD_SUFFIXES: &[&str] = &["morning", "afternoon", "evening", "night"];

/// Explicit request phrasing; the user wants a fresh answer every time
pub const REQUEST_PHRASES: &[&str] = &["sing", "tell me", "show me", "give me", "explain"];

/// Whole utterances that are greetings (persona name already removed)
pub const GREETINGS: &[&str] = &[
    "hi",
    "hey",
    "hello",
    "yo",
    "hiya",
    "hi there",
    "hey there",
    "hello there",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Whole utterances that are farewells (persona name already removed)
pub const FAREWELLS: &[&str] = &[
    "bye",
    "goodbye",
    "bye bye",
    "see you",
    "see ya",
    "see you later",
    "later",
    "good night",
    "goodnight",
];

/// Questions about the assistant's own name
pub const SELF_IDENTITY_PHRASES: &[&str] = &["your name", "who are you"];

/// Questions about the speaker's own name
pub const USER_IDENTITY_PHRASES: &[&str] = &["my name", "who am i"];

/// Tokens that turn a name question into a meta or third-party question
pub const USER_IDENTITY_GUARD: &[&str] = &["is", "why", "did", "times", "about", "friend"];

/// Questions about who built the assistant
pub const CREATOR_PHRASES: &[&str] = &[
    "who made you",
    "who created you",
    "who built you",
    "who is your creator",
    "whos your creator",
    "your creator",
];

/// Openers that make an utterance a question
pub const QUESTION_STARTS: &[&str] = &["what", "whats", "which", "who", "whos", "when", "where", "how", "do you know"];

/// Markers that a question is about the speaker personally
pub const PERSONAL_MARKERS: &[&str] = &[
    "my", "about me", "do i", "did i", "am i", "i like", "i love", "i play", "i work", "i study",
];

/// Triggers that earn the long output budget
pub const EXPLANATION_TRIGGERS: &[&str] = &["tell me", "explain", "list", "why", "describe", "how does", "how do"];

/// Words that pick the news variant of a web lookup
pub const NEWS_WORDS: &[&str] = &[
    "news", "happened", "breaking", "announcement", "released", "launched", "died", "elected",
    "war", "earthquake", "disaster",
];

/// First token is a command verb
pub fn is_command_verb(u: &Utterance) -> bool {
    COMMAND_VERBS.contains(&u.first_token())
}

/// Utterance opens with a greeting or farewell word
pub fn is_greeting_opener(u: &Utterance) -> bool {
    let first = u.first_token();
    if GREETING_OPENERS.contains(&first) {
        return true;
    }
    first == "good"
        && u
            .tokens
            .get(1)
            .map(|second| GOOD_SUFFIXES.contains(&second.as_str()))
            .unwrap_or(false)
}

/// Utterance contains an explicit request phrase
pub fn is_request(u: &Utterance) -> bool {
    u.has_any_phrase(REQUEST_PHRASES)
}

/// Utterance opens with an interrogative
pub fn is_question(u: &Utterance) -> bool {
    QUESTION_STARTS.iter().any(|q| u.starts_with_phrase(q))
}

/// Utterance talks about the speaker
pub fn is_personal(u: &Utterance) -> bool {
    u.has_any_phrase(PERSONAL_MARKERS)
}

/// Asks the assistant's name; short and not about frequency
pub fn is_self_identity(u: &Utterance) -> bool {
    u.has_any_phrase(SELF_IDENTITY_PHRASES) && u.len() <= 6 && !u.has_any_token(&["how", "did"])
}

/// Asks the speaker's own name directly
pub fn is_user_identity(u: &Utterance) -> bool {
    u.has_any_phrase(USER_IDENTITY_PHRASES) && !u.has_any_token(USER_IDENTITY_GUARD) && !u.has_phrase("how many")
}

/// Asks who built the assistant
pub fn is_creator_question(u: &Utterance) -> bool {
    u.has_any_phrase(CREATOR_PHRASES) && u.len() <= 6
}

/// Normalized text with a trailing or leading persona name removed
pub fn without_name(u: &Utterance, persona: &str) -> String {
    let persona = persona.to_lowercase();
    let tokens: Vec<&str> = u
        .tokens
        .iter()
        .map(String::as_str)
        .filter(|t| *t != persona)
        .collect();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn test_command_verb_is_first_token_only() {
        assert!(is_command_verb(&normalize("Open Chrome")));
        assert!(!is_command_verb(&normalize("can you open chrome")));
    }

    #[test]
    fn test_greeting_opener() {
        assert!(is_greeting_opener(&normalize("hey seven")));
        assert!(is_greeting_opener(&normalize("Good morning!")));
        assert!(!is_greeting_opener(&normalize("good job")));
    }

    #[test]
    fn test_question_and_personal() {
        let u = normalize("What sport do I play?");
        assert!(is_question(&u));
        assert!(is_personal(&u));
        let u = normalize("Tell me a joke");
        assert!(!is_question(&u));
        assert!(!is_personal(&u));
        assert!(is_request(&u));
    }

    #[test]
    fn test_mystery_is_not_personal() {
        assert!(!is_personal(&normalize("what is a mystery novel")));
    }

    #[test]
    fn test_identity_guards() {
        assert!(is_self_identity(&normalize("What's your name?")));
        assert!(!is_self_identity(&normalize("how many times did i ask your name")));
        assert!(is_user_identity(&normalize("What's my name?")));
        assert!(is_user_identity(&normalize("who am i")));
        assert!(!is_user_identity(&normalize("what is my friends name")));
        assert!(!is_user_identity(&normalize("how many people share my name")));
        assert!(is_creator_question(&normalize("Who made you?")));
    }

    #[test]
    fn test_without_name() {
        assert_eq!(without_name(&normalize("Bye Seven"), "Seven"), "bye");
    }
}
