//! Properties that hold for every input: caps, command exemption from the
//! repetition log, and lossless tag round-trips.

use chrono::NaiveDate;
use seven_common::commands::{compile, default_domains, CommandEnv, Compiled};
use seven_common::session::{HISTORY_CAP, RECENT_QUESTIONS_CAP};
use seven_common::{
    normalize, AnyWindow, Config, Dispatcher, FakeInferenceClient, FixedClock, PhrasePicker, SessionStore,
};
use seven_shared::CommandTag;
use std::sync::Arc;

const COMMANDS: &[&str] = &[
    "open chrome",
    "Open Chrome and Notepad",
    "close all instances of firefox",
    "kill discord",
    "launch spotify, slack & visual studio code",
    "minimize chrome",
    "maximize notepad",
    "snap chrome to the top left",
    "switch to spotify",
    "focus slack",
    "center this window",
    "put chrome on monitor 2",
    "pin notepad on top",
    "make chrome 40 percent transparent",
    "split chrome and notepad side by side",
    "swap chrome and notepad",
    "undo",
    "set volume to 35",
    "turn the brightness down",
    "turn off bluetooth",
    "mute",
    "remind me in 10 minutes to check the oven",
    "set an alarm for 6:30am",
    "set a timer for 90 seconds",
    "remind me every monday at 9am to water the plants",
    "schedule a meeting with john on june 20 at 3pm",
    "cancel my reminder about the oven",
];

fn dispatcher() -> Dispatcher {
    let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 6, 11).unwrap().and_hms_opt(9, 0, 0).unwrap());
    Dispatcher::builder(Config::default())
        .picker(PhrasePicker::seeded(3))
        .clock(Arc::new(clock))
        .inference(Arc::new(FakeInferenceClient::always("Sure.")))
        .build()
        .unwrap()
}

#[test]
fn command_verbs_never_logged_or_blocked() {
    let d = dispatcher();
    for _ in 0..3 {
        for text in COMMANDS {
            let out = d.dispatch(text, "spk");
            assert_ne!(out, seven_common::phrases::JUST_ASKED, "blocked: {}", text);
            assert_ne!(out, seven_common::phrases::ASKED_BEFORE, "blocked: {}", text);
        }
    }
    d.sessions().with_session("spk", |s| {
        let first_tokens_are_verbs = s
            .recent_questions()
            .iter()
            .all(|q| !seven_common::lexicon::is_command_verb(&normalize(q)));
        assert!(first_tokens_are_verbs, "logged: {:?}", s.recent_questions());
    });
}

#[test]
fn caps_hold_under_volume() {
    let d = dispatcher();
    for i in 0..60 {
        d.dispatch(&format!("what is the square root of {}", i), "spk");
    }
    d.sessions().with_session("spk", |s| {
        assert!(s.recent_questions().len() <= RECENT_QUESTIONS_CAP);
        assert!(s.history().len() <= HISTORY_CAP);
        assert_eq!(s.history().len(), HISTORY_CAP);
    });
}

#[test]
fn compiled_tags_round_trip() {
    let picker = PhrasePicker::seeded(9);
    let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 6, 11).unwrap().and_hms_opt(9, 0, 0).unwrap());
    let sessions = SessionStore::new(None);
    let env = CommandEnv {
        picker: &picker,
        clock: &clock,
        windows: &AnyWindow,
        sessions: &sessions,
    };
    let domains = default_domains();

    let mut checked = 0;
    for text in COMMANDS {
        let Some((_, Compiled::Tags { tags, .. })) = compile(&domains, &normalize(text), &env) else {
            continue;
        };
        for tag in tags {
            let decoded = CommandTag::decode(&tag.encode()).unwrap();
            assert_eq!(decoded, tag, "round trip failed for {}", text);
            assert_eq!(decoded.params(), tag.params());
            checked += 1;
        }
    }
    assert!(checked >= COMMANDS.len(), "only {} tags checked", checked);
}

#[test]
fn every_command_produces_tags_or_a_clarification() {
    let d = dispatcher();
    for text in COMMANDS {
        let out = d.dispatch(text, "spk");
        assert!(out.contains("###") || out.ends_with('?') || out.ends_with('.'), "{} -> {}", text, out);
        assert!(!out.starts_with("###"), "no speech for {}: {}", text, out);
    }
}
