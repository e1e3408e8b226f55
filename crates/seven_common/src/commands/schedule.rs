//! Alarms, reminders, timers and calendar events.
//!
//! Compiles `###SCHED: action=...` tags. Adds carry an absolute local
//! `time=` (timers carry `duration=` seconds instead), an optional
//! `recur=` pattern and a `message=` with spaces encoded as `_`. Cancel,
//! list and timer-remaining requests compile to their own actions. An
//! unresolvable time yields a clarification, never a partial tag.

use super::time_parse::{
    describe, describe_duration, find_duration, find_recurrence, find_time, format_tag_time, next_weekday_at,
    Recurrence,
};
use super::{CommandDomain, CommandEnv, Compiled};
use crate::normalize::{normalize, Utterance};
use crate::phrases::Phrase;
use seven_shared::{CommandTag, TagKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    Alarm,
    Reminder,
    Timer,
    Event,
}

impl ScheduleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleKind::Alarm => "alarm",
            ScheduleKind::Reminder => "reminder",
            ScheduleKind::Timer => "timer",
            ScheduleKind::Event => "event",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleIntent {
    Add(ScheduleKind),
    Cancel(Option<ScheduleKind>),
    List(Option<ScheduleKind>),
    TimerRemaining,
}

const PLURALS: &[&str] = &["alarms", "reminders", "timers", "events", "appointments", "meetings"];
const ADD_VERBS: &[&str] = &["set", "add", "create", "start", "schedule", "make", "put", "book"];
const CANCEL_VERBS: &[&str] = &["cancel", "delete", "remove", "clear", "stop", "dismiss"];
const REMAINING: &[&str] = &["how long", "how much time", "time left", "time remaining", "left on", "remaining"];
const LIST_PHRASES: &[&str] = &["do i have", "coming up", "upcoming", "are set", "my schedule", "any"];

/// Leading words stripped from a reminder message
const MESSAGE_LEAD: &[&str] = &[
    "remind", "me", "set", "a", "an", "add", "create", "schedule", "alarm", "reminder", "event", "new",
    "to", "that", "about", "for", "wake", "up", "please", "can", "you", "put", "called", "named", "on",
    "my", "calendar", "make", "book", "of", "at",
];

/// Words stripped when building a cancel match
const CANCEL_FILLER: &[&str] = &[
    "cancel", "delete", "remove", "clear", "stop", "dismiss", "my", "the", "a", "an", "all", "alarm",
    "alarms", "reminder", "reminders", "timer", "timers", "event", "events", "appointment",
    "appointments", "about", "for", "called", "named", "to", "that", "please", "schedule", "at",
];

/// Kind named by the utterance
pub fn kind_of(u: &Utterance) -> Option<ScheduleKind> {
    if u.has_any_token(&["alarm", "alarms"]) || u.has_phrase("wake me") {
        return Some(ScheduleKind::Alarm);
    }
    if u.has_any_token(&["timer", "timers"]) {
        return Some(ScheduleKind::Timer);
    }
    if u.has_any_token(&["remind", "reminder", "reminders"]) {
        return Some(ScheduleKind::Reminder);
    }
    if u.has_any_token(&["event", "events", "appointment", "appointments", "meeting", "meetings", "calendar"]) {
        return Some(ScheduleKind::Event);
    }
    None
}

/// Classify a scheduling request
pub fn classify(u: &Utterance) -> Option<ScheduleIntent> {
    let kind = kind_of(u);
    let first = u.first_token();
    let schedule_word = u.has_token("schedule");

    if u.has_any_token(&["timer", "timers"]) && u.has_any_phrase(REMAINING) {
        return Some(ScheduleIntent::TimerRemaining);
    }
    if CANCEL_VERBS.contains(&first) && (kind.is_some() || schedule_word) {
        return Some(ScheduleIntent::Cancel(kind));
    }

    let adding = u.has_any_phrase(&["remind me", "wake me"])
        || (ADD_VERBS.contains(&first) && kind.is_some())
        || matches!(first, "timer" | "alarm" | "reminder");
    if adding {
        if let Some(k) = kind {
            return Some(ScheduleIntent::Add(k));
        }
    }

    let listing = matches!(first, "list" | "show")
        || u.has_any_token(PLURALS)
        || u.has_any_phrase(LIST_PHRASES);
    if (kind.is_some() || schedule_word) && listing {
        return Some(ScheduleIntent::List(kind));
    }
    if first == "schedule" && u.len() > 1 {
        return Some(ScheduleIntent::Add(ScheduleKind::Event));
    }
    None
}

/// Message left after removing time, recurrence and trigger words
fn message(text: &str, recur_phrase: Option<&str>) -> String {
    let mut padded = format!(" {} ", text);
    if let Some(p) = recur_phrase {
        padded = padded.replacen(&format!(" {} ", p), " ", 1);
    }
    let tokens: Vec<&str> = padded.split_whitespace().collect();
    let start = tokens.iter().position(|t| !MESSAGE_LEAD.contains(t)).unwrap_or(tokens.len());
    let mut body = &tokens[start..];
    while let Some((last, init)) = body.split_last() {
        if matches!(*last, "please" | "at" | "on" | "for" | "to") {
            body = init;
        } else {
            break;
        }
    }
    body.join(" ")
}

/// Scheduling domain
pub struct ScheduleDomain;

impl ScheduleDomain {
    fn add(&self, kind: ScheduleKind, u: &Utterance, env: &CommandEnv) -> Compiled {
        let now = env.clock.now();
        let picker = env.picker;
        let text = u.text.as_str();

        if kind == ScheduleKind::Timer {
            let Some((secs, _)) = find_duration(text) else {
                return Compiled::Clarify("How long should the timer run?".to_string());
            };
            let when = describe_duration(secs);
            let tag = CommandTag::new(TagKind::Sched)
                .with("action", kind.as_str())
                .with("duration", &secs.to_string());
            return Compiled::tags(picker.say(Phrase::TimerSet, &[("when", &when)]), vec![tag]);
        }

        let recurrence = find_recurrence(text, now);
        let Some(found) = find_time(text, now) else {
            return Compiled::Clarify(format!(
                "When should I set the {}? Try something like 'at 5pm' or 'in 10 minutes'.",
                kind.as_str()
            ));
        };

        let mut at = found.at;
        if let Some((Recurrence::Weekly(day), _)) = recurrence {
            at = next_weekday_at(now, day, at.time());
        }

        let stripped = found.strip_from(text);
        let what = message(&stripped, recurrence.as_ref().map(|(_, p)| p.as_str()));
        let what = if what.is_empty() { kind.as_str().to_string() } else { what };

        let mut when = if found.relative {
            found.spans.first().map(|r| text[r.clone()].to_string()).unwrap_or_default()
        } else {
            describe(at, now)
        };
        if let Some((_, phrase)) = &recurrence {
            when = format!("{} {}", when, phrase);
        }

        let mut tag = CommandTag::new(TagKind::Sched)
            .with("action", kind.as_str())
            .with("time", &format_tag_time(at))
            .with("message", &what);
        if let Some((r, _)) = &recurrence {
            tag = tag.with("recur", &r.tag_value());
        }

        let phrase = match kind {
            ScheduleKind::Alarm => Phrase::AlarmSet,
            ScheduleKind::Event => Phrase::EventSet,
            _ => Phrase::ReminderSet,
        };
        let speech = picker.say(phrase, &[("when", &when), ("what", &what)]);
        tracing::debug!(kind = kind.as_str(), at = %at, "schedule entry compiled");
        Compiled::tags(speech, vec![tag])
    }

    fn cancel(&self, kind: Option<ScheduleKind>, u: &Utterance, env: &CommandEnv) -> Compiled {
        let mut tag = CommandTag::new(TagKind::Sched).with("action", "cancel");
        if let Some(k) = kind {
            tag = tag.with("cancel_type", k.as_str());
        }
        let words: Vec<&str> = u
            .tokens
            .iter()
            .map(String::as_str)
            .filter(|t| !CANCEL_FILLER.contains(t))
            .collect();
        if !words.is_empty() {
            tag = tag.with("match", &words.join(" "));
        }
        Compiled::tags(env.picker.say(Phrase::ScheduleCancel, &[]), vec![tag])
    }
}

impl CommandDomain for ScheduleDomain {
    fn name(&self) -> &'static str {
        "schedule"
    }

    fn detect(&self, u: &Utterance, _env: &CommandEnv) -> bool {
        classify(u).is_some()
    }

    fn compile(&self, u: &Utterance, env: &CommandEnv) -> Compiled {
        // "after" reads the same as "in" for relative times
        let u = if u.has_token("after") {
            let mut n = normalize(&u.raw);
            n.text = format!(" {} ", n.text).replace(" after ", " in ").trim().to_string();
            n.tokens = n.text.split_whitespace().map(str::to_string).collect();
            n
        } else {
            u.clone()
        };

        match classify(&u) {
            Some(ScheduleIntent::Add(kind)) => self.add(kind, &u, env),
            Some(ScheduleIntent::Cancel(kind)) => self.cancel(kind, &u, env),
            Some(ScheduleIntent::List(kind)) => {
                let mut tag = CommandTag::new(TagKind::Sched).with("action", "list");
                if let Some(k) = kind {
                    tag = tag.with("list_type", k.as_str());
                }
                Compiled::tags(env.picker.say(Phrase::ScheduleList, &[]), vec![tag])
            }
            Some(ScheduleIntent::TimerRemaining) => {
                let tag = CommandTag::new(TagKind::Sched).with("action", "timer_remaining");
                Compiled::tags(env.picker.say(Phrase::TimerRemaining, &[]), vec![tag])
            }
            None => Compiled::Clarify("I'm not sure what to schedule.".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::collaborators::AnyWindow;
    use crate::phrases::PhrasePicker;
    use crate::session::SessionStore;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    /// Wednesday 2025-06-11 10:00:00
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap().and_hms_opt(10, 0, 0).unwrap()
    }

    fn run(text: &str) -> Compiled {
        let picker = PhrasePicker::seeded(8);
        let clock = FixedClock(now());
        let sessions = SessionStore::new(None);
        let env = CommandEnv {
            picker: &picker,
            clock: &clock,
            windows: &AnyWindow,
            sessions: &sessions,
        };
        let u = normalize(text);
        assert!(ScheduleDomain.detect(&u, &env), "not detected: {}", text);
        ScheduleDomain.compile(&u, &env)
    }

    fn tag(c: Compiled) -> CommandTag {
        match c {
            Compiled::Tags { mut tags, .. } => tags.remove(0),
            Compiled::Clarify(t) => panic!("expected a tag, got {:?}", t),
        }
    }

    #[test]
    fn test_relative_reminder() {
        let t = tag(run("remind me in 10 minutes to check the oven"));
        assert_eq!(t.get("action"), Some("reminder"));
        assert_eq!(t.get("time"), Some(format_tag_time(now() + Duration::minutes(10)).as_str()));
        assert_eq!(t.get("message"), Some("check_the_oven"));
    }

    #[test]
    fn test_after_reads_as_in() {
        let t = tag(run("remind me after 2 hours to stretch"));
        assert_eq!(t.get("time"), Some("2025-06-11T12:00:00"));
        assert_eq!(t.get("message"), Some("stretch"));
    }

    #[test]
    fn test_clock_reminder_message() {
        let t = tag(run("Remind me to call Mom at 5pm"));
        assert_eq!(t.get("time"), Some("2025-06-11T17:00:00"));
        assert_eq!(t.get("message"), Some("call_mom"));
    }

    #[test]
    fn test_alarm_default_message() {
        let t = tag(run("set an alarm for 6:30am"));
        assert_eq!(t.get("action"), Some("alarm"));
        assert_eq!(t.get("time"), Some("2025-06-12T06:30:00"));
        assert_eq!(t.get("message"), Some("alarm"));
        let t = tag(run("wake me up tomorrow at 7am"));
        assert_eq!(t.get("time"), Some("2025-06-12T07:00:00"));
    }

    #[test]
    fn test_recurring() {
        let t = tag(run("remind me every day at 9am to take my pills"));
        assert_eq!(t.get("recur"), Some("daily"));
        assert_eq!(t.get("time"), Some("2025-06-12T09:00:00"));
        assert_eq!(t.get("message"), Some("take_my_pills"));

        let t = tag(run("set an alarm every monday at 7am"));
        assert_eq!(t.get("recur"), Some("weekly_0"));
        assert_eq!(t.get("time"), Some("2025-06-16T07:00:00"));
    }

    #[test]
    fn test_event() {
        let t = tag(run("schedule a meeting with john on june 20 at 3pm"));
        assert_eq!(t.get("action"), Some("event"));
        assert_eq!(t.get("time"), Some("2025-06-20T15:00:00"));
        assert_eq!(t.get("message"), Some("meeting_with_john"));
    }

    #[test]
    fn test_timer_duration() {
        let t = tag(run("set a timer for 10 minutes"));
        assert_eq!(t.get("action"), Some("timer"));
        assert_eq!(t.get("duration"), Some("600"));
        assert!(t.get("time").is_none());
    }

    #[test]
    fn test_unparseable_time_clarifies() {
        match run("remind me to buy milk") {
            Compiled::Clarify(text) => assert!(text.contains("reminder")),
            other => panic!("expected clarification, got {:?}", other),
        }
        assert!(matches!(run("set a timer"), Compiled::Clarify(_)));
    }

    #[test]
    fn test_cancel_list_remaining() {
        let t = tag(run("cancel my reminder about mom"));
        assert_eq!(t.get("action"), Some("cancel"));
        assert_eq!(t.get("cancel_type"), Some("reminder"));
        assert_eq!(t.get("match"), Some("mom"));

        let t = tag(run("what alarms do I have"));
        assert_eq!(t.get("action"), Some("list"));
        assert_eq!(t.get("list_type"), Some("alarm"));

        let t = tag(run("how much time is left on my timer"));
        assert_eq!(t.encode(), "###SCHED: action=timer_remaining");
    }

    #[test]
    fn test_not_scheduling() {
        assert_eq!(classify(&normalize("what is a timer")), None);
        assert_eq!(classify(&normalize("tell me a joke")), None);
    }
}
