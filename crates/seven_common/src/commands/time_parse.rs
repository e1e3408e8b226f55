//! Natural-language time expressions.
//!
//! Works on normalized text and reports the byte span it consumed so the
//! caller can cut the expression out of a reminder message.
//!
//! Supported, in match priority:
//! - relative: "in 10 minutes", "after 2 hours", "in an hour"
//! - bare duration: "10 minutes" (timers)
//! - "tomorrow", optionally with a clock time (default 9am)
//! - "next friday", "on friday", optionally with a clock time
//! - month and day: "june 20", "on dec 3rd at 5pm" (rolls to next year if past)
//! - bare clock time: "5pm", "at 7", "17:30" (rolls to tomorrow if past)

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Wire format of time values in schedule tags
pub const TAG_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const UNIT: &str = r"(seconds?|secs?|minutes?|mins?|hours?|hrs?)";

static RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:in|after)\s+(\d+|an?)\s+{}\b", UNIT)).expect("relative time pattern")
});

static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b(\d+|an?)\s+{}\b", UNIT)).expect("duration pattern"));

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(at\s+)?(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\b").expect("clock pattern")
});

static TOMORROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\btomorrow\b").expect("tomorrow pattern"));

static NEXT_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bnext\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tue|wed|thu|fri|sat|sun)\b")
        .expect("next weekday pattern")
});

static ON_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:on\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b").expect("weekday pattern")
});

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:on\s+)?(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|sept|oct|nov|dec)\s+(\d{1,2})(?:st|nd|rd|th)?\b",
    )
    .expect("month day pattern")
});

/// A resolved time expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMatch {
    pub at: NaiveDateTime,
    /// Byte ranges of the expression in the searched text
    pub spans: Vec<Range<usize>>,
    /// Expression was relative to now ("in 10 minutes")
    pub relative: bool,
}

/// Repeat pattern for alarms and reminders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    Weekdays,
    Weekly(Weekday),
}

impl Recurrence {
    /// Value carried in the `recur=` tag parameter
    pub fn tag_value(&self) -> String {
        match self {
            Recurrence::Daily => "daily".to_string(),
            Recurrence::Weekdays => "weekdays".to_string(),
            Recurrence::Weekly(day) => format!("weekly_{}", day.num_days_from_monday()),
        }
    }
}

fn unit_secs(unit: &str) -> u64 {
    if unit.starts_with('s') {
        1
    } else if unit.starts_with('m') {
        60
    } else {
        3600
    }
}

fn amount(raw: &str) -> Option<u64> {
    match raw {
        "a" | "an" => Some(1),
        n => n.parse().ok(),
    }
}

fn weekday(name: &str) -> Option<Weekday> {
    let day = match name {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn month(name: &str) -> Option<u32> {
    let m = match name {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(m)
}

/// Clock time found in text
#[derive(Debug, Clone, PartialEq, Eq)]
struct Clock {
    hour: u32,
    minute: u32,
    meridiem: bool,
    span: Range<usize>,
}

/// First clock-looking token. A bare number only counts after "at".
fn find_clock(text: &str) -> Option<Clock> {
    for caps in CLOCK.captures_iter(text) {
        let whole = caps.get(0)?;
        let has_at = caps.get(1).is_some();
        let minute_str = caps.get(3).map(|m| m.as_str());
        let ampm = caps.get(4).map(|m| m.as_str());
        if !has_at && minute_str.is_none() && ampm.is_none() {
            continue;
        }
        let Some(mut hour) = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            continue;
        };
        if ampm.is_some() && hour > 12 {
            continue;
        }
        let minute = minute_str.and_then(|m| m.parse::<u32>().ok()).unwrap_or(0);
        match ampm {
            Some("pm") if hour < 12 => hour += 12,
            Some("am") if hour == 12 => hour = 0,
            _ => {}
        }
        if hour > 23 || minute > 59 {
            continue;
        }
        return Some(Clock {
            hour,
            minute,
            meridiem: ampm.is_some(),
            span: whole.range(),
        });
    }
    None
}

fn at_clock(date: NaiveDate, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    Some(date.and_time(NaiveTime::from_hms_opt(hour, minute, 0)?))
}

impl TimeMatch {
    /// `text` with the matched expression cut out, re-spaced
    pub fn strip_from(&self, text: &str) -> String {
        let mut spans = self.spans.clone();
        spans.sort_by_key(|r| r.start);
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        for r in spans {
            if r.start >= pos && r.end <= text.len() {
                out.push_str(&text[pos..r.start]);
                out.push(' ');
                pos = r.end;
            }
        }
        out.push_str(&text[pos.min(text.len())..]);
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Date at the clock time in `text`, or 9am when no time is given
fn on_date(text: &str, date: NaiveDate, span: Range<usize>) -> Option<TimeMatch> {
    let (at, spans) = match find_clock(text) {
        Some(c) => (at_clock(date, c.hour, c.minute)?, vec![span, c.span]),
        None => (at_clock(date, 9, 0)?, vec![span]),
    };
    Some(TimeMatch {
        at,
        spans,
        relative: false,
    })
}

/// Days until the next `day`, always 1..=7
fn days_until(now: NaiveDateTime, day: Weekday) -> i64 {
    let current = now.weekday().num_days_from_monday() as i64;
    let target = day.num_days_from_monday() as i64;
    let ahead = target - current;
    if ahead <= 0 {
        ahead + 7
    } else {
        ahead
    }
}

/// `now` plus `secs`, or None when the result is not representable
fn offset(now: NaiveDateTime, secs: u64) -> Option<NaiveDateTime> {
    let delta = Duration::try_seconds(i64::try_from(secs).ok()?)?;
    now.checked_add_signed(delta)
}

/// Resolve the first time expression in `text` against `now`
pub fn find_time(text: &str, now: NaiveDateTime) -> Option<TimeMatch> {
    if let Some(caps) = RELATIVE.captures(text) {
        let n = amount(caps.get(1)?.as_str())?;
        let secs = n.checked_mul(unit_secs(caps.get(2)?.as_str()))?;
        return Some(TimeMatch {
            at: offset(now, secs)?,
            spans: vec![caps.get(0)?.range()],
            relative: true,
        });
    }

    if let Some(m) = TOMORROW.find(text) {
        return on_date(text, now.date().succ_opt()?, m.range());
    }

    if let Some(caps) = NEXT_DAY.captures(text) {
        let day = weekday(caps.get(1)?.as_str())?;
        let date = now.date() + Duration::days(days_until(now, day));
        return on_date(text, date, caps.get(0)?.range());
    }

    if !text.split_whitespace().any(|t| t == "every") {
        if let Some(caps) = ON_DAY.captures(text) {
            let day = weekday(caps.get(1)?.as_str())?;
            let date = now.date() + Duration::days(days_until(now, day));
            return on_date(text, date, caps.get(0)?.range());
        }
    }

    if let Some(caps) = MONTH_DAY.captures(text) {
        let m = month(caps.get(1)?.as_str())?;
        let d: u32 = caps.get(2)?.as_str().parse().ok()?;
        let mut date = NaiveDate::from_ymd_opt(now.year(), m, d)?;
        if date < now.date() {
            date = NaiveDate::from_ymd_opt(now.year() + 1, m, d)?;
        }
        // the day number itself is not a clock time
        let rest = &text[caps.get(0)?.end()..];
        let offset = caps.get(0)?.end();
        let (at, spans) = match find_clock(rest) {
            Some(c) => {
                let clock_span = (c.span.start + offset)..(c.span.end + offset);
                (at_clock(date, c.hour, c.minute)?, vec![caps.get(0)?.range(), clock_span])
            }
            None => (at_clock(date, 9, 0)?, vec![caps.get(0)?.range()]),
        };
        return Some(TimeMatch {
            at,
            spans,
            relative: false,
        });
    }

    if let Some(c) = find_clock(text) {
        let mut hour = c.hour;
        let today = now.date();
        // "at 5" with 5am already gone means 5pm
        if !c.meridiem && hour < 12 && at_clock(today, hour, c.minute)? < now {
            hour += 12;
        }
        let mut at = at_clock(today, hour, c.minute)?;
        if at <= now {
            at += Duration::days(1);
        }
        return Some(TimeMatch {
            at,
            spans: vec![c.span],
            relative: false,
        });
    }

    if let Some(caps) = DURATION.captures(text) {
        let n = amount(caps.get(1)?.as_str())?;
        let secs = n.checked_mul(unit_secs(caps.get(2)?.as_str()))?;
        return Some(TimeMatch {
            at: offset(now, secs)?,
            spans: vec![caps.get(0)?.range()],
            relative: true,
        });
    }

    None
}

/// Timer length in seconds and the span it came from
pub fn find_duration(text: &str) -> Option<(u64, Range<usize>)> {
    let caps = DURATION.captures(text)?;
    let n = amount(caps.get(1)?.as_str())?;
    let secs = n.checked_mul(unit_secs(caps.get(2)?.as_str()))?;
    if secs == 0 || Duration::try_seconds(i64::try_from(secs).ok()?).is_none() {
        return None;
    }
    Some((secs, caps.get(0)?.range()))
}

/// Repeat pattern and the phrase it came from
pub fn find_recurrence(text: &str, now: NaiveDateTime) -> Option<(Recurrence, String)> {
    const DAILY: &[&str] = &["every day", "everyday", "daily", "every morning", "every night", "every evening"];
    const WEEKDAYS: &[&str] = &["every weekday", "weekdays", "on weekdays"];
    const WEEKLY: &[&str] = &["every week", "weekly"];

    let padded = format!(" {} ", text);
    let has = |p: &str| padded.contains(&format!(" {} ", p));

    if let Some(p) = WEEKDAYS.iter().find(|p| has(p)) {
        return Some((Recurrence::Weekdays, p.to_string()));
    }
    if let Some(p) = DAILY.iter().find(|p| has(p)) {
        return Some((Recurrence::Daily, p.to_string()));
    }
    let tokens: Vec<&str> = text.split_whitespace().collect();
    for pair in tokens.windows(2) {
        if pair[0] == "every" {
            if let Some(day) = weekday(pair[1]) {
                return Some((Recurrence::Weekly(day), format!("every {}", pair[1])));
            }
        }
    }
    if let Some(p) = WEEKLY.iter().find(|p| has(p)) {
        return Some((Recurrence::Weekly(now.weekday()), p.to_string()));
    }
    None
}

/// First occurrence of a weekly recurrence at the given clock time
pub fn next_weekday_at(now: NaiveDateTime, day: Weekday, time: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(time);
    if now.weekday() == day && today > now {
        return today;
    }
    today + Duration::days(days_until(now, day))
}

/// Tag wire form of a time value
pub fn format_tag_time(at: NaiveDateTime) -> String {
    at.format(TAG_TIME_FORMAT).to_string()
}

/// Short spoken form: "at 5:30 PM", "tomorrow at 9:00 AM", "Friday, June 20 at 3:00 PM"
pub fn describe(at: NaiveDateTime, now: NaiveDateTime) -> String {
    let clock = at.format("%-I:%M %p");
    if at.date() == now.date() {
        format!("at {}", clock)
    } else if Some(at.date()) == now.date().succ_opt() {
        format!("tomorrow at {}", clock)
    } else {
        format!("{} at {}", at.format("%A, %B %-d"), clock)
    }
}

/// Spoken form of a duration: "10 minutes", "1 hour 30 minutes"
pub fn describe_duration(secs: u64) -> String {
    fn part(n: u64, unit: &str) -> String {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    }
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let mut parts = Vec::new();
    if h > 0 {
        parts.push(part(h, "hour"));
    }
    if m > 0 {
        parts.push(part(m, "minute"));
    }
    if s > 0 || parts.is_empty() {
        parts.push(part(s, "second"));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wednesday 2025-06-11 10:00:00
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 11)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, 0).unwrap()
    }

    #[test]
    fn test_relative() {
        let text = "remind me in 10 minutes to check the oven";
        let m = find_time(text, now()).unwrap();
        assert_eq!(m.at, now() + Duration::minutes(10));
        assert_eq!(&text[m.spans[0].clone()], "in 10 minutes");
        assert_eq!(m.strip_from(text), "remind me to check the oven");
        assert!(m.relative);

        let m = find_time("after 2 hours", now()).unwrap();
        assert_eq!(m.at, now() + Duration::hours(2));
        let m = find_time("in an hour", now()).unwrap();
        assert_eq!(m.at, now() + Duration::hours(1));
    }

    #[test]
    fn test_unrepresentable_offsets_are_not_times() {
        assert!(find_time("in 9999999999 hours", now()).is_none());
        assert!(find_time("in 99999999999999 hours", now()).is_none());
        assert!(find_time("in 99999999999999999999999 minutes", now()).is_none());
        assert!(find_time("9999999999 hours", now()).is_none());
        assert!(find_duration("a timer for 99999999999999 hours").is_none());
        assert_eq!(find_duration("a timer for 90 seconds").map(|(s, _)| s), Some(90));
    }

    #[test]
    fn test_tomorrow() {
        assert_eq!(find_time("tomorrow", now()).unwrap().at, at(2025, 6, 12, 9, 0));
        assert_eq!(find_time("tomorrow at 3pm", now()).unwrap().at, at(2025, 6, 12, 15, 0));
        assert_eq!(find_time("tomorrow at 7", now()).unwrap().at, at(2025, 6, 12, 7, 0));
    }

    #[test]
    fn test_strip_split_expression() {
        let text = "remind me tomorrow to submit the report at 9am";
        let m = find_time(text, now()).unwrap();
        assert_eq!(m.strip_from(text), "remind me to submit the report");
    }

    #[test]
    fn test_weekdays() {
        // Wednesday now; next friday is two days out
        assert_eq!(find_time("next friday at 2pm", now()).unwrap().at, at(2025, 6, 13, 14, 0));
        // same weekday rolls a full week
        assert_eq!(find_time("on wednesday", now()).unwrap().at, at(2025, 6, 18, 9, 0));
        assert_eq!(find_time("monday", now()).unwrap().at, at(2025, 6, 16, 9, 0));
    }

    #[test]
    fn test_month_day() {
        assert_eq!(find_time("on june 20 at 3pm", now()).unwrap().at, at(2025, 6, 20, 15, 0));
        assert_eq!(find_time("jan 5th", now()).unwrap().at, at(2026, 1, 5, 9, 0));
        assert!(find_time("february 30", now()).is_none());
    }

    #[test]
    fn test_bare_clock() {
        assert_eq!(find_time("at 5pm", now()).unwrap().at, at(2025, 6, 11, 17, 0));
        assert_eq!(find_time("6:30am", now()).unwrap().at, at(2025, 6, 12, 6, 30));
        assert_eq!(find_time("17:45", now()).unwrap().at, at(2025, 6, 11, 17, 45));
        // 7am already passed, so "at 7" means this evening
        assert_eq!(find_time("at 7", now()).unwrap().at, at(2025, 6, 11, 19, 0));
        assert_eq!(find_time("at 11", now()).unwrap().at, at(2025, 6, 11, 11, 0));
    }

    #[test]
    fn test_plain_numbers_are_not_times() {
        assert!(find_time("call 5 people", now()).is_none());
        assert!(find_time("buy milk", now()).is_none());
    }

    #[test]
    fn test_duration() {
        assert_eq!(find_duration("set a timer for 10 minutes").unwrap().0, 600);
        assert_eq!(find_duration("timer 90 seconds").unwrap().0, 90);
        assert_eq!(find_duration("an hour").unwrap().0, 3600);
        assert!(find_duration("set a timer").is_none());
        assert!(find_duration("0 minutes").is_none());
    }

    #[test]
    fn test_recurrence() {
        let (r, p) = find_recurrence("remind me every day at 9am", now()).unwrap();
        assert_eq!(r, Recurrence::Daily);
        assert_eq!(p, "every day");
        assert_eq!(find_recurrence("every weekday at 7", now()).unwrap().0, Recurrence::Weekdays);
        let (r, _) = find_recurrence("every monday", now()).unwrap();
        assert_eq!(r.tag_value(), "weekly_0");
        assert_eq!(find_recurrence("weekly", now()).unwrap().0.tag_value(), "weekly_2");
        assert!(find_recurrence("tomorrow", now()).is_none());
    }

    #[test]
    fn test_next_weekday_at() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(next_weekday_at(now(), Weekday::Mon, nine), at(2025, 6, 16, 9, 0));
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        assert_eq!(next_weekday_at(now(), Weekday::Wed, noon), at(2025, 6, 11, 12, 0));
        assert_eq!(next_weekday_at(now(), Weekday::Wed, nine), at(2025, 6, 18, 9, 0));
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_tag_time(at(2025, 6, 11, 17, 5)), "2025-06-11T17:05:00");
        assert_eq!(describe(at(2025, 6, 11, 17, 5), now()), "at 5:05 PM");
        assert_eq!(describe(at(2025, 6, 12, 9, 0), now()), "tomorrow at 9:00 AM");
        assert_eq!(describe(at(2025, 6, 20, 15, 0), now()), "Friday, June 20 at 3:00 PM");
        assert_eq!(describe_duration(600), "10 minutes");
        assert_eq!(describe_duration(5400), "1 hour 30 minutes");
        assert_eq!(describe_duration(1), "1 second");
    }
}
