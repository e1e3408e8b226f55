//! Device and system settings: volume, brightness, radios, display modes,
//! media keys.
//!
//! Compiles `###SYS: action=<domain>_<verb> [value=N]`. When an utterance
//! names no domain ("turn it up more") the last resolved domain is used,
//! and every successful resolution records its domain for the next turn.

use super::{first_number, CommandDomain, CommandEnv, Compiled};
use crate::normalize::Utterance;
use crate::phrases::Phrase;
use seven_shared::{CommandTag, TagKind};

/// Device-control category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceDomain {
    Volume,
    Brightness,
    Battery,
    Wifi,
    Bluetooth,
    Media,
    DarkMode,
    NightLight,
    DoNotDisturb,
    Airplane,
}

impl DeviceDomain {
    /// Prefix of the tag action
    pub fn action_prefix(&self) -> &'static str {
        match self {
            DeviceDomain::Volume => "volume",
            DeviceDomain::Brightness => "brightness",
            DeviceDomain::Battery => "battery",
            DeviceDomain::Wifi => "wifi",
            DeviceDomain::Bluetooth => "bluetooth",
            DeviceDomain::Media => "media",
            DeviceDomain::DarkMode => "dark_mode",
            DeviceDomain::NightLight => "night_light",
            DeviceDomain::DoNotDisturb => "dnd",
            DeviceDomain::Airplane => "airplane",
        }
    }

    /// Spoken name
    pub fn label(&self) -> &'static str {
        match self {
            DeviceDomain::Volume => "volume",
            DeviceDomain::Brightness => "brightness",
            DeviceDomain::Battery => "the battery",
            DeviceDomain::Wifi => "wifi",
            DeviceDomain::Bluetooth => "bluetooth",
            DeviceDomain::Media => "playback",
            DeviceDomain::DarkMode => "dark mode",
            DeviceDomain::NightLight => "night light",
            DeviceDomain::DoNotDisturb => "do not disturb",
            DeviceDomain::Airplane => "airplane mode",
        }
    }

    fn is_level(&self) -> bool {
        matches!(self, DeviceDomain::Volume | DeviceDomain::Brightness)
    }
}

/// Resolved device action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    Up(Option<u8>),
    Down(Option<u8>),
    Set(u8),
    Mute,
    Unmute,
    Get,
    On,
    Off,
    Status,
    PlayPause,
    Next,
    Prev,
    Stop,
}

const UP_WORDS: &[&str] = &["up", "louder", "brighter", "increase", "raise", "higher", "more", "boost"];
const DOWN_WORDS: &[&str] = &["down", "quieter", "dimmer", "dim", "decrease", "lower", "less", "reduce", "softer"];
const QUERY_WORDS: &[&str] = &["what", "whats", "how", "check", "status", "current", "level", "is"];
const ON_WORDS: &[&str] = &["on", "enable", "activate", "connect"];
const OFF_WORDS: &[&str] = &["off", "disable", "deactivate", "disconnect"];
const ANAPHORA: &[&str] = &["it", "that", "bit", "little"];
const MEDIA_VERBS: &[&str] = &["play", "pause", "resume", "skip", "next", "previous", "prev", "stop"];
const MEDIA_NOUNS: &[&str] = &["music", "song", "track", "playback", "media"];

/// Explicit domain named by the utterance
pub fn explicit_domain(u: &Utterance) -> Option<DeviceDomain> {
    if u.has_any_phrase(&["do not disturb", "dnd", "focus assist"]) {
        return Some(DeviceDomain::DoNotDisturb);
    }
    if u.has_any_phrase(&["airplane mode", "aeroplane mode", "flight mode"]) {
        return Some(DeviceDomain::Airplane);
    }
    if u.has_any_phrase(&["night light", "night mode", "blue light"]) {
        return Some(DeviceDomain::NightLight);
    }
    if u.has_any_phrase(&["dark mode", "light mode", "dark theme"]) {
        return Some(DeviceDomain::DarkMode);
    }
    if u.has_any_token(&["volume", "louder", "quieter", "mute", "unmute"]) {
        return Some(DeviceDomain::Volume);
    }
    if u.has_any_token(&["brightness", "brighter", "dimmer"]) || u.has_phrase("dim the screen") {
        return Some(DeviceDomain::Brightness);
    }
    if u.has_token("battery") {
        return Some(DeviceDomain::Battery);
    }
    if u.has_any_token(&["wifi", "wireless"]) || u.has_phrase("wi fi") {
        return Some(DeviceDomain::Wifi);
    }
    if u.has_token("bluetooth") {
        return Some(DeviceDomain::Bluetooth);
    }
    let media_verb = MEDIA_VERBS.contains(&u.first_token());
    if media_verb && (u.len() == 1 || u.has_any_token(MEDIA_NOUNS)) && u.first_token() != "stop" {
        return Some(DeviceDomain::Media);
    }
    if u.first_token() == "stop" && u.has_any_token(MEDIA_NOUNS) {
        return Some(DeviceDomain::Media);
    }
    None
}

/// Utterance refers back to a previous domain ("turn it down")
fn is_anaphoric(u: &Utterance) -> bool {
    let refers = u.has_any_token(ANAPHORA) || u.first_token() == "more" || u.first_token() == "less";
    let acts = u.has_any_token(UP_WORDS)
        || u.has_any_token(DOWN_WORDS)
        || u.has_any_token(ON_WORDS)
        || u.has_any_token(OFF_WORDS)
        || (u.has_token("set") && first_number(u).is_some());
    refers && acts && u.len() <= 8
}

fn percent(n: i64) -> u8 {
    n.clamp(0, 100) as u8
}

/// Resolve the action for a domain. `None` means a required value is missing.
pub fn resolve_action(domain: DeviceDomain, u: &Utterance) -> Option<DeviceAction> {
    let number = first_number(u);
    match domain {
        DeviceDomain::Battery => Some(DeviceAction::Get),
        DeviceDomain::Media => {
            let action = match u.first_token() {
                "skip" | "next" => DeviceAction::Next,
                "previous" | "prev" => DeviceAction::Prev,
                "stop" => DeviceAction::Stop,
                _ if u.has_any_token(&["previous", "last"]) => DeviceAction::Prev,
                _ => DeviceAction::PlayPause,
            };
            Some(action)
        }
        d if d.is_level() => {
            if d == DeviceDomain::Volume {
                if u.has_token("unmute") {
                    return Some(DeviceAction::Unmute);
                }
                if u.has_token("mute") {
                    return Some(DeviceAction::Mute);
                }
            }
            let wants_set = u.has_any_token(&["set", "to", "at", "percent"]);
            if u.has_any_token(UP_WORDS) && !(wants_set && u.has_token("to")) {
                return Some(DeviceAction::Up(number.map(percent)));
            }
            if u.has_any_token(DOWN_WORDS) && !(wants_set && u.has_token("to")) {
                return Some(DeviceAction::Down(number.map(percent)));
            }
            if let Some(n) = number {
                return Some(DeviceAction::Set(percent(n)));
            }
            if wants_set && u.has_token("set") {
                return None;
            }
            Some(DeviceAction::Get)
        }
        _ => {
            let radio = matches!(domain, DeviceDomain::Wifi | DeviceDomain::Bluetooth);
            if domain == DeviceDomain::DarkMode && u.has_phrase("light mode") {
                return Some(DeviceAction::Off);
            }
            if radio && (QUERY_WORDS.contains(&u.first_token()) || u.has_token("status")) {
                return Some(DeviceAction::Status);
            }
            if u.has_any_token(OFF_WORDS) {
                return Some(DeviceAction::Off);
            }
            if u.has_any_token(ON_WORDS) || !radio {
                return Some(DeviceAction::On);
            }
            Some(DeviceAction::Status)
        }
    }
}

/// Tag and spoken acknowledgment for a resolved action
fn build(domain: DeviceDomain, action: DeviceAction, env: &CommandEnv) -> Compiled {
    let prefix = domain.action_prefix();
    let label = domain.label();
    let picker = env.picker;
    let (verb, value, speech) = match action {
        DeviceAction::Up(step) => ("up", step, picker.say(Phrase::LevelUp, &[("target", label)])),
        DeviceAction::Down(step) => ("down", step, picker.say(Phrase::LevelDown, &[("target", label)])),
        DeviceAction::Set(n) => {
            let shown = n.to_string();
            ("set", Some(n), picker.say(Phrase::LevelSet, &[("target", label), ("value", &shown)]))
        }
        DeviceAction::Mute => ("mute", None, picker.say(Phrase::Mute, &[])),
        DeviceAction::Unmute => ("unmute", None, picker.say(Phrase::Unmute, &[])),
        DeviceAction::Get => ("get", None, picker.say(Phrase::StatusCheck, &[("target", label)])),
        DeviceAction::Status => ("status", None, picker.say(Phrase::StatusCheck, &[("target", label)])),
        DeviceAction::On => ("on", None, picker.say(Phrase::ToggleOn, &[("target", label)])),
        DeviceAction::Off => ("off", None, picker.say(Phrase::ToggleOff, &[("target", label)])),
        DeviceAction::PlayPause => ("play_pause", None, picker.say(Phrase::MediaPlayPause, &[])),
        DeviceAction::Next => ("next", None, picker.say(Phrase::MediaNext, &[])),
        DeviceAction::Prev => ("prev", None, picker.say(Phrase::MediaPrev, &[])),
        DeviceAction::Stop => ("stop", None, picker.say(Phrase::MediaStop, &[])),
    };

    let action_name = match domain {
        DeviceDomain::Battery => prefix.to_string(),
        _ => format!("{}_{}", prefix, verb),
    };

    let mut tag = CommandTag::new(TagKind::Sys).with("action", &action_name);
    if let Some(v) = value {
        tag = tag.with("value", &v.to_string());
    }
    Compiled::tags(speech, vec![tag])
}

/// Device control domain
pub struct DeviceControl;

impl DeviceControl {
    fn domain_for(u: &Utterance, env: &CommandEnv) -> Option<DeviceDomain> {
        explicit_domain(u).or_else(|| {
            if is_anaphoric(u) {
                env.sessions.domain_context()
            } else {
                None
            }
        })
    }
}

impl CommandDomain for DeviceControl {
    fn name(&self) -> &'static str {
        "device"
    }

    fn detect(&self, u: &Utterance, env: &CommandEnv) -> bool {
        Self::domain_for(u, env).is_some()
    }

    fn compile(&self, u: &Utterance, env: &CommandEnv) -> Compiled {
        let Some(domain) = Self::domain_for(u, env) else {
            return Compiled::Clarify("I'm not sure which setting you mean.".to_string());
        };
        match resolve_action(domain, u) {
            Some(action) => {
                env.sessions.set_domain_context(domain);
                tracing::debug!(domain = domain.action_prefix(), ?action, "device action resolved");
                build(domain, action, env)
            }
            None => Compiled::Clarify(format!(
                "What level should I set {} to? Give me a number from 0 to 100.",
                domain.label()
            )),
        }
    }
}
