//! Window manipulation.
//!
//! Compiles `###WINDOW: action=<verb> [target=..] [position=..] ...`.
//! Named targets are checked through the window locator before a tag is
//! built; "this" and "it" address the focused window and skip the lookup.

use super::apps::{list_items, spoken_list};
use super::device::explicit_domain;
use super::{CommandDomain, CommandEnv, Compiled};
use crate::normalize::Utterance;
use crate::phrases::Phrase;
use seven_shared::{CommandTag, TagKind};

/// Target value for the focused window
pub const FOCUSED: &str = "focused";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Split,
    Stack,
    Quad,
}

impl LayoutMode {
    fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Split => "split",
            LayoutMode::Stack => "stack",
            LayoutMode::Quad => "quad",
        }
    }
}

/// Window action named by an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Focus,
    Minimize,
    Maximize,
    Restore,
    Snap,
    MoveMonitor,
    Layout(LayoutMode),
    Swap,
    Center,
    CloseWindow,
    Pin,
    Unpin,
    Fullscreen,
    Transparent,
    Solid,
    MinimizeAll,
    ShowDesktop,
    Undo,
    List,
}

impl WindowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowAction::Focus => "focus",
            WindowAction::Minimize => "minimize",
            WindowAction::Maximize => "maximize",
            WindowAction::Restore => "restore",
            WindowAction::Snap => "snap",
            WindowAction::MoveMonitor => "move_monitor",
            WindowAction::Layout(_) => "layout",
            WindowAction::Swap => "swap",
            WindowAction::Center => "center",
            WindowAction::CloseWindow => "close_window",
            WindowAction::Pin => "pin",
            WindowAction::Unpin => "unpin",
            WindowAction::Fullscreen => "fullscreen",
            WindowAction::Transparent => "transparent",
            WindowAction::Solid => "solid",
            WindowAction::MinimizeAll => "minimize_all",
            WindowAction::ShowDesktop => "show_desktop",
            WindowAction::Undo => "undo",
            WindowAction::List => "list",
        }
    }
}

const PRONOUNS: &[&str] = &["this", "it", "that", "current", "focused", "active"];
const MONITOR_WORDS: &[&str] = &["monitor", "screen", "display"];
const POSITION_WORDS: &[&str] = &["left", "right", "top", "bottom"];
const LAYOUT_VERBS: &[&str] = &["split", "tile", "arrange", "stack"];
const ADJUST_VERBS: &[&str] = &["make", "set", "turn", "change"];

/// Words that never belong to a window name
const FILLER: &[&str] = &[
    "the", "a", "an", "my", "window", "windows", "app", "to", "on", "onto", "of", "please", "can",
    "you", "make", "set", "turn", "change", "go", "put", "move", "send", "throw", "snap", "focus",
    "switch", "minimize", "minimise", "maximize", "maximise", "restore", "center", "centre", "pin",
    "unpin", "swap", "split", "tile", "arrange", "stack", "close", "keep", "always", "top", "bottom",
    "left", "right", "side", "by", "more", "less", "transparent", "transparency", "opacity", "solid",
    "opaque", "see", "through", "fullscreen", "full", "screen", "monitor", "display", "percent",
    "first", "second", "third", "fourth", "other", "next", "main", "primary", "secondary", "in",
    "middle", "half", "corner", "quad", "grid", "layout", "and", "with", "places", "up", "bring",
    "stop", "keeping", "not", "anymore", "no", "longer",
];

/// Classify the window action, if any
pub fn classify(u: &Utterance) -> Option<WindowAction> {
    let first = u.first_token();
    let has_position = u.has_any_token(POSITION_WORDS);
    let has_monitor = u.has_any_token(MONITOR_WORDS);

    if matches!(first, "minimize" | "minimise") && u.has_any_token(&["all", "everything"]) {
        return Some(WindowAction::MinimizeAll);
    }
    if u.has_token("desktop") && u.has_any_token(&["show", "go", "take", "see"]) {
        return Some(WindowAction::ShowDesktop);
    }
    if u.has_token("windows") && matches!(first, "list" | "show" | "what" | "whats" | "which") {
        return Some(WindowAction::List);
    }
    if first == "undo" {
        return Some(WindowAction::Undo);
    }
    if first == "close"
        && (u.has_token("window") || matches!(u.text.as_str(), "close this" | "close it" | "close that"))
    {
        return Some(WindowAction::CloseWindow);
    }
    if LAYOUT_VERBS.contains(&first) || u.has_phrase("side by side") || u.has_phrase("four corners") {
        return Some(WindowAction::Layout(layout_mode(u)));
    }
    if first == "swap" {
        return Some(WindowAction::Swap);
    }
    if first == "unpin" || u.has_phrase("not on top") || u.has_phrase("stop keeping") {
        return Some(WindowAction::Unpin);
    }
    if first == "pin" || (u.has_phrase("on top") && matches!(first, "keep" | "put" | "make" | "set" | "always")) {
        return Some(WindowAction::Pin);
    }
    if ADJUST_VERBS.contains(&first) {
        if u.has_any_token(&["transparent", "transparency", "opacity"]) || u.has_phrase("see through") {
            return Some(WindowAction::Transparent);
        }
        if u.has_any_token(&["solid", "opaque"]) {
            return Some(WindowAction::Solid);
        }
    }
    if u.has_token("fullscreen") || (u.has_phrase("full screen") && matches!(first, "make" | "go" | "put" | "set")) {
        return Some(WindowAction::Fullscreen);
    }
    if matches!(first, "center" | "centre") {
        return Some(WindowAction::Center);
    }
    if matches!(first, "move" | "send" | "throw" | "put") && has_monitor {
        return Some(WindowAction::MoveMonitor);
    }
    if first == "snap" || (matches!(first, "move" | "put") && has_position) {
        return Some(WindowAction::Snap);
    }
    match first {
        "minimize" | "minimise" => return Some(WindowAction::Minimize),
        "maximize" | "maximise" => return Some(WindowAction::Maximize),
        "restore" => return Some(WindowAction::Restore),
        "focus" => return Some(WindowAction::Focus),
        _ => {}
    }
    if (u.starts_with_phrase("switch to") || u.starts_with_phrase("bring up")) && explicit_domain(u).is_none() {
        return Some(WindowAction::Focus);
    }
    None
}

fn layout_mode(u: &Utterance) -> LayoutMode {
    if u.has_any_token(&["quad", "grid", "corners"]) {
        LayoutMode::Quad
    } else if u.first_token() == "stack" || u.has_any_phrase(&["top and bottom", "on top of each other"]) {
        LayoutMode::Stack
    } else {
        LayoutMode::Split
    }
}

/// Snap position in executor form ("top-left")
pub fn position(u: &Utterance) -> Option<String> {
    let vertical = ["top", "bottom"].into_iter().find(|w| u.has_token(w));
    let horizontal = ["left", "right"].into_iter().find(|w| u.has_token(w));
    match (vertical, horizontal) {
        (Some(v), Some(h)) => Some(format!("{}-{}", v, h)),
        (Some(v), None) => Some(v.to_string()),
        (None, Some(h)) => Some(h.to_string()),
        (None, None) if u.has_phrase("full screen") || u.has_phrase("whole screen") => Some("full".to_string()),
        (None, None) => None,
    }
}

/// Zero-based monitor index; spoken numbers are one-based
pub fn monitor_index(u: &Utterance) -> usize {
    for pair in u.tokens.windows(2) {
        if MONITOR_WORDS.contains(&pair[0].as_str()) {
            if let Ok(n) = pair[1].parse::<usize>() {
                return n.saturating_sub(1);
            }
        }
    }
    if u.has_any_token(&["first", "main", "primary"]) {
        0
    } else if u.has_token("third") {
        2
    } else if u.has_token("fourth") {
        3
    } else {
        1
    }
}

/// Named target, `FOCUSED` for pronouns, `None` when nothing is named
fn single_target(u: &Utterance) -> Option<String> {
    if u.has_any_token(PRONOUNS) {
        return Some(FOCUSED.to_string());
    }
    let name: Vec<&str> = u
        .tokens
        .iter()
        .map(String::as_str)
        .filter(|t| !FILLER.contains(t) && t.parse::<u32>().is_err())
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name.join(" "))
    }
}

/// Opacity parameter: absolute percent or a relative step
fn opacity(u: &Utterance) -> (&'static str, String) {
    if let Some(n) = super::first_number(u) {
        let n = n.clamp(0, 100);
        // "30 percent transparent" is 70 percent opaque
        let opaque = if u.has_any_token(&["transparent", "transparency"]) && !u.has_token("opacity") {
            100 - n
        } else {
            n
        };
        return ("opacity", opaque.clamp(10, 100).to_string());
    }
    if u.has_token("more") {
        return ("delta", "more".to_string());
    }
    if u.has_token("less") {
        return ("delta", "less".to_string());
    }
    ("opacity", "80".to_string())
}

fn spoken(target: &str) -> String {
    if target == FOCUSED {
        "this window".to_string()
    } else {
        target.to_string()
    }
}

/// Window manipulation domain
pub struct WindowDomain;

impl WindowDomain {
    /// Resolve and verify a single target; missing defaults to focused
    fn checked_target(&self, u: &Utterance, env: &CommandEnv, required: bool) -> Result<String, Compiled> {
        let target = match single_target(u) {
            Some(t) => t,
            None if required => {
                return Err(Compiled::Clarify("Which window do you mean?".to_string()));
            }
            None => FOCUSED.to_string(),
        };
        if target == FOCUSED {
            return Ok(target);
        }
        match env.windows.find(&target) {
            Some(title) => {
                tracing::debug!(target = %target, title = %title, "window located");
                Ok(target)
            }
            None => Err(Compiled::Clarify(format!("I couldn't find a window called {}.", target))),
        }
    }

    fn checked_list(&self, u: &Utterance, env: &CommandEnv, min: usize) -> Result<Vec<String>, Compiled> {
        let targets = list_items(&u.raw, FILLER);
        if targets.len() < min {
            return Err(Compiled::Clarify(format!(
                "Name at least {} windows for that.",
                if min == 2 { "two" } else { "some" }
            )));
        }
        let missing: Vec<String> = targets.iter().filter(|t| env.windows.find(t).is_none()).cloned().collect();
        if !missing.is_empty() {
            return Err(Compiled::Clarify(format!("I couldn't find {}.", spoken_list(&missing))));
        }
        Ok(targets)
    }

    fn build(&self, action: WindowAction, u: &Utterance, env: &CommandEnv) -> Result<Compiled, Compiled> {
        let picker = env.picker;
        let tag = CommandTag::new(TagKind::Window).with("action", action.as_str());

        match action {
            WindowAction::MinimizeAll | WindowAction::ShowDesktop | WindowAction::Undo | WindowAction::List => {
                let phrase = match action {
                    WindowAction::MinimizeAll => Phrase::WindowMinimizeAll,
                    WindowAction::ShowDesktop => Phrase::WindowShowDesktop,
                    WindowAction::Undo => Phrase::WindowUndo,
                    _ => Phrase::WindowList,
                };
                Ok(Compiled::tags(picker.say(phrase, &[]), vec![tag]))
            }
            WindowAction::Layout(mode) => {
                let targets = self.checked_list(u, env, 2)?;
                let spoken_targets = spoken_list(&targets);
                let tag = tag.with("mode", mode.as_str()).with("targets", &targets.join(","));
                let speech = picker.say(Phrase::WindowLayout, &[("target", &spoken_targets)]);
                Ok(Compiled::tags(speech, vec![tag]))
            }
            WindowAction::Swap => {
                let targets = self.checked_list(u, env, 2)?;
                let pair = &targets[..2];
                let spoken_targets = spoken_list(pair);
                let tag = tag.with("targets", &pair.join(","));
                let speech = picker.say(Phrase::WindowSwap, &[("target", &spoken_targets)]);
                Ok(Compiled::tags(speech, vec![tag]))
            }
            WindowAction::Snap => {
                let Some(pos) = position(u) else {
                    return Err(Compiled::Clarify(
                        "Where should it go? Left, right, top, bottom or a corner.".to_string(),
                    ));
                };
                let target = self.checked_target(u, env, false)?;
                let value = pos.replace('-', " ");
                let speech = picker.say(Phrase::WindowSnap, &[("target", &spoken(&target)), ("value", &value)]);
                let mut tag = tag.with("target", &target).with("position", &pos);
                if u.has_any_token(&["monitor", "display"]) {
                    tag = tag.with("monitor", &monitor_index(u).to_string());
                }
                Ok(Compiled::tags(speech, vec![tag]))
            }
            WindowAction::MoveMonitor => {
                let target = self.checked_target(u, env, false)?;
                let index = monitor_index(u);
                let shown = (index + 1).to_string();
                let speech = picker.say(
                    Phrase::WindowMoveMonitor,
                    &[("target", &spoken(&target)), ("value", &shown)],
                );
                let tag = tag.with("target", &target).with("monitor", &index.to_string());
                Ok(Compiled::tags(speech, vec![tag]))
            }
            WindowAction::Transparent => {
                let target = self.checked_target(u, env, false)?;
                let (key, value) = opacity(u);
                let speech = picker.say(Phrase::WindowTransparent, &[("target", &spoken(&target))]);
                let tag = tag.with("target", &target).with(key, &value);
                Ok(Compiled::tags(speech, vec![tag]))
            }
            WindowAction::CloseWindow => {
                let target = self.checked_target(u, env, false)?;
                let speech = if target == FOCUSED {
                    picker.say(Phrase::WindowClose, &[])
                } else {
                    picker.say(Phrase::Close, &[("target", &target)])
                };
                Ok(Compiled::tags(speech, vec![tag.with("target", &target)]))
            }
            other => {
                let required = other == WindowAction::Focus;
                let target = self.checked_target(u, env, required)?;
                let phrase = match other {
                    WindowAction::Focus => Phrase::WindowFocus,
                    WindowAction::Minimize => Phrase::WindowMinimize,
                    WindowAction::Maximize => Phrase::WindowMaximize,
                    WindowAction::Restore => Phrase::WindowRestore,
                    WindowAction::Center => Phrase::WindowCenter,
                    WindowAction::Pin => Phrase::WindowPin,
                    WindowAction::Unpin => Phrase::WindowUnpin,
                    WindowAction::Fullscreen => Phrase::WindowFullscreen,
                    _ => Phrase::WindowSolid,
                };
                let speech = picker.say(phrase, &[("target", &spoken(&target))]);
                Ok(Compiled::tags(speech, vec![tag.with("target", &target)]))
            }
        }
    }
}

impl CommandDomain for WindowDomain {
    fn name(&self) -> &'static str {
        "window"
    }

    fn detect(&self, u: &Utterance, _env: &CommandEnv) -> bool {
        classify(u).is_some()
    }

    fn compile(&self, u: &Utterance, env: &CommandEnv) -> Compiled {
        let Some(action) = classify(u) else {
            return Compiled::Clarify("I'm not sure what to do with that window.".to_string());
        };
        tracing::debug!(action = action.as_str(), "window action classified");
        match self.build(action, u, env) {
            Ok(compiled) | Err(compiled) => compiled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::collaborators::KnownWindows;
    use crate::normalize::normalize;
    use crate::phrases::PhrasePicker;
    use crate::session::SessionStore;
    use chrono::NaiveDate;

    fn run(text: &str) -> Compiled {
        let picker = PhrasePicker::seeded(4);
        let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap());
        let sessions = SessionStore::new(None);
        let windows = KnownWindows::new(["Google Chrome", "Visual Studio Code", "Spotify Premium"]);
        let env = CommandEnv {
            picker: &picker,
            clock: &clock,
            windows: &windows,
            sessions: &sessions,
        };
        WindowDomain.compile(&normalize(text), &env)
    }

    fn tag(c: Compiled) -> CommandTag {
        match c {
            Compiled::Tags { mut tags, .. } => tags.remove(0),
            Compiled::Clarify(t) => panic!("expected a tag, got {:?}", t),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&normalize("minimize everything")), Some(WindowAction::MinimizeAll));
        assert_eq!(classify(&normalize("show me the desktop")), Some(WindowAction::ShowDesktop));
        assert_eq!(classify(&normalize("close this window")), Some(WindowAction::CloseWindow));
        assert_eq!(classify(&normalize("switch to chrome")), Some(WindowAction::Focus));
        assert_eq!(classify(&normalize("switch to light mode")), None);
        assert_eq!(classify(&normalize("close chrome")), None);
        assert_eq!(classify(&normalize("keep spotify on top")), Some(WindowAction::Pin));
        assert_eq!(classify(&normalize("what windows are open")), Some(WindowAction::List));
        assert_eq!(classify(&normalize("tell me about windows")), None);
    }

    #[test]
    fn test_snap_with_known_window() {
        let t = tag(run("snap chrome left"));
        assert_eq!(t.get("action"), Some("snap"));
        assert_eq!(t.get("target"), Some("chrome"));
        assert_eq!(t.get("position"), Some("left"));
    }

    #[test]
    fn test_snap_unknown_window() {
        match run("snap notepad left") {
            Compiled::Clarify(text) => assert!(text.contains("notepad")),
            other => panic!("expected clarification, got {:?}", other),
        }
    }

    #[test]
    fn test_corner_and_pronoun() {
        let t = tag(run("snap it to the top right"));
        assert_eq!(t.get("target"), Some(FOCUSED));
        assert_eq!(t.get("position"), Some("top-right"));
    }

    #[test]
    fn test_snap_needs_position() {
        assert!(matches!(run("snap chrome"), Compiled::Clarify(_)));
    }

    #[test]
    fn test_move_monitor() {
        let t = tag(run("move chrome to monitor 2"));
        assert_eq!(t.get("action"), Some("move_monitor"));
        assert_eq!(t.get("monitor"), Some("1"));
        let t = tag(run("send spotify to the main screen"));
        assert_eq!(t.get("monitor"), Some("0"));
    }

    #[test]
    fn test_layout_and_swap() {
        let t = tag(run("put chrome and code side by side"));
        assert_eq!(t.get("action"), Some("layout"));
        assert_eq!(t.get("mode"), Some("split"));
        assert_eq!(t.get_list("targets"), vec!["chrome", "code"]);

        let t = tag(run("swap chrome and spotify"));
        assert_eq!(t.get("targets"), Some("chrome,spotify"));

        assert!(matches!(run("swap chrome and notepad"), Compiled::Clarify(_)));
        assert!(matches!(run("split chrome"), Compiled::Clarify(_)));
    }

    #[test]
    fn test_transparency() {
        let t = tag(run("make chrome 30 percent transparent"));
        assert_eq!(t.get("opacity"), Some("70"));
        let t = tag(run("make it more transparent"));
        assert_eq!(t.get("delta"), Some("more"));
        let t = tag(run("make chrome solid"));
        assert_eq!(t.get("action"), Some("solid"));
    }

    #[test]
    fn test_focus_requires_target() {
        assert!(matches!(run("focus"), Compiled::Clarify(_)));
        let t = tag(run("switch to visual studio code"));
        assert_eq!(t.get("target"), Some("visual_studio_code"));
    }

    #[test]
    fn test_parameterless_actions() {
        assert_eq!(tag(run("undo that")).encode(), "###WINDOW: action=undo");
        assert_eq!(tag(run("minimize all windows")).get("action"), Some("minimize_all"));
    }
}
