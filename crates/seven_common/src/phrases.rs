//! Spoken phrase pools.
//!
//! Acknowledgments and small-talk answers are drawn from small pools so
//! repeated commands don't sound robotic. Selection goes through an
//! injectable random source; tests seed it and assert exact output.
//!
//! Templates use `{name}`, `{persona}`, `{creator}`, `{greeting}`,
//! `{target}`, `{value}`, `{when}` and `{what}` placeholders.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Mutex;

/// Speaker asked their own name but never gave it
pub const NAME_UNKNOWN: &str = "You haven't told me your name yet.";

/// Personal question with nothing in memory
pub const NOT_TOLD_YET: &str = "You haven't told me that yet.";

/// First repeat of the same question
pub const JUST_ASKED: &str = "You just asked me that. Same answer.";

/// Second and later repeats of the same question
pub const ASKED_BEFORE: &str = "You've asked me this multiple times now. My answer hasn't changed.";

/// Filler for an empty model answer
pub const LISTENING: &str = "Listening.";

/// Anything unexpected at the dispatcher boundary
pub const RECOVERY: &str = "Something went wrong on my end, but I'm still here. Try that again.";

/// Name capture matched but nothing followed "is"
pub const NAME_MISSING: &str = "I didn't catch your name. Say it like 'my name is Alex'.";

/// Event a phrase is chosen for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phrase {
    NameAck,
    SelfIdentity,
    WhatAreYou,
    CallMe,
    UserIdentity,
    Greeting,
    GreetingAnon,
    Farewell,
    FarewellAnon,
    Creator,
    RepeatSelf,
    RepeatUser,
    RepeatCreator,
    Open,
    Close,
    CloseAll,
    WindowFocus,
    WindowMinimize,
    WindowMaximize,
    WindowRestore,
    WindowSnap,
    WindowMoveMonitor,
    WindowLayout,
    WindowSwap,
    WindowCenter,
    WindowClose,
    WindowPin,
    WindowUnpin,
    WindowFullscreen,
    WindowTransparent,
    WindowSolid,
    WindowMinimizeAll,
    WindowShowDesktop,
    WindowUndo,
    WindowList,
    LevelUp,
    LevelDown,
    LevelSet,
    Mute,
    Unmute,
    StatusCheck,
    ToggleOn,
    ToggleOff,
    MediaPlayPause,
    MediaNext,
    MediaPrev,
    MediaStop,
    AlarmSet,
    ReminderSet,
    TimerSet,
    EventSet,
    ScheduleCancel,
    ScheduleList,
    TimerRemaining,
}

impl Phrase {
    /// The fixed pool for this event
    pub fn pool(self) -> &'static [&'static str] {
        match self {
            Phrase::NameAck => &[
                "Understood. You are {name}.",
                "Got it. I'll call you {name}.",
                "Nice to meet you, {name}.",
            ],
            Phrase::SelfIdentity => &[
                "I am {persona}. You can call me {persona}.",
                "I'm {persona}, your personal assistant.",
                "The name's {persona}.",
            ],
            Phrase::WhatAreYou => &[
                "I am {persona}, your personal AI assistant.",
                "I'm {persona}, an assistant that runs right here on your PC.",
            ],
            Phrase::CallMe => &["You can call me {persona}.", "Just {persona} is fine."],
            Phrase::UserIdentity => &["You are {name}.", "You're {name}.", "{name}, of course."],
            Phrase::Greeting => &[
                "{greeting}, {name}.",
                "{greeting}, {name}. What do you need?",
                "{greeting}, {name}. I'm here.",
            ],
            Phrase::GreetingAnon => &["{greeting}.", "{greeting}. What do you need?", "{greeting}. I'm here."],
            Phrase::Farewell => &["Later, {name}.", "See you, {name}.", "Take care, {name}."],
            Phrase::FarewellAnon => &["Later.", "See you.", "Take care."],
            Phrase::Creator => &["{creator} made me.", "I was built by {creator}.", "{creator} created me."],
            Phrase::RepeatSelf => &[
                "Still {persona}. That hasn't changed.",
                "Same as before. I'm {persona}.",
            ],
            Phrase::RepeatUser => &["Still {name}, last I checked.", "You're still {name}."],
            Phrase::RepeatCreator => &[
                "Still {creator}. That hasn't changed.",
                "{creator} made me, same as before.",
            ],
            Phrase::Open => &["Opening {target}.", "On it, launching {target}.", "Starting {target} now."],
            Phrase::Close => &["Closing {target}.", "Shutting {target} down.", "Done with {target}, closing it."],
            Phrase::CloseAll => &["Closing every {target} window.", "Shutting down all of {target}."],
            Phrase::WindowFocus => &["Switching to {target}.", "Bringing up {target}."],
            Phrase::WindowMinimize => &["Minimizing {target}.", "Tucking {target} away."],
            Phrase::WindowMaximize => &["Maximizing {target}.", "Making {target} full size."],
            Phrase::WindowRestore => &["Restoring {target}.", "Bringing {target} back."],
            Phrase::WindowSnap => &["Snapping {target} {value}.", "Moving {target} to the {value}."],
            Phrase::WindowMoveMonitor => &["Moving {target} to monitor {value}.", "Sending {target} to screen {value}."],
            Phrase::WindowLayout => &["Arranging {target}.", "Setting up {target}."],
            Phrase::WindowSwap => &["Swapping {target}.", "Switching places for {target}."],
            Phrase::WindowCenter => &["Centering {target}.", "Putting {target} in the middle."],
            Phrase::WindowClose => &["Closing this window.", "Closing it."],
            Phrase::WindowPin => &["Pinning {target} on top.", "Keeping {target} on top."],
            Phrase::WindowUnpin => &["Unpinning {target}.", "{target} no longer stays on top."],
            Phrase::WindowFullscreen => &["Going fullscreen with {target}.", "Making {target} fullscreen."],
            Phrase::WindowTransparent => &["Adjusting {target} transparency.", "Changing how see-through {target} is."],
            Phrase::WindowSolid => &["Making {target} solid again.", "Removing the transparency from {target}."],
            Phrase::WindowMinimizeAll => &["Minimizing everything.", "Clearing the screen."],
            Phrase::WindowShowDesktop => &["Here's your desktop.", "Showing the desktop."],
            Phrase::WindowUndo => &["Undoing that.", "Putting it back."],
            Phrase::WindowList => &["Here's what's open.", "Checking your windows."],
            Phrase::LevelUp => &["Turning {target} up.", "Bumping {target} up."],
            Phrase::LevelDown => &["Turning {target} down.", "Bringing {target} down."],
            Phrase::LevelSet => &["Setting {target} to {value} percent.", "{target} at {value} percent."],
            Phrase::Mute => &["Muted.", "Going quiet."],
            Phrase::Unmute => &["Unmuted.", "Sound's back."],
            Phrase::StatusCheck => &["Checking {target}.", "Let me look at {target}."],
            Phrase::ToggleOn => &["Turning {target} on.", "{target} on."],
            Phrase::ToggleOff => &["Turning {target} off.", "{target} off."],
            Phrase::MediaPlayPause => &["Toggling playback.", "Got it."],
            Phrase::MediaNext => &["Skipping ahead.", "Next track."],
            Phrase::MediaPrev => &["Going back a track.", "Previous track."],
            Phrase::MediaStop => &["Stopping playback.", "Music stopped."],
            Phrase::AlarmSet => &["Alarm set {when}.", "I'll wake you {when}."],
            Phrase::ReminderSet => &["I'll remind you {when}.", "Reminder set {when}: {what}."],
            Phrase::TimerSet => &["Timer set for {when}.", "Starting a {when} timer."],
            Phrase::EventSet => &["Added {what} {when}.", "{what} is on the calendar {when}."],
            Phrase::ScheduleCancel => &["Cancelling that.", "Consider it cancelled."],
            Phrase::ScheduleList => &["Here's what's coming up.", "Checking your schedule."],
            Phrase::TimerRemaining => &["Checking your timer.", "Let me see how long is left."],
        }
    }
}

/// Picks phrases from pools with an injectable random source
pub struct PhrasePicker {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl PhrasePicker {
    pub fn new(rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Picker seeded from the OS
    pub fn from_entropy() -> Self {
        Self::new(Box::new(StdRng::from_entropy()))
    }

    /// Deterministic picker
    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(StdRng::seed_from_u64(seed)))
    }

    /// Choose one element of a pool
    pub fn pick<'a>(&self, pool: &[&'a str]) -> &'a str {
        if pool.is_empty() {
            return "";
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        pool[rng.gen_range(0..pool.len())]
    }

    /// Choose a phrase for an event and fill its placeholders
    pub fn say(&self, phrase: Phrase, vars: &[(&str, &str)]) -> String {
        capitalize(&fill(self.pick(phrase.pool()), vars))
    }
}

impl Default for PhrasePicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Replace `{key}` placeholders
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

/// Upper-case the first letter
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
