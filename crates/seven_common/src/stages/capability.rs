//! "What can you do" questions.
//!
//! The question is narrowed to a sub-domain by keyword and rewritten into
//! an instruction that lists only the matching capability facts, so the
//! model phrases the answer freshly each time without inventing features.

use super::{Flow, Services, Stage, TurnContext};
use crate::normalize::Utterance;

const TRIGGERS: &[&str] = &[
    "what can you do",
    "what else can you do",
    "what are your capabilities",
    "what are you capable of",
    "what are your features",
    "how can you help",
    "what do you do",
    "can you control",
    "what can you control",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityTopic {
    Windows,
    Apps,
    Device,
    General,
}

const WINDOW_FACTS: &[&str] = &[
    "I can minimize, maximize, restore, center and focus any open window.",
    "I can snap windows to a side or corner of the screen and move them between monitors.",
    "I can arrange several windows side by side, stacked or in a grid, and swap two of them.",
    "I can pin a window on top, make it fullscreen or see-through, and undo the last change.",
];

const APP_FACTS: &[&str] = &[
    "I can open and close applications by name, several at once.",
    "I can close every instance of an app in one go.",
];

const DEVICE_FACTS: &[&str] = &[
    "I can change the volume and screen brightness, or mute and unmute.",
    "I can switch wifi, bluetooth, airplane mode, dark mode, night light and do not disturb.",
    "I can play, pause and skip music and tell you how much battery is left.",
];

const GENERAL_FACTS: &[&str] = &[
    "I can open and close apps and manage your windows.",
    "I can control volume, brightness, wifi, bluetooth and media playback.",
    "I can set alarms, reminders, timers and calendar events.",
    "I remember what you tell me and use it in later conversations.",
    "I run entirely on this computer; nothing is sent to the cloud.",
];

impl CapabilityTopic {
    pub fn classify(u: &Utterance) -> Self {
        if u.has_any_token(&["window", "windows", "snap", "minimize", "maximize", "monitor", "screen", "layout"]) {
            CapabilityTopic::Windows
        } else if u.has_any_token(&["app", "apps", "application", "applications", "program", "programs", "open", "launch"]) {
            CapabilityTopic::Apps
        } else if u.has_any_token(&[
            "volume", "brightness", "wifi", "bluetooth", "music", "media", "battery", "settings", "system", "device",
        ]) {
            CapabilityTopic::Device
        } else {
            CapabilityTopic::General
        }
    }

    pub fn facts(self) -> &'static [&'static str] {
        match self {
            CapabilityTopic::Windows => WINDOW_FACTS,
            CapabilityTopic::Apps => APP_FACTS,
            CapabilityTopic::Device => DEVICE_FACTS,
            CapabilityTopic::General => GENERAL_FACTS,
        }
    }
}

pub fn is_capability_question(u: &Utterance) -> bool {
    TRIGGERS.iter().any(|t| u.has_phrase(t))
}

/// Instruction that replaces the user's line in the prompt
pub fn instruction(question: &str, topic: CapabilityTopic) -> String {
    let facts: Vec<String> = topic.facts().iter().map(|f| format!("- {}", f)).collect();
    format!(
        "The user asked: \"{}\". Answer using only these facts about yourself:\n{}\nSummarize them naturally in your own words. No bullet points, no lists.",
        question.trim(),
        facts.join("\n")
    )
}

pub struct CapabilityStage;

impl Stage for CapabilityStage {
    fn name(&self) -> &'static str {
        "capability"
    }

    fn run(&self, ctx: &mut TurnContext, _services: &Services) -> Flow {
        if !is_capability_question(&ctx.utterance) {
            return Flow::Continue;
        }
        let topic = CapabilityTopic::classify(&ctx.utterance);
        tracing::debug!(?topic, "capability question");
        // a question about commands is not a command
        ctx.capability = true;
        ctx.command_like = false;
        ctx.prompt_line = instruction(&ctx.utterance.raw, topic);
        Flow::Continue
    }
}
