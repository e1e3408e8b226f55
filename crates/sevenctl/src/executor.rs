//! Tag executors for the console.
//!
//! The console has no window manager, mixer or scheduler behind it, so the
//! default executor only describes what it would do.

use owo_colors::OwoColorize;
use seven_shared::{CommandTag, SevenError, TagKind, TARGET_KEY};
use std::io::Write;

pub trait Executor {
    /// Carry out one tag, writing a report line per action
    fn execute(&self, tag: &CommandTag, out: &mut dyn Write) -> Result<(), SevenError>;
}

/// Prints each action instead of performing it
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    color: bool,
}

impl DryRunExecutor {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Human-readable actions for one tag
    pub fn describe(tag: &CommandTag) -> Result<Vec<String>, SevenError> {
        let actions: Vec<String> = match tag.kind() {
            TagKind::Open => tag.targets().into_iter().map(|t| format!("open {}", t)).collect(),
            TagKind::Close => {
                let scope = if tag.is_close_all() { "close every" } else { "close" };
                tag.targets().into_iter().map(|t| format!("{} {}", scope, t)).collect()
            }
            TagKind::Search => tag.get(TARGET_KEY).map(|q| format!("search {}", q)).into_iter().collect(),
            TagKind::Look => vec!["look at the screen".to_string()],
            TagKind::Sys | TagKind::Window | TagKind::Sched => {
                let action = tag.require("action")?;
                let rest: Vec<String> = tag
                    .params()
                    .iter()
                    .filter(|(k, _)| k != "action")
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                if rest.is_empty() {
                    vec![action.to_string()]
                } else {
                    vec![format!("{} {}", action, rest.join(" "))]
                }
            }
        };
        if actions.is_empty() {
            return Err(SevenError::NothingToDo(tag.kind()));
        }
        Ok(actions)
    }
}

impl Executor for DryRunExecutor {
    fn execute(&self, tag: &CommandTag, out: &mut dyn Write) -> Result<(), SevenError> {
        let actions = Self::describe(tag)?;
        let kind = format!("{:<6}", tag.kind().as_str());
        for action in actions {
            if self.color {
                writeln!(out, "  {} {} {}", "[dry-run]".dimmed(), kind.cyan(), action)?;
            } else {
                writeln!(out, "  [dry-run] {} {}", kind, action)?;
            }
        }
        Ok(())
    }
}
