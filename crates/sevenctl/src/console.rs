//! Text console standing in for the speech loop.

use crate::executor::{DryRunExecutor, Executor};
use crate::gate::{GateEvent, ListenGate};
use anyhow::Result;
use owo_colors::OwoColorize;
use seven_common::Dispatcher;
use seven_shared::{extract, CommandTag, SevenError};
use std::io::{BufRead, Write};
use tracing::warn;

/// Whether the console keeps reading after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

const HELP: &str = "\
/reset            forget this speaker's conversation
/reset-all        forget every speaker's conversation
/speaker <id>     talk as another speaker
/exec <tag>       run one ###KIND: tag through the executor
/quit             leave";

pub struct Console<'a> {
    dispatcher: &'a Dispatcher,
    speaker: String,
    gate: ListenGate,
    executor: Box<dyn Executor + 'a>,
    color: bool,
}

impl<'a> Console<'a> {
    pub fn new(dispatcher: &'a Dispatcher, speaker: &str) -> Self {
        Self {
            dispatcher,
            speaker: speaker.to_string(),
            gate: ListenGate::new(),
            executor: Box::new(DryRunExecutor::new(false)),
            color: false,
        }
    }

    /// Colored output, for both replies and the dry-run executor
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self.executor = Box::new(DryRunExecutor::new(color));
        self
    }

    pub fn with_executor(mut self, executor: Box<dyn Executor + 'a>) -> Self {
        self.executor = executor;
        self
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    /// Read lines until end of input or a quit
    pub fn run(&mut self, input: impl BufRead, out: &mut dyn Write, prompt: bool) -> Result<()> {
        let mut lines = input.lines();
        loop {
            if prompt {
                write!(out, "{}", if self.gate.is_paused() { "(paused) > " } else { "> " })?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            if self.turn(&line?, out)? == Control::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Handle one line of input
    pub fn turn(&mut self, line: &str, out: &mut dyn Write) -> Result<Control> {
        let line = line.trim();
        if line.starts_with('/') {
            return self.command(line, out);
        }

        match self.gate.check(line) {
            GateEvent::Shutdown => {
                self.notice("shutting down", out)?;
                return Ok(Control::Quit);
            }
            GateEvent::Paused => self.notice("paused", out)?,
            GateEvent::Resumed => self.notice("listening", out)?,
            GateEvent::Ignored => {}
            GateEvent::Pass => self.respond(line, out)?,
        }
        Ok(Control::Continue)
    }

    /// Dispatch, print the speech, then hand every tag to the executor
    pub fn respond(&mut self, line: &str, out: &mut dyn Write) -> Result<()> {
        let reply = self.dispatcher.dispatch(line, &self.speaker);
        let parsed = extract(&reply);

        if !parsed.speech.is_empty() {
            let persona = &self.dispatcher.config().persona.name;
            if self.color {
                writeln!(out, "{}: {}", persona.bright_green(), parsed.speech)?;
            } else {
                writeln!(out, "{}: {}", persona, parsed.speech)?;
            }
        }
        if parsed.tags.is_empty() {
            return Ok(());
        }

        let mut success = true;
        for tag in &parsed.tags {
            if let Err(e) = self.executor.execute(tag, out) {
                warn!(tag = %tag, error = %e, "executor failed");
                writeln!(out, "  [failed] {}", e)?;
                success = false;
            }
        }
        self.dispatcher.report_command_result(success);
        Ok(())
    }

    fn command(&mut self, line: &str, out: &mut dyn Write) -> Result<Control> {
        let mut parts = line.split_whitespace();
        match (parts.next().unwrap_or(""), parts.next()) {
            ("/quit" | "/exit", _) => return Ok(Control::Quit),
            ("/reset", _) => {
                self.dispatcher.reset(&self.speaker);
                self.notice("session cleared", out)?;
            }
            ("/reset-all", _) => {
                self.dispatcher.reset_all();
                self.notice("all sessions cleared", out)?;
            }
            ("/speaker", Some(id)) => {
                self.speaker = id.to_string();
                self.notice(&format!("speaker {}", id), out)?;
            }
            ("/exec", Some(_)) => {
                let raw = line.trim_start_matches("/exec").trim();
                if let Err(e) = self.exec_raw(raw, out) {
                    writeln!(out, "  [failed] {} (code {})", e, e.code())?;
                }
            }
            ("/help", _) => writeln!(out, "{}", HELP)?,
            (other, _) => writeln!(out, "unknown command {} (try /help)", other)?,
        }
        Ok(Control::Continue)
    }

    /// Decode a typed tag and hand it straight to the executor
    fn exec_raw(&self, raw: &str, out: &mut dyn Write) -> Result<(), SevenError> {
        let tag = CommandTag::decode(raw)?;
        self.executor.execute(&tag, out)
    }

    fn notice(&self, text: &str, out: &mut dyn Write) -> Result<()> {
        if self.color {
            writeln!(out, "{}", format!("[{}]", text).yellow())?;
        } else {
            writeln!(out, "[{}]", text)?;
        }
        Ok(())
    }
}
