//! Rule stages of the dispatch pipeline.
//!
//! Each stage looks at the turn and either lets it continue or ends it
//! with an outcome. The order of `default_stages()` is the pipeline order;
//! whatever survives every stage goes to the generative fallback.

mod affect;
mod capability;
mod commands;
mod fact_capture;
mod identity;
mod name_capture;
mod no_context;
mod repetition;
mod retrieval;

pub use affect::AffectStage;
pub use capability::CapabilityStage;
pub use commands::CommandStage;
pub use fact_capture::FactCaptureStage;
pub use identity::IdentityStage;
pub use name_capture::NameCaptureStage;
pub use no_context::NoContextStage;
pub use repetition::RepetitionStage;
pub use retrieval::RetrievalStage;

use crate::clock::Clock;
use crate::collaborators::{FactExtractor, FactStore, MemorySearch, Mood, WebFetcher, WebNeedClassifier, WindowLocator};
use crate::commands::{self as command_domains, CommandDomain, CommandEnv};
use crate::config::Config;
use crate::lexicon;
use crate::normalize::Utterance;
use crate::phrases::PhrasePicker;
use crate::session::SessionStore;
use seven_shared::{render, CommandTag};
use std::sync::Arc;

/// Collaborators and shared state every stage may use
pub struct Services {
    pub config: Config,
    pub picker: PhrasePicker,
    pub clock: Arc<dyn Clock>,
    pub sessions: SessionStore,
    pub facts: Arc<dyn FactStore>,
    pub memory: Arc<dyn MemorySearch>,
    pub extractor: Arc<dyn FactExtractor>,
    pub mood: Arc<dyn Mood>,
    pub web_classifier: Arc<dyn WebNeedClassifier>,
    pub web: Arc<dyn WebFetcher>,
    pub windows: Arc<dyn WindowLocator>,
    pub domains: Vec<Box<dyn CommandDomain>>,
}

impl Services {
    pub fn command_env(&self) -> CommandEnv<'_> {
        CommandEnv {
            picker: &self.picker,
            clock: self.clock.as_ref(),
            windows: self.windows.as_ref(),
            sessions: &self.sessions,
        }
    }

    pub fn persona(&self) -> &str {
        &self.config.persona.name
    }

    /// Memory search with failures logged and treated as no result
    pub fn search_memory(&self, query: &str, speaker_id: &str) -> Option<String> {
        match self.memory.search(query, speaker_id) {
            Ok(found) => found.filter(|m| !m.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "memory search failed");
                None
            }
        }
    }
}

/// Per-turn working state handed from stage to stage
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    pub utterance: Utterance,
    pub speaker_id: String,
    /// First token is a command verb or a command domain claims the text
    pub command_like: bool,
    /// Opens with a greeting or farewell word
    pub greeting: bool,
    /// A similar question was asked recently
    pub rephrase: bool,
    /// Capability question rewritten into an instruction
    pub capability: bool,
    /// Line sent to the model as the user's turn
    pub prompt_line: String,
    pub style: String,
    pub memory: Option<String>,
    pub web: Option<String>,
}

impl TurnContext {
    pub fn new(utterance: Utterance, speaker_id: &str, services: &Services) -> Self {
        let command_like = lexicon::is_command_verb(&utterance)
            || command_domains::detect_domain(&services.domains, &utterance, &services.command_env()).is_some();
        let greeting = lexicon::is_greeting_opener(&utterance);
        let prompt_line = utterance.raw.trim().to_string();
        Self {
            utterance,
            speaker_id: speaker_id.to_string(),
            command_like,
            greeting,
            prompt_line,
            ..Self::default()
        }
    }
}

/// Final classification of one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    DirectAnswer(String),
    Command { tags: Vec<CommandTag>, speech: Option<String> },
    /// Needs the model; carries the finished prompt and its token budget
    Generative { prompt: String, max_tokens: u32 },
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::DirectAnswer(_) => "direct",
            Outcome::Command { .. } => "command",
            Outcome::Generative { .. } => "generative",
        }
    }

    /// Response text for non-generative outcomes
    pub fn render(&self) -> Option<String> {
        match self {
            Outcome::DirectAnswer(text) => Some(text.clone()),
            Outcome::Command { tags, speech } => Some(render(speech.as_deref().unwrap_or(""), tags)),
            Outcome::Generative { .. } => None,
        }
    }
}

/// What a stage decided
#[derive(Debug)]
pub enum Flow {
    Continue,
    Stop(Outcome),
}

/// One rule stage
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &mut TurnContext, services: &Services) -> Flow;
}

/// Stages in pipeline order
pub fn default_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(NameCaptureStage),
        Box::new(RepetitionStage),
        Box::new(IdentityStage),
        Box::new(CapabilityStage),
        Box::new(AffectStage),
        Box::new(RetrievalStage),
        Box::new(NoContextStage),
        Box::new(FactCaptureStage),
        Box::new(CommandStage),
    ]
}

/// Run stages in order until one stops the turn
pub fn run_stages(stages: &[Box<dyn Stage>], ctx: &mut TurnContext, services: &Services) -> Option<Outcome> {
    for stage in stages {
        if let Flow::Stop(outcome) = stage.run(ctx, services) {
            tracing::debug!(stage = stage.name(), outcome = outcome.kind(), "stage ended turn");
            return Some(outcome);
        }
    }
    None
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::collaborators::InMemoryMemory;

    #[test]
    fn test_turn_context_flags() {
        let s = services(Arc::new(InMemoryMemory::new()));
        let c = ctx("Open Chrome", "alice", &s);
        assert!(c.command_like);
        assert!(!c.greeting);
        let c = ctx("can you turn the volume up", "alice", &s);
        assert!(c.command_like);
        let c = ctx("hello there", "alice", &s);
        assert!(c.greeting);
        assert!(!c.command_like);
        assert_eq!(c.prompt_line, "hello there");
    }

    #[test]
    fn test_outcome_render() {
        let tag = CommandTag::with_target(seven_shared::TagKind::Open, "chrome");
        let out = Outcome::Command {
            tags: vec![tag],
            speech: Some("Opening chrome.".to_string()),
        };
        assert_eq!(out.render().as_deref(), Some("Opening chrome. ###OPEN: chrome"));
        assert_eq!(
            Outcome::Generative {
                prompt: String::new(),
                max_tokens: 1
            }
            .render(),
            None
        );
    }

    #[test]
    fn test_stage_order() {
        let names: Vec<_> = default_stages().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "name_capture",
                "repetition",
                "identity",
                "capability",
                "affect",
                "retrieval",
                "no_context",
                "fact_capture",
                "commands"
            ]
        );
    }
}
