//! The dispatcher: one utterance in, one response string out.
//!
//! Rule stages run in order; the first one that stops the turn decides the
//! answer. Anything left goes to the inference client with an assembled
//! prompt. Panics anywhere below `dispatch` are caught and answered with a
//! fixed recovery phrase.

use crate::clock::{Clock, SystemClock};
use crate::collaborators::{
    AnyWindow, FactExtractor, FactStore, InMemoryMemory, MemorySearch, Mood, NeutralMood, OfflineWeb, WebFetcher,
    WebNeedClassifier, WindowLocator,
};
use crate::commands::{default_domains, CommandDomain};
use crate::config::Config;
use crate::inference::{assemble, stop_sequences, Budget, InferenceClient, OllamaClient, PromptParts};
use crate::lexicon;
use crate::normalize::normalize;
use crate::phrases::{PhrasePicker, LISTENING, RECOVERY};
use crate::session::{SessionStore, Turn};
use crate::stages::{default_stages, run_stages, Outcome, Services, Stage, TurnContext};
use crate::web_classifier::KeywordWebClassifier;
use anyhow::Result;
use seven_shared::extract;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Inputs this short are not worth storing as a conversation
const MIN_STORED_CHARS: usize = 3;

/// Conversational dispatch pipeline
pub struct Dispatcher {
    services: Services,
    stages: Vec<Box<dyn Stage>>,
    inference: Arc<dyn InferenceClient>,
}

/// Builder for [`Dispatcher`]; unset collaborators get in-process defaults
pub struct DispatcherBuilder {
    config: Config,
    picker: Option<PhrasePicker>,
    clock: Option<Arc<dyn Clock>>,
    facts: Option<Arc<dyn FactStore>>,
    memory: Option<Arc<dyn MemorySearch>>,
    extractor: Option<Arc<dyn FactExtractor>>,
    mood: Option<Arc<dyn Mood>>,
    web_classifier: Option<Arc<dyn WebNeedClassifier>>,
    web: Option<Arc<dyn WebFetcher>>,
    windows: Option<Arc<dyn WindowLocator>>,
    inference: Option<Arc<dyn InferenceClient>>,
    domains: Option<Vec<Box<dyn CommandDomain>>>,
}

impl DispatcherBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            picker: None,
            clock: None,
            facts: None,
            memory: None,
            extractor: None,
            mood: None,
            web_classifier: None,
            web: None,
            windows: None,
            inference: None,
            domains: None,
        }
    }

    pub fn picker(mut self, picker: PhrasePicker) -> Self {
        self.picker = Some(picker);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use one store for fact writes, memory search and fact extraction
    pub fn memory_store<M>(mut self, store: Arc<M>) -> Self
    where
        M: FactStore + MemorySearch + FactExtractor + 'static,
    {
        self.facts = Some(store.clone());
        self.memory = Some(store.clone());
        self.extractor = Some(store);
        self
    }

    pub fn fact_store(mut self, facts: Arc<dyn FactStore>) -> Self {
        self.facts = Some(facts);
        self
    }

    pub fn memory_search(mut self, memory: Arc<dyn MemorySearch>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn fact_extractor(mut self, extractor: Arc<dyn FactExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn mood(mut self, mood: Arc<dyn Mood>) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn web_classifier(mut self, classifier: Arc<dyn WebNeedClassifier>) -> Self {
        self.web_classifier = Some(classifier);
        self
    }

    pub fn web(mut self, web: Arc<dyn WebFetcher>) -> Self {
        self.web = Some(web);
        self
    }

    pub fn windows(mut self, windows: Arc<dyn WindowLocator>) -> Self {
        self.windows = Some(windows);
        self
    }

    pub fn inference(mut self, inference: Arc<dyn InferenceClient>) -> Self {
        self.inference = Some(inference);
        self
    }

    pub fn domains(mut self, domains: Vec<Box<dyn CommandDomain>>) -> Self {
        self.domains = Some(domains);
        self
    }

    /// Fails only if the default HTTP inference client can't be created
    pub fn build(self) -> Result<Dispatcher> {
        let inference: Arc<dyn InferenceClient> = match self.inference {
            Some(client) => client,
            None => Arc::new(OllamaClient::new(self.config.inference.clone())?),
        };

        let store = Arc::new(InMemoryMemory::new());
        let facts = self.facts.unwrap_or_else(|| store.clone());
        let memory = self.memory.unwrap_or_else(|| store.clone());
        let extractor = self.extractor.unwrap_or_else(|| store.clone());

        let sessions = SessionStore::new(self.config.speaker.default_name.clone());
        let services = Services {
            picker: self.picker.unwrap_or_default(),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            sessions,
            facts,
            memory,
            extractor,
            mood: self.mood.unwrap_or_else(|| Arc::new(NeutralMood::new())),
            web_classifier: self.web_classifier.unwrap_or_else(|| Arc::new(KeywordWebClassifier)),
            web: self.web.unwrap_or_else(|| Arc::new(OfflineWeb)),
            windows: self.windows.unwrap_or_else(|| Arc::new(AnyWindow)),
            domains: self.domains.unwrap_or_else(default_domains),
            config: self.config,
        };

        Ok(Dispatcher {
            services,
            stages: default_stages(),
            inference,
        })
    }
}

impl Dispatcher {
    pub fn builder(config: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(config)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.services.sessions
    }

    pub fn config(&self) -> &Config {
        &self.services.config
    }

    /// Answer one utterance from one speaker
    pub fn dispatch(&self, utterance: &str, speaker_id: &str) -> String {
        let turn_id = Uuid::new_v4();
        let span = info_span!("turn", speaker = %speaker_id, turn_id = %turn_id);
        let _entered = span.enter();
        let started = Instant::now();

        match catch_unwind(AssertUnwindSafe(|| self.handle(utterance, speaker_id))) {
            Ok((kind, reply)) => {
                info!(
                    outcome = kind,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "turn complete"
                );
                reply
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown".to_string());
                error!(reason = %reason, "dispatch panicked");
                RECOVERY.to_string()
            }
        }
    }

    /// Run the rule stages; whatever they leave becomes a generative outcome
    pub fn classify(&self, utterance: &str, speaker_id: &str) -> (TurnContext, Outcome) {
        let mut ctx = TurnContext::new(normalize(utterance), speaker_id, &self.services);
        if let Some(outcome) = run_stages(&self.stages, &mut ctx, &self.services) {
            return (ctx, outcome);
        }
        let outcome = self.generative_outcome(&ctx);
        (ctx, outcome)
    }

    fn generative_outcome(&self, ctx: &TurnContext) -> Outcome {
        let history: Vec<Turn> = self
            .services
            .sessions
            .with_session(&ctx.speaker_id, |s| s.history().iter().cloned().collect());
        let speaker_name = self.services.sessions.display_name(&ctx.speaker_id);

        let parts = PromptParts {
            persona: self.services.persona(),
            creator: &self.services.config.persona.creator,
            speaker_name: speaker_name.as_deref(),
            style: &ctx.style,
            web: ctx.web.as_deref(),
            memory: ctx.memory.as_deref(),
            history: &history,
            rephrase: ctx.rephrase,
            user_line: &ctx.prompt_line,
        };
        let budget = Budget::choose(&ctx.utterance, ctx.capability, ctx.web.is_some());
        debug!(?budget, history = history.len(), "prompt assembled");

        Outcome::Generative {
            prompt: assemble(&parts),
            max_tokens: budget.tokens(&self.services.config.inference),
        }
    }

    fn handle(&self, utterance: &str, speaker_id: &str) -> (&'static str, String) {
        if normalize(utterance).is_empty() {
            return ("empty", LISTENING.to_string());
        }

        let (ctx, outcome) = self.classify(utterance, speaker_id);
        let kind = outcome.kind();
        match outcome {
            Outcome::Generative { prompt, max_tokens } => (kind, self.generate(&ctx, &prompt, max_tokens)),
            other => (kind, other.render().unwrap_or_default()),
        }
    }

    fn generate(&self, ctx: &TurnContext, prompt: &str, max_tokens: u32) -> String {
        let stop = stop_sequences(self.services.persona());
        let stop: Vec<&str> = stop.iter().map(String::as_str).collect();

        let reply = match self.inference.generate(prompt, max_tokens, &stop) {
            Ok(text) if text.trim().is_empty() => LISTENING.to_string(),
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "inference failed");
                return e.apology().to_string();
            }
        };

        let user_line = ctx.utterance.raw.trim();
        self.services
            .sessions
            .with_session(&ctx.speaker_id, |s| s.record_exchange(user_line, &reply));
        self.store_conversation(ctx, &reply);
        reply
    }

    fn store_conversation(&self, ctx: &TurnContext, reply: &str) {
        let user_line = ctx.utterance.raw.trim();
        let bare = lexicon::without_name(&ctx.utterance, self.services.persona());
        if user_line.chars().count() <= MIN_STORED_CHARS || lexicon::GREETINGS.contains(&bare.as_str()) {
            return;
        }
        let speech = extract(reply).speech;
        if speech.is_empty() {
            return;
        }
        if let Err(e) = self.services.facts.store_conversation(user_line, &speech, &ctx.speaker_id) {
            warn!(error = %e, "failed to store conversation");
        }
    }

    /// Executor outcome for the last command, forwarded to the mood tracker
    pub fn report_command_result(&self, success: bool) {
        debug!(success, "command result reported");
        self.services.mood.on_command_result(success);
    }

    /// Clear one speaker's session
    pub fn reset(&self, speaker_id: &str) {
        info!(speaker = %speaker_id, "session reset");
        self.services.sessions.reset(speaker_id);
    }

    /// Clear every session
    pub fn reset_all(&self) {
        info!("all sessions reset");
        self.services.sessions.reset_all();
    }
}
