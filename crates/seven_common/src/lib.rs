//! Seven Common - the conversational dispatch pipeline.
//!
//! One utterance from one speaker goes in; a spoken answer, a command
//! with `###KIND:` tags, or a model-generated reply comes out.

pub mod clock;
pub mod collaborators;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod inference;
pub mod lexicon;
pub mod normalize;
pub mod phrases;
pub mod session;
pub mod stages;
pub mod web_classifier;

pub use clock::{Clock, FixedClock, SystemClock};
pub use collaborators::{
    AnyWindow, FactExtractor, FactStore, InMemoryMemory, KnownWindows, MemorySearch, Mood, NeutralMood, OfflineWeb,
    WebFetcher, WebNeedClassifier, WindowLocator,
};
pub use config::Config;
pub use dispatch::{Dispatcher, DispatcherBuilder};
pub use inference::{FakeInferenceClient, InferenceClient, InferenceError, OllamaClient};
pub use normalize::{normalize, Utterance};
pub use phrases::PhrasePicker;
pub use session::SessionStore;
pub use stages::Outcome;
