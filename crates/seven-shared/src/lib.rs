//! Shared types for Seven components.
//!
//! The command-tag micro-language lives here so the dispatcher that
//! compiles tags and the executors that consume them share one grammar.

pub mod error;
pub mod tags;

pub use error::SevenError;
pub use tags::{
    extract, render, CommandTag, ExtractedResponse, TagError, TagKind, CLOSE_ALL_PREFIX, TAG_MARKER,
    TARGET_KEY,
};

/// Reserved speaker id for an utterance whose voice was not identified
pub const UNIDENTIFIED_SPEAKER: &str = "unknown";
