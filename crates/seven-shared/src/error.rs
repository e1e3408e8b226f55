//! Errors an executor can hit while acting on command tags.

use crate::tags::{TagError, TagKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SevenError {
    #[error("Tag error: {0}")]
    Tag(#[from] TagError),

    #[error("{kind} tag is missing {key}")]
    MissingParam { kind: TagKind, key: String },

    #[error("{0} tag has nothing to act on")]
    NothingToDo(TagKind),

    #[error("no executor for {0} tags")]
    Unsupported(TagKind),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SevenError {
    /// Stable numeric code for reporting back over a wire
    pub fn code(&self) -> i32 {
        match self {
            SevenError::Tag(_) => -32004,
            SevenError::MissingParam { .. } => -32602,
            SevenError::NothingToDo(_) => -32010,
            SevenError::Unsupported(_) => -32601,
            SevenError::Io(_) => -32006,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            SevenError::Tag(TagError::MissingMarker),
            SevenError::MissingParam {
                kind: TagKind::Sys,
                key: "action".into(),
            },
            SevenError::NothingToDo(TagKind::Open),
            SevenError::Unsupported(TagKind::Look),
            SevenError::Io(std::io::Error::other("closed")),
        ];
        let mut codes: Vec<i32> = errors.iter().map(SevenError::code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_messages_name_the_tag() {
        let e = SevenError::MissingParam {
            kind: TagKind::Window,
            key: "target".into(),
        };
        assert_eq!(e.to_string(), "WINDOW tag is missing target");
        assert_eq!(SevenError::Unsupported(TagKind::Sys).to_string(), "no executor for SYS tags");
    }
}
