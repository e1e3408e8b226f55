//! Command tag wire grammar.
//!
//! A response string carries zero or more tags after its speakable text:
//!
//! ```text
//! Opening both. ###OPEN: chrome ###OPEN: notepad
//! Volume set. ###SYS: action=volume_set value=40
//! ```
//!
//! OPEN, CLOSE and SEARCH carry one free-text target. SYS, WINDOW and SCHED
//! carry whitespace-separated `key=value` pairs whose values never contain
//! whitespace (spaces are written as `_`). LOOK carries nothing. No value
//! ever contains the `###` marker.
//!
//! The same `decode` is used for tags compiled by the dispatcher and for
//! tags a language model wrote into its answer.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Marker that opens every tag
pub const TAG_MARKER: &str = "###";

/// Parameter key used for the single target of bare kinds
pub const TARGET_KEY: &str = "target";

/// Prefix on a CLOSE target asking for every instance to be closed
pub const CLOSE_ALL_PREFIX: &str = "ALL_";

/// Tag decode failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("tag does not start with {TAG_MARKER}")]
    MissingMarker,

    #[error("unknown tag kind: {0}")]
    UnknownKind(String),
}

/// Executor a tag is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagKind {
    Open,
    Close,
    Search,
    Sys,
    Window,
    Sched,
    Look,
}

impl TagKind {
    pub const ALL: [TagKind; 7] = [
        TagKind::Open,
        TagKind::Close,
        TagKind::Search,
        TagKind::Sys,
        TagKind::Window,
        TagKind::Sched,
        TagKind::Look,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Open => "OPEN",
            TagKind::Close => "CLOSE",
            TagKind::Search => "SEARCH",
            TagKind::Sys => "SYS",
            TagKind::Window => "WINDOW",
            TagKind::Sched => "SCHED",
            TagKind::Look => "LOOK",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Kinds whose body is one free-text target instead of key=value pairs
    pub fn is_bare(&self) -> bool {
        matches!(self, TagKind::Open | TagKind::Close | TagKind::Search)
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured command for a downstream executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTag {
    kind: TagKind,
    params: Vec<(String, String)>,
}

impl CommandTag {
    /// Tag with no parameters
    pub fn new(kind: TagKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
        }
    }

    /// Bare tag with a single target (`###OPEN: chrome`)
    pub fn with_target(kind: TagKind, target: &str) -> Self {
        Self::new(kind).with(TARGET_KEY, target)
    }

    /// Add or replace a parameter.
    ///
    /// Values are sanitized so that encoding is lossless: the marker is
    /// removed, surrounding whitespace trimmed, and for keyed kinds inner
    /// whitespace becomes `_`. Bare kinds hold only their target, so any
    /// key on a bare kind sets the target.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        let (key, value) = if self.kind.is_bare() {
            (TARGET_KEY.to_string(), sanitize_bare(value))
        } else {
            (sanitize_key(key), sanitize_keyed(value))
        };
        if key.is_empty() || (self.kind.is_bare() && value.is_empty()) {
            return self;
        }
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
        self
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    /// Parameters in insertion order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parameter an executor cannot act without
    pub fn require(&self, key: &str) -> Result<&str, crate::SevenError> {
        self.get(key).ok_or_else(|| crate::SevenError::MissingParam {
            kind: self.kind,
            key: key.to_string(),
        })
    }

    /// Comma-joined list value (`targets=chrome,code`)
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().replace('_', " "))
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Render as `###KIND: ...`
    pub fn encode(&self) -> String {
        if self.params.is_empty() {
            return format!("{}{}", TAG_MARKER, self.kind);
        }
        let body = if self.kind.is_bare() {
            self.params[0].1.clone()
        } else {
            self.params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!("{}{}: {}", TAG_MARKER, self.kind, body)
    }

    /// Parse a single `###KIND: ...` occurrence
    pub fn decode(s: &str) -> Result<Self, TagError> {
        let rest = s
            .trim()
            .strip_prefix(TAG_MARKER)
            .ok_or(TagError::MissingMarker)?;

        let (kind_str, body) = match rest.find(|c: char| c == ':' || c.is_whitespace()) {
            Some(idx) => (&rest[..idx], rest[idx..].trim_start_matches(':').trim()),
            None => (rest.trim(), ""),
        };
        let kind = TagKind::parse(kind_str.trim())
            .ok_or_else(|| TagError::UnknownKind(kind_str.trim().to_string()))?;

        let mut tag = Self::new(kind);
        if body.is_empty() {
            return Ok(tag);
        }

        if kind.is_bare() {
            tag.params.push((TARGET_KEY.to_string(), body.to_string()));
            return Ok(tag);
        }

        for token in body.split_whitespace() {
            match token.split_once('=') {
                Some((k, v)) if !k.is_empty() => tag.params.push((k.to_string(), v.to_string())),
                _ => match tag.params.last_mut() {
                    // Model output sometimes leaves spaces inside a value
                    Some(last) => {
                        last.1.push('_');
                        last.1.push_str(token);
                    }
                    None => tag.params.push((TARGET_KEY.to_string(), token.to_string())),
                },
            }
        }
        Ok(tag)
    }

    /// Individual targets of an OPEN/CLOSE/SEARCH tag.
    ///
    /// Model-written tags sometimes pack several apps into one target
    /// ("chrome and notepad"); this splits on `and`, commas and `&`, and
    /// drops quotes, trailing periods and the close-all prefix.
    pub fn targets(&self) -> Vec<String> {
        let Some(raw) = self.get(TARGET_KEY) else {
            return Vec::new();
        };
        let raw = raw.strip_prefix(CLOSE_ALL_PREFIX).unwrap_or(raw);
        let cleaned: String = raw.chars().filter(|c| *c != '"' && *c != '\'').collect();

        cleaned
            .replace('&', ",")
            .replace(" and ", ",")
            .split(',')
            .map(|s| s.trim().trim_end_matches('.').trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// CLOSE tag addressed to every instance
    pub fn is_close_all(&self) -> bool {
        self.kind == TagKind::Close
            && self
                .get(TARGET_KEY)
                .map(|t| t.starts_with(CLOSE_ALL_PREFIX))
                .unwrap_or(false)
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// A response split into its speakable text and its tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedResponse {
    pub speech: String,
    pub tags: Vec<CommandTag>,
}

/// Split a response at its tag markers.
///
/// Text before the first marker is the speech. Segments with an unknown
/// kind are dropped.
pub fn extract(text: &str) -> ExtractedResponse {
    let mut pieces = text.split(TAG_MARKER);
    let speech = pieces.next().unwrap_or_default().trim().to_string();

    let tags = pieces
        .filter_map(|piece| CommandTag::decode(&format!("{}{}", TAG_MARKER, piece)).ok())
        .collect();

    ExtractedResponse { speech, tags }
}

/// Render speech followed by tags, space separated
pub fn render(speech: &str, tags: &[CommandTag]) -> String {
    let mut out = speech.trim().to_string();
    for tag in tags {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&tag.encode());
    }
    out
}

fn sanitize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

fn sanitize_keyed(value: &str) -> String {
    value
        .replace(TAG_MARKER, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn sanitize_bare(value: &str) -> String {
    let mut v = value.replace(TAG_MARKER, "");
    // A lone trailing '#' pair could re-form the marker against the next tag
    while v.ends_with('#') {
        v.pop();
    }
    v.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in TagKind::ALL {
            assert_eq!(TagKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TagKind::parse("open"), None);
    }

    #[test]
    fn test_encode_bare() {
        let tag = CommandTag::with_target(TagKind::Open, "  chrome ");
        assert_eq!(tag.encode(), "###OPEN: chrome");
    }

    #[test]
    fn test_encode_keyed_replaces_spaces() {
        let tag = CommandTag::new(TagKind::Sched)
            .with("action", "reminder")
            .with("message", "check the oven");
        assert_eq!(
            tag.encode(),
            "###SCHED: action=reminder message=check_the_oven"
        );
    }

    #[test]
    fn test_encode_no_params() {
        assert_eq!(CommandTag::new(TagKind::Look).encode(), "###LOOK");
    }

    #[test]
    fn test_marker_never_in_value() {
        let tag = CommandTag::new(TagKind::Sys).with("action", "vol###ume");
        assert_eq!(tag.get("action"), Some("volume"));
        let bare = CommandTag::with_target(TagKind::Search, "rust ### news");
        assert!(!bare.get(TARGET_KEY).unwrap().contains(TAG_MARKER));
    }

    #[test]
    fn test_with_replaces_existing_key() {
        let tag = CommandTag::new(TagKind::Sys)
            .with("value", "10")
            .with("value", "20");
        assert_eq!(tag.params().len(), 1);
        assert_eq!(tag.get("value"), Some("20"));
    }

    #[test]
    fn test_decode_keyed() {
        let tag = CommandTag::decode("###WINDOW: action=snap target=chrome position=left").unwrap();
        assert_eq!(tag.kind(), TagKind::Window);
        assert_eq!(tag.get("action"), Some("snap"));
        assert_eq!(tag.get("position"), Some("left"));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(CommandTag::decode("OPEN: x"), Err(TagError::MissingMarker));
        assert_eq!(
            CommandTag::decode("###DANCE: now"),
            Err(TagError::UnknownKind("DANCE".to_string()))
        );
    }

    #[test]
    fn test_decode_look() {
        let tag = CommandTag::decode("###LOOK").unwrap();
        assert_eq!(tag.kind(), TagKind::Look);
        assert!(tag.params().is_empty());
    }

    #[test]
    fn test_decode_stray_tokens_join_previous_value() {
        let tag = CommandTag::decode("###SCHED: action=reminder message=call mom").unwrap();
        assert_eq!(tag.get("message"), Some("call_mom"));
    }

    #[test]
    fn test_round_trip() {
        let tags = vec![
            CommandTag::with_target(TagKind::Close, "ALL_chrome"),
            CommandTag::new(TagKind::Window)
                .with("action", "layout")
                .with("mode", "split")
                .with("targets", "chrome,code"),
            CommandTag::new(TagKind::Sys)
                .with("action", "volume_set")
                .with("value", "100"),
            CommandTag::new(TagKind::Look),
        ];
        for tag in tags {
            assert_eq!(CommandTag::decode(&tag.encode()).unwrap(), tag);
        }
    }

    #[test]
    fn test_extract_speech_and_tags() {
        let out = extract("On it. ###OPEN: chrome ###OPEN: notepad");
        assert_eq!(out.speech, "On it.");
        assert_eq!(out.tags.len(), 2);
        assert_eq!(out.tags[1].get(TARGET_KEY), Some("notepad"));
    }

    #[test]
    fn test_extract_skips_unknown() {
        let out = extract("Sure ###FLY: away ###SEARCH: rust lang");
        assert_eq!(out.tags.len(), 1);
        assert_eq!(out.tags[0].kind(), TagKind::Search);
    }

    #[test]
    fn test_extract_plain_text() {
        let out = extract("Just talking.");
        assert_eq!(out.speech, "Just talking.");
        assert!(out.tags.is_empty());
    }

    #[test]
    fn test_targets_split() {
        let tag = CommandTag::decode("###OPEN: chrome and notepad, spotify & 'steam'.").unwrap();
        assert_eq!(tag.targets(), vec!["chrome", "notepad", "spotify", "steam"]);
    }

    #[test]
    fn test_close_all() {
        let tag = CommandTag::with_target(TagKind::Close, "ALL_chrome");
        assert!(tag.is_close_all());
        assert_eq!(tag.targets(), vec!["chrome"]);
        assert!(!CommandTag::with_target(TagKind::Close, "chrome").is_close_all());
    }

    #[test]
    fn test_get_list() {
        let tag = CommandTag::new(TagKind::Window).with("targets", "chrome,vs_code");
        assert_eq!(tag.get_list("targets"), vec!["chrome", "vs code"]);
    }

    #[test]
    fn test_render() {
        let tags = vec![CommandTag::with_target(TagKind::Open, "chrome")];
        assert_eq!(render("Opening.", &tags), "Opening. ###OPEN: chrome");
        assert_eq!(render("", &tags), "###OPEN: chrome");
    }
}
