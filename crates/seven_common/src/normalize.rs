//! Utterance normalization.

/// One utterance in raw and normalized form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Utterance {
    /// Text exactly as heard
    pub raw: String,
    /// Lowercased, punctuation stripped, single-spaced
    pub text: String,
    /// `text` split on whitespace
    pub tokens: Vec<String>,
}

/// Normalize a raw utterance.
///
/// Apostrophes and quotes are dropped so "what's" becomes "whats"; a colon
/// survives only between digits ("5:30"); every other punctuation mark
/// becomes a space.
pub fn normalize(raw: &str) -> Utterance {
    let lower = raw.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    let mut cleaned = String::with_capacity(lower.len());

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() || c.is_whitespace() {
            cleaned.push(c);
            continue;
        }
        match c {
            '\'' | '\u{2019}' | '"' | '\u{201c}' | '\u{201d}' | '`' => {}
            ':' => {
                let digit_before = i > 0 && chars[i - 1].is_ascii_digit();
                let digit_after = chars.get(i + 1).map(|n| n.is_ascii_digit()).unwrap_or(false);
                if digit_before && digit_after {
                    cleaned.push(':');
                } else {
                    cleaned.push(' ');
                }
            }
            _ => cleaned.push(' '),
        }
    }

    let tokens: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();
    let text = tokens.join(" ");

    Utterance {
        raw: raw.to_string(),
        text,
        tokens,
    }
}

impl Utterance {
    pub fn first_token(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn has_token(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t == word)
    }

    pub fn has_any_token(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.has_token(w))
    }

    /// Whole-word phrase containment ("call you" does not match "recall your")
    pub fn has_phrase(&self, phrase: &str) -> bool {
        if phrase.is_empty() {
            return false;
        }
        format!(" {} ", self.text).contains(&format!(" {} ", phrase))
    }

    pub fn has_any_phrase(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.has_phrase(p))
    }

    pub fn starts_with_phrase(&self, phrase: &str) -> bool {
        self.text == phrase || self.text.starts_with(&format!("{} ", phrase))
    }

    /// Tokens after the first `n`, rejoined
    pub fn rest_after(&self, n: usize) -> String {
        self.tokens.iter().skip(n).cloned().collect::<Vec<_>>().join(" ")
    }
}
