//! Command detection and tag compilation.
//!
//! Four domains are tried in fixed priority: scheduling, window control,
//! device control, application lifecycle. The first domain whose detector
//! fires owns the utterance, so "play spotify" never reaches media control
//! and "remind me to open chrome" never launches anything.
//!
//! A domain either compiles complete tags with a spoken acknowledgment or
//! answers with a clarification. A tag is only built once every required
//! parameter has resolved.

pub mod apps;
pub mod device;
pub mod schedule;
pub mod time_parse;
pub mod window;

use crate::clock::Clock;
use crate::collaborators::WindowLocator;
use crate::normalize::Utterance;
use crate::phrases::PhrasePicker;
use crate::session::SessionStore;
use seven_shared::{render, CommandTag};

/// Everything a domain may consult while compiling
pub struct CommandEnv<'a> {
    pub picker: &'a PhrasePicker,
    pub clock: &'a dyn Clock,
    pub windows: &'a dyn WindowLocator,
    pub sessions: &'a SessionStore,
}

/// What a matched domain produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compiled {
    Tags { speech: String, tags: Vec<CommandTag> },
    /// Domain matched but a parameter did not resolve
    Clarify(String),
}

impl Compiled {
    pub fn tags(speech: String, tags: Vec<CommandTag>) -> Self {
        Compiled::Tags { speech, tags }
    }

    /// Wire form: acknowledgment followed by the tags
    pub fn render(&self) -> String {
        match self {
            Compiled::Tags { speech, tags } => render(speech, tags),
            Compiled::Clarify(text) => text.clone(),
        }
    }
}

/// One command domain
pub trait CommandDomain: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this domain claims the utterance
    fn detect(&self, u: &Utterance, env: &CommandEnv) -> bool;

    /// Build tags for a claimed utterance
    fn compile(&self, u: &Utterance, env: &CommandEnv) -> Compiled;
}

/// Domains in priority order
pub fn default_domains() -> Vec<Box<dyn CommandDomain>> {
    vec![
        Box::new(schedule::ScheduleDomain),
        Box::new(window::WindowDomain),
        Box::new(device::DeviceControl),
        Box::new(apps::AppDomain),
    ]
}

/// Name of the first domain that claims the utterance
pub fn detect_domain(domains: &[Box<dyn CommandDomain>], u: &Utterance, env: &CommandEnv) -> Option<&'static str> {
    domains.iter().find(|d| d.detect(u, env)).map(|d| d.name())
}

/// Compile with the first claiming domain
pub fn compile(domains: &[Box<dyn CommandDomain>], u: &Utterance, env: &CommandEnv) -> Option<(&'static str, Compiled)> {
    let domain = domains.iter().find(|d| d.detect(u, env))?;
    Some((domain.name(), domain.compile(u, env)))
}

/// Parse the first whole-number token
pub(crate) fn first_number(u: &Utterance) -> Option<i64> {
    u.tokens.iter().find_map(|t| {
        let digits = t.trim_end_matches('%');
        digits.parse::<i64>().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::collaborators::AnyWindow;
    use crate::normalize::normalize;
    use chrono::NaiveDate;

    fn with_env<R>(f: impl FnOnce(&CommandEnv) -> R) -> R {
        let picker = PhrasePicker::seeded(1);
        let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 6, 11).unwrap().and_hms_opt(10, 0, 0).unwrap());
        let sessions = SessionStore::new(None);
        let env = CommandEnv {
            picker: &picker,
            clock: &clock,
            windows: &AnyWindow,
            sessions: &sessions,
        };
        f(&env)
    }

    #[test]
    fn test_priority_order() {
        let domains = default_domains();
        with_env(|env| {
            assert_eq!(detect_domain(&domains, &normalize("remind me to open chrome at 5pm"), env), Some("schedule"));
            assert_eq!(detect_domain(&domains, &normalize("minimize chrome"), env), Some("window"));
            assert_eq!(detect_domain(&domains, &normalize("set volume to 50"), env), Some("device"));
            assert_eq!(detect_domain(&domains, &normalize("open notepad"), env), Some("apps"));
            assert_eq!(detect_domain(&domains, &normalize("play spotify"), env), None);
            assert_eq!(detect_domain(&domains, &normalize("tell me a joke"), env), None);
        });
    }

    #[test]
    fn test_render_clarify() {
        assert_eq!(Compiled::Clarify("When?".to_string()).render(), "When?");
    }

    #[test]
    fn test_first_number() {
        assert_eq!(first_number(&normalize("set volume to 40%")), Some(40));
        assert_eq!(first_number(&normalize("louder")), None);
    }
}
