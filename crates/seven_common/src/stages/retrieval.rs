//! Context retrieval: recalled memories and, for time-sensitive questions,
//! a web lookup. Skipped for commands and greetings. Either block may be
//! missing; a failing collaborator only costs its block.

use super::{Flow, Services, Stage, TurnContext};
use crate::web_classifier::wants_news;

pub struct RetrievalStage;

impl RetrievalStage {
    fn fetch_web(query: &str, services: &Services) -> Option<String> {
        let news = wants_news(query);
        let result = if news {
            services.web.news(query)
        } else {
            services.web.search(query)
        };
        match result {
            Ok(block) if !block.trim().is_empty() => {
                tracing::debug!(news, "web context added");
                Some(block)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, news, "web lookup failed");
                None
            }
        }
    }
}

impl Stage for RetrievalStage {
    fn name(&self) -> &'static str {
        "retrieval"
    }

    fn run(&self, ctx: &mut TurnContext, services: &Services) -> Flow {
        if ctx.command_like || ctx.greeting || ctx.capability {
            return Flow::Continue;
        }

        if ctx.memory.is_none() {
            ctx.memory = services.search_memory(&ctx.utterance.raw, &ctx.speaker_id);
        }

        let (needed, query) = services.web_classifier.needs_search(&ctx.utterance.raw);
        if needed && !query.trim().is_empty() {
            ctx.web = Self::fetch_web(&query, services);
        }

        tracing::debug!(
            memory = ctx.memory.is_some(),
            web = ctx.web.is_some(),
            "context retrieved"
        );
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::collaborators::{FactStore, InMemoryMemory, WebFetcher};
    use anyhow::Result;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingWeb {
        calls: Mutex<Vec<(&'static str, String)>>,
        fail: bool,
    }

    impl WebFetcher for RecordingWeb {
        fn search(&self, query: &str) -> Result<String> {
            self.calls.lock().unwrap().push(("search", query.to_string()));
            if self.fail {
                anyhow::bail!("offline");
            }
            Ok(format!("results for {}", query))
        }

        fn news(&self, query: &str) -> Result<String> {
            self.calls.lock().unwrap().push(("news", query.to_string()));
            Ok(format!("headlines for {}", query))
        }
    }

    #[test]
    fn test_memory_and_web() {
        let memory = Arc::new(InMemoryMemory::new());
        memory.store_fact("I live in Oslo", "personal", "spk").unwrap();
        let mut s = services(memory);
        let web = Arc::new(RecordingWeb::default());
        s.web = web.clone();

        let mut c = ctx("what's the weather in Oslo today", "spk", &s);
        RetrievalStage.run(&mut c, &s);
        assert!(c.memory.as_deref().unwrap().contains("Oslo"));
        assert!(c.web.as_deref().unwrap().starts_with("results for"));
        assert_eq!(web.calls.lock().unwrap()[0].0, "search");
    }

    #[test]
    fn test_news_variant() {
        let mut s = services(Arc::new(InMemoryMemory::new()));
        let web = Arc::new(RecordingWeb::default());
        s.web = web.clone();
        let mut c = ctx("what's the latest news about the election", "spk", &s);
        RetrievalStage.run(&mut c, &s);
        assert_eq!(web.calls.lock().unwrap()[0].0, "news");
        assert!(c.memory.is_none());
    }

    #[test]
    fn test_web_failure_degrades() {
        let mut s = services(Arc::new(InMemoryMemory::new()));
        s.web = Arc::new(RecordingWeb {
            fail: true,
            ..RecordingWeb::default()
        });
        let mut c = ctx("what's the weather today", "spk", &s);
        assert!(matches!(RetrievalStage.run(&mut c, &s), Flow::Continue));
        assert!(c.web.is_none());
    }

    #[test]
    fn test_commands_skip_retrieval() {
        let mut s = services(Arc::new(InMemoryMemory::new()));
        let web = Arc::new(RecordingWeb::default());
        s.web = web.clone();
        let mut c = ctx("open the weather app today", "spk", &s);
        RetrievalStage.run(&mut c, &s);
        assert!(web.calls.lock().unwrap().is_empty());
    }
}
