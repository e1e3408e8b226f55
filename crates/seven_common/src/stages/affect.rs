//! Mood update. Feeds the utterance to the mood tracker and keeps its
//! style directive for the prompt. Never ends the turn.

use super::{Flow, Services, Stage, TurnContext};

pub struct AffectStage;

impl Stage for AffectStage {
    fn name(&self) -> &'static str {
        "affect"
    }

    fn run(&self, ctx: &mut TurnContext, services: &Services) -> Flow {
        services.mood.analyze(&ctx.utterance.raw);
        ctx.style = services.mood.style_directive();
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::collaborators::{InMemoryMemory, NeutralMood};
    use std::sync::Arc;

    #[test]
    fn test_style_directive_recorded() {
        let mut s = services(Arc::new(InMemoryMemory::new()));
        let mood = Arc::new(NeutralMood::new());
        s.mood = mood.clone();
        let mut c = ctx("I had a rough day", "spk", &s);
        assert!(matches!(AffectStage.run(&mut c, &s), Flow::Continue));
        assert_eq!(mood.analyzed(), 1);
        assert_eq!(c.style, "Be calm, direct and friendly.");
    }
}
