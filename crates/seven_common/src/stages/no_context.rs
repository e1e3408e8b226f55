//! Personal questions with nothing recalled get a fixed answer instead of
//! a guess from the model.

use super::{Flow, Outcome, Services, Stage, TurnContext};
use crate::lexicon;
use crate::phrases::NOT_TOLD_YET;

pub struct NoContextStage;

impl Stage for NoContextStage {
    fn name(&self) -> &'static str {
        "no_context"
    }

    fn run(&self, ctx: &mut TurnContext, _services: &Services) -> Flow {
        let u = &ctx.utterance;
        if ctx.command_like || ctx.capability || ctx.memory.is_some() {
            return Flow::Continue;
        }
        if lexicon::is_question(u) && lexicon::is_personal(u) {
            tracing::debug!("personal question without memory");
            return Flow::Stop(Outcome::DirectAnswer(NOT_TOLD_YET.to_string()));
        }
        Flow::Continue
    }
}
