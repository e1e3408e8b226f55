//! Hands the utterance to the fact extractor. Whatever happens there, the
//! turn goes on.

use super::{Flow, Services, Stage, TurnContext};

pub struct FactCaptureStage;

impl Stage for FactCaptureStage {
    fn name(&self) -> &'static str {
        "fact_capture"
    }

    fn run(&self, ctx: &mut TurnContext, services: &Services) -> Flow {
        if ctx.command_like || ctx.greeting || ctx.utterance.is_empty() {
            return Flow::Continue;
        }
        match services.extractor.extract_and_store(&ctx.utterance.raw, &ctx.speaker_id) {
            Ok(true) => tracing::debug!(speaker = %ctx.speaker_id, "fact stored"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, speaker = %ctx.speaker_id, "fact extraction failed"),
        }
        Flow::Continue
    }
}
