//! Command detection. The first command domain that claims the utterance
//! compiles it; a clarification comes back as a direct answer.

use super::{Flow, Outcome, Services, Stage, TurnContext};
use crate::commands::{self as command_domains, Compiled};

pub struct CommandStage;

impl Stage for CommandStage {
    fn name(&self) -> &'static str {
        "commands"
    }

    fn run(&self, ctx: &mut TurnContext, services: &Services) -> Flow {
        if ctx.capability {
            return Flow::Continue;
        }
        let env = services.command_env();
        let Some((domain, compiled)) = command_domains::compile(&services.domains, &ctx.utterance, &env) else {
            return Flow::Continue;
        };

        let outcome = match compiled {
            Compiled::Tags { speech, tags } => {
                tracing::debug!(domain, tags = tags.len(), "command compiled");
                Outcome::Command {
                    tags,
                    speech: Some(speech).filter(|s| !s.is_empty()),
                }
            }
            Compiled::Clarify(text) => {
                tracing::debug!(domain, "command needs clarification");
                Outcome::DirectAnswer(text)
            }
        };
        Flow::Stop(outcome)
    }
}
