use crate::action::ActionExt;
use crate::command::{CommandSpec, Interaction, OptionKind, OptionSpec, Response};
use crate::error::{BotError, Result};
use crate::host::{Context, Plugin};
use crate::text::{format_duration, mention, parse_duration, truncate};

const MAX_REMINDER_CHARS: usize = 1500;

pub struct RemindPlugin;

impl Plugin for RemindPlugin {
    fn name(&self) -> &str {
        "remind"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("remind", "Send yourself a reminder later")
            .option(OptionSpec::required("in", "Delay, e.g. 10m or 1h30m", OptionKind::String))
            .option(OptionSpec::required("text", "What to remind you of", OptionKind::String))]
    }

    fn handle(&mut self, ctx: &mut Context<'_>, interaction: &Interaction) -> Result<Response> {
        let missing = |option: &str| BotError::InvalidOption {
            command: "remind".to_string(),
            option: option.to_string(),
            reason: "required option missing".to_string(),
        };
        let delay = parse_duration(interaction.string("in").ok_or_else(|| missing("in"))?)?;
        let text = interaction.string("text").ok_or_else(|| missing("text"))?;

        let content = format!(
            "{}, reminder: {}",
            mention(&interaction.user_id),
            truncate(text, MAX_REMINDER_CHARS)
        );
        let reminder = ctx
            .message(&interaction.channel_id, content)
            .delay_for_on(delay, ctx.clock.clone());
        ctx.schedule(format!("remind:{}", interaction.user_id), reminder);

        Ok(Response::ephemeral(format!(
            "I'll remind you in {}.",
            format_duration(delay)
        )))
    }
}
