use crate::command::{CommandSpec, Interaction, Response};
use crate::error::Result;
use crate::host::{Context, Plugin};

pub struct PingPlugin;

impl Plugin for PingPlugin {
    fn name(&self) -> &str {
        "ping"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("ping", "Check that the bot is responding")]
    }

    fn handle(&mut self, _ctx: &mut Context<'_>, _interaction: &Interaction) -> Result<Response> {
        Ok(Response::text("pong"))
    }
}
