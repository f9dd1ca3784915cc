use std::time::Duration;

use crate::action::{ActionExt, SequentialAction};
use crate::command::{CommandSpec, Interaction, OptionKind, OptionSpec, Response};
use crate::error::{BotError, Result};
use crate::host::{Context, Plugin};

const MAX_FROM: i64 = 10;
const STEP: Duration = Duration::from_secs(1);

pub struct CountdownPlugin;

impl Plugin for CountdownPlugin {
    fn name(&self) -> &str {
        "countdown"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("countdown", "Count down to liftoff, one step per second")
            .option(OptionSpec::required("from", "Start value, 1 to 10", OptionKind::Integer))]
    }

    fn handle(&mut self, ctx: &mut Context<'_>, interaction: &Interaction) -> Result<Response> {
        let from = interaction.integer("from").unwrap_or(0);
        if !(1..=MAX_FROM).contains(&from) {
            return Err(BotError::InvalidOption {
                command: "countdown".to_string(),
                option: "from".to_string(),
                reason: format!("must be between 1 and {MAX_FROM}"),
            });
        }

        let channel = &interaction.channel_id;
        let mut steps: Vec<_> = (1..=from)
            .rev()
            .map(|n| {
                ctx.message(channel, n.to_string())
                    .with_wait_on(STEP, ctx.clock.clone())
                    .boxed()
            })
            .collect();
        steps.push(ctx.message(channel, "liftoff").boxed());
        ctx.schedule("countdown", SequentialAction::new(steps));

        Ok(Response::text(format!("Counting down from {from}")))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::command::{Interaction, OptionValue};
    use crate::error::BotError;
    use crate::plugins::testing;

    fn countdown(from: i64) -> Interaction {
        Interaction::new("countdown", "chan", "u").with_option("from", OptionValue::Integer(from))
    }

    #[test]
    fn counts_down_then_lifts_off() {
        let (mut host, clock) = testing::host();
        host.dispatch(&countdown(3)).unwrap();

        let first: Vec<String> = host.tick().into_iter().map(|m| m.content).collect();
        assert_eq!(first, vec!["3"]);
        assert!(host.tick().is_empty(), "the step wait has not passed");

        let mut sent = first;
        for _ in 0..20 {
            clock.advance(Duration::from_millis(1100));
            sent.extend(host.tick().into_iter().map(|m| m.content));
            if host.pending_jobs() == 0 {
                break;
            }
        }
        assert_eq!(sent, vec!["3", "2", "1", "liftoff"]);
        assert_eq!(host.pending_jobs(), 0);
    }

    #[test]
    fn from_is_range_checked() {
        let (mut host, _) = testing::host();
        for bad in [0, -2, 11] {
            assert!(matches!(
                host.dispatch(&countdown(bad)),
                Err(BotError::InvalidOption { .. })
            ));
        }
        host.dispatch(&countdown(10)).unwrap();
        assert_eq!(host.pending_jobs(), 1);
    }
}
