use crate::command::{CommandSpec, Interaction, OptionKind, OptionSpec, Response};
use crate::error::Result;
use crate::host::{Context, Plugin};
use crate::paginate::Paginator;

/// Embed descriptions are capped at 4096 characters.
const MAX_PAGE_CHARS: usize = 4096;

pub struct HelpPlugin;

impl Plugin for HelpPlugin {
    fn name(&self) -> &str {
        "help"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("help", "List the available commands")
            .option(OptionSpec::optional("page", "Page to show", OptionKind::Integer))
            .option(OptionSpec::optional(
                "control",
                "first, prev, next or last",
                OptionKind::String,
            ))]
    }

    fn handle(&mut self, ctx: &mut Context<'_>, interaction: &Interaction) -> Result<Response> {
        let lines: Vec<String> = ctx
            .commands
            .iter()
            .map(|c| {
                let usage: Vec<String> = c
                    .options
                    .iter()
                    .map(|o| {
                        if o.required {
                            format!("<{}>", o.name)
                        } else {
                            format!("[{}]", o.name)
                        }
                    })
                    .collect();
                if usage.is_empty() {
                    format!("`/{}`: {}", c.name, c.description)
                } else {
                    format!("`/{} {}`: {}", c.name, usage.join(" "), c.description)
                }
            })
            .collect();

        let mut pages = Paginator::from_lines("Commands", &lines, ctx.page_size, MAX_PAGE_CHARS);
        pages.seek(interaction.integer("page"), interaction.string("control"))?;
        Ok(Response::embed(pages.render()))
    }
}

#[cfg(test)]
mod tests {
    use crate::command::{Interaction, OptionValue};
    use crate::error::BotError;
    use crate::plugins::testing;

    fn help(page: Option<i64>) -> crate::command::Embed {
        let (mut host, _) = testing::host();
        let mut interaction = Interaction::new("help", "c", "u");
        if let Some(page) = page {
            interaction = interaction.with_option("page", OptionValue::Integer(page));
        }
        host.dispatch(&interaction).unwrap().embed.unwrap()
    }

    #[test]
    fn first_page_lists_commands_alphabetically() {
        let embed = help(None);
        let lines: Vec<&str> = embed.description.lines().collect();
        assert_eq!(lines.len(), 3, "page size is 3 in the test host");
        assert!(lines[0].starts_with("`/alt-add <main> <alt>`"), "{}", lines[0]);
        assert!(lines[1].starts_with("`/alt-list <main> [page] [control]`"), "{}", lines[1]);
        assert_eq!(embed.footer.as_deref(), Some("Page 1/3"));
    }

    #[test]
    fn page_option_is_clamped() {
        // 8 commands at 3 per page
        assert_eq!(help(Some(3)).footer.as_deref(), Some("Page 3/3"));
        assert_eq!(help(Some(42)).footer.as_deref(), Some("Page 3/3"));
        assert_eq!(help(Some(-1)).footer.as_deref(), Some("Page 1/3"));
        assert!(help(Some(3)).description.contains("`/remind <in> <text>`"));
    }

    #[test]
    fn control_option_steps_from_the_page() {
        let (mut host, _) = testing::host();
        let step = |page: i64, control: &str| {
            Interaction::new("help", "c", "u")
                .with_option("page", OptionValue::Integer(page))
                .with_option("control", OptionValue::String(control.into()))
        };
        let footer = |r: crate::command::Response| r.embed.unwrap().footer.unwrap();

        assert_eq!(footer(host.dispatch(&step(1, "next")).unwrap()), "Page 2/3");
        assert_eq!(footer(host.dispatch(&step(1, "prev")).unwrap()), "Page 1/3");
        assert_eq!(footer(host.dispatch(&step(2, "last")).unwrap()), "Page 3/3");
        assert!(matches!(
            host.dispatch(&step(1, "sideways")),
            Err(BotError::InvalidPageControl(_))
        ));
    }
}
