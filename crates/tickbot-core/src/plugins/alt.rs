use chrono::Utc;

use crate::alts::{add_alt, alts_of, main_of, remove_alt};
use crate::command::{CommandSpec, Interaction, OptionKind, OptionSpec, Response};
use crate::error::{BotError, Result};
use crate::host::{Context, Plugin};
use crate::paginate::Paginator;
use crate::text::{mention, pluralize};

const MAX_PAGE_CHARS: usize = 4096;

/// `/alt-add`, `/alt-remove`, `/alt-list` and `/alt-whois`.
pub struct AltPlugin;

impl Plugin for AltPlugin {
    fn name(&self) -> &str {
        "alt"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("alt-add", "Register an alternate account")
                .option(OptionSpec::required("main", "Main account", OptionKind::User))
                .option(OptionSpec::required("alt", "Alternate account", OptionKind::User))
                .guild_only(),
            CommandSpec::new("alt-remove", "Unregister an alternate account")
                .option(OptionSpec::required("alt", "Alternate account", OptionKind::User))
                .guild_only(),
            CommandSpec::new("alt-list", "List the alternate accounts of a user")
                .option(OptionSpec::required("main", "Main account", OptionKind::User))
                .option(OptionSpec::optional("page", "Page to show", OptionKind::Integer))
                .option(OptionSpec::optional(
                    "control",
                    "first, prev, next or last",
                    OptionKind::String,
                ))
                .guild_only(),
            CommandSpec::new("alt-whois", "Show which accounts a user is linked to")
                .option(OptionSpec::required("user", "User to look up", OptionKind::User))
                .guild_only(),
        ]
    }

    fn handle(&mut self, ctx: &mut Context<'_>, interaction: &Interaction) -> Result<Response> {
        let guild = interaction
            .guild_id
            .as_deref()
            .ok_or_else(|| BotError::GuildOnly(interaction.command.clone()))?;
        let user = |name: &str| {
            interaction.user(name).ok_or_else(|| BotError::InvalidOption {
                command: interaction.command.clone(),
                option: name.to_string(),
                reason: "expected a user".to_string(),
            })
        };

        match interaction.command.as_str() {
            "alt-add" => {
                let link = add_alt(
                    ctx.store,
                    guild,
                    user("main")?,
                    user("alt")?,
                    &interaction.user_id,
                    Utc::now(),
                )?;
                Ok(Response::text(format!(
                    "{} is now registered as an alt of {}",
                    mention(&link.alt_id),
                    mention(&link.main_id)
                )))
            }
            "alt-remove" => {
                let alt = user("alt")?;
                Ok(match remove_alt(ctx.store, guild, alt)? {
                    Some(link) => Response::text(format!(
                        "{} is no longer an alt of {}",
                        mention(alt),
                        mention(&link.main_id)
                    )),
                    None => Response::ephemeral(format!("{} is not a registered alt", mention(alt))),
                })
            }
            "alt-list" => {
                let main = user("main")?;
                let links = alts_of(ctx.store, guild, main)?;
                if links.is_empty() {
                    return Ok(Response::ephemeral(format!(
                        "{} has no registered alts",
                        mention(main)
                    )));
                }
                let lines: Vec<String> = links
                    .iter()
                    .enumerate()
                    .map(|(i, link)| {
                        format!(
                            "{}. {} (added by {} on {})",
                            i + 1,
                            mention(&link.alt_id),
                            mention(&link.added_by),
                            link.added_at.format("%Y-%m-%d")
                        )
                    })
                    .collect();
                let title = format!("{} of {}", pluralize(links.len(), "alt"), mention(main));
                let mut pages = Paginator::from_lines(title, &lines, ctx.page_size, MAX_PAGE_CHARS);
                pages.seek(interaction.integer("page"), interaction.string("control"))?;
                Ok(Response::embed(pages.render()))
            }
            "alt-whois" => {
                let who = user("user")?;
                if let Some(main) = main_of(ctx.store, guild, who)? {
                    return Ok(Response::text(format!(
                        "{} is an alt of {}",
                        mention(who),
                        mention(&main)
                    )));
                }
                let alts: Vec<String> = alts_of(ctx.store, guild, who)?
                    .iter()
                    .map(|link| mention(&link.alt_id))
                    .collect();
                Ok(Response::text(if alts.is_empty() {
                    format!("{} has no linked accounts", mention(who))
                } else {
                    format!(
                        "{} is a main with {}: {}",
                        mention(who),
                        pluralize(alts.len(), "alt"),
                        alts.join(", ")
                    )
                }))
            }
            other => Err(BotError::UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::command::{Interaction, OptionValue};
    use crate::error::BotError;
    use crate::host::Host;
    use crate::plugins::testing;

    fn user(id: &str) -> OptionValue {
        OptionValue::String(format!("<@{id}>"))
    }

    fn add(host: &mut Host, main: &str, alt: &str) -> crate::error::Result<String> {
        let interaction = Interaction::new("alt-add", "c", "mod")
            .in_guild("g1")
            .with_option("main", user(main))
            .with_option("alt", user(alt));
        host.dispatch(&interaction).map(|r| r.content)
    }

    fn run(host: &mut Host, command: &str, option: &str, id: &str) -> crate::command::Response {
        let interaction = Interaction::new(command, "c", "mod")
            .in_guild("g1")
            .with_option(option, user(id));
        host.dispatch(&interaction).unwrap()
    }

    #[test]
    fn add_then_whois() {
        let (mut host, _) = testing::host();
        assert_eq!(add(&mut host, "1", "2").unwrap(), "<@2> is now registered as an alt of <@1>");
        add(&mut host, "1", "3").unwrap();

        assert_eq!(run(&mut host, "alt-whois", "user", "2").content, "<@2> is an alt of <@1>");
        assert_eq!(
            run(&mut host, "alt-whois", "user", "1").content,
            "<@1> is a main with 2 alts: <@2>, <@3>"
        );
        assert_eq!(run(&mut host, "alt-whois", "user", "9").content, "<@9> has no linked accounts");
    }

    #[test]
    fn chained_add_reports_the_root_main() {
        let (mut host, _) = testing::host();
        add(&mut host, "1", "2").unwrap();
        assert_eq!(add(&mut host, "2", "3").unwrap(), "<@3> is now registered as an alt of <@1>");
    }

    #[test]
    fn rule_violations_surface_as_errors() {
        let (mut host, _) = testing::host();
        assert!(matches!(add(&mut host, "1", "1"), Err(BotError::AltSelfLink(_))));
        add(&mut host, "1", "2").unwrap();
        assert!(matches!(
            add(&mut host, "5", "2"),
            Err(BotError::AltAlreadyLinked { .. })
        ));
    }

    #[test]
    fn list_paginates() {
        let (mut host, _) = testing::host();
        for alt in ["2", "3", "4", "5"] {
            add(&mut host, "1", alt).unwrap();
        }
        let embed = run(&mut host, "alt-list", "main", "1").embed.unwrap();
        assert_eq!(embed.title, "4 alts of <@1>");
        assert_eq!(embed.footer.as_deref(), Some("Page 1/2"));
        assert!(embed.description.starts_with("1. <@2> (added by <@mod> on "));

        let last = Interaction::new("alt-list", "c", "mod")
            .in_guild("g1")
            .with_option("main", user("1"))
            .with_option("control", OptionValue::String("last".into()));
        let embed = host.dispatch(&last).unwrap().embed.unwrap();
        assert_eq!(embed.footer.as_deref(), Some("Page 2/2"));
        assert!(embed.description.starts_with("4. <@5>"));

        let empty = run(&mut host, "alt-list", "main", "9");
        assert!(empty.ephemeral);
        assert!(empty.embed.is_none());
    }

    #[test]
    fn remove_unlinks() {
        let (mut host, _) = testing::host();
        add(&mut host, "1", "2").unwrap();
        assert_eq!(run(&mut host, "alt-remove", "alt", "2").content, "<@2> is no longer an alt of <@1>");
        assert!(run(&mut host, "alt-remove", "alt", "2").ephemeral);
    }

    #[test]
    fn outside_a_guild_is_rejected() {
        let (mut host, _) = testing::host();
        let dm = Interaction::new("alt-whois", "c", "u").with_option("user", user("1"));
        assert!(matches!(host.dispatch(&dm), Err(BotError::GuildOnly(_))));
    }
}
