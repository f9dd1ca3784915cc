//! Plugin host: command routing, option checking and the scheduled-action
//! runner shared by every plugin.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::action::{Action, ActionRunner, JobId, SharedClock, SystemClock};
use crate::command::{CommandSpec, Interaction, OutgoingMessage, Response};
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::plugins;
use crate::store::{open_store, DocumentStore};

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

/// Messages produced by scheduled actions, waiting for the gateway to send
/// them.
#[derive(Debug, Clone, Default)]
pub struct Outbox(Arc<Mutex<Vec<OutgoingMessage>>>);

impl Outbox {
    pub fn push(&self, message: OutgoingMessage) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    pub fn drain(&self) -> Vec<OutgoingMessage> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Leaf action that queues one message on its first `execute`.
pub struct SendMessage {
    outbox: Outbox,
    message: Option<OutgoingMessage>,
}

impl SendMessage {
    pub fn new(outbox: Outbox, channel_id: &str, content: impl Into<String>) -> Self {
        Self {
            outbox,
            message: Some(OutgoingMessage {
                channel_id: channel_id.to_string(),
                content: content.into(),
            }),
        }
    }
}

impl Action for SendMessage {
    fn execute(&mut self) {
        if let Some(message) = self.message.take() {
            self.outbox.push(message);
        }
    }

    fn is_finished(&self) -> bool {
        self.message.is_none()
    }
}

// ---------------------------------------------------------------------------
// Plugin / Context
// ---------------------------------------------------------------------------

/// What a plugin sees while handling one interaction.
pub struct Context<'a> {
    pub store: &'a mut dyn DocumentStore,
    pub clock: SharedClock,
    pub page_size: usize,
    /// Every registered command, sorted by name.
    pub commands: &'a [CommandSpec],
    runner: &'a mut ActionRunner,
    outbox: &'a Outbox,
}

impl Context<'_> {
    /// Start `action` on the host runner. It is ticked with every other job
    /// until finished.
    pub fn schedule(&mut self, label: impl Into<String>, action: impl Action + 'static) -> JobId {
        self.runner.spawn(label, action)
    }

    /// A message leaf bound to the host outbox.
    pub fn message(&self, channel_id: &str, content: impl Into<String>) -> SendMessage {
        SendMessage::new(self.outbox.clone(), channel_id, content)
    }
}

pub trait Plugin: Send {
    fn name(&self) -> &str;

    fn commands(&self) -> Vec<CommandSpec>;

    fn handle(&mut self, ctx: &mut Context<'_>, interaction: &Interaction) -> Result<Response>;
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

struct Route {
    plugin: usize,
    spec: CommandSpec,
}

pub struct Host {
    plugins: Vec<Box<dyn Plugin>>,
    routes: BTreeMap<String, Route>,
    store: Box<dyn DocumentStore>,
    runner: ActionRunner,
    outbox: Outbox,
    clock: SharedClock,
    page_size: usize,
}

impl Host {
    pub fn new(store: Box<dyn DocumentStore>) -> Self {
        Self {
            plugins: Vec::new(),
            routes: BTreeMap::new(),
            store,
            runner: ActionRunner::new(),
            outbox: Outbox::default(),
            clock: SystemClock::shared(),
            page_size: 10,
        }
    }

    /// Open the configured store and register every enabled built-in plugin.
    pub fn from_config(root: &Path, config: &Config) -> Result<Self> {
        let store = open_store(root, &config.store)?;
        let mut host = Host::new(store).with_page_size(config.plugins.page_size);
        for name in &config.plugins.enabled {
            match plugins::builtin(name) {
                Some(plugin) => host.register_boxed(plugin)?,
                None => tracing::warn!(plugin = %name, "unknown plugin skipped"),
            }
        }
        Ok(host)
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn register(&mut self, plugin: impl Plugin + 'static) -> Result<()> {
        self.register_boxed(Box::new(plugin))
    }

    /// Validate and route every command of `plugin`. Nothing is registered
    /// when any command is invalid or already taken.
    pub fn register_boxed(&mut self, plugin: Box<dyn Plugin>) -> Result<()> {
        let specs = plugin.commands();
        for (i, spec) in specs.iter().enumerate() {
            spec.validate()?;
            if self.routes.contains_key(&spec.name) || specs[..i].iter().any(|s| s.name == spec.name)
            {
                return Err(BotError::DuplicateCommand(spec.name.clone()));
            }
        }

        let index = self.plugins.len();
        info!(plugin = plugin.name(), commands = specs.len(), "plugin registered");
        for spec in specs {
            self.routes.insert(
                spec.name.clone(),
                Route {
                    plugin: index,
                    spec,
                },
            );
        }
        self.plugins.push(plugin);
        Ok(())
    }

    /// Registration payload: every command, sorted by name.
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.routes.values().map(|r| r.spec.clone()).collect()
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Route `interaction` to the plugin owning its command.
    pub fn dispatch(&mut self, interaction: &Interaction) -> Result<Response> {
        let route = self
            .routes
            .get(&interaction.command)
            .ok_or_else(|| BotError::UnknownCommand(interaction.command.clone()))?;
        check_interaction(&route.spec, interaction)?;
        debug!(
            command = %interaction.command,
            user = %interaction.user_id,
            "dispatching interaction"
        );

        let commands = self.commands();
        let plugin = &mut self.plugins[route.plugin];
        let mut ctx = Context {
            store: self.store.as_mut(),
            clock: self.clock.clone(),
            page_size: self.page_size,
            commands: &commands,
            runner: &mut self.runner,
            outbox: &self.outbox,
        };
        plugin.handle(&mut ctx, interaction)
    }

    /// Tick every scheduled job once and collect the messages they queued.
    pub fn tick(&mut self) -> Vec<OutgoingMessage> {
        for id in self.runner.tick() {
            debug!(job = %id, "scheduled job done");
        }
        self.outbox.drain()
    }

    pub fn pending_jobs(&self) -> usize {
        self.runner.len()
    }

    /// Labels of the scheduled jobs, in schedule order.
    pub fn pending_labels(&self) -> Vec<String> {
        self.runner
            .labels()
            .into_iter()
            .map(|(_, label)| label.to_string())
            .collect()
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }
}

fn check_interaction(spec: &CommandSpec, interaction: &Interaction) -> Result<()> {
    let invalid = |option: &str, reason: String| BotError::InvalidOption {
        command: spec.name.clone(),
        option: option.to_string(),
        reason,
    };

    if spec.guild_only && interaction.guild_id.is_none() {
        return Err(BotError::GuildOnly(spec.name.clone()));
    }
    for (name, value) in &interaction.options {
        let option = spec
            .find_option(name)
            .ok_or_else(|| invalid(name.as_str(), "unknown option".to_string()))?;
        if !option.kind.accepts(value) {
            return Err(invalid(
                name.as_str(),
                format!("expected {}, got {}", option.kind, value.kind_name()),
            ));
        }
    }
    for option in spec.options.iter().filter(|o| o.required) {
        if !interaction.options.contains_key(&option.name) {
            return Err(invalid(option.name.as_str(), "required option missing".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionExt;
    use crate::command::{OptionKind, OptionSpec, OptionValue};
    use crate::store::MemoryStore;
    use std::time::Duration;

    struct Echo {
        name: &'static str,
        commands: Vec<CommandSpec>,
    }

    impl Echo {
        fn new(name: &'static str, commands: &[&str]) -> Self {
            Self {
                name,
                commands: commands
                    .iter()
                    .map(|c| {
                        CommandSpec::new(c, "echo").option(OptionSpec::optional(
                            "n",
                            "number",
                            OptionKind::Integer,
                        ))
                    })
                    .collect(),
            }
        }
    }

    impl Plugin for Echo {
        fn name(&self) -> &str {
            self.name
        }

        fn commands(&self) -> Vec<CommandSpec> {
            self.commands.clone()
        }

        fn handle(&mut self, ctx: &mut Context<'_>, interaction: &Interaction) -> Result<Response> {
            let later = ctx
                .message(&interaction.channel_id, format!("later {}", interaction.command))
                .delay_for_on(Duration::from_secs(1), ctx.clock.clone());
            ctx.schedule("echo", later);
            Ok(Response::text(format!("{} from {}", interaction.command, self.name)))
        }
    }

    fn host() -> Host {
        Host::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn routes_to_the_owning_plugin() {
        let mut host = host();
        host.register(Echo::new("first", &["alpha"])).unwrap();
        host.register(Echo::new("second", &["beta"])).unwrap();

        let reply = host.dispatch(&Interaction::new("beta", "c", "u")).unwrap();
        assert_eq!(reply.content, "beta from second");
        assert_eq!(host.plugin_names(), vec!["first", "second"]);
    }

    #[test]
    fn duplicate_commands_are_rejected_atomically() {
        let mut host = host();
        host.register(Echo::new("first", &["alpha"])).unwrap();
        let err = host
            .register(Echo::new("second", &["beta", "alpha"]))
            .unwrap_err();
        assert!(matches!(err, BotError::DuplicateCommand(ref c) if c == "alpha"));
        assert_eq!(host.commands().len(), 1, "beta is not half-registered");

        let err = host.register(Echo::new("third", &["x", "x"])).unwrap_err();
        assert!(matches!(err, BotError::DuplicateCommand(_)));
    }

    #[test]
    fn invalid_specs_are_rejected() {
        let mut host = host();
        let err = host.register(Echo::new("bad", &["Not Valid"])).unwrap_err();
        assert!(matches!(err, BotError::InvalidCommand { .. }));
    }

    #[test]
    fn commands_are_sorted_by_name() {
        let mut host = host();
        host.register(Echo::new("p", &["zeta", "alpha", "mid"])).unwrap();
        let names: Vec<String> = host.commands().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn unknown_command() {
        let mut host = host();
        let err = host.dispatch(&Interaction::new("nope", "c", "u")).unwrap_err();
        assert!(matches!(err, BotError::UnknownCommand(_)));
    }

    #[test]
    fn options_are_checked_before_the_plugin_runs() {
        let mut host = host();
        host.register(Echo::new("p", &["alpha"])).unwrap();

        let wrong_kind =
            Interaction::new("alpha", "c", "u").with_option("n", OptionValue::String("x".into()));
        assert!(matches!(
            host.dispatch(&wrong_kind),
            Err(BotError::InvalidOption { .. })
        ));

        let unknown =
            Interaction::new("alpha", "c", "u").with_option("zzz", OptionValue::Integer(1));
        assert!(matches!(
            host.dispatch(&unknown),
            Err(BotError::InvalidOption { .. })
        ));
        assert_eq!(host.pending_jobs(), 0);
    }

    #[test]
    fn missing_required_option() {
        let spec = CommandSpec::new("need", "needs x")
            .option(OptionSpec::required("x", "x", OptionKind::String));
        let err = check_interaction(&spec, &Interaction::new("need", "c", "u")).unwrap_err();
        assert!(err.to_string().contains("required option missing"), "{err}");
    }

    #[test]
    fn guild_only_commands_need_a_guild() {
        let spec = CommandSpec::new("g", "guild").guild_only();
        let dm = Interaction::new("g", "c", "u");
        assert!(matches!(check_interaction(&spec, &dm), Err(BotError::GuildOnly(_))));
        check_interaction(&spec, &dm.in_guild("g1")).unwrap();
    }

    #[test]
    fn tick_drains_scheduled_messages() {
        let clock = Arc::new(crate::action::ManualClock::new());
        let mut host = host().with_clock(clock.clone());
        host.register(Echo::new("p", &["alpha"])).unwrap();

        host.dispatch(&Interaction::new("alpha", "chan", "u")).unwrap();
        assert_eq!(host.pending_jobs(), 1);
        assert_eq!(host.pending_labels(), vec!["echo"]);
        assert!(host.tick().is_empty());

        clock.advance(Duration::from_secs(2));
        let sent = host.tick();
        assert_eq!(
            sent,
            vec![OutgoingMessage {
                channel_id: "chan".into(),
                content: "later alpha".into(),
            }]
        );
        host.tick();
        assert_eq!(host.pending_jobs(), 0);
    }

    #[test]
    fn send_message_queues_once() {
        let outbox = Outbox::default();
        let mut action = SendMessage::new(outbox.clone(), "c", "hi");
        assert!(!action.is_finished());
        action.execute();
        action.execute();
        assert!(action.is_finished());
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox.drain()[0].content, "hi");
        assert!(outbox.is_empty());
    }
}
