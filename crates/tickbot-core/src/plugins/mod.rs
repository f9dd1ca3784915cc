//! Built-in plugins.

mod alt;
mod countdown;
mod help;
mod ping;
mod remind;

pub use alt::AltPlugin;
pub use countdown::CountdownPlugin;
pub use help::HelpPlugin;
pub use ping::PingPlugin;
pub use remind::RemindPlugin;

use crate::host::Plugin;

/// Names accepted in `plugins.enabled`.
pub const BUILTIN: &[&str] = &["ping", "help", "alt", "remind", "countdown"];

pub fn builtin(name: &str) -> Option<Box<dyn Plugin>> {
    let plugin: Box<dyn Plugin> = match name {
        "ping" => Box::new(PingPlugin),
        "help" => Box::new(HelpPlugin),
        "alt" => Box::new(AltPlugin),
        "remind" => Box::new(RemindPlugin),
        "countdown" => Box::new(CountdownPlugin),
        _ => return None,
    };
    Some(plugin)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::action::ManualClock;
    use crate::host::Host;
    use crate::store::MemoryStore;

    /// A host with every built-in registered, a manual clock and a memory store.
    pub fn host() -> (Host, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let mut host = Host::new(Box::new(MemoryStore::new()))
            .with_clock(clock.clone())
            .with_page_size(3);
        for name in super::BUILTIN {
            host.register_boxed(super::builtin(name).unwrap()).unwrap();
        }
        (host, clock)
    }
}
