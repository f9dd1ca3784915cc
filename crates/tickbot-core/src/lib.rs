pub mod action;
pub mod alts;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod io;
pub mod migrate;
pub mod paginate;
pub mod paths;
pub mod plugins;
pub mod store;
pub mod text;

pub use error::{BotError, Result};
