pub mod alt;
pub mod commands;
pub mod config;
pub mod init;
pub mod migrate;
pub mod run;
pub mod store;
