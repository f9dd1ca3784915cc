use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("not initialized: run 'tickbot init'")]
    NotInitialized,

    #[error("invalid collection name '{0}': must be lowercase alphanumeric with '-' or '_'")]
    InvalidCollection(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("command already registered: {0}")]
    DuplicateCommand(String),

    #[error("invalid command '{name}': {reason}")]
    InvalidCommand { name: String, reason: String },

    #[error("invalid option '{option}' for /{command}: {reason}")]
    InvalidOption {
        command: String,
        option: String,
        reason: String,
    },

    #[error("/{0} can only be used inside a server")]
    GuildOnly(String),

    #[error("a user cannot be registered as their own alt: {0}")]
    AltSelfLink(String),

    #[error("{alt} is already registered as an alt of {main}")]
    AltAlreadyLinked { alt: String, main: String },

    #[error("{0} has alts of their own and cannot be registered as an alt")]
    AltIsMain(String),

    #[error("invalid duration '{0}': expected something like 90s, 15m or 1h30m")]
    InvalidDuration(String),

    #[error("unknown page control '{0}': expected first, prev, next or last")]
    InvalidPageControl(String),

    #[error("action tree still running after {0} ticks")]
    TickLimit(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
