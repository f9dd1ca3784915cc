//! Slash-command declarations and the interaction/response payloads that
//! flow between a gateway and the plugin host.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::paths::is_valid_command_name;

pub const MAX_DESCRIPTION_CHARS: usize = 100;
pub const MAX_OPTIONS: usize = 25;

// ---------------------------------------------------------------------------
// OptionKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    /// A user id (digits), or a `<@id>` mention.
    User,
}

impl OptionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionKind::String => "string",
            OptionKind::Integer => "integer",
            OptionKind::Boolean => "boolean",
            OptionKind::User => "user",
        }
    }

    pub fn accepts(self, value: &OptionValue) -> bool {
        match (self, value) {
            (OptionKind::String, OptionValue::String(_)) => true,
            (OptionKind::Integer, OptionValue::Integer(_)) => true,
            (OptionKind::Boolean, OptionValue::Boolean(_)) => true,
            (OptionKind::User, OptionValue::String(s)) => parse_user_id(s).is_some(),
            _ => false,
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `"123"`, `"<@123>"` and `"<@!123>"` all name user `123`.
pub fn parse_user_id(raw: &str) -> Option<&str> {
    let id = raw
        .strip_prefix("<@")
        .and_then(|s| s.strip_suffix('>'))
        .map(|s| s.strip_prefix('!').unwrap_or(s))
        .unwrap_or(raw);
    (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then_some(id)
}

// ---------------------------------------------------------------------------
// CommandSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    #[serde(default)]
    pub required: bool,
}

impl OptionSpec {
    pub fn required(name: &str, description: &str, kind: OptionKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: &str, description: &str, kind: OptionKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, description, kind)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
    /// Rejected outside a guild when set.
    #[serde(default)]
    pub guild_only: bool,
}

impl CommandSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            options: Vec::new(),
            guild_only: false,
        }
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    pub fn find_option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Check the declaration against the platform's registration limits.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| BotError::InvalidCommand {
            name: self.name.clone(),
            reason,
        };

        if !is_valid_command_name(&self.name) {
            return Err(fail("name must be 1-32 lowercase letters, digits, '-' or '_'".into()));
        }
        check_description(&self.description).map_err(|r| fail(r.to_string()))?;
        if self.options.len() > MAX_OPTIONS {
            return Err(fail(format!("at most {MAX_OPTIONS} options are allowed")));
        }

        let mut seen_optional = false;
        for (i, option) in self.options.iter().enumerate() {
            if !is_valid_command_name(&option.name) {
                return Err(fail(format!("option '{}' has an invalid name", option.name)));
            }
            if self.options[..i].iter().any(|o| o.name == option.name) {
                return Err(fail(format!("option '{}' is declared twice", option.name)));
            }
            check_description(&option.description)
                .map_err(|r| fail(format!("option '{}': {r}", option.name)))?;
            if option.required && seen_optional {
                return Err(fail(format!(
                    "required option '{}' follows an optional one",
                    option.name
                )));
            }
            seen_optional |= !option.required;
        }
        Ok(())
    }
}

fn check_description(description: &str) -> std::result::Result<(), &'static str> {
    let len = description.chars().count();
    if len == 0 {
        Err("description must not be empty")
    } else if len > MAX_DESCRIPTION_CHARS {
        Err("description must be at most 100 characters")
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl OptionValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            OptionValue::Boolean(_) => "boolean",
            OptionValue::Integer(_) => "integer",
            OptionValue::String(_) => "string",
        }
    }
}

/// One slash-command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub user_id: String,
    pub command: String,
    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,
}

impl Interaction {
    pub fn new(command: &str, channel_id: &str, user_id: &str) -> Self {
        Self {
            id: String::new(),
            guild_id: None,
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
            command: command.to_string(),
            options: BTreeMap::new(),
        }
    }

    pub fn in_guild(mut self, guild_id: &str) -> Self {
        self.guild_id = Some(guild_id.to_string());
        self
    }

    pub fn with_option(mut self, name: &str, value: OptionValue) -> Self {
        self.options.insert(name.to_string(), value);
        self
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.options.get(name) {
            Some(OptionValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.options.get(name) {
            Some(OptionValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.options.get(name) {
            Some(OptionValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// A user option, normalized to the bare id.
    pub fn user(&self, name: &str) -> Option<&str> {
        self.string(name).and_then(parse_user_id)
    }
}

// ---------------------------------------------------------------------------
// Responses and outgoing messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
    /// Visible only to the invoking user.
    #[serde(default)]
    pub ephemeral: bool,
}

impl Response {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embed: None,
            ephemeral: false,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            ephemeral: true,
            ..Self::text(content)
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Self::text("")
        }
    }
}

/// A message sent to a channel outside of any interaction reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub channel_id: String,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
