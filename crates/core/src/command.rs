//! Mention text parsing.
//!
//! A mention message looks like `<@BOT> name arg1 arg2`. The text is split on
//! single spaces: the first token is the mention itself and is discarded, the
//! second is the command name, and everything after it is an argument.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a mention into a [`CommandInvocation`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The text has no token after the mention.
    #[error("mention must be followed by a command name")]
    MissingName,
}

/// A command name and its arguments, taken from a mention message.
///
/// `name` is always present; `args` may be empty.
///
/// ## Examples
///
/// ```
/// use gohan_core::CommandInvocation;
///
/// let cmd = CommandInvocation::parse("<@U0BOT> check 1625097600123456").unwrap();
/// assert_eq!(cmd.name(), "check");
/// assert_eq!(cmd.args(), ["1625097600123456"]);
///
/// assert!(CommandInvocation::parse("<@U0BOT>").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInvocation {
    name: String,
    args: Vec<String>,
}

impl CommandInvocation {
    /// Split mention text on single-space boundaries.
    ///
    /// Consecutive spaces produce empty tokens, so `"<@B>  ping"` has an empty
    /// command name. Such names match no command and are ignored downstream.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingName`] if the text has fewer than two
    /// tokens.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let mut tokens = text.split(' ').skip(1);
        let name = tokens.next().ok_or(CommandError::MissingName)?;

        Ok(Self {
            name: name.to_owned(),
            args: tokens.map(str::to_owned).collect(),
        })
    }

    /// The command name (second token).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments after the command name, in order.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The single argument of a one-argument command.
    ///
    /// Returns `None` unless exactly one argument was given.
    #[must_use]
    pub fn single_arg(&self) -> Option<&str> {
        match self.args.as_slice() {
            [arg] => Some(arg.as_str()),
            _ => None,
        }
    }
}

/// Commands the bot knows how to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Reply `pong` in the channel.
    Ping,
    /// Post the ephemeral gohan menu.
    Gohan,
    /// Create a throwaway channel.
    Conversations,
    /// Schedule a delayed `reactions` nudge for a message id.
    Check,
    /// List the reactions on a message id.
    Reactions,
}

impl Command {
    /// Every command, in help order.
    pub const ALL: [Self; 5] = [
        Self::Ping,
        Self::Gohan,
        Self::Conversations,
        Self::Check,
        Self::Reactions,
    ];

    /// The name typed after the mention.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Gohan => "gohan",
            Self::Conversations => "conversations",
            Self::Check => "check",
            Self::Reactions => "reactions",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a name is not a known [`Command`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name() == s)
            .ok_or_else(|| UnknownCommand(s.to_owned()))
    }
}

/// Which commands a deployment answers.
///
/// `Basic` answers `ping`, `gohan` and `conversations`. `Full` also answers
/// the message-id commands `check` and `reactions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandSet {
    /// Menu and channel commands only.
    Basic,
    /// Every command.
    #[default]
    Full,
}

impl CommandSet {
    /// Whether `command` is answered under this set.
    #[must_use]
    pub const fn enables(self, command: Command) -> bool {
        match self {
            Self::Full => true,
            Self::Basic => matches!(
                command,
                Command::Ping | Command::Gohan | Command::Conversations
            ),
        }
    }
}

/// Error returned when a name is not a known [`CommandSet`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown command set: {0} (expected `basic` or `full`)")]
pub struct UnknownCommandSet(pub String);

impl FromStr for CommandSet {
    type Err = UnknownCommandSet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "full" => Ok(Self::Full),
            _ => Err(UnknownCommandSet(s.to_owned())),
        }
    }
}
