//! Slack integration for the gohan bot.
//!
//! This module provides:
//! - [`SignatureVerifier`] for authenticating inbound webhooks
//! - Envelope and interaction payload types for the two webhook endpoints
//! - [`Messenger`] and its Web API implementation [`SlackClient`]
//! - Block Kit types and message builders for the gohan flow
//!
//! # Flow
//!
//! 1. A user mentions the bot with `gohan`; an ephemeral menu is posted
//! 2. The user picks a dish; the menu is replaced with confirm/deny buttons
//! 3. The user confirms; the bot announces the wait, then the result

mod client;
mod error;
mod events;
mod interaction;
pub mod messages;
mod messenger;
pub mod signature;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::SlackClient;
pub use error::SlackError;
pub use events::{EventEnvelope, InnerEvent, MentionEvent};
pub use interaction::{
    BlockAction, BlockActionsPayload, InteractionChannel, InteractionContainer,
    InteractionPayload, InteractionUser, RawAction, SelectedOption,
};
pub use messenger::Messenger;
pub use signature::{SignatureError, SignatureVerifier, VerifiedBody};
pub use types::{
    ActionElement, Block, ButtonStyle, EphemeralMessage, OptionObject, PlainText,
    PostEphemeralResponse, PostMessageResponse, Reaction, ResponseUrlMessage, SlackMessage, Text,
};
