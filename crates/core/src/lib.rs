//! Gohan Core - Shared types library.
//!
//! This crate provides common types used across the gohan bot components:
//! - `bot` - Slack webhook server (events, interactions, scheduling)
//! - `cli` - Operator tooling for signing and inspecting requests
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no HTTP
//! clients, no timers. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for Slack IDs and message timestamps
//! - [`command`] - Mention text parsing into a [`CommandInvocation`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod command;
pub mod types;

pub use command::{
    Command, CommandError, CommandInvocation, CommandSet, UnknownCommand, UnknownCommandSet,
};
pub use types::*;
