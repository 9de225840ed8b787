//! Core types for the gohan bot.
//!
//! This module provides type-safe wrappers for common Slack concepts.

pub mod id;
pub mod message_ts;

pub use id::*;
pub use message_ts::{MessageTs, MessageTsError};
