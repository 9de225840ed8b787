//! Business logic services for the bot.
//!
//! # Services
//!
//! - `dispatcher` - Mention command dispatch
//! - `interactions` - The gohan select/confirm flow
//! - `scheduler` - One-shot delayed callbacks for `check`
//! - `tasks` - Launching detached background workflows

pub mod dispatcher;
pub mod interactions;
pub mod scheduler;
pub mod tasks;

pub use dispatcher::{CommandDispatcher, Dispatched, DispatcherSettings};
pub use interactions::{InteractionStateMachine, Transition, run_cooking_workflow};
pub use scheduler::{DelayedTaskScheduler, ScheduledTask, SchedulerError};
pub use tasks::{BoxTask, DetachedLauncher, TaskLauncher};

#[cfg(any(test, feature = "test-support"))]
pub use tasks::CollectingLauncher;
