//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::BotConfig;
use crate::services::{
    CommandDispatcher, DelayedTaskScheduler, DetachedLauncher, DispatcherSettings,
    InteractionStateMachine, TaskLauncher,
};
use crate::slack::{Messenger, SignatureVerifier, SlackClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and gives handlers the
/// signature verifier and the command and interaction services.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    verifier: SignatureVerifier,
    scheduler: DelayedTaskScheduler,
    dispatcher: CommandDispatcher,
    interactions: InteractionStateMachine,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("verifier", &self.inner.verifier)
            .field("dispatcher", &self.inner.dispatcher)
            .field("interactions", &self.inner.interactions)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create the production state: Slack Web API client and detached
    /// background workflows.
    #[must_use]
    pub fn new(config: &BotConfig) -> Self {
        let messenger: Arc<dyn Messenger> =
            Arc::new(SlackClient::new(config.slack.bot_token.clone()));

        Self::from_parts(
            config.signature_verifier(),
            messenger,
            Arc::new(DetachedLauncher),
            config.dispatcher_settings(),
            config.cooking_duration,
        )
    }

    /// Create a state from explicit collaborators.
    ///
    /// # Arguments
    ///
    /// * `verifier` - Inbound signature verifier
    /// * `messenger` - Outbound Slack operations
    /// * `launcher` - Starts the cooking workflow
    /// * `settings` - Command dispatch settings
    /// * `cooking_duration` - Wait between the cooking notices
    #[must_use]
    pub fn from_parts(
        verifier: SignatureVerifier,
        messenger: Arc<dyn Messenger>,
        launcher: Arc<dyn TaskLauncher>,
        settings: DispatcherSettings,
        cooking_duration: Duration,
    ) -> Self {
        let scheduler = DelayedTaskScheduler::new();
        let dispatcher = CommandDispatcher::new(Arc::clone(&messenger), scheduler.clone(), settings);
        let interactions = InteractionStateMachine::new(messenger, launcher, cooking_duration);

        Self {
            inner: Arc::new(AppStateInner {
                verifier,
                scheduler,
                dispatcher,
                interactions,
            }),
        }
    }

    /// Get a reference to the webhook signature verifier.
    #[must_use]
    pub fn verifier(&self) -> &SignatureVerifier {
        &self.inner.verifier
    }

    /// Get a reference to the delayed task scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &DelayedTaskScheduler {
        &self.inner.scheduler
    }

    /// Get a reference to the mention command dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.inner.dispatcher
    }

    /// Get a reference to the interaction state machine.
    #[must_use]
    pub fn interactions(&self) -> &InteractionStateMachine {
        &self.inner.interactions
    }
}
