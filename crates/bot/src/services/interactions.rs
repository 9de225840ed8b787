//! The gohan selection flow, driven by block actions.
//!
//! Two steps, keyed by the block ID of the action:
//! - `select-item`: replace the menu with a confirm/deny prompt
//! - `confirm-item`: launch the cooking workflow in the background
//!
//! Actions from any other block are ignored.

use std::sync::Arc;
use std::time::Duration;

use gohan_core::{ChannelId, UserId};
use tracing::{debug, error, info, instrument};

use super::tasks::TaskLauncher;
use crate::error::AppError;
use crate::slack::messages::{
    CONFIRM_BLOCK_ID, FALLBACK_TEXT, SELECT_BLOCK_ID, build_confirm_prompt, cooking_done_text,
    cooking_started_text,
};
use crate::slack::{BlockAction, Messenger, SlackError};

/// Default length of the cooking wait.
pub const DEFAULT_COOKING_DURATION: Duration = Duration::from_secs(10);

/// What an interaction led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The menu was replaced with the confirm/deny prompt.
    Prompted,
    /// The cooking workflow was launched.
    CookingStarted,
    /// The action came from a block this flow does not own.
    Ignored,
}

/// Routes block actions through the selection flow.
#[derive(Clone)]
pub struct InteractionStateMachine {
    messenger: Arc<dyn Messenger>,
    launcher: Arc<dyn TaskLauncher>,
    cooking_duration: Duration,
}

impl std::fmt::Debug for InteractionStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionStateMachine")
            .field("cooking_duration", &self.cooking_duration)
            .finish_non_exhaustive()
    }
}

impl InteractionStateMachine {
    /// Create a state machine.
    #[must_use]
    pub fn new(
        messenger: Arc<dyn Messenger>,
        launcher: Arc<dyn TaskLauncher>,
        cooking_duration: Duration,
    ) -> Self {
        Self {
            messenger,
            launcher,
            cooking_duration,
        }
    }

    /// Advance the flow for one block action.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] if the action lacks the value or
    /// response URL its step needs, and [`AppError::Slack`] if replacing the
    /// menu fails. Failures inside the cooking workflow are only logged.
    #[instrument(skip(self, action), fields(block_id = %action.block_id, user = %action.user))]
    pub async fn handle(&self, action: BlockAction) -> Result<Transition, AppError> {
        match action.block_id.as_str() {
            SELECT_BLOCK_ID => self.select(action).await,
            CONFIRM_BLOCK_ID => self.confirm(action),
            other => {
                debug!(block_id = other, "Ignoring action from unknown block");
                Ok(Transition::Ignored)
            }
        }
    }

    async fn select(&self, action: BlockAction) -> Result<Transition, AppError> {
        let value = required(action.value, "selected value")?;
        let response_url = required(action.response_url, "response_url")?;

        self.messenger
            .replace_message(&response_url, FALLBACK_TEXT, build_confirm_prompt(&value))
            .await?;

        info!(gohan = %value, "Replaced menu with confirmation prompt");
        Ok(Transition::Prompted)
    }

    fn confirm(&self, action: BlockAction) -> Result<Transition, AppError> {
        let value = required(action.value, "button value")?;
        let channel = required(action.channel, "channel")?;

        let workflow = run_cooking_workflow(
            Arc::clone(&self.messenger),
            channel,
            action.user,
            value,
            self.cooking_duration,
        );
        self.launcher.launch("cooking", Box::pin(async move {
            if let Err(e) = workflow.await {
                error!(error = %e, "Cooking workflow failed");
            }
        }));

        Ok(Transition::CookingStarted)
    }
}

fn required<T>(field: Option<T>, what: &str) -> Result<T, AppError> {
    field.ok_or_else(|| AppError::BadRequest(format!("interaction is missing {what}")))
}

/// Announce the wait, wait, then announce the result.
///
/// Stops at the first failed post.
///
/// # Errors
///
/// Returns the [`SlackError`] of the first post that fails.
#[instrument(skip(messenger), fields(channel = %channel, user = %user))]
pub async fn run_cooking_workflow(
    messenger: Arc<dyn Messenger>,
    channel: ChannelId,
    user: UserId,
    gohan: String,
    duration: Duration,
) -> Result<(), SlackError> {
    messenger
        .post_message(&channel, &cooking_started_text(&user, duration))
        .await?;

    tokio::time::sleep(duration).await;

    messenger
        .post_message(&channel, &cooking_done_text(&user, &gohan))
        .await?;

    info!("Cooking workflow finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tasks::CollectingLauncher;
    use crate::slack::testing::{RecordingMessenger, Sent};

    struct Harness {
        messenger: Arc<RecordingMessenger>,
        launcher: Arc<CollectingLauncher>,
        machine: InteractionStateMachine,
    }

    fn harness() -> Harness {
        let messenger = Arc::new(RecordingMessenger::new());
        let launcher = Arc::new(CollectingLauncher::new());
        let machine = InteractionStateMachine::new(
            messenger.clone(),
            launcher.clone(),
            Duration::from_secs(10),
        );
        Harness {
            messenger,
            launcher,
            machine,
        }
    }

    fn action(block_id: &str, value: Option<&str>) -> BlockAction {
        BlockAction {
            block_id: block_id.to_string(),
            value: value.map(str::to_string),
            response_url: Some("https://hooks.slack.com/actions/T/1/abc".to_string()),
            user: UserId::new("U0USER"),
            channel: Some(ChannelId::new("C0CHAN")),
        }
    }

    #[tokio::test]
    async fn test_select_replaces_menu_with_prompt() {
        let h = harness();

        let transition = h
            .machine
            .handle(action(SELECT_BLOCK_ID, Some("sushi")))
            .await
            .expect("select");
        assert_eq!(transition, Transition::Prompted);

        let sent = h.messenger.sent();
        let [Sent::Replaced {
            response_url,
            blocks,
            ..
        }] = sent.as_slice()
        else {
            panic!("expected one replace, got {sent:?}");
        };
        assert_eq!(response_url, "https://hooks.slack.com/actions/T/1/abc");
        assert_eq!(blocks[1]["block_id"], CONFIRM_BLOCK_ID);
        assert_eq!(blocks[1]["elements"][0]["value"], "sushi");
        assert_eq!(blocks[1]["elements"][1]["value"], "いいえ");
        assert!(h.launcher.launched().is_empty());
    }

    #[tokio::test]
    async fn test_select_without_response_url_is_bad_request() {
        let h = harness();
        let mut select = action(SELECT_BLOCK_ID, Some("sushi"));
        select.response_url = None;

        let err = h.machine.handle(select).await.expect_err("no url");
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_posts_start_then_done() {
        let h = harness();

        let transition = h
            .machine
            .handle(action(CONFIRM_BLOCK_ID, Some("sushi")))
            .await
            .expect("confirm");
        assert_eq!(transition, Transition::CookingStarted);

        // Nothing is posted until the workflow runs
        assert!(h.messenger.sent().is_empty());
        assert_eq!(h.launcher.launched(), ["cooking"]);

        h.launcher.run_all().await;

        assert_eq!(
            h.messenger.posted_texts(),
            [
                "<@U0USER> 了解しました. 10秒待つのです.",
                "<@U0USER> の今日のご飯は `sushi` に決定しました",
            ]
        );
    }

    #[tokio::test]
    async fn test_confirm_workflow_failure_is_not_propagated() {
        let h = harness();
        h.messenger.fail_all();

        let transition = h
            .machine
            .handle(action(CONFIRM_BLOCK_ID, Some("sushi")))
            .await
            .expect("confirm still succeeds");
        assert_eq!(transition, Transition::CookingStarted);

        h.launcher.run_all().await;
        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_block_is_ignored() {
        let h = harness();

        let transition = h
            .machine
            .handle(action("some-other-block", Some("x")))
            .await
            .expect("ignored");

        assert_eq!(transition, Transition::Ignored);
        assert!(h.messenger.sent().is_empty());
        assert!(h.launcher.launched().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_workflow_waits_between_posts() {
        let messenger = Arc::new(RecordingMessenger::new());
        let workflow = tokio::spawn(run_cooking_workflow(
            messenger.clone(),
            ChannelId::new("C0CHAN"),
            UserId::new("U0USER"),
            "寿司".to_string(),
            Duration::from_secs(10),
        ));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(messenger.posted_texts().len(), 1);

        workflow.await.expect("join").expect("workflow");
        assert_eq!(messenger.posted_texts().len(), 2);
    }
}
