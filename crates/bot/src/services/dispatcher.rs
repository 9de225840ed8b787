//! Mention command dispatch.
//!
//! Turns an `app_mention` into at most one command:
//! 1. Split the text into a [`CommandInvocation`] (bare mentions are rejected)
//! 2. Look the name up in the configured [`CommandSet`]; unknown or disabled
//!    names are ignored
//! 3. Check the argument count, then run the command

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use gohan_core::{ChannelId, Command, CommandInvocation, CommandSet, MessageTs, UserId};
use tracing::{debug, error, info, instrument};

use super::scheduler::{DelayedTaskScheduler, ScheduledTask};
use crate::error::AppError;
use crate::slack::messages::{
    FALLBACK_TEXT, PONG, build_menu_message, check_reminder_text, reaction_summary_text,
    temp_channel_name,
};
use crate::slack::{MentionEvent, Messenger};

/// Default delay before the `check` nudge is posted.
pub const DEFAULT_CHECK_DELAY: Duration = Duration::from_secs(10);

/// Default user tagged by the `check` nudge.
pub const DEFAULT_REFERENCE_USER: &str = "A017C1D07AR";

/// Tunables for [`CommandDispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// Commands this deployment answers.
    pub command_set: CommandSet,
    /// Delay before the `check` nudge.
    pub check_delay: Duration,
    /// User tagged by the `check` nudge.
    pub reference_user: UserId,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            command_set: CommandSet::Full,
            check_delay: DEFAULT_CHECK_DELAY,
            reference_user: UserId::new(DEFAULT_REFERENCE_USER),
        }
    }
}

/// What a mention led to.
#[derive(Debug)]
pub enum Dispatched {
    /// `ping` was answered.
    Ponged,
    /// The gohan menu was posted to the sender.
    MenuPosted,
    /// A throwaway channel was created.
    ChannelCreated(ChannelId),
    /// The `check` nudge is waiting to be posted.
    CheckScheduled(ScheduledTask),
    /// One message was posted per reaction.
    ReactionsListed(usize),
    /// Unknown or disabled command; nothing was done.
    Ignored,
}

/// Runs mention commands against a [`Messenger`].
#[derive(Clone)]
pub struct CommandDispatcher {
    messenger: Arc<dyn Messenger>,
    scheduler: DelayedTaskScheduler,
    settings: DispatcherSettings,
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("scheduler", &self.scheduler)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CommandDispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub fn new(
        messenger: Arc<dyn Messenger>,
        scheduler: DelayedTaskScheduler,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            messenger,
            scheduler,
            settings,
        }
    }

    /// Run the command in a mention.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] for a bare mention, a wrong argument
    /// count, or a message id that cannot be converted, and
    /// [`AppError::Slack`] if a synchronous Slack call fails.
    #[instrument(skip(self, event), fields(channel = %event.channel, user = %event.user))]
    pub async fn dispatch(&self, event: &MentionEvent) -> Result<Dispatched, AppError> {
        let invocation = CommandInvocation::parse(&event.text)?;

        let Ok(command) = invocation.name().parse::<Command>() else {
            debug!(name = invocation.name(), "Ignoring unknown command");
            return Ok(Dispatched::Ignored);
        };

        if !self.settings.command_set.enables(command) {
            debug!(%command, "Ignoring command outside the configured set");
            return Ok(Dispatched::Ignored);
        }

        info!(%command, "Dispatching command");

        match command {
            Command::Ping => self.ping(&event.channel).await,
            Command::Gohan => self.gohan(&event.channel, &event.user).await,
            Command::Conversations => self.conversations().await,
            Command::Check => {
                let message_id = message_id_arg(command, &invocation)?;
                self.check(&event.channel, message_id)
            }
            Command::Reactions => {
                let message_id = message_id_arg(command, &invocation)?;
                self.reactions(&event.channel, message_id).await
            }
        }
    }

    async fn ping(&self, channel: &ChannelId) -> Result<Dispatched, AppError> {
        self.messenger.post_message(channel, PONG).await?;
        Ok(Dispatched::Ponged)
    }

    async fn gohan(&self, channel: &ChannelId, user: &UserId) -> Result<Dispatched, AppError> {
        self.messenger
            .post_ephemeral(channel, user, FALLBACK_TEXT, build_menu_message())
            .await?;
        Ok(Dispatched::MenuPosted)
    }

    async fn conversations(&self) -> Result<Dispatched, AppError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal(format!("system clock before unix epoch: {e}")))?;
        let name = temp_channel_name(now.as_secs());

        let channel = self.messenger.create_conversation(&name).await?;
        info!(%channel, %name, "Created temporary channel");

        Ok(Dispatched::ChannelCreated(channel))
    }

    fn check(&self, channel: &ChannelId, message_id: &str) -> Result<Dispatched, AppError> {
        let messenger = Arc::clone(&self.messenger);
        let channel = channel.clone();
        let text = check_reminder_text(&self.settings.reference_user, message_id);

        let task = self
            .scheduler
            .schedule("check", self.settings.check_delay, move || async move {
                if let Err(e) = messenger.post_message(&channel, &text).await {
                    error!(error = %e, %channel, "Failed to post check reminder");
                }
            })?;

        info!(
            task_id = task.id(),
            delay_secs = self.settings.check_delay.as_secs(),
            "Scheduled check reminder"
        );
        Ok(Dispatched::CheckScheduled(task))
    }

    async fn reactions(&self, channel: &ChannelId, message_id: &str) -> Result<Dispatched, AppError> {
        let ts = MessageTs::from_message_id(message_id)?;
        let reactions = self.messenger.get_reactions(channel, &ts).await?;

        for reaction in &reactions {
            self.messenger
                .post_message(channel, &reaction_summary_text(reaction))
                .await?;
        }

        debug!(%ts, count = reactions.len(), "Listed reactions");
        Ok(Dispatched::ReactionsListed(reactions.len()))
    }
}

/// The one argument of a message-id command.
fn message_id_arg(command: Command, invocation: &CommandInvocation) -> Result<&str, AppError> {
    invocation.single_arg().ok_or_else(|| {
        AppError::BadRequest(format!(
            "{command} takes exactly one message id (got {} arguments)",
            invocation.args().len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::Reaction;
    use crate::slack::testing::{RecordingMessenger, Sent};

    fn mention(text: &str) -> MentionEvent {
        serde_json::from_value(serde_json::json!({
            "channel": "C0CHAN",
            "user": "U0USER",
            "text": text,
            "ts": "1625097600.000100"
        }))
        .expect("mention")
    }

    fn dispatcher_with(
        messenger: &Arc<RecordingMessenger>,
        settings: DispatcherSettings,
    ) -> CommandDispatcher {
        let messenger: Arc<dyn Messenger> = messenger.clone();
        CommandDispatcher::new(messenger, DelayedTaskScheduler::new(), settings)
    }

    fn dispatcher(messenger: &Arc<RecordingMessenger>) -> CommandDispatcher {
        dispatcher_with(messenger, DispatcherSettings::default())
    }

    #[tokio::test]
    async fn test_ping_replies_pong_once() {
        let messenger = Arc::new(RecordingMessenger::new());

        let outcome = dispatcher(&messenger)
            .dispatch(&mention("<@U0BOT> ping"))
            .await
            .expect("ping");

        assert!(matches!(outcome, Dispatched::Ponged));
        assert_eq!(
            messenger.sent(),
            [Sent::Message {
                channel: "C0CHAN".to_string(),
                text: "pong".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_bare_mention_is_bad_request() {
        let messenger = Arc::new(RecordingMessenger::new());

        let err = dispatcher(&messenger)
            .dispatch(&mention("<@U0BOT>"))
            .await
            .expect_err("bare mention");

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let messenger = Arc::new(RecordingMessenger::new());

        let outcome = dispatcher(&messenger)
            .dispatch(&mention("<@U0BOT> dance now"))
            .await
            .expect("ignored");

        assert!(matches!(outcome, Dispatched::Ignored));
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_gohan_posts_ephemeral_menu() {
        let messenger = Arc::new(RecordingMessenger::new());

        let outcome = dispatcher(&messenger)
            .dispatch(&mention("<@U0BOT> gohan"))
            .await
            .expect("menu");
        assert!(matches!(outcome, Dispatched::MenuPosted));

        let sent = messenger.sent();
        let [Sent::Ephemeral {
            channel,
            user,
            text,
            blocks,
        }] = sent.as_slice()
        else {
            panic!("expected one ephemeral message, got {sent:?}");
        };
        assert_eq!(channel, "C0CHAN");
        assert_eq!(user, "U0USER");
        assert_eq!(text, FALLBACK_TEXT);
        assert_eq!(blocks[1]["block_id"], "select-item");
    }

    #[tokio::test]
    async fn test_check_wrong_arg_count_is_bad_request() {
        let messenger = Arc::new(RecordingMessenger::new());
        let dispatcher = dispatcher(&messenger);

        for text in ["<@U0BOT> check", "<@U0BOT> check 1 2"] {
            let err = dispatcher.dispatch(&mention(text)).await.expect_err(text);
            assert!(matches!(err, AppError::BadRequest(_)), "{text}");
        }
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_posts_after_delay() {
        let messenger = Arc::new(RecordingMessenger::new());
        let dispatcher = dispatcher(&messenger);

        let outcome = dispatcher
            .dispatch(&mention("<@U0BOT> check 1625097600123456"))
            .await
            .expect("check");
        let Dispatched::CheckScheduled(task) = outcome else {
            panic!("expected scheduled check");
        };
        assert!(messenger.sent().is_empty());

        tokio::time::sleep(DEFAULT_CHECK_DELAY + Duration::from_millis(1)).await;
        tokio::task::yield_now().await;

        assert!(task.has_fired());
        assert_eq!(
            messenger.posted_texts(),
            ["<@A017C1D07AR> reactions 1625097600123456"]
        );
    }

    #[tokio::test]
    async fn test_reactions_posts_one_message_per_reaction() {
        let messenger = Arc::new(RecordingMessenger::new().with_reactions(vec![
            Reaction {
                name: "thumbsup".to_string(),
                users: vec!["U1".to_string(), "U2".to_string()],
                count: 2,
            },
            Reaction {
                name: "sushi".to_string(),
                users: vec!["U3".to_string()],
                count: 1,
            },
        ]));

        let outcome = dispatcher(&messenger)
            .dispatch(&mention("<@U0BOT> reactions 1625097600123456"))
            .await
            .expect("reactions");
        assert!(matches!(outcome, Dispatched::ReactionsListed(2)));

        let sent = messenger.sent();
        assert_eq!(
            sent.first(),
            Some(&Sent::ReactionsFetched {
                channel: "C0CHAN".to_string(),
                ts: "1625097600.123456".to_string(),
            })
        );
        assert_eq!(messenger.posted_texts(), ["[U1 U2] :thumbsup:", "[U3] :sushi:"]);
    }

    #[tokio::test]
    async fn test_reactions_short_id_is_bad_request() {
        let messenger = Arc::new(RecordingMessenger::new());

        let err = dispatcher(&messenger)
            .dispatch(&mention("<@U0BOT> reactions 12345"))
            .await
            .expect_err("too short");

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_conversations_creates_temp_channel() {
        let messenger = Arc::new(RecordingMessenger::new());

        let outcome = dispatcher(&messenger)
            .dispatch(&mention("<@U0BOT> conversations"))
            .await
            .expect("conversations");
        assert!(matches!(outcome, Dispatched::ChannelCreated(_)));

        let sent = messenger.sent();
        let [Sent::ConversationCreated { name }] = sent.as_slice() else {
            panic!("expected one created channel, got {sent:?}");
        };
        assert!(name.starts_with("temp-test-"));
    }

    #[tokio::test]
    async fn test_basic_set_ignores_message_id_commands() {
        let messenger = Arc::new(RecordingMessenger::new());
        let dispatcher = dispatcher_with(
            &messenger,
            DispatcherSettings {
                command_set: CommandSet::Basic,
                ..DispatcherSettings::default()
            },
        );

        // Disabled commands are ignored before their arguments are checked
        for text in ["<@U0BOT> check", "<@U0BOT> reactions 1625097600123456"] {
            let outcome = dispatcher.dispatch(&mention(text)).await.expect(text);
            assert!(matches!(outcome, Dispatched::Ignored), "{text}");
        }
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_slack_failure_is_server_error() {
        let messenger = Arc::new(RecordingMessenger::new());
        messenger.fail_all();

        let err = dispatcher(&messenger)
            .dispatch(&mention("<@U0BOT> ping"))
            .await
            .expect_err("slack down");

        assert!(matches!(err, AppError::Slack(_)));
    }
}
