//! Conversation state and its mutation rules.
//!
//! [`Conversation`] owns the message history, the draft, and the busy flag.
//! Request progress is fed back through [`Conversation::apply`], which is the
//! only place the history changes after a submission.

use tracing::{debug, warn};

use crate::client::CompletionClient;
use crate::message::{Message, Role};
use crate::prompts::RATE_LIMIT_ALERT;
use crate::turn::{drive, TurnEvent, TurnOutcome};

/// In-memory chat session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    draft: String,
    busy: bool,
    /// Whether the last message is an assistant reply still receiving fragments.
    reply_open: bool,
    alert: Option<String>,
    last_error: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// True between a submission and its terminal outcome.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// True while an assistant reply is receiving fragments.
    pub fn is_streaming(&self) -> bool {
        self.busy && self.reply_open
    }

    /// Pending user-facing notification, if any.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// True while busy and no reply text has arrived yet.
    pub fn is_waiting(&self) -> bool {
        self.busy && !self.reply_open
    }

    /// Most recent transport failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether `submit` would start a request right now.
    pub fn can_submit(&self) -> bool {
        !self.busy && !self.draft.is_empty()
    }

    /// Replace the draft.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Commit the draft as a user message and mark the conversation busy.
    ///
    /// Returns the history to send, or `None` when the draft is empty or a
    /// request is already in flight. In that case nothing changes.
    pub fn submit(&mut self) -> Option<Vec<Message>> {
        if !self.can_submit() {
            debug!(busy = self.busy, "submit ignored");
            return None;
        }

        let content = std::mem::take(&mut self.draft);
        self.messages.push(Message::user(content));
        self.busy = true;
        self.reply_open = false;
        self.last_error = None;

        debug!(messages = self.messages.len(), "submitted draft");
        Some(self.messages.clone())
    }

    /// Apply request progress. Returns the outcome when `event` ends the turn.
    pub fn apply(&mut self, event: TurnEvent) -> Option<TurnOutcome> {
        if !self.busy {
            debug!(?event, "ignoring turn event while idle");
            return None;
        }

        match event {
            // The reply row only exists once there is text to show
            TurnEvent::Opened => {
                debug!("reply stream opened");
                None
            }
            TurnEvent::Fragment(text) => {
                if text.is_empty() {
                    return None;
                }
                self.open_reply();
                if let Some(reply) = self.messages.last_mut() {
                    reply.content.push_str(&text);
                }
                None
            }
            TurnEvent::Finished => {
                self.settle();
                Some(TurnOutcome::Completed)
            }
            TurnEvent::RateLimited => {
                warn!("request rate limited");
                self.alert = Some(RATE_LIMIT_ALERT.to_string());
                self.settle();
                Some(TurnOutcome::RateLimited)
            }
            TurnEvent::Failed(reason) => {
                warn!(%reason, "request failed");
                self.last_error = Some(reason);
                self.settle();
                Some(TurnOutcome::Failed)
            }
        }
    }

    /// Dismiss the pending alert, returning its text.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Submit the draft and run the whole turn against `client`.
    ///
    /// Returns `None` when there was nothing to submit.
    pub async fn submit_with<C>(&mut self, client: &C) -> Option<TurnOutcome>
    where
        C: CompletionClient + ?Sized,
    {
        let history = self.submit()?;
        let outcome = drive(client, &history, |event| {
            self.apply(event);
        })
        .await;
        Some(outcome)
    }

    fn open_reply(&mut self) {
        if !self.reply_open {
            self.messages.push(Message::assistant(""));
            self.reply_open = true;
        }
    }

    fn settle(&mut self) {
        self.busy = false;
        self.reply_open = false;
    }

    /// Number of assistant messages in the history.
    pub fn reply_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }
}
