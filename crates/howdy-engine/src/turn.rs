//! Running a single request/response turn.
//!
//! A turn always produces events in this shape:
//! `Opened? Fragment* (Finished | RateLimited | Failed)`.
//! Exactly one terminal event ends every turn.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{CompletionClient, CompletionError};
use crate::message::Message;

/// Progress of an in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// The endpoint accepted the request and started streaming.
    Opened,
    /// A piece of the assistant reply, in arrival order.
    Fragment(String),
    /// The stream closed normally.
    Finished,
    /// The endpoint refused the request with its rate-limit status.
    RateLimited,
    /// The request or stream failed.
    Failed(String),
}

impl TurnEvent {
    /// Whether this event ends the turn.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TurnEvent::Finished | TurnEvent::RateLimited | TurnEvent::Failed(_)
        )
    }
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    RateLimited,
    Failed,
}

impl From<&CompletionError> for TurnEvent {
    fn from(err: &CompletionError) -> Self {
        match err {
            CompletionError::RateLimited => TurnEvent::RateLimited,
            other => TurnEvent::Failed(other.to_string()),
        }
    }
}

/// Run one turn against `client`, reporting every event to `emit`.
pub async fn drive<C, F>(client: &C, history: &[Message], mut emit: F) -> TurnOutcome
where
    C: CompletionClient + ?Sized,
    F: FnMut(TurnEvent),
{
    let mut stream = match client.stream(history).await {
        Ok(stream) => stream,
        Err(err) => {
            warn!(error = %err, "completion request failed");
            let event = TurnEvent::from(&err);
            let outcome = if err.is_rate_limited() {
                TurnOutcome::RateLimited
            } else {
                TurnOutcome::Failed
            };
            emit(event);
            return outcome;
        }
    };

    emit(TurnEvent::Opened);

    let mut fragments = 0usize;
    let mut chars = 0usize;
    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                fragments += 1;
                chars += fragment.chars().count();
                emit(TurnEvent::Fragment(fragment));
            }
            Err(err) => {
                warn!(error = %err, fragments, "completion stream broke");
                emit(TurnEvent::from(&err));
                return if err.is_rate_limited() {
                    TurnOutcome::RateLimited
                } else {
                    TurnOutcome::Failed
                };
            }
        }
    }

    info!(fragments, chars, "completion finished");
    emit(TurnEvent::Finished);
    TurnOutcome::Completed
}

/// Run a turn on a background task, forwarding events over `tx`.
///
/// The receiving side owns the conversation; this task never touches it.
pub fn spawn_turn(
    client: Arc<dyn CompletionClient>,
    history: Vec<Message>,
    tx: mpsc::UnboundedSender<TurnEvent>,
) -> JoinHandle<TurnOutcome> {
    tokio::spawn(async move {
        drive(client.as_ref(), &history, |event| {
            if tx.send(event).is_err() {
                debug!("turn receiver dropped");
            }
        })
        .await
    })
}
