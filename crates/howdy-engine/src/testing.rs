//! Scripted completion client for tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use crate::client::{CompletionClient, CompletionError};
use crate::message::Message;
use crate::stream::FragmentStream;

/// One canned response.
#[derive(Debug, Clone)]
pub enum Script {
    /// Stream these fragments, then close.
    Reply(Vec<String>),
    /// Refuse with the rate-limit status.
    RateLimited,
    /// Fail before any fragment.
    Fail(String),
    /// Stream these fragments, then fail.
    BreakAfter(Vec<String>, String),
    /// Panic inside the request task.
    Panic(String),
}

impl Script {
    pub fn reply<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Script::Reply(fragments.into_iter().map(Into::into).collect())
    }
}

/// Completion client that answers from a queue of scripts and records every
/// history it was sent.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedClient {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Histories received so far, oldest first.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn stream(&self, history: &[Message]) -> Result<FragmentStream, CompletionError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(history.to_vec());

        let script = self
            .scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match script {
            None => Err(CompletionError::Network("no scripted response left".into())),
            Some(Script::RateLimited) => Err(CompletionError::RateLimited),
            Some(Script::Fail(reason)) => Err(CompletionError::Network(reason)),
            Some(Script::Reply(fragments)) => {
                Ok(stream::iter(fragments.into_iter().map(Ok)).boxed())
            }
            Some(Script::Panic(reason)) => panic!("{reason}"),
            Some(Script::BreakAfter(fragments, reason)) => Ok(stream::iter(
                fragments
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(CompletionError::Network(reason)))),
            )
            .boxed()),
        }
    }
}
