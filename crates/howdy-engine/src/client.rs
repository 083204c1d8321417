//! Completion endpoint clients.
//!
//! The conversation only talks to a [`CompletionClient`]; the HTTP client
//! below is the production implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{EndpointConfig, WireFormat};
use crate::message::Message;
use crate::stream::{openai_fragments, text_fragments, FragmentStream};

/// Errors reported by a completion endpoint.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The endpoint answered 429 Too Many Requests.
    #[error("rate limited by completion endpoint")]
    RateLimited,

    /// Any other non-success status.
    #[error("completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport failure while sending or reading the body.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint reported an error inside a successful response.
    #[error("completion endpoint error: {0}")]
    Endpoint(String),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("client setup failed: {0}")]
    Build(String),
}

impl CompletionError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Something that can turn a message history into a stream of fragments.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the full history and open the response stream.
    ///
    /// Errors returned here happen before any fragment is produced; errors
    /// after that arrive inside the stream.
    async fn stream(&self, history: &[Message]) -> Result<FragmentStream, CompletionError>;
}

#[derive(Serialize)]
pub struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
pub struct TextStreamRequest<'a> {
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
pub struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

/// Request payload, shaped by wire format.
#[derive(Serialize)]
#[serde(untagged)]
pub enum RequestBody<'a> {
    Text(TextStreamRequest<'a>),
    OpenAi(OpenAiRequest<'a>),
}

fn wire_messages<'a>(system_prompt: Option<&'a str>, history: &'a [Message]) -> Vec<WireMessage<'a>> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    if let Some(system) = system_prompt {
        messages.push(WireMessage {
            role: "system",
            content: system,
        });
    }
    messages.extend(history.iter().map(|m| WireMessage {
        role: m.role.as_str(),
        content: &m.content,
    }));
    messages
}

/// Build the request payload for the given wire format.
///
/// The system prompt only ever appears here; it is never part of the
/// conversation history.
pub fn request_body<'a>(
    format: WireFormat,
    model: &'a str,
    system_prompt: Option<&'a str>,
    history: &'a [Message],
) -> RequestBody<'a> {
    let messages = wire_messages(system_prompt, history);
    match format {
        WireFormat::TextStream => RequestBody::Text(TextStreamRequest { messages }),
        WireFormat::OpenAiChat => RequestBody::OpenAi(OpenAiRequest {
            model,
            messages,
            stream: true,
        }),
    }
}

/// HTTP client for a hosted completion endpoint.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: Client,
    url: String,
    format: WireFormat,
    model: String,
    api_key: Option<String>,
    system_prompt: Option<String>,
}

impl fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("url", &self.url)
            .field("format", &self.format)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("system_prompt", &self.system_prompt.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpCompletionClient {
    /// Create a client from endpoint configuration.
    ///
    /// The API key is read from the environment variable named in the
    /// configuration, if any.
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(endpoint.timeout_seconds))
            .build()
            .map_err(|e| CompletionError::Build(e.to_string()))?;

        let api_key = endpoint
            .api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.is_empty());

        Ok(Self {
            client,
            url: endpoint.url.clone(),
            format: endpoint.format,
            model: endpoint.model.clone(),
            api_key,
            system_prompt: None,
        })
    }

    /// Set the bearer token explicitly.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Prepend a system prompt to every request payload.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// The URL requests are posted to.
    pub fn request_url(&self) -> String {
        match self.format {
            WireFormat::TextStream => self.url.clone(),
            WireFormat::OpenAiChat => {
                format!("{}/chat/completions", self.url.trim_end_matches('/'))
            }
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn stream(&self, history: &[Message]) -> Result<FragmentStream, CompletionError> {
        let url = self.request_url();
        let body = request_body(
            self.format,
            &self.model,
            self.system_prompt.as_deref(),
            history,
        );

        debug!(%url, messages = history.len(), "sending completion request");

        let mut request = self.client.post(&url).json(&body);
        if self.format == WireFormat::OpenAiChat {
            request = request.header("Accept", "text/event-stream");
        }
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("completion endpoint rate limited the request");
            return Err(CompletionError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "completion endpoint returned an error");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes_stream();
        Ok(match self.format {
            WireFormat::TextStream => text_fragments(body),
            WireFormat::OpenAiChat => openai_fragments(body),
        })
    }
}
