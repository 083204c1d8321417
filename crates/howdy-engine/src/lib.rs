//! howdy-engine: Headless conversation engine for the howdy chat client
//!
//! This crate provides everything below the terminal surface:
//! - The conversation state container and its mutation rules
//! - A completion client seam with a streaming HTTP implementation
//! - Decoders for plain text and server-sent event response bodies
//! - Configuration and the static prompt copy

pub mod client;
pub mod config;
pub mod conversation;
pub mod message;
pub mod prompts;
pub mod stream;
pub mod turn;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use client::{request_body, CompletionClient, CompletionError, HttpCompletionClient};
pub use config::{Config, ConfigError, EndpointConfig, IconMode, WireFormat};
pub use conversation::Conversation;
pub use message::{Message, Role};
pub use prompts::{
    ASSISTANT_NAME, EXAMPLE_PROMPTS, INPUT_PLACEHOLDER, RATE_LIMIT_ALERT, WELCOME_BLURB,
    WELCOME_TITLE,
};
pub use stream::FragmentStream;
pub use turn::{drive, spawn_turn, TurnEvent, TurnOutcome};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
