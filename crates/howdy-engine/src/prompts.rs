//! Static copy shown by the chat surface.

/// Example prompts offered while the conversation is empty.
pub const EXAMPLE_PROMPTS: [&str; 3] = [
    "🌵 Yeehaw, tell our Wild West Product team what to focus on next",
    "🏜️ Saddle up, I need a summary of the latest trends in our customer feedback",
    "🐴 Just for fun, lasso me up a cowboy pun I can use down at the O.K. Corral",
];

/// Assistant display name.
pub const ASSISTANT_NAME: &str = "HOWDY";

/// Greeting headline for the empty state.
pub const WELCOME_TITLE: &str =
    "Well, hey there, partner! The name's HOWDY, reckon we'll get along just fine!";

/// Blurb under the greeting.
pub const WELCOME_BLURB: &str = "I'm an AI partner-in-crime designed to help Product know \
what to explore next based on customer feedback trends.";

/// Shown when the endpoint rate limits a request.
pub const RATE_LIMIT_ALERT: &str = "You have reached your request limit for the day.";

/// Placeholder text for the empty input.
pub const INPUT_PLACEHOLDER: &str = "Send a message";
