//! howdy CLI: chat with a streaming completion endpoint from the terminal

use clap::{Parser, Subcommand};
use howdy_engine::{
    drive, CompletionClient, CompletionError, Config, ConfigError, Conversation,
    HttpCompletionClient, TurnEvent, TurnOutcome, WireFormat,
};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "HOWDY_LOG";

/// Filter used when `HOWDY_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Exit code when the endpoint refuses the request with its rate limit.
const EXIT_RATE_LIMITED: i32 = 2;

/// Chat with a streaming LLM endpoint in your terminal
#[derive(Parser, Debug)]
#[command(name = "howdy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ./howdy.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Completion endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Model name sent with OpenAI-format requests
    #[arg(long, global = true)]
    model: Option<String>,

    /// Response framing: text-stream or openai-chat
    #[arg(long, global = true)]
    format: Option<WireFormat>,

    /// Write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Commands {
    /// Open the chat TUI (default when no command specified)
    Chat,

    /// Send one prompt and stream the reply to stdout
    Ask {
        /// Prompt text; multiple words are joined with spaces
        #[arg(required = true)]
        prompt: Vec<String>,
    },

    /// Print the example prompts
    Examples,

    /// Print the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    File(PathBuf),
    /// No subscriber is installed.
    Discard,
}

impl Cli {
    fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat)
    }

    /// The TUI owns the screen, so it only logs to an explicit file.
    fn log_target(&self) -> LogTarget {
        match (&self.log_file, self.command()) {
            (Some(path), _) => LogTarget::File(path.clone()),
            (None, Commands::Chat) => LogTarget::Discard,
            (None, _) => LogTarget::Stderr,
        }
    }

    /// Flags override file and environment settings.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.endpoint {
            config.endpoint.url.clone_from(url);
        }
        if let Some(model) = &self.model {
            config.endpoint.model.clone_from(model);
        }
        if let Some(format) = self.format {
            config.endpoint.format = format;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_target()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command() {
        Commands::Chat => cmd_chat(&config),
        Commands::Ask { prompt } => {
            let code = cmd_ask(&config, &prompt.join(" "));
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Examples => cmd_examples(&config),
        Commands::Config { json } => cmd_config(&config, json),
    }
}

fn init_logging(target: &LogTarget) -> io::Result<()> {
    let filter = || {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    match target {
        LogTarget::Discard => {}
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(io::stderr)
                .try_init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
    let mut config = Config::resolve(cli.config.as_deref(), &cwd)?;
    cli.apply_overrides(&mut config);
    debug!(url = %config.endpoint.url, format = config.endpoint.format.as_str(), "resolved config");
    Ok(config)
}

fn build_client(config: &Config) -> Result<Arc<dyn CompletionClient>, CompletionError> {
    let client = HttpCompletionClient::new(&config.endpoint)?
        .with_system_prompt(config.system_prompt.clone());
    Ok(Arc::new(client))
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_chat(config: &Config) {
    let client = match build_client(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let rt = runtime();
    if let Err(e) = rt.block_on(howdy_tui::run_tui(config, client)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_ask(config: &Config, prompt: &str) -> i32 {
    let client = match build_client(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let rt = runtime();
    let mut stdout = io::stdout();
    match rt.block_on(ask(client.as_ref(), prompt, &mut stdout)) {
        Ok((_, None)) => {
            eprintln!("Error: prompt is empty");
            1
        }
        Ok((mut conversation, Some(outcome))) => {
            if conversation.reply_count() > 0 {
                println!();
            }
            match outcome {
                TurnOutcome::Completed => {}
                TurnOutcome::RateLimited => {
                    if let Some(alert) = conversation.take_alert() {
                        eprintln!("{alert}");
                    }
                }
                TurnOutcome::Failed => {
                    eprintln!(
                        "Error: {}",
                        conversation.last_error().unwrap_or("request failed")
                    );
                }
            }
            exit_code(outcome)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

/// Run one turn for `prompt`, writing each fragment to `out` as it arrives.
///
/// The outcome is `None` when the prompt had nothing to send.
async fn ask<C, W>(
    client: &C,
    prompt: &str,
    out: &mut W,
) -> io::Result<(Conversation, Option<TurnOutcome>)>
where
    C: CompletionClient + ?Sized,
    W: Write,
{
    let mut conversation = Conversation::new();
    conversation.set_draft(prompt);
    let Some(history) = conversation.submit() else {
        return Ok((conversation, None));
    };

    let mut write_error = None;
    let outcome = drive(client, &history, |event| {
        if let TurnEvent::Fragment(text) = &event {
            if write_error.is_none() {
                if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
                    write_error = Some(e);
                }
            }
        }
        conversation.apply(event);
    })
    .await;

    match write_error {
        Some(e) => Err(e),
        None => Ok((conversation, Some(outcome))),
    }
}

fn exit_code(outcome: TurnOutcome) -> i32 {
    match outcome {
        TurnOutcome::Completed => 0,
        TurnOutcome::RateLimited => EXIT_RATE_LIMITED,
        TurnOutcome::Failed => 1,
    }
}

fn cmd_examples(config: &Config) {
    if config.examples.is_empty() {
        println!("No example prompts configured");
        return;
    }
    for (i, example) in config.examples.iter().enumerate() {
        println!("{}. {example}", i + 1);
    }
}

fn cmd_config(config: &Config, json: bool) {
    let report = config_report(config, |name| std::env::var(name).ok());

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let endpoint = &config.endpoint;
    println!("Endpoint:      {}", endpoint.url);
    println!("Format:        {}", endpoint.format.as_str());
    println!("Model:         {}", endpoint.model);
    println!("API key:       {}", api_key_status(config, |name| std::env::var(name).ok()));
    println!("Timeout:       {}s", endpoint.timeout_seconds);
    println!(
        "System prompt: {}",
        config.system_prompt.as_deref().unwrap_or("(none)")
    );
    println!("Icons:         {}", format!("{:?}", config.icons).to_lowercase());
    println!("Examples:      {}", config.examples.len());
}

/// Describe the API key without revealing it.
fn api_key_status<F>(config: &Config, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match config.endpoint.api_key_env.as_deref() {
        None => "not used".to_string(),
        Some(name) => match lookup(name).filter(|key| !key.is_empty()) {
            Some(_) => format!("set (${name})"),
            None => format!("not set (${name})"),
        },
    }
}

/// Configuration as JSON with the key presence added and its value hidden.
fn config_report<F>(config: &Config, lookup: F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    let mut report = serde_json::to_value(config).unwrap_or(Value::Null);
    let key = config
        .endpoint
        .api_key_env
        .as_deref()
        .and_then(&lookup)
        .filter(|key| !key.is_empty())
        .map(|_| Value::String("<redacted>".into()));

    if let Some(endpoint) = report.get_mut("endpoint").and_then(Value::as_object_mut) {
        endpoint.insert("api_key".into(), key.unwrap_or(Value::Null));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use howdy_engine::testing::{Script, ScriptedClient};
    use howdy_engine::{Message, RATE_LIMIT_ALERT};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_command_is_chat() {
        let cli = parse(&["howdy"]);
        assert_eq!(cli.command(), Commands::Chat);
        assert_eq!(cli.log_target(), LogTarget::Discard);
    }

    #[test]
    fn test_ask_joins_words_and_logs_to_stderr() {
        let cli = parse(&["howdy", "ask", "how", "are", "you"]);
        assert_eq!(
            cli.command(),
            Commands::Ask {
                prompt: vec!["how".into(), "are".into(), "you".into()]
            }
        );
        assert_eq!(cli.log_target(), LogTarget::Stderr);
    }

    #[test]
    fn test_ask_requires_prompt() {
        assert!(Cli::try_parse_from(["howdy", "ask"]).is_err());
    }

    #[test]
    fn test_log_file_wins() {
        let cli = parse(&["howdy", "--log-file", "howdy.log"]);
        assert_eq!(cli.log_target(), LogTarget::File(PathBuf::from("howdy.log")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&[
            "howdy",
            "config",
            "--json",
            "--endpoint",
            "http://localhost:3000/api/chat",
            "--format",
            "text-stream",
            "--model",
            "llama3",
        ]);
        assert_eq!(cli.command(), Commands::Config { json: true });

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.endpoint.url, "http://localhost:3000/api/chat");
        assert_eq!(config.endpoint.format, WireFormat::TextStream);
        assert_eq!(config.endpoint.model, "llama3");
    }

    #[test]
    fn test_bad_format_rejected() {
        assert!(Cli::try_parse_from(["howdy", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = parse(&["howdy", "examples"]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(TurnOutcome::Completed), 0);
        assert_eq!(exit_code(TurnOutcome::RateLimited), 2);
        assert_eq!(exit_code(TurnOutcome::Failed), 1);
    }

    #[tokio::test]
    async fn test_ask_streams_fragments() {
        let client = ScriptedClient::new([Script::reply(["Howdy", ", partner"])]);
        let mut out = Vec::new();

        let (conversation, outcome) = ask(&client, "hello", &mut out).await.unwrap();

        assert_eq!(outcome, Some(TurnOutcome::Completed));
        assert_eq!(String::from_utf8(out).unwrap(), "Howdy, partner");
        assert_eq!(
            conversation.messages(),
            &[Message::user("hello"), Message::assistant("Howdy, partner")]
        );
    }

    #[tokio::test]
    async fn test_ask_rate_limited() {
        let client = ScriptedClient::new([Script::RateLimited]);
        let mut out = Vec::new();

        let (mut conversation, outcome) = ask(&client, "hello", &mut out).await.unwrap();

        assert_eq!(outcome, Some(TurnOutcome::RateLimited));
        assert!(out.is_empty());
        assert_eq!(conversation.take_alert().as_deref(), Some(RATE_LIMIT_ALERT));
    }

    #[tokio::test]
    async fn test_ask_empty_prompt_sends_nothing() {
        let client = ScriptedClient::new(Vec::new());
        let mut out = Vec::new();

        let (conversation, outcome) = ask(&client, "", &mut out).await.unwrap();

        assert!(outcome.is_none());
        assert!(conversation.messages().is_empty());
        assert!(client.requests().is_empty());
    }

    #[test]
    fn test_api_key_status() {
        let config = Config::default();
        assert_eq!(
            api_key_status(&config, |_| Some("sk-secret".into())),
            "set ($OPENAI_API_KEY)"
        );
        assert_eq!(
            api_key_status(&config, |_| None),
            "not set ($OPENAI_API_KEY)"
        );
    }

    #[test]
    fn test_config_report_redacts_key() {
        let config = Config::default();

        let report = config_report(&config, |_| Some("sk-secret".into()));
        let text = report.to_string();
        assert!(!text.contains("sk-secret"));
        assert_eq!(report["endpoint"]["api_key"], "<redacted>");
        assert_eq!(report["endpoint"]["model"], "gpt-3.5-turbo");

        let report = config_report(&config, |_| None);
        assert!(report["endpoint"]["api_key"].is_null());
    }
}
