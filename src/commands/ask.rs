use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use log::{debug, error, info, warn};
use serde_json::json;
use tokio::signal;
use tokio::task;

use crate::commands::{extract, version_line};
use crate::config::{self, OutputMode, ProfileConfig};
use crate::error::CliError;
use crate::logging;
use crate::responses::client::{
    endpoint_for, is_api_key_present, CreateResponseRequest, DEFAULT_BASE_URL,
};
use crate::responses::ResponsesClient;

pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";
const MODEL_ENV: &str = "OPENAI_MODEL";
const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
const TIMEOUT_ENV: &str = "OAIRESP_TIMEOUT";
const GREETING: &str = "Greetings! How May I Help You Today? ";
const PAUSE_MESSAGE: &str = "\nPress Enter to exit...";

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    /// Prompt to send; asked interactively when omitted
    #[arg(value_name = "PROMPT", conflicts_with = "prompt")]
    pub text: Option<String>,

    /// Prompt to send (alternative to the positional PROMPT)
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Model to use [env: OPENAI_MODEL] [default: gpt-4.1-nano]
    #[arg(long)]
    pub model: Option<String>,

    /// Profile from the config file
    #[arg(long)]
    pub profile: Option<String>,

    /// Path to a .env file to load (defaults to ./.env when present)
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// API base URL [env: OPENAI_BASE_URL]
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds [env: OAIRESP_TIMEOUT]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[arg(long, value_enum)]
    pub output: Option<OutputMode>,

    /// Shorthand for --output json
    #[arg(long)]
    pub json: bool,

    /// Keep asking until an empty line, `exit`, or end of input
    #[arg(short, long, conflicts_with_all = ["text", "prompt"])]
    pub interactive: bool,

    /// Wait for Enter before exiting
    #[arg(long)]
    pub pause: bool,

    /// Print the request instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print version and build metadata
    #[arg(long)]
    pub version: bool,
}

/// Outcome of asking the user for one line.
#[derive(Debug, PartialEq, Eq)]
enum PromptInput {
    Line(String),
    Closed,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    model: String,
    base_url: String,
    timeout_secs: Option<u64>,
    output: OutputMode,
    pause: bool,
}

#[derive(Debug, Clone, Default)]
struct EnvSnapshot {
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<String>,
}

impl EnvSnapshot {
    fn capture() -> Self {
        Self {
            model: non_empty_env(MODEL_ENV),
            base_url: non_empty_env(BASE_URL_ENV),
            timeout: non_empty_env(TIMEOUT_ENV),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub async fn run(args: AskArgs) -> Result<(), CliError> {
    if args.version {
        println!("{}", version_line(env!("CARGO_PKG_NAME")));
        return Ok(());
    }

    logging::init(args.verbose, args.quiet);

    let profile = args
        .profile
        .as_deref()
        .map(config::load_profile)
        .transpose()
        .map_err(CliError::Config)?;
    let env_file = args
        .env_file
        .as_deref()
        .or_else(|| profile.as_ref().and_then(|profile| profile.env_file.as_deref()));
    load_env_file(env_file);

    let settings = resolve_settings(&args, profile.as_ref(), &EnvSnapshot::capture())?;
    debug!(
        "model={} endpoint={} timeout_secs={:?} output={} api_key_present={}",
        settings.model,
        endpoint_for(&settings.base_url),
        settings.timeout_secs,
        settings.output.as_str(),
        is_api_key_present()
    );

    let client = if args.dry_run {
        None
    } else {
        Some(
            ResponsesClient::from_env(settings.base_url.clone())?
                .with_timeout(settings.timeout_secs),
        )
    };

    if args.interactive {
        run_interactive(client.as_ref(), &settings).await?;
    } else {
        let prompt = match args.prompt.or(args.text) {
            Some(prompt) => prompt,
            None => match prompt_user(GREETING).await? {
                PromptInput::Line(prompt) => prompt,
                PromptInput::Closed | PromptInput::Interrupted => {
                    info!("Prompt cancelled by user");
                    return Ok(());
                }
            },
        };

        if prompt.trim().is_empty() {
            warn!("Empty prompt provided; nothing to send");
            return Ok(());
        }
        ask_once(client.as_ref(), &settings, &prompt).await?;
    }

    if settings.pause {
        // Enter, end of input and Ctrl-C all just end the pause.
        let _ = prompt_user(PAUSE_MESSAGE).await;
    }
    Ok(())
}

fn load_env_file(path: Option<&Path>) {
    match path {
        Some(path) => match dotenvy::from_path(path) {
            Ok(()) => debug!("loaded env file {}", path.display()),
            Err(err) => warn!("Failed to load env file '{}': {err}", path.display()),
        },
        None => {
            if let Ok(path) = dotenvy::dotenv() {
                debug!("loaded env file {}", path.display());
            }
        }
    }
}

/// CLI flag, then environment, then profile, then default.
fn resolve_settings(
    args: &AskArgs,
    profile: Option<&ProfileConfig>,
    env: &EnvSnapshot,
) -> Result<Settings, CliError> {
    let model = args
        .model
        .clone()
        .or_else(|| env.model.clone())
        .or_else(|| profile.and_then(|profile| profile.model.clone()))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let base_url = args
        .base_url
        .clone()
        .or_else(|| env.base_url.clone())
        .or_else(|| profile.and_then(|profile| profile.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let env_timeout = env
        .timeout
        .as_deref()
        .map(|raw| {
            raw.parse::<u64>().map_err(|_| {
                CliError::Config(format!(
                    "Invalid {TIMEOUT_ENV} '{raw}'. Expected a number of seconds."
                ))
            })
        })
        .transpose()?;
    let timeout_secs = args
        .timeout
        .or(env_timeout)
        .or_else(|| profile.and_then(|profile| profile.timeout));

    let profile_output = profile
        .map(ProfileConfig::output_mode)
        .transpose()
        .map_err(CliError::Config)?
        .flatten();
    let output = if args.json {
        OutputMode::Json
    } else {
        args.output.or(profile_output).unwrap_or(OutputMode::Text)
    };

    let pause = args.pause || profile.and_then(|profile| profile.pause).unwrap_or(false);

    Ok(Settings {
        model,
        base_url,
        timeout_secs,
        output,
        pause,
    })
}

/// Shows `message` and reads one line. `None` on end of input.
fn read_prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
    message: &str,
) -> Result<Option<String>, CliError> {
    write!(output, "{message}")
        .and_then(|_| output.flush())
        .map_err(|source| CliError::io("Failed to write prompt", source))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|source| CliError::io("Failed to read prompt", source))?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Reads one line from stdin, racing it against Ctrl-C.
///
/// The interrupt listener is polled first so it is installed before the
/// message is shown. The blocking reader may outlive an interrupt; the
/// binaries exit through `process::exit`, which does not wait for it.
async fn prompt_user(message: &'static str) -> Result<PromptInput, CliError> {
    tokio::select! {
        biased;
        Ok(()) = signal::ctrl_c() => Ok(PromptInput::Interrupted),
        input = read_stdin_line(message) => input,
    }
}

async fn read_stdin_line(message: &'static str) -> Result<PromptInput, CliError> {
    let line = task::spawn_blocking(move || {
        read_prompt(&mut io::stdin().lock(), &mut io::stdout(), message)
    })
    .await
    .map_err(|err| CliError::io("Failed to read prompt", io::Error::other(err)))??;
    Ok(line.map_or(PromptInput::Closed, PromptInput::Line))
}

async fn run_interactive(
    client: Option<&ResponsesClient>,
    settings: &Settings,
) -> Result<(), CliError> {
    loop {
        let line = match prompt_user(GREETING).await? {
            PromptInput::Line(line) => line,
            PromptInput::Closed | PromptInput::Interrupted => {
                info!("Prompt cancelled by user");
                return Ok(());
            }
        };

        let prompt = line.trim();
        if prompt.is_empty() || matches!(prompt, "exit" | "quit") {
            return Ok(());
        }

        // Each prompt is an independent request; a failure does not end the session.
        if let Err(err) = ask_once(client, settings, prompt).await {
            error!("{err}");
        }
    }
}

async fn ask_once(
    client: Option<&ResponsesClient>,
    settings: &Settings,
    prompt: &str,
) -> Result<(), CliError> {
    let Some(client) = client else {
        print_dry_run(settings, prompt);
        return Ok(());
    };

    let body = tokio::select! {
        body = client.create(&settings.model, prompt) => body?,
        Ok(()) = signal::ctrl_c() => return Err(CliError::Interrupted),
    };
    let extracted = extract(&body, true);
    let response = extracted.response.as_ref();

    if let Some(usage) = response.and_then(|response| response.usage.as_ref()) {
        debug!(
            "usage: input_tokens={:?} output_tokens={:?} total_tokens={:?}",
            usage.input_tokens, usage.output_tokens, usage.total_tokens
        );
    }

    match settings.output {
        OutputMode::Text => {
            println!("\nResponse:\n");
            println!("{}", extracted.text);
        }
        OutputMode::Json => {
            let body = json!({
                "model": settings.model,
                "id": response.and_then(|response| response.id.as_deref()),
                "text": extracted.text,
                "usage": response.and_then(|response| response.usage.as_ref()),
            });
            println!("{body}");
        }
    }
    Ok(())
}

fn print_dry_run(settings: &Settings, prompt: &str) {
    let request = CreateResponseRequest {
        model: &settings.model,
        input: prompt,
    };
    let body = json!({
        "dry_run": true,
        "endpoint": endpoint_for(&settings.base_url),
        "model": settings.model,
        "request": request,
        "timeout_secs": settings.timeout_secs,
        "output": settings.output.as_str(),
    });
    println!("{body}");
}

#[cfg(test)]
mod tests {
    use super::{
        read_prompt, resolve_settings, AskArgs, EnvSnapshot, Settings, GREETING, PAUSE_MESSAGE,
    };
    use crate::config::{OutputMode, ProfileConfig};
    use crate::responses::client::DEFAULT_BASE_URL;
    use clap::Parser;
    use std::io::Cursor;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        ask: AskArgs,
    }

    fn args(extra: &[&str]) -> AskArgs {
        let mut argv = vec!["oaiask"];
        argv.extend_from_slice(extra);
        TestCli::parse_from(argv).ask
    }

    #[test]
    fn defaults_apply_without_flags_env_or_profile() {
        let settings = resolve_settings(&args(&[]), None, &EnvSnapshot::default()).unwrap();
        assert_eq!(
            settings,
            Settings {
                model: "gpt-4.1-nano".to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: None,
                output: OutputMode::Text,
                pause: false,
            }
        );
    }

    #[test]
    fn cli_beats_env_which_beats_profile() {
        let profile = ProfileConfig {
            model: Some("profile-model".to_string()),
            timeout: Some(3),
            output: Some("json".to_string()),
            pause: Some(true),
            ..ProfileConfig::default()
        };
        let env = EnvSnapshot {
            model: Some("env-model".to_string()),
            base_url: Some("http://env.test/v1".to_string()),
            timeout: Some("21".to_string()),
        };

        let from_env = resolve_settings(&args(&[]), Some(&profile), &env).unwrap();
        assert_eq!(from_env.model, "env-model");
        assert_eq!(from_env.base_url, "http://env.test/v1");
        assert_eq!(from_env.timeout_secs, Some(21));
        assert_eq!(from_env.output, OutputMode::Json);
        assert!(from_env.pause);

        let from_cli = resolve_settings(
            &args(&["--model", "cli-model", "--timeout", "33", "--output", "text"]),
            Some(&profile),
            &env,
        )
        .unwrap();
        assert_eq!(from_cli.model, "cli-model");
        assert_eq!(from_cli.timeout_secs, Some(33));
        assert_eq!(from_cli.output, OutputMode::Text);
    }

    #[test]
    fn json_flag_overrides_output() {
        let settings = resolve_settings(
            &args(&["--output", "text", "--json"]),
            None,
            &EnvSnapshot::default(),
        )
        .unwrap();
        assert_eq!(settings.output, OutputMode::Json);
    }

    #[test]
    fn invalid_env_timeout_is_reported() {
        let env = EnvSnapshot {
            timeout: Some("soon".to_string()),
            ..EnvSnapshot::default()
        };
        let err = resolve_settings(&args(&[]), None, &env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid OAIRESP_TIMEOUT 'soon'. Expected a number of seconds."
        );
    }

    #[test]
    fn read_prompt_greets_and_strips_line_ending() {
        let mut input = Cursor::new("what is rust?\r\n");
        let mut output = Vec::new();
        let prompt = read_prompt(&mut input, &mut output, GREETING).unwrap();
        assert_eq!(prompt.as_deref(), Some("what is rust?"));
        assert_eq!(String::from_utf8(output).unwrap(), GREETING);
    }

    #[test]
    fn read_prompt_returns_none_at_end_of_input() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert_eq!(read_prompt(&mut input, &mut output, PAUSE_MESSAGE).unwrap(), None);
        assert_eq!(String::from_utf8(output).unwrap(), PAUSE_MESSAGE);
    }

    #[test]
    fn interactive_conflicts_with_prompt() {
        let result = TestCli::try_parse_from(["oaiask", "--interactive", "--prompt", "hi"]);
        assert!(result.is_err());
    }
}
