use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use oairesp::commands::ask::{self, AskArgs};
use oairesp::commands::config::{self, ConfigArgs};
use oairesp::commands::normalize::{self, NormalizeArgs};
use oairesp::logging;

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  oairesp ask \"Summarize RFC 9110 in one line\"\n  oairesp normalize < saved-response.json\n  oairesp normalize --typed saved-response.json\n  oairesp config check --profile work";

const ASK_HELP_EXAMPLES: &str = "Examples:\n  oairesp ask --model gpt-4.1-mini --prompt \"Explain lifetimes\"\n  oairesp ask --env-file ~/.openai.env --interactive\n  oairesp ask --dry-run --json \"What would be sent?\"";

const NORMALIZE_HELP: &str = "Reads a Responses API body and prints the text it carries.\nFalls back to a dump of the body when no text is found.";

#[derive(Debug, Parser)]
#[command(
    name = "oairesp",
    about = "Prompt the OpenAI Responses API and turn any response shape into plain text",
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Send a prompt and print the reply text", after_help = ASK_HELP_EXAMPLES)]
    Ask(AskArgs),
    #[command(about = "Extract the text of a saved response body", long_about = NORMALIZE_HELP)]
    Normalize(NormalizeArgs),
    #[command(about = "Inspect the profile config file")]
    Config(ConfigArgs),
    #[command(about = "Print a shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "oairesp", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "oairesp", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "oairesp", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask(args) => ask::run(args).await,
        Commands::Normalize(args) => {
            logging::init(false, false);
            normalize::run(args)
        }
        Commands::Config(args) => {
            logging::init(false, false);
            config::run(args)
        }
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    let code = match result {
        Ok(()) => 0,
        Err(err) => {
            err.report();
            err.exit_code()
        }
    };
    // A stdin reader abandoned on Ctrl-C would block runtime shutdown.
    process::exit(code);
}
