use std::process;

use clap::Parser;
use oairesp::commands::ask::{self, AskArgs};

/// Single-shot front end: everything `oairesp ask` does, without subcommands.
#[derive(Debug, Parser)]
#[command(
    name = "oaiask",
    about = "Send one prompt to the OpenAI Responses API and print the text of the reply",
    after_help = "Without a prompt argument, oaiask asks for one on stdin.\nOPENAI_API_KEY is read from the environment or a .env file.",
    disable_version_flag = true
)]
struct Cli {
    #[command(flatten)]
    ask: AskArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match ask::run(cli.ask).await {
        Ok(()) => 0,
        Err(err) => {
            err.report();
            err.exit_code()
        }
    };
    // A stdin reader abandoned on Ctrl-C would block runtime shutdown.
    process::exit(code);
}
