use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

use crate::commands::extract;
use crate::error::CliError;

#[derive(Debug, Args, Clone)]
pub struct NormalizeArgs {
    /// Saved response JSON; reads stdin when omitted
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Lift the body into the typed response model first
    #[arg(long)]
    pub typed: bool,
}

pub fn run(args: NormalizeArgs) -> Result<(), CliError> {
    let raw = match &args.file {
        Some(path) => fs::read_to_string(path).map_err(|source| {
            CliError::io(
                format!("Failed to read response file '{}'", path.display()),
                source,
            )
        })?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| CliError::io("Failed to read response from stdin", source))?;
            buffer
        }
    };

    let body: Value = serde_json::from_str(&raw)
        .map_err(|err| CliError::InvalidInput(format!("Response is not valid JSON: {err}")))?;
    println!("{}", extract(&body, args.typed).text);
    Ok(())
}
