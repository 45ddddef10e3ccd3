use std::io;

use log::error;
use thiserror::Error;

use crate::responses::ProviderError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("Interrupted")]
    Interrupted,
}

impl CliError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit status: a missing credential is 2, Ctrl-C during a
    /// request is 130, anything else 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Provider(ProviderError::MissingApiKey { .. }) => 2,
            Self::Interrupted => 130,
            _ => 1,
        }
    }

    /// Logs the error as the run's final `ERROR:` line.
    pub fn report(&self) {
        error!("{self}");
    }
}
