use log::{debug, warn};
use serde_json::Value;

use crate::normalize::normalize;
use crate::responses::Response;

/// `ask`: send a prompt and print the response text.
pub mod ask;
/// `config`: inspect the local config file.
pub mod config;
/// `normalize`: extract text from a saved response body.
pub mod normalize;

pub fn version_line(bin: &str) -> String {
    format!(
        "{bin} {} (commit: {}, built: {})",
        env!("CARGO_PKG_VERSION"),
        env!("OAIRESP_GIT_SHA"),
        env!("OAIRESP_BUILD_TS")
    )
}

/// Text extracted from a response body, plus the typed view when the body
/// fit it.
#[derive(Debug)]
pub(crate) struct Extracted {
    pub text: String,
    pub response: Option<Response>,
}

/// Normalizes `body` through the typed model when `typed` is set and the body
/// fits it, otherwise through the raw JSON.
pub(crate) fn extract(body: &Value, typed: bool) -> Extracted {
    if typed {
        match Response::from_value(body.clone()) {
            Ok(response) => {
                return Extracted {
                    text: normalize(&response),
                    response: Some(response),
                };
            }
            Err(err) => warn!("response did not match the typed model ({err}); using raw body"),
        }
    }

    debug!("normalizing raw response body");
    Extracted {
        text: normalize(body),
        response: None,
    }
}
