//! Ask the OpenAI Responses API from the command line.
//!
//! The interesting part is [`normalize`]: responses come back in several
//! shapes depending on API and SDK version, and the normalizer turns any of
//! them into one printable string.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod responses;

pub use normalize::{normalize, ResponseValue};
