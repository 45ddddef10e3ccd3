//! OpenAI Responses API plumbing.
//!
//! The client performs the "create a model response" call and hands back the
//! raw JSON body; the model module lifts that body into an SDK-style typed
//! response. Both forms implement [`crate::normalize::ResponseValue`].

/// HTTP client for `POST /responses`.
pub mod client;
/// Typed response object with convenience text and usage.
pub mod model;

pub use client::{ProviderError, ResponsesClient};
pub use model::{OutputItem, Response, Usage};
