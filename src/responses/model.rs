use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{Block, BlockAttributes, Output, ResponseValue};

/// Typed view of a Responses API body, shaped like the official SDK object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    /// Convenience text; filled from `output_text` content parts when the
    /// body does not carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One entry of `output`: a message, a reasoning item, a tool call...
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

impl Response {
    /// Lifts a raw body into the typed model.
    pub fn from_value(body: Value) -> Result<Self, serde_json::Error> {
        let mut response: Self = serde_json::from_value(body)?;
        if response.output_text.is_none() {
            response.output_text = response.collect_output_text();
        }
        Ok(response)
    }

    /// Concatenates the `output_text` parts of every message item.
    fn collect_output_text(&self) -> Option<String> {
        let text: String = self
            .output
            .iter()
            .filter(|item| item.kind == "message")
            .filter_map(|item| item.content.as_ref()?.as_array())
            .flatten()
            .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

impl BlockAttributes for OutputItem {
    fn text(&self) -> Option<&Value> {
        self.text.as_ref()
    }

    fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }
}

impl ResponseValue for Response {
    fn output_text(&self) -> Option<Value> {
        self.output_text.clone().map(Value::String)
    }

    fn output(&self) -> Option<Output<'_>> {
        if self.output.is_empty() {
            return None;
        }
        Some(Output::Blocks(
            self.output
                .iter()
                .map(|item| Block::Object(item))
                .collect(),
        ))
    }

    fn to_mapping(&self) -> Option<Value> {
        serde_json::to_value(self).ok()
    }

    fn render(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}
