//! Response-shape normalization.
//!
//! The Responses API has returned its text in several layouts across API and
//! SDK versions: a pre-joined `output_text` field, a list of `output` blocks
//! holding nested content pieces, SDK objects with `text`/`content`
//! attributes, or nothing recognizable at all. [`normalize`] tries those
//! layouts in a fixed priority order and always produces a string, degrading
//! to a raw dump of the input when nothing matches.

use std::fmt;

use log::debug;
use serde_json::{Map, Value};

/// Keys looked up on a content piece, highest priority first.
const PIECE_TEXT_KEYS: [&str; 3] = ["text", "plain_text", "content"];

/// Capabilities a response value may expose to the normalizer.
///
/// Every accessor defaults to "not available", so an implementation only
/// declares the shapes it actually carries.
pub trait ResponseValue: fmt::Debug {
    /// Pre-assembled convenience text (`output_text`).
    fn output_text(&self) -> Option<Value> {
        None
    }

    /// The ordered block list (`output`), when present and non-empty.
    fn output(&self) -> Option<Output<'_>> {
        None
    }

    /// Generic serialization accessor yielding a structured mapping of the
    /// whole value.
    fn to_mapping(&self) -> Option<Value> {
        None
    }

    /// Plain rendering of the whole value. `None` when it cannot be rendered.
    fn render(&self) -> Option<String> {
        None
    }
}

/// The `output` field of a response.
pub enum Output<'a> {
    /// A sequence of blocks, visited in order.
    Blocks(Vec<Block<'a>>),
    /// The field exists but is not a sequence; carries its textual dump.
    NotSequence(String),
}

/// One element of the `output` sequence.
pub enum Block<'a> {
    /// Key-value block, e.g. `{"content": [{"text": "..."}], "text": "..."}`.
    Mapping(&'a Map<String, Value>),
    /// Opaque object read through its attributes.
    Object(&'a dyn BlockAttributes),
}

impl<'a> Block<'a> {
    /// Classifies a raw JSON element: objects are mappings, anything else is
    /// an opaque object without attributes.
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Block::Mapping(map),
            other => Block::Object(other),
        }
    }
}

/// Attribute access on an opaque output block.
pub trait BlockAttributes {
    fn text(&self) -> Option<&Value>;
    fn content(&self) -> Option<&Value>;
}

impl BlockAttributes for Value {
    fn text(&self) -> Option<&Value> {
        self.get("text")
    }

    fn content(&self) -> Option<&Value> {
        self.get("content")
    }
}

impl ResponseValue for Value {
    fn output_text(&self) -> Option<Value> {
        self.get("output_text").cloned()
    }

    fn output(&self) -> Option<Output<'_>> {
        let output = self.get("output").filter(|value| is_truthy(value))?;
        Some(match output {
            Value::Array(items) => Output::Blocks(items.iter().map(Block::from_value).collect()),
            other => Output::NotSequence(stringify(other)),
        })
    }

    fn render(&self) -> Option<String> {
        Some(stringify(self))
    }
}

/// Extracts a single human-readable string from `response`.
///
/// Strategies, first success wins:
/// 1. non-empty `output_text`;
/// 2. text fragments gathered from the `output` blocks, joined with `\n`
///    (a non-sequence `output` is returned as its dump);
/// 3. a pretty JSON dump of the serialization accessor's mapping;
/// 4. the value's plain rendering, or its `Debug` form.
pub fn normalize<R: ResponseValue + ?Sized>(response: &R) -> String {
    if let Some(text) = convenience_text(response) {
        return text;
    }

    if let Some(text) = block_text(response) {
        return text;
    }

    if let Some(dump) = serialized_dump(response) {
        debug!("response carried no text fragments; using serialized mapping");
        return dump;
    }

    debug!("response shape not recognized; rendering raw value");
    response
        .render()
        .unwrap_or_else(|| format!("{response:?}"))
}

fn convenience_text<R: ResponseValue + ?Sized>(response: &R) -> Option<String> {
    response
        .output_text()
        .filter(is_truthy)
        .map(|value| stringify(&value))
}

fn block_text<R: ResponseValue + ?Sized>(response: &R) -> Option<String> {
    let blocks = match response.output()? {
        Output::NotSequence(dump) => {
            debug!("response output is not a sequence; returning its dump");
            return Some(dump);
        }
        Output::Blocks(blocks) => blocks,
    };

    let mut parts = Vec::new();
    for block in &blocks {
        collect_block(block, &mut parts);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn collect_block(block: &Block<'_>, parts: &mut Vec<String>) {
    match block {
        Block::Mapping(map) => {
            if let Some(Value::Array(pieces)) = map.get("content") {
                parts.extend(pieces.iter().filter_map(piece_text));
            }
            // Block-level text is cumulative with the nested pieces.
            if let Some(text) = map.get("text").filter(|value| is_truthy(value)) {
                parts.push(stringify(text));
            }
        }
        Block::Object(object) => {
            let text = [object.text(), object.content()]
                .into_iter()
                .flatten()
                .find_map(|value| value.as_str().filter(|text| !text.is_empty()));
            if let Some(text) = text {
                parts.push(text.to_string());
            }
        }
    }
}

fn piece_text(piece: &Value) -> Option<String> {
    match piece {
        Value::Object(map) => PIECE_TEXT_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|value| is_truthy(value))
            .map(stringify),
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}

fn serialized_dump<R: ResponseValue + ?Sized>(response: &R) -> Option<String> {
    let mapping = response.to_mapping()?;
    Some(serde_json::to_string_pretty(&mapping).unwrap_or_else(|_| mapping.to_string()))
}

/// Strings are used verbatim; every other value becomes its JSON text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `null`, `false`, zero and empty strings/containers count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
