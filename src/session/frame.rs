//! Demultiplexing of incoming run-channel frames.
//!
//! The engine sends either plain text lines or `{type, payload}` envelopes.
//! Both are resolved here into a single [`Frame`] type.

use serde::Deserialize;

use crate::model::ResultRow;

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// One progress line, from a plain text frame or a `log` envelope.
    Log(String),
    /// Terminal ranked result set. `null` payloads decode as empty.
    Result(Vec<ResultRow>),
    /// An envelope that could not be understood.
    Unreadable { raw: String, reason: String },
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
enum Envelope {
    Log(String),
    Result(Option<Vec<ResultRow>>),
}

impl Frame {
    pub fn decode(text: &str) -> Self {
        if !text.trim_start().starts_with('{') {
            return Self::Log(text.to_string());
        }
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(v) => v,
            // Looks like JSON but isn't: a plain line that starts with a brace.
            Err(_) => return Self::Log(text.to_string()),
        };
        if value.get("type").is_none() {
            return Self::Log(text.to_string());
        }
        match serde_json::from_value::<Envelope>(value) {
            Ok(Envelope::Log(line)) => Self::Log(line),
            Ok(Envelope::Result(rows)) => Self::Result(rows.unwrap_or_default()),
            Err(e) => Self::Unreadable {
                raw: text.to_string(),
                reason: e.to_string(),
            },
        }
    }
}
