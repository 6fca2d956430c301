use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::web::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "model")]
    Model,
}

impl Role {
    /// Only an exact `"model"` is a model turn; everything else is the user.
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(role)) if role == "model" => Role::Model,
            _ => Role::User,
        }
    }
}

/// One prior utterance, resent by the client on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    fn from_value(entry: &Value) -> Self {
        match entry {
            Value::Object(fields) => Self {
                role: Role::from_value(fields.get("role")),
                text: coerce_text(fields.get("text")),
            },
            _ => Self {
                role: Role::User,
                text: String::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub history: Vec<ChatTurn>,
    pub message: String,
}

impl ChatRequest {
    /// Decodes a raw request body.
    ///
    /// The message check runs first, so a request with both a bad message and
    /// a bad history is reported as a validation failure.
    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| RelayError::MissingMessage)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, RelayError> {
        let message = match value.get("message") {
            Some(Value::String(message)) if !message.is_empty() => message.clone(),
            _ => return Err(RelayError::MissingMessage),
        };

        let history = match value.get("history") {
            None => Vec::new(),
            Some(Value::Array(entries)) => entries.iter().map(ChatTurn::from_value).collect(),
            Some(_) => return Err(RelayError::Context("history must be an array".to_string())),
        };

        Ok(Self { history, message })
    }
}

// Falsy values become empty text; everything else reads like a JS `String(..)`.
fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(other) => js_string(other),
    }
}

fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(text) => text.clone(),
        Value::Number(n) => js_number(n),
        // Array elements that are null become empty slots.
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn js_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    let f = match n.as_f64() {
        Some(f) => f,
        None => return n.to_string(),
    };
    let magnitude = f.abs();
    if magnitude != 0.0 && (magnitude >= 1e21 || magnitude < 1e-6) {
        let formatted = format!("{:e}", f);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        }
    } else {
        format!("{}", f)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
