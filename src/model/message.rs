use crate::config::RenderConfig;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{ChatsnapError, ChatsnapResult};

/// Username color used when a record carries none.
pub const DEFAULT_COLOR: &str = "#ffffff";

/// Untrusted message record as it arrives over the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawMessage {
    /// Author display name.
    pub username: Option<String>,
    /// Message body.
    pub message: Option<String>,
    /// Username color as hex, `#` optional.
    pub color: Option<String>,
    /// Pre-formatted display timestamp.
    pub timestamp: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

/// Render request envelope: `{ "messages": [...] }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderRequest {
    /// Messages in display order.
    pub messages: Vec<RawMessage>,
}

impl RenderRequest {
    /// Parse a request body. Malformed JSON or a missing `messages` array is a validation error.
    pub fn from_json(bytes: &[u8]) -> ChatsnapResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| ChatsnapError::validation(format!("invalid request data: {e}")))
    }
}

/// Canonical, validated message consumed by every rendering stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Non-empty author display name.
    pub username: String,
    /// Body text, possibly containing line breaks.
    pub body: String,
    /// Normalized `#rrggbb` color string.
    pub color: String,
    /// Parsed form of `color`.
    pub rgb: Rgb8,
    /// Opaque display timestamp; empty means none.
    pub timestamp: String,
    /// Avatar URL, `None` when absent or blank.
    pub avatar_url: Option<String>,
}

/// Validate a whole request: count first, then every record. The first invalid record fails the
/// request.
pub fn validate_messages(raw: &[RawMessage], cfg: &RenderConfig) -> ChatsnapResult<Vec<Message>> {
    if raw.len() > cfg.max_messages {
        return Err(ChatsnapError::TooManyMessages {
            count: raw.len(),
            max: cfg.max_messages,
        });
    }
    if raw.is_empty() {
        return Err(ChatsnapError::validation(
            "messages: at least one message is required",
        ));
    }

    raw.iter()
        .enumerate()
        .map(|(idx, m)| validate_message(idx, m, cfg))
        .collect()
}

/// Validate and normalize one record; `idx` is used to name the field in errors.
pub fn validate_message(idx: usize, raw: &RawMessage, cfg: &RenderConfig) -> ChatsnapResult<Message> {
    let field = |name: &str| format!("messages[{idx}].{name}");

    let username = raw
        .username
        .as_deref()
        .ok_or_else(|| ChatsnapError::validation(format!("{}: is required", field("username"))))?;
    if username.trim().is_empty() {
        return Err(ChatsnapError::validation(format!(
            "{}: must not be empty",
            field("username")
        )));
    }

    let body = raw
        .message
        .as_deref()
        .ok_or_else(|| ChatsnapError::validation(format!("{}: is required", field("message"))))?;
    let body_len = body.chars().count();
    if body_len > cfg.max_message_length {
        return Err(ChatsnapError::validation(format!(
            "{}: length {body_len} exceeds maximum of {}",
            field("message"),
            cfg.max_message_length
        )));
    }

    let rgb = Rgb8::parse_hex(raw.color.as_deref().unwrap_or(DEFAULT_COLOR))
        .map_err(|e| ChatsnapError::validation(format!("{}: {e}", field("color"))))?;

    let timestamp = raw
        .timestamp
        .clone()
        .unwrap_or_else(|| cfg.default_timestamp.clone());

    let avatar_url = raw
        .avatar_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    Ok(Message {
        username: username.to_string(),
        body: body.to_string(),
        color: rgb.to_hex(),
        rgb,
        timestamp,
        avatar_url,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/model/message.rs"]
mod tests;
