//! Render configuration.
//!
//! Every option has a default matching the reference look. [`RenderConfig`] deserializes from
//! partial JSON (missing keys keep their defaults) and can be overlaid with `CHATSNAP_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{ChatsnapError, ChatsnapResult};

/// Limits, geometry, typography and palette used by one render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Maximum number of messages accepted in one request.
    pub max_messages: usize,
    /// Maximum message body length, in characters.
    pub max_message_length: usize,

    /// Output width in pixels.
    pub canvas_width: u32,
    /// Padding above the first message.
    pub padding_top: u32,
    /// Padding below the last message.
    pub padding_bottom: u32,
    /// Padding left of the avatar column.
    pub padding_left: u32,
    /// Padding right of the text column.
    pub padding_right: u32,

    /// Side of the square avatar tile.
    pub avatar_size: u32,
    /// Horizontal gap between avatar column and text column.
    pub avatar_gap: u32,
    /// Height of the username/timestamp header line.
    pub header_height: u32,
    /// Gap between header line and first body line.
    pub header_gap: u32,
    /// Height of one body line.
    pub line_height: u32,
    /// Extra space between wrapped body lines.
    pub line_gap: u32,
    /// Space before a message that starts a new author group.
    pub group_spacing: u32,
    /// Space before a message that continues the current author group.
    pub continuation_spacing: u32,
    /// Horizontal gap between username and timestamp.
    pub timestamp_gap: u32,

    /// Username font size in pixels.
    pub username_font_size: f32,
    /// Body font size in pixels.
    pub body_font_size: f32,
    /// Timestamp font size in pixels.
    pub timestamp_font_size: f32,

    /// Canvas background.
    pub background_color: Rgb8,
    /// Body text color.
    pub text_color: Rgb8,
    /// Timestamp color.
    pub timestamp_color: Rgb8,
    /// Fill used by the placeholder avatar.
    pub avatar_placeholder_color: Rgb8,

    /// Per-avatar fetch timeout.
    pub avatar_timeout_ms: u64,
    /// Largest avatar body accepted from a remote host.
    pub avatar_max_bytes: usize,

    /// Timestamp used when a message carries none. Empty means no timestamp is drawn.
    pub default_timestamp: String,
    /// Font file to render with. `None` picks the system sans-serif face.
    pub font_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_messages: 50,
            max_message_length: 2000,
            canvas_width: 800,
            padding_top: 20,
            padding_bottom: 20,
            padding_left: 20,
            padding_right: 20,
            avatar_size: 40,
            avatar_gap: 16,
            header_height: 22,
            header_gap: 4,
            line_height: 20,
            line_gap: 2,
            group_spacing: 20,
            continuation_spacing: 4,
            timestamp_gap: 8,
            username_font_size: 16.0,
            body_font_size: 15.0,
            timestamp_font_size: 12.0,
            background_color: Rgb8::new(0x1a, 0x1a, 0x1a),
            text_color: Rgb8::new(0xdc, 0xdd, 0xde),
            timestamp_color: Rgb8::new(0x99, 0x99, 0x99),
            avatar_placeholder_color: Rgb8::new(0x58, 0x65, 0xf2),
            avatar_timeout_ms: 3000,
            avatar_max_bytes: 5 * 1024 * 1024,
            default_timestamp: String::new(),
            font_path: None,
        }
    }
}

impl RenderConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(bytes: &[u8]) -> ChatsnapResult<Self> {
        let cfg: Self = serde_json::from_slice(bytes)
            .map_err(|e| ChatsnapError::serde(format!("render config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> ChatsnapResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read render config '{}'", path.display()))?;
        Self::from_json(&bytes)
    }

    /// Overlay `CHATSNAP_*` environment variables. Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
        }

        if let Some(v) = env_parse::<usize>("CHATSNAP_MAX_MESSAGES").filter(|&n| n > 0) {
            self.max_messages = v;
        }
        if let Some(v) = env_parse::<usize>("CHATSNAP_MAX_MESSAGE_LENGTH").filter(|&n| n > 0) {
            self.max_message_length = v;
        }
        if let Some(v) = env_parse::<u32>("CHATSNAP_CANVAS_WIDTH").filter(|&n| n > 0) {
            self.canvas_width = v;
        }
        if let Some(v) = env_parse::<u64>("CHATSNAP_AVATAR_TIMEOUT_MS").filter(|&n| n > 0) {
            self.avatar_timeout_ms = v;
        }
        if let Some(v) = std::env::var_os("CHATSNAP_FONT_PATH").filter(|v| !v.is_empty()) {
            self.font_path = Some(PathBuf::from(v));
        }
        self
    }

    /// X coordinate where username, timestamp and body text start. Saturates on overflow, which
    /// [`RenderConfig::validate`] rejects.
    pub fn content_x(&self) -> u32 {
        self.padding_left
            .saturating_add(self.avatar_size)
            .saturating_add(self.avatar_gap)
    }

    /// Pixel budget for one body line.
    pub fn wrap_width(&self) -> u32 {
        self.canvas_width
            .saturating_sub(self.content_x())
            .saturating_sub(self.padding_right)
    }

    /// Reject geometry the compositor cannot lay out. Failures are [`ChatsnapError::Config`]:
    /// they describe the deployment, not the request.
    pub fn validate(&self) -> ChatsnapResult<()> {
        if self.max_messages == 0 {
            return Err(ChatsnapError::config("max_messages must be > 0"));
        }
        if self.avatar_size == 0 {
            return Err(ChatsnapError::config("avatar_size must be > 0"));
        }
        if self.line_height == 0 || self.header_height == 0 {
            return Err(ChatsnapError::config(
                "line_height and header_height must be > 0",
            ));
        }
        for (name, parts) in [
            (
                "padding_left + avatar_size + avatar_gap",
                [self.padding_left, self.avatar_size, self.avatar_gap],
            ),
            (
                "header_height + header_gap + line_height",
                [self.header_height, self.header_gap, self.line_height],
            ),
            (
                "line_height + line_gap + continuation_spacing",
                [self.line_height, self.line_gap, self.continuation_spacing],
            ),
        ] {
            if parts
                .iter()
                .try_fold(0u32, |acc, &v| acc.checked_add(v))
                .is_none()
            {
                return Err(ChatsnapError::config(format!("{name} overflows u32")));
            }
        }
        let max_side = u32::from(u16::MAX);
        if self.canvas_width > max_side || self.avatar_size > max_side {
            return Err(ChatsnapError::config(format!(
                "canvas_width and avatar_size must be <= {max_side}"
            )));
        }
        if self.wrap_width() == 0 {
            return Err(ChatsnapError::config(format!(
                "canvas_width {} leaves no room for text after padding and avatar column",
                self.canvas_width
            )));
        }
        for (name, size) in [
            ("username_font_size", self.username_font_size),
            ("body_font_size", self.body_font_size),
            ("timestamp_font_size", self.timestamp_font_size),
        ] {
            if !size.is_finite() || size <= 0.0 {
                return Err(ChatsnapError::config(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if self.avatar_timeout_ms == 0 {
            return Err(ChatsnapError::config("avatar_timeout_ms must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
