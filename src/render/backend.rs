use crate::config::RenderConfig;
use crate::foundation::error::ChatsnapResult;
use crate::model::message::Message;

/// A rendered canvas as RGBA8 pixels.
///
/// Backends read back **premultiplied alpha**; the `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Turns validated messages into encoded image bytes.
///
/// Implementations must be shareable across threads; each call owns its canvas.
pub trait RenderBackend: Send + Sync {
    /// Render `messages` with `config` and return PNG bytes.
    fn render(&self, messages: &[Message], config: &RenderConfig) -> ChatsnapResult<Vec<u8>>;
}
