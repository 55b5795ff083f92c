//! Chatsnap renders a short conversation into a chat-style PNG screenshot.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: `RawMessage -> Message` (limits, required fields, colors)
//! 2. **Measure**: `[Message] -> ChatLayout` (wrapping, author grouping, final canvas height)
//! 3. **Compile**: `ChatLayout -> DrawPlan` (backend-agnostic draw ops)
//! 4. **Resolve**: avatar URLs are fetched concurrently; failures fall back to a placeholder
//! 5. **Draw**: `DrawPlan -> FrameRGBA` (CPU backend)
//! 6. **Encode**: `FrameRGBA -> PNG bytes`
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: identical input, config, fonts and avatar bytes give identical pixels.
//! - **No hidden globals**: typefaces, fetchers and configuration are passed in explicitly.
//! - **Client vs server errors**: [`ChatsnapError::is_client_error`] separates bad input from
//!   internal faults, and [`ChatsnapError::public_message`] keeps internal detail out of replies.
//!
//! # Getting started
//!
//! ```no_run
//! use chatsnap::{RenderConfig, Renderer};
//!
//! let renderer = Renderer::from_config(RenderConfig::default().with_env_overrides())?;
//! let png = renderer.render_json(br#"{"messages":[{"username":"Ada","message":"hi"}]}"#)?;
//! # let _ = png;
//! # Ok::<(), chatsnap::ChatsnapError>(())
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod encode;
mod foundation;
mod layout;
mod model;
mod render;
mod text;

pub use assets::avatar::{AvatarResolver, AvatarTile, select_tile};
pub use assets::decode::{apply_circle_mask, center_crop_square, decode_image, resize_square};
pub use assets::fetch::{AvatarFetchError, AvatarFetcher, HttpAvatarFetcher};
pub use config::RenderConfig;
pub use encode::png::encode_png;
pub use foundation::core::{
    Canvas, Point, Rect, Rgb8, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place,
};
pub use foundation::error::{ChatsnapError, ChatsnapResult, GENERIC_RENDER_FAILURE};
pub use layout::plan::{
    BlockKind, ChatLayout, MessageBlock, block_height, block_kind, body_height, gap_before,
    layout_messages,
};
pub use model::message::{
    DEFAULT_COLOR, Message, RawMessage, RenderRequest, validate_message, validate_messages,
};
pub use render::backend::{FrameRGBA, RenderBackend};
pub use render::compile::{DrawOp, DrawPlan, compile_draw_plan};
pub use render::cpu::{CpuBackend, draw_plan};
pub use render::pipeline::Renderer;
pub use text::typeface::{
    BLOCK_ADVANCE_EM, BlockFace, FontFace, TextBrushRgba8, TextRun, Typeface, Typesetter,
};
pub use text::wrap::{TextMeasure, wrap_text};
