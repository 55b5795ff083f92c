use crate::config::RenderConfig;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ChatsnapError, ChatsnapResult};
use crate::model::message::Message;
use crate::text::wrap::{TextMeasure, wrap_text};

/// Role of a message within its author group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// First message of a run by one author: avatar, header, body.
    GroupStart,
    /// Later message by the same author: body only.
    GroupContinuation,
}

/// Measured placement of one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageBlock {
    /// Index into the message slice.
    pub index: usize,
    /// Group role.
    pub kind: BlockKind,
    /// Y of the block's top edge.
    pub top: u32,
    /// Block height, see [`block_height`].
    pub height: u32,
    /// Wrapped body lines; at least one.
    pub lines: Vec<String>,
}

impl MessageBlock {
    /// Y of the first body line.
    pub fn body_top(&self, cfg: &RenderConfig) -> u64 {
        match self.kind {
            BlockKind::GroupStart => {
                u64::from(self.top) + u64::from(cfg.header_height) + u64::from(cfg.header_gap)
            }
            BlockKind::GroupContinuation => u64::from(self.top),
        }
    }
}

/// Result of the measure pass: final canvas size plus every block's placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatLayout {
    /// Canvas size the draw pass must allocate.
    pub canvas: Canvas,
    /// One block per message, in order.
    pub blocks: Vec<MessageBlock>,
}

/// A message starts a group unless it directly follows a message by the same author.
pub fn block_kind(previous: Option<&Message>, current: &Message) -> BlockKind {
    match previous {
        Some(prev) if prev.username == current.username => BlockKind::GroupContinuation,
        _ => BlockKind::GroupStart,
    }
}

/// `n * line_height + (n - 1) * line_gap`, with `n` clamped to at least one line.
pub fn body_height(line_count: usize, cfg: &RenderConfig) -> u64 {
    let n = line_count.max(1) as u64;
    n * u64::from(cfg.line_height) + (n - 1) * u64::from(cfg.line_gap)
}

/// Height of a message block, excluding the spacing before it.
pub fn block_height(kind: BlockKind, line_count: usize, cfg: &RenderConfig) -> u64 {
    let body = body_height(line_count, cfg);
    match kind {
        BlockKind::GroupStart => u64::from(cfg.avatar_size)
            .max(u64::from(cfg.header_height) + u64::from(cfg.header_gap) + body),
        BlockKind::GroupContinuation => body,
    }
}

/// Spacing inserted above a block. Nothing precedes the first block.
pub fn gap_before(kind: BlockKind, is_first: bool, cfg: &RenderConfig) -> u64 {
    if is_first {
        return 0;
    }
    match kind {
        BlockKind::GroupStart => u64::from(cfg.group_spacing),
        BlockKind::GroupContinuation => u64::from(cfg.continuation_spacing),
    }
}

/// Measure pass: wrap every body, assign group roles and compute the final canvas height
/// before anything is drawn.
pub fn layout_messages<M: TextMeasure + ?Sized>(
    messages: &[Message],
    measure: &mut M,
    cfg: &RenderConfig,
) -> ChatsnapResult<ChatLayout> {
    let wrap_width = cfg.wrap_width();
    if wrap_width == 0 {
        return Err(ChatsnapError::render("layout has no horizontal room for text"));
    }

    let mut blocks = Vec::with_capacity(messages.len());
    let mut current_y = u64::from(cfg.padding_top);
    let mut last_author: Option<&Message> = None;

    for (index, msg) in messages.iter().enumerate() {
        let kind = block_kind(last_author, msg);
        let lines = wrap_text(&msg.body, measure, cfg.body_font_size, wrap_width as f32);
        let block_h = block_height(kind, lines.len(), cfg);

        current_y += gap_before(kind, index == 0, cfg);
        let top = u32::try_from(current_y)
            .map_err(|_| ChatsnapError::render("layout height overflows u32"))?;
        let height = u32::try_from(block_h)
            .map_err(|_| ChatsnapError::render("block height overflows u32"))?;
        blocks.push(MessageBlock {
            index,
            kind,
            top,
            height,
            lines,
        });

        current_y += block_h;
        last_author = Some(msg);
    }

    let height = u32::try_from(current_y + u64::from(cfg.padding_bottom))
        .map_err(|_| ChatsnapError::render("layout height overflows u32"))?;
    tracing::debug!(
        messages = messages.len(),
        width = cfg.canvas_width,
        height,
        "chat layout measured"
    );

    Ok(ChatLayout {
        canvas: Canvas {
            width: cfg.canvas_width,
            height,
        },
        blocks,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/plan.rs"]
mod tests;
