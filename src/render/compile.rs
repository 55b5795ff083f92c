use crate::config::RenderConfig;
use crate::foundation::core::{Canvas, Point, Rect, Rgb8};
use crate::layout::plan::{BlockKind, ChatLayout};
use crate::model::message::Message;
use crate::text::typeface::TextRun;
use crate::text::wrap::TextMeasure;

/// Backend-agnostic drawing instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Solid rectangle in canvas coordinates.
    FillRect {
        /// Area to fill.
        rect: Rect,
        /// Fill color.
        color: Rgb8,
    },
    /// Avatar tile with its top-left corner at `origin`.
    Avatar {
        /// Index into [`DrawPlan::avatar_urls`] and the resolved tile list.
        slot: usize,
        /// Top-left corner.
        origin: Point,
    },
    /// One line of text.
    Text(TextRun),
}

/// Everything the draw pass needs, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawPlan {
    /// Canvas size.
    pub canvas: Canvas,
    /// Avatar URL per slot; one slot per group-start message.
    pub avatar_urls: Vec<Option<String>>,
    /// Ops in paint order; the background fill always comes first.
    pub ops: Vec<DrawOp>,
}

impl DrawPlan {
    /// Number of avatar ops, which equals the number of author groups.
    pub fn avatar_count(&self) -> usize {
        self.avatar_urls.len()
    }
}

/// Turn a measured layout into draw ops.
///
/// Group starts get an avatar at the block's top-left, a header with the username in the author
/// color and an optional timestamp, then the body. Continuations get body lines only.
pub fn compile_draw_plan<M: TextMeasure + ?Sized>(
    layout: &ChatLayout,
    messages: &[Message],
    measure: &mut M,
    cfg: &RenderConfig,
) -> DrawPlan {
    let mut ops = Vec::with_capacity(1 + layout.blocks.len() * 3);
    let mut avatar_urls = Vec::new();

    ops.push(DrawOp::FillRect {
        rect: Rect::new(
            0.0,
            0.0,
            f64::from(layout.canvas.width),
            f64::from(layout.canvas.height),
        ),
        color: cfg.background_color,
    });

    let content_x = f64::from(cfg.content_x());
    for block in &layout.blocks {
        let msg = &messages[block.index];
        let top = f64::from(block.top);

        if block.kind == BlockKind::GroupStart {
            ops.push(DrawOp::Avatar {
                slot: avatar_urls.len(),
                origin: Point::new(f64::from(cfg.padding_left), top),
            });
            avatar_urls.push(msg.avatar_url.clone());

            ops.push(DrawOp::Text(TextRun {
                text: msg.username.clone(),
                origin: Point::new(content_x, top),
                size_px: cfg.username_font_size,
                line_height: f64::from(cfg.header_height),
                color: msg.rgb,
            }));

            if !msg.timestamp.is_empty() {
                let name_w = f64::from(measure.measure(&msg.username, cfg.username_font_size));
                ops.push(DrawOp::Text(TextRun {
                    text: msg.timestamp.clone(),
                    origin: Point::new(content_x + name_w + f64::from(cfg.timestamp_gap), top),
                    size_px: cfg.timestamp_font_size,
                    line_height: f64::from(cfg.header_height),
                    color: cfg.timestamp_color,
                }));
            }
        }

        let pitch = f64::from(cfg.line_height) + f64::from(cfg.line_gap);
        let body_top = block.body_top(cfg) as f64;
        for (i, line) in block.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            ops.push(DrawOp::Text(TextRun {
                text: line.clone(),
                origin: Point::new(content_x, body_top + pitch * i as f64),
                size_px: cfg.body_font_size,
                line_height: f64::from(cfg.line_height),
                color: cfg.text_color,
            }));
        }
    }

    DrawPlan {
        canvas: layout.canvas,
        avatar_urls,
        ops,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compile.rs"]
mod tests;
