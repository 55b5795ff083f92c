use std::borrow::Cow;
use std::path::Path;

use anyhow::Context as _;

use crate::config::RenderConfig;
use crate::foundation::core::{Point, Rgb8};
use crate::foundation::error::{ChatsnapError, ChatsnapResult};
use crate::text::wrap::TextMeasure;

/// Advance of one [`BlockFace`] character, as a fraction of the font size.
pub const BLOCK_ADVANCE_EM: f32 = 0.5;

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgb8> for TextBrushRgba8 {
    fn from(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }
}

/// One line of text placed in a line box.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    /// Text to draw; never contains line breaks.
    pub text: String,
    /// Top-left corner of the line box.
    pub origin: Point,
    /// Font size in pixels.
    pub size_px: f32,
    /// Height of the line box; glyphs are centered vertically inside it.
    pub line_height: f64,
    /// Fill color.
    pub color: Rgb8,
}

/// Per-render text engine: measures and draws single lines.
pub trait Typesetter: TextMeasure {
    /// Draw `run` onto `ctx`.
    fn draw(&mut self, ctx: &mut vello_cpu::RenderContext, run: &TextRun);
}

/// Immutable, shareable font resource. Each render call asks for its own [`Typesetter`].
pub trait Typeface: Send + Sync {
    /// Family name, for diagnostics.
    fn family_name(&self) -> &str;
    /// Fresh typesetter with its own mutable shaping state.
    fn typesetter(&self) -> Box<dyn Typesetter + '_>;
}

/// Outline font shaped with Parley and rasterized with `vello_cpu`.
pub struct FontFace {
    family_name: String,
    font_len: usize,
    blob: parley::fontique::Blob<u8>,
    font_data: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family_name", &self.family_name)
            .field("font_bytes_len", &self.font_len)
            .finish()
    }
}

impl FontFace {
    /// Load from raw TTF/OTF bytes.
    pub fn from_bytes(font_bytes: Vec<u8>) -> ChatsnapResult<Self> {
        Self::from_bytes_with_index(font_bytes, 0)
    }

    fn from_bytes_with_index(font_bytes: Vec<u8>, index: u32) -> ChatsnapResult<Self> {
        let font_len = font_bytes.len();
        let blob = parley::fontique::Blob::from(font_bytes.clone());

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(blob.clone(), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ChatsnapError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ChatsnapError::render("registered font family has no name"))?
            .to_string();

        let font_data =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), index);

        Ok(Self {
            family_name,
            font_len,
            blob,
            font_data,
        })
    }

    /// Load a font file.
    pub fn from_path(path: impl AsRef<Path>) -> ChatsnapResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read font file '{}'", path.display()))?;
        Self::from_bytes(bytes).map_err(|e| {
            ChatsnapError::render(format!("load font '{}': {e}", path.display()))
        })
    }

    /// First sans-serif face from the system font database, or any face if none matches.
    pub fn system_sans_serif() -> ChatsnapResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let query = usvg::fontdb::Query {
            families: &[usvg::fontdb::Family::SansSerif],
            weight: usvg::fontdb::Weight::NORMAL,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|f| f.id))
            .ok_or_else(|| ChatsnapError::render("no system fonts available"))?;
        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| ChatsnapError::render("system font data unavailable"))?;

        Self::from_bytes_with_index(bytes, index)
    }

    /// `font_path` from the config when set, otherwise the system sans-serif face.
    pub fn load(cfg: &RenderConfig) -> ChatsnapResult<Self> {
        let face = match &cfg.font_path {
            Some(path) => Self::from_path(path)?,
            None => Self::system_sans_serif()?,
        };
        tracing::debug!(family = %face.family_name, "font loaded");
        Ok(face)
    }
}

impl Typeface for FontFace {
    fn family_name(&self) -> &str {
        &self.family_name
    }

    fn typesetter(&self) -> Box<dyn Typesetter + '_> {
        let mut font_ctx = parley::FontContext::default();
        font_ctx.collection.register_fonts(self.blob.clone(), None);
        Box::new(ParleyTypesetter {
            face: self,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
        })
    }
}

struct ParleyTypesetter<'f> {
    face: &'f FontFace,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl ParleyTypesetter<'_> {
    fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.face.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl TextMeasure for ParleyTypesetter<'_> {
    fn measure(&mut self, text: &str, size_px: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let layout = self.layout_line(text, size_px, TextBrushRgba8::default());
        layout
            .lines()
            .map(|line| line.metrics().advance)
            .fold(0.0, f32::max)
    }
}

impl Typesetter for ParleyTypesetter<'_> {
    fn draw(&mut self, ctx: &mut vello_cpu::RenderContext, run: &TextRun) {
        if run.text.is_empty() {
            return;
        }
        let layout = self.layout_line(&run.text, run.size_px, run.color.into());
        let dy = (run.line_height - f64::from(layout.height())) / 2.0;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            run.origin.x,
            run.origin.y + dy,
        )));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };

                let brush = glyph_run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = glyph_run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.face.font_data)
                    .font_size(glyph_run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

/// Fixed-advance typeface that draws one solid block per visible character.
///
/// Metrics are exact and independent of installed fonts, which makes it suitable for previews on
/// font-less hosts and for pixel-exact comparisons.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockFace;

impl Typeface for BlockFace {
    fn family_name(&self) -> &str {
        "blocks"
    }

    fn typesetter(&self) -> Box<dyn Typesetter + '_> {
        Box::new(BlockTypesetter)
    }
}

struct BlockTypesetter;

impl TextMeasure for BlockTypesetter {
    fn measure(&mut self, text: &str, size_px: f32) -> f32 {
        text.chars().count() as f32 * size_px * BLOCK_ADVANCE_EM
    }
}

impl Typesetter for BlockTypesetter {
    fn draw(&mut self, ctx: &mut vello_cpu::RenderContext, run: &TextRun) {
        let advance = f64::from(run.size_px * BLOCK_ADVANCE_EM);
        let glyph_h = f64::from(run.size_px) * 0.7;
        let y0 = run.origin.y + (run.line_height - glyph_h) / 2.0;

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            run.color.r,
            run.color.g,
            run.color.b,
            255,
        ));
        for (i, ch) in run.text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = run.origin.x + advance * i as f64 + advance * 0.1;
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                x0,
                y0,
                x0 + advance * 0.8,
                y0 + glyph_h,
            ));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/typeface.rs"]
mod tests;
