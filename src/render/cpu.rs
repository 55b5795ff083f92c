use std::sync::Arc;

use crate::assets::avatar::{AvatarResolver, AvatarTile};
use crate::assets::fetch::AvatarFetcher;
use crate::config::RenderConfig;
use crate::encode::png::encode_png;
use crate::foundation::error::{ChatsnapError, ChatsnapResult};
use crate::layout::plan::layout_messages;
use crate::model::message::Message;
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::compile::{DrawOp, DrawPlan, compile_draw_plan};
use crate::text::typeface::{Typeface, Typesetter};

/// CPU raster backend powered by `vello_cpu`.
///
/// Holds only shared, immutable resources; every call to [`RenderBackend::render`] gets its own
/// typesetter, avatar resolver and canvas.
pub struct CpuBackend {
    typeface: Arc<dyn Typeface>,
    fetcher: Arc<dyn AvatarFetcher>,
}

impl CpuBackend {
    /// Backend drawing text with `typeface` and loading avatars through `fetcher`.
    pub fn new(typeface: Arc<dyn Typeface>, fetcher: Arc<dyn AvatarFetcher>) -> Self {
        Self { typeface, fetcher }
    }

    /// Measure, compile, resolve avatars and draw, stopping before encoding.
    pub fn render_frame(
        &self,
        messages: &[Message],
        config: &RenderConfig,
    ) -> ChatsnapResult<FrameRGBA> {
        let mut typesetter = self.typeface.typesetter();
        let layout = layout_messages(messages, typesetter.as_mut(), config)?;
        let plan = compile_draw_plan(&layout, messages, typesetter.as_mut(), config);

        let resolver = AvatarResolver::new(
            Arc::clone(&self.fetcher),
            config.avatar_size,
            config.avatar_placeholder_color,
        );
        let urls: Vec<Option<&str>> = plan.avatar_urls.iter().map(|u| u.as_deref()).collect();
        let avatars = resolver.resolve_all(&urls);

        draw_plan(&plan, &avatars, typesetter.as_mut())
    }
}

impl std::fmt::Debug for CpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuBackend")
            .field("typeface", &self.typeface.family_name())
            .finish_non_exhaustive()
    }
}

impl RenderBackend for CpuBackend {
    fn render(&self, messages: &[Message], config: &RenderConfig) -> ChatsnapResult<Vec<u8>> {
        let frame = self.render_frame(messages, config)?;
        encode_png(&frame)
    }
}

/// Rows per `vello_cpu` surface. Taller canvases are drawn as a stack of bands.
pub const BAND_ROWS: u16 = 4096;

/// Execute `plan` and read back premultiplied RGBA8.
///
/// `avatars[slot]` supplies the tile for every [`DrawOp::Avatar`]. The canvas may be taller than
/// one `vello_cpu` surface allows; it is drawn in horizontal bands of [`BAND_ROWS`] rows.
pub fn draw_plan(
    plan: &DrawPlan,
    avatars: &[AvatarTile],
    typesetter: &mut dyn Typesetter,
) -> ChatsnapResult<FrameRGBA> {
    draw_plan_in_bands(plan, avatars, typesetter, BAND_ROWS)
}

fn draw_plan_in_bands(
    plan: &DrawPlan,
    avatars: &[AvatarTile],
    typesetter: &mut dyn Typesetter,
    band_rows: u16,
) -> ChatsnapResult<FrameRGBA> {
    let w: u16 = plan
        .canvas
        .width
        .try_into()
        .map_err(|_| ChatsnapError::render("canvas width exceeds u16"))?;
    let height = plan.canvas.height;
    if w == 0 || height == 0 || band_rows == 0 {
        return Err(ChatsnapError::render("canvas has zero area"));
    }

    let paints = avatars
        .iter()
        .map(avatar_paint)
        .collect::<ChatsnapResult<Vec<_>>>()?;

    let row_bytes = usize::from(w) * 4;
    let mut data = Vec::with_capacity(row_bytes * height as usize);
    let mut band_y = 0u32;
    while band_y < height {
        let rows = (height - band_y).min(u32::from(band_rows));
        let band_h = rows as u16;
        let band = Band {
            top: f64::from(band_y),
            bottom: f64::from(band_y + rows),
        };

        let mut pixmap = vello_cpu::Pixmap::new(w, band_h);
        let mut ctx = vello_cpu::RenderContext::new(w, band_h);
        for op in &plan.ops {
            draw_op(&mut ctx, &band, op, &paints, typesetter)?;
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        data.extend_from_slice(pixmap.data_as_u8_slice());

        band_y += rows;
    }

    Ok(FrameRGBA {
        width: plan.canvas.width,
        height,
        data,
        premultiplied: true,
    })
}

/// Vertical canvas range covered by one surface.
struct Band {
    top: f64,
    bottom: f64,
}

impl Band {
    fn overlaps(&self, y0: f64, y1: f64) -> bool {
        y1 > self.top && y0 < self.bottom
    }

    fn transform(&self) -> vello_cpu::kurbo::Affine {
        vello_cpu::kurbo::Affine::translate((0.0, -self.top))
    }
}

fn draw_op(
    ctx: &mut vello_cpu::RenderContext,
    band: &Band,
    op: &DrawOp,
    avatars: &[vello_cpu::Image],
    typesetter: &mut dyn Typesetter,
) -> ChatsnapResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::FillRect { rect, color } => {
            if !band.overlaps(rect.y0, rect.y1) {
                return Ok(());
            }
            ctx.set_transform(band.transform());
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                color.r, color.g, color.b, 255,
            ));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1));
            Ok(())
        }
        DrawOp::Avatar { slot, origin } => {
            let paint = avatars.get(*slot).ok_or_else(|| {
                ChatsnapError::render(format!("avatar slot {slot} was not resolved"))
            })?;
            let (w, h) = image_paint_size(paint)?;
            if !band.overlaps(origin.y, origin.y + h) {
                return Ok(());
            }

            ctx.set_transform(
                band.transform() * vello_cpu::kurbo::Affine::translate((origin.x, origin.y)),
            );
            ctx.set_paint(paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            Ok(())
        }
        DrawOp::Text(run) => {
            // Glyphs may overhang their line box; keep one box of slack on both sides.
            if !band.overlaps(run.origin.y - run.line_height, run.origin.y + 2.0 * run.line_height)
            {
                return Ok(());
            }
            let mut shifted = run.clone();
            shifted.origin.y -= band.top;
            typesetter.draw(ctx, &shifted);
            Ok(())
        }
    }
}

fn avatar_paint(tile: &AvatarTile) -> ChatsnapResult<vello_cpu::Image> {
    let size = tile.size();
    let pixmap = image_premul_bytes_to_pixmap(&tile.to_premul_rgba8(), size, size)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn image_paint_size(image: &vello_cpu::Image) -> ChatsnapResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        vello_cpu::ImageSource::OpaqueId(_) => Err(ChatsnapError::render(
            "cpu backend does not support opaque image ids",
        )),
    }
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ChatsnapResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ChatsnapError::render("avatar width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ChatsnapError::render("avatar height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ChatsnapError::render("avatar byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
