use std::io::Cursor;

use crate::foundation::core::unpremultiply_rgba8_in_place;
use crate::foundation::error::{ChatsnapError, ChatsnapResult};
use crate::render::backend::FrameRGBA;

/// Encode a frame as lossless RGBA PNG. Premultiplied frames are converted to straight alpha
/// first. Identical frames always produce identical bytes.
pub fn encode_png(frame: &FrameRGBA) -> ChatsnapResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(ChatsnapError::render(format!(
            "frame byte length {} does not match {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| ChatsnapError::render("frame buffer does not fit its dimensions"))?;

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| ChatsnapError::render(format!("encode png: {e}")))?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
