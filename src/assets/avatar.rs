use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;

use crate::assets::decode;
use crate::assets::fetch::{AvatarFetchError, AvatarFetcher};
use crate::foundation::core::{Rgb8, premultiply_rgba8_in_place};

/// Immutable square avatar raster in straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarTile {
    image: Arc<RgbaImage>,
}

impl AvatarTile {
    /// Flat `color` disc under the circular mask. Pixels depend only on `(size, color)`.
    pub fn placeholder(size: u32, color: Rgb8) -> Self {
        let mut img = RgbaImage::from_pixel(size, size, image::Rgba(color.to_rgba()));
        decode::apply_circle_mask(&mut img);
        Self {
            image: Arc::new(img),
        }
    }

    /// Decode, center-crop, resize and mask encoded image bytes.
    pub fn from_image_bytes(bytes: &[u8], size: u32) -> Result<Self, AvatarFetchError> {
        let img = decode::decode_image(bytes)
            .map_err(|e| AvatarFetchError::Decode(format!("{e:#}")))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(AvatarFetchError::Decode("image has no pixels".to_string()));
        }
        let square = decode::center_crop_square(img);
        let mut img = decode::resize_square(&square, size);
        decode::apply_circle_mask(&mut img);
        Ok(Self {
            image: Arc::new(img),
        })
    }

    /// Side length in pixels.
    pub fn size(&self) -> u32 {
        self.image.width()
    }

    /// Straight-alpha pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.image
    }

    /// Row-major premultiplied RGBA8 copy for compositing.
    pub fn to_premul_rgba8(&self) -> Vec<u8> {
        let mut data = self.image.as_raw().clone();
        premultiply_rgba8_in_place(&mut data);
        data
    }
}

/// Turns optional avatar URLs into tiles. Never fails: every error path yields the placeholder.
pub struct AvatarResolver {
    fetcher: Arc<dyn AvatarFetcher>,
    size: u32,
    placeholder: AvatarTile,
}

impl AvatarResolver {
    /// Resolver producing `size`×`size` tiles with a `placeholder_color` fallback.
    pub fn new(fetcher: Arc<dyn AvatarFetcher>, size: u32, placeholder_color: Rgb8) -> Self {
        Self {
            fetcher,
            size,
            placeholder: AvatarTile::placeholder(size, placeholder_color),
        }
    }

    /// The fallback tile.
    pub fn placeholder(&self) -> &AvatarTile {
        &self.placeholder
    }

    /// Resolve one avatar.
    pub fn resolve(&self, url: Option<&str>) -> AvatarTile {
        let Some(url) = url else {
            return self.placeholder.clone();
        };
        let outcome = self
            .fetcher
            .fetch(url)
            .and_then(|bytes| AvatarTile::from_image_bytes(&bytes, self.size));
        select_tile(url, outcome, &self.placeholder)
    }

    /// Resolve many avatars concurrently; output order matches input order.
    pub fn resolve_all(&self, urls: &[Option<&str>]) -> Vec<AvatarTile> {
        urls.par_iter().map(|url| self.resolve(*url)).collect()
    }
}

/// Pick the fetched tile, or log the failure and fall back to the placeholder.
pub fn select_tile(
    url: &str,
    outcome: Result<AvatarTile, AvatarFetchError>,
    placeholder: &AvatarTile,
) -> AvatarTile {
    match outcome {
        Ok(tile) => tile,
        Err(err) => {
            tracing::warn!(url, error = %err, "avatar unavailable, using placeholder");
            placeholder.clone()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/avatar.rs"]
mod tests;
