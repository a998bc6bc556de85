use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageReader, RgbaImage};
use thiserror::Error;

use crate::app::Size2;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Shared, immutable RGBA raster. Cloning only bumps a reference count, so
/// entities, tile sets and draw commands can all hold the same pixels.
#[derive(Clone)]
pub struct ImageHandle {
    pixels: Arc<RgbaImage>,
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.pixels == *other.pixels
    }
}

impl From<RgbaImage> for ImageHandle {
    fn from(pixels: RgbaImage) -> Self {
        Self::new(pixels)
    }
}

impl ImageHandle {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn open(path: &Path) -> Result<Self, RasterError> {
        let reader = ImageReader::open(path).map_err(|source| RasterError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| RasterError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(decoded.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size2 {
        Size2::new(self.width() as f32, self.height() as f32)
    }

    pub fn rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// Copies the `width x height` pixel rectangle at `(x, y)` into a new
    /// image. Returns `None` when the rectangle is empty or leaves the image.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let right = x.checked_add(width)?;
        let bottom = y.checked_add(height)?;
        if right > self.width() || bottom > self.height() {
            return None;
        }
        let view = image::imageops::crop_imm(self.pixels.as_ref(), x, y, width, height);
        Some(Self::new(view.to_image()))
    }
}
