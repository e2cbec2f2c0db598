//! Result of a side assembly.

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use image::{DynamicImage, ImageError, ImageFormat, RgbaImage};

use crate::tile::TileCoordinate;

/// Tile counts and timing of one assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Tiles in the grid
    pub requested: usize,
    /// Tiles placed on the canvas
    pub succeeded: usize,
    /// Tiles left blank
    pub failed: usize,
    /// Wall time from dispatch to the last settled task
    pub elapsed: Duration,
}

/// An assembled side together with the tiles it lacks.
#[derive(Debug, Clone)]
pub struct AssembledImage {
    image: RgbaImage,
    detail: u8,
    missing: Vec<TileCoordinate>,
    stats: AssemblyStats,
}

impl AssembledImage {
    pub(crate) fn new(
        image: RgbaImage,
        detail: u8,
        missing: Vec<TileCoordinate>,
        stats: AssemblyStats,
    ) -> Self {
        Self {
            image,
            detail,
            missing,
            stats,
        }
    }

    /// The RGBA raster. Missing regions are transparent black.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consumes the result, returning the raster.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Edge length in pixels.
    pub fn dimension(&self) -> u32 {
        self.image.width()
    }

    /// Detail level the side was assembled at.
    pub fn detail(&self) -> u8 {
        self.detail
    }

    /// Coordinates of tiles that could not be placed, in row-major order.
    pub fn missing(&self) -> &[TileCoordinate] {
        &self.missing
    }

    /// Whether every tile was placed.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn stats(&self) -> &AssemblyStats {
        &self.stats
    }

    /// Encodes the raster in the given format.
    ///
    /// Formats without an alpha channel, such as JPEG, receive the RGB
    /// channels only.
    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgba8(self.image.clone())
                .into_rgb8()
                .write_to(&mut cursor, format)?,
            _ => self.image.write_to(&mut cursor, format)?,
        }
        Ok(buffer)
    }

    /// Writes the raster to `path`, choosing the format from its extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)?;
        let bytes = self.encode(format)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}
