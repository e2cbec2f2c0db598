//! Tile image decoding.

use image::RgbaImage;
use thiserror::Error;

use crate::tile::{TILE_BORDER, TILE_CORE_SIZE};

/// Smallest tile edge that still contains the full core region.
pub const MIN_TILE_EDGE: u32 = TILE_BORDER + TILE_CORE_SIZE;

/// Errors that can occur while decoding a tile.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a supported image.
    #[error("Failed to decode tile image: {0}")]
    Image(#[from] image::ImageError),

    /// The image is too small to hold the core region.
    #[error("Unexpected tile dimensions {width}x{height}, need at least {min}x{min}")]
    UnexpectedDimensions { width: u32, height: u32, min: u32 },
}

/// Decodes raw tile bytes into an RGBA raster.
///
/// Implementations must be usable from blocking worker threads.
pub trait TileDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<RgbaImage, DecodeError>;
}

/// Decoder backed by the `image` crate, sniffing the format from content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl TileDecoder for ImageDecoder {
    fn decode(&self, data: &[u8]) -> Result<RgbaImage, DecodeError> {
        Ok(image::load_from_memory(data)?.to_rgba8())
    }
}

/// Rejects rasters whose core region would fall outside the image.
pub fn check_dimensions(tile: &RgbaImage) -> Result<(), DecodeError> {
    let (width, height) = tile.dimensions();
    if width < MIN_TILE_EDGE || height < MIN_TILE_EDGE {
        return Err(DecodeError::UnexpectedDimensions {
            width,
            height,
            min: MIN_TILE_EDGE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn encode(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    #[test]
    fn test_decode_png() {
        let img = RgbaImage::from_pixel(256, 256, Rgba([10, 20, 30, 255]));
        let decoded = ImageDecoder.decode(&encode(&img, ImageFormat::Png)).unwrap();

        assert_eq!(decoded.dimensions(), (256, 256));
        assert_eq!(*decoded.get_pixel(128, 128), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_decode_garbage() {
        let result = ImageDecoder.decode(b"definitely not an image");
        assert!(matches!(result, Err(DecodeError::Image(_))));
    }

    #[test]
    fn test_check_dimensions() {
        assert!(check_dimensions(&RgbaImage::new(256, 256)).is_ok());
        assert!(check_dimensions(&RgbaImage::new(255, 255)).is_ok());

        let err = check_dimensions(&RgbaImage::new(256, 200)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedDimensions {
                width: 256,
                height: 200,
                min: 255
            }
        ));
        assert_eq!(
            err.to_string(),
            "Unexpected tile dimensions 256x200, need at least 255x255"
        );
    }
}
