//! Placement of tile cores on the side canvas.

use image::{imageops, GenericImageView, RgbaImage};

use crate::tile::{TileCoordinate, TILE_BORDER, TILE_CORE_SIZE};

/// Copies the core region of `tile` into `canvas` at the tile's grid slot.
///
/// The one-pixel border is dropped: source `(1, 1)..(255, 255)` lands on
/// `(x * 254, y * 254)`. The tile must already have passed
/// [`super::decode::check_dimensions`].
pub(crate) fn place_core(canvas: &mut RgbaImage, tile: &RgbaImage, coordinate: TileCoordinate) {
    let core = tile
        .view(TILE_BORDER, TILE_BORDER, TILE_CORE_SIZE, TILE_CORE_SIZE)
        .to_image();
    let (dest_x, dest_y) = coordinate.pixel_offset();
    imageops::replace(canvas, &core, i64::from(dest_x), i64::from(dest_y));
}
