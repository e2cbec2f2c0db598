//! Tile location: which tiles cover a side, and how large the result is.

mod grid;
mod request;

pub use grid::{
    image_dimension, row_length, tile_count, tile_grid, validate_detail, InvalidDetail,
    TileCoordinate, MAX_DETAIL, TILE_BORDER, TILE_CORE_SIZE, TILE_SIZE,
};
pub use request::SideRequest;
