//! Caching of downloaded tiles.

mod tile;

pub use tile::{TileCache, DEFAULT_TILE_CACHE_BYTES};
