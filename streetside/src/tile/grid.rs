//! Tile grid enumeration and raster dimensions.
//!
//! A side at detail `d` is a square grid of `2^d × 2^d` tiles. Each tile is
//! delivered as a [`TILE_SIZE`] pixel square whose outer pixel ring is shared
//! with its neighbours, so only the [`TILE_CORE_SIZE`] interior counts toward
//! the assembled image.

use std::fmt;

/// Nominal edge length of a delivered tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Width of the shared border on every tile edge.
pub const TILE_BORDER: u32 = 1;

/// Edge length of the authoritative tile interior.
pub const TILE_CORE_SIZE: u32 = TILE_SIZE - 2 * TILE_BORDER;

/// Highest detail level accepted for assembly.
///
/// Detail 5 already means 1024 requests and an 8128 px square RGBA buffer
/// (about 264 MB).
pub const MAX_DETAIL: u8 = 5;

/// Position of one tile within a side's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoordinate {
    /// Column, increasing to the right.
    pub x: u32,
    /// Row, increasing downward.
    pub y: u32,
}

impl TileCoordinate {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Pixel offset of this tile's core within the assembled image.
    ///
    /// Saturates at `u32::MAX` for coordinates far outside any valid grid.
    pub const fn pixel_offset(&self) -> (u32, u32) {
        (
            self.x.saturating_mul(TILE_CORE_SIZE),
            self.y.saturating_mul(TILE_CORE_SIZE),
        )
    }

    /// Whether the coordinate lies inside the grid at `detail`.
    pub fn is_within(&self, detail: u8) -> bool {
        let row_len = row_length(detail);
        (self.x as u64) < row_len && (self.y as u64) < row_len
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(u32, u32)> for TileCoordinate {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Detail level beyond what this crate will assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDetail {
    pub detail: u8,
    pub max: u8,
}

impl fmt::Display for InvalidDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Detail level {} exceeds the maximum of {} ({} tiles requested)",
            self.detail,
            self.max,
            tile_count_label(self.detail)
        )
    }
}

impl std::error::Error for InvalidDetail {}

fn tile_count_label(detail: u8) -> String {
    4u128
        .checked_pow(detail as u32)
        .map(|count| count.to_string())
        .unwrap_or_else(|| format!("4^{}", detail))
}

/// Rejects detail levels above [`MAX_DETAIL`].
pub fn validate_detail(detail: u8) -> Result<u8, InvalidDetail> {
    if detail > MAX_DETAIL {
        return Err(InvalidDetail {
            detail,
            max: MAX_DETAIL,
        });
    }
    Ok(detail)
}

/// Number of tiles along one edge of the grid (`2^detail`).
#[inline]
pub fn row_length(detail: u8) -> u64 {
    1u64 << detail.min(32)
}

/// Number of tiles covering a side (`4^detail`).
#[inline]
pub fn tile_count(detail: u8) -> u64 {
    let row_len = row_length(detail);
    row_len.saturating_mul(row_len)
}

/// Edge length in pixels of the assembled side image.
///
/// Callers should validate `detail` first; the value saturates for details
/// far beyond [`MAX_DETAIL`].
#[inline]
pub fn image_dimension(detail: u8) -> u32 {
    u32::try_from(row_length(detail) * TILE_CORE_SIZE as u64).unwrap_or(u32::MAX)
}

/// Enumerates every tile of a side in row-major order.
///
/// Sequence position `i` maps to `x = i % row_len`, `y = i / row_len`. This is
/// only the fan-out order; the quadtree index used in addresses is computed
/// separately by [`crate::quadkey::tile_to_index`].
///
/// Allocates `4^detail` entries, so `detail` must be validated beforehand.
pub fn tile_grid(detail: u8) -> Vec<TileCoordinate> {
    let row_len = row_length(detail);
    (0..tile_count(detail))
        .map(|i| TileCoordinate::new((i % row_len) as u32, (i / row_len) as u32))
        .collect()
}
