//! Quadtree addressing for panorama tiles.
//!
//! Every tile of a panorama side is identified by a quadkey-style address:
//!
//! ```text
//! 0000000003000321 01 12
//! └── panorama ──┘ └┘ └┘
//!   16 base-4      side  quadtree index, `detail` base-4 digits
//! ```
//!
//! The quadtree index interleaves the bits of the tile column (even bit
//! positions) and row (odd bit positions), so dropping trailing digits of
//! the address yields the parent tile at a coarser detail level.
//!
//! # Example
//!
//! ```
//! use streetside::quadkey::{build_address, tile_to_index, PanoramaId, Side};
//!
//! assert_eq!(tile_to_index(2, 1, 2), 6);
//!
//! let address = build_address(PanoramaId::new(12345), Side::Front, 2, 1, 2);
//! assert_eq!(address.as_str(), "00000000030003210112");
//! ```

mod types;

pub use types::{
    PanoramaId, ParseSideError, Side, TileAddress, PANORAMA_DIGITS, SIDE_DIGITS,
};

/// Highest bit position that can hold a coordinate bit.
const MAX_COORD_BIT: u8 = u32::BITS as u8 - 1;

/// Converts a tile position into its quadtree index.
///
/// Bit `i` of `x` lands on output bit `2i`, bit `i` of `y` on `2i + 1`, for
/// every `i` from `detail` down to zero. For `x, y < 2^detail` the result is
/// in `[0, 4^detail)` and the mapping is a bijection.
#[inline]
pub fn tile_to_index(x: u32, y: u32, detail: u8) -> u64 {
    let mut index = 0u64;
    for i in (0..=detail.min(MAX_COORD_BIT)).rev() {
        let x_bit = ((x >> i) & 0x01) as u64;
        let y_bit = ((y >> i) & 0x01) as u64;
        index |= (x_bit << (2 * i)) | (y_bit << (2 * i + 1));
    }
    index
}

/// Recovers the tile position from a quadtree index.
///
/// Inverse of [`tile_to_index`] for indices in `[0, 4^detail)`.
#[inline]
pub fn index_to_tile(index: u64, detail: u8) -> (u32, u32) {
    let mut x = 0u32;
    let mut y = 0u32;
    for i in 0..=detail.min(MAX_COORD_BIT) {
        x |= (((index >> (2 * i)) & 0x01) as u32) << i;
        y |= (((index >> (2 * i + 1)) & 0x01) as u32) << i;
    }
    (x, y)
}

/// Renders `value` in base 4 using exactly `width` digits.
///
/// Shorter representations are left-padded with `'0'`. Longer ones keep only
/// the least-significant `width` digits, so callers must keep
/// `value < 4^width` when the full value matters. A width of zero yields an
/// empty string.
pub fn encode_base4(value: u64, width: usize) -> String {
    let mut digits = vec!['0'; width];
    let mut remaining = value;
    for digit in digits.iter_mut().rev() {
        *digit = char::from(b'0' + (remaining & 0x03) as u8);
        remaining >>= 2;
    }
    digits.into_iter().collect()
}

/// Builds the address of tile `(x, y)` of one side at the given detail.
pub fn build_address(panorama: PanoramaId, side: Side, x: u32, y: u32, detail: u8) -> TileAddress {
    let index = tile_to_index(x, y, detail);
    let mut key = String::with_capacity(PANORAMA_DIGITS + SIDE_DIGITS + detail as usize);
    key.push_str(&encode_base4(panorama.get(), PANORAMA_DIGITS));
    key.push_str(&encode_base4(side.code() as u64, SIDE_DIGITS));
    key.push_str(&encode_base4(index, detail as usize));
    TileAddress::from_parts(key, index)
}
