//! Side assembly request type.
//!
//! Provides the `SideRequest` type that bundles the caller-supplied,
//! immutable identity of one assembly: which panorama, which side, and at
//! which detail level.

use std::fmt;

use crate::quadkey::{build_address, PanoramaId, Side, TileAddress};
use crate::tile::{image_dimension, tile_count, tile_grid, TileCoordinate};

/// Request to assemble one side of a panorama.
///
/// # Example
///
/// ```
/// use streetside::quadkey::{PanoramaId, Side};
/// use streetside::tile::SideRequest;
///
/// let request = SideRequest::new(PanoramaId::new(12345), Side::Front, 1);
/// assert_eq!(request.tile_count(), 4);
/// assert_eq!(request.dimension(), 508);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SideRequest {
    panorama: PanoramaId,
    side: Side,
    detail: u8,
}

impl SideRequest {
    /// Create a new side request.
    ///
    /// # Arguments
    ///
    /// * `panorama` - Panorama to fetch
    /// * `side` - Cube face to assemble
    /// * `detail` - Level of detail (`4^detail` tiles)
    pub fn new(panorama: PanoramaId, side: Side, detail: u8) -> Self {
        Self {
            panorama,
            side,
            detail,
        }
    }

    /// Get the panorama id.
    pub fn panorama(&self) -> PanoramaId {
        self.panorama
    }

    /// Get the side.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Get the detail level.
    pub fn detail(&self) -> u8 {
        self.detail
    }

    /// Number of tiles this request fans out to.
    pub fn tile_count(&self) -> u64 {
        tile_count(self.detail)
    }

    /// Edge length in pixels of the assembled image.
    pub fn dimension(&self) -> u32 {
        image_dimension(self.detail)
    }

    /// Every tile coordinate of the side, in fan-out order.
    pub fn tiles(&self) -> Vec<TileCoordinate> {
        tile_grid(self.detail)
    }

    /// Address of one tile of this side.
    pub fn address(&self, tile: TileCoordinate) -> TileAddress {
        build_address(self.panorama, self.side, tile.x, tile.y, self.detail)
    }
}

impl fmt::Display for SideRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.panorama, self.side, self.detail)
    }
}
