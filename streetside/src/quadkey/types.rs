//! Identifier types used to build tile addresses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of base-4 digits used for the panorama segment of an address.
pub const PANORAMA_DIGITS: usize = 16;

/// Number of base-4 digits used for the side segment of an address.
pub const SIDE_DIGITS: usize = 2;

/// Identifier of a single capture point in the remote catalog.
///
/// The value is opaque to this crate. Only ids below `4^16` can be encoded
/// into an address without losing digits, see [`PanoramaId::fits_address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanoramaId(u64);

impl PanoramaId {
    /// Largest id that survives the 16-digit base-4 panorama segment.
    pub const MAX_ADDRESSABLE: u64 = (1u64 << (2 * PANORAMA_DIGITS)) - 1;

    /// Wraps a raw catalog id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether the id encodes into an address without truncation.
    pub const fn fits_address(self) -> bool {
        self.0 <= Self::MAX_ADDRESSABLE
    }
}

impl From<u64> for PanoramaId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for PanoramaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One face of the cube a panorama is projected onto.
///
/// The discriminant is the code embedded in the tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front = 1,
    Right = 2,
    Back = 3,
    Left = 4,
    Top = 5,
    Bottom = 6,
}

impl Side {
    /// All sides in code order.
    pub const ALL: [Side; 6] = [
        Side::Front,
        Side::Right,
        Side::Back,
        Side::Left,
        Side::Top,
        Side::Bottom,
    ];

    /// Address code of this side (1-6).
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Looks a side up by its address code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|side| side.code() == code)
    }

    /// Lowercase name of the side.
    pub const fn name(self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Right => "right",
            Side::Back => "back",
            Side::Left => "left",
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSideError(String);

impl fmt::Display for ParseSideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown side '{}' (expected front, right, back, left, top, bottom or 1-6)",
            self.0
        )
    }
}

impl std::error::Error for ParseSideError {}

impl FromStr for Side {
    type Err = ParseSideError;

    /// Accepts a side name (any case) or its numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Side::from_code(code).ok_or_else(|| ParseSideError(s.to_string()));
        }
        Side::ALL
            .into_iter()
            .find(|side| side.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseSideError(s.to_string()))
    }
}

/// Canonical key of one tile as submitted to the remote tile service.
///
/// Holds the concatenated base-4 string together with the quadtree index it
/// was built from, since the index also drives subdomain selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileAddress {
    key: String,
    index: u64,
}

impl TileAddress {
    pub(crate) fn from_parts(key: String, index: u64) -> Self {
        Self { key, index }
    }

    /// The address string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The quadtree index encoded in the trailing segment.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Consumes the address, returning the string.
    pub fn into_string(self) -> String {
        self.key
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for TileAddress {
    fn as_ref(&self) -> &str {
        &self.key
    }
}
