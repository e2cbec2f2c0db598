//! Streetside - panorama tile addressing and side assembly
//!
//! Street-level panoramas are served as six cube faces ("sides"), each split
//! into a quadtree of 256px JPEG tiles. This crate computes the address of
//! every tile, downloads a whole side concurrently, and stitches the tiles
//! into one image with the one-pixel tile borders trimmed away.
//!
//! # Modules
//!
//! - [`quadkey`]: bit interleaving and base-4 tile addresses
//! - [`tile`]: tile grid geometry and side requests
//! - [`config`]: tile service configuration
//! - [`provider`]: URL templating and HTTP tile retrieval
//! - [`cache`]: in-memory tile cache
//! - [`assembly`]: concurrent side assembly
//! - [`logging`]: `tracing` subscriber setup for binaries
//!
//! # Example
//!
//! ```ignore
//! use streetside::{AsyncReqwestClient, PanoramaId, ServiceConfig, Side, SideAssembler};
//!
//! let config = ServiceConfig::from_json(&std::fs::read_to_string("service.json")?)?;
//! let assembler = SideAssembler::from_config(AsyncReqwestClient::new()?, &config);
//! let front = assembler
//!     .assemble_side(PanoramaId::new(12345), Side::Front, 2, &config)
//!     .await?;
//! if !front.is_complete() {
//!     eprintln!("missing tiles: {:?}", front.missing());
//! }
//! front.save("front.png")?;
//! ```

pub mod assembly;
pub mod cache;
pub mod config;
pub mod logging;
pub mod provider;
pub mod quadkey;
pub mod tile;

pub use assembly::{AssembledImage, AssemblyError, AssemblyStats, SideAssembler};
pub use config::{ConfigError, ServiceConfig};
pub use provider::{AsyncHttpClient, AsyncReqwestClient, ProviderError, TileFetcher};
pub use quadkey::{build_address, tile_to_index, PanoramaId, Side, TileAddress};
pub use tile::{SideRequest, TileCoordinate};
