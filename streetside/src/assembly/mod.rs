//! Side assembly - fetches every tile of a cube face and stitches them.
//!
//! [`SideAssembler::assemble_side`] validates its inputs, spawns one task per
//! tile onto a [`JoinSet`], and composes each decoded tile's core region into
//! a single RGBA canvas as tasks finish. Only the join loop touches the
//! canvas, so no locking is involved.
//!
//! Individual tile failures never abort the assembly. The affected region is
//! left transparent and the coordinate is listed in
//! [`AssembledImage::missing`].
//!
//! # Example
//!
//! ```ignore
//! use streetside::assembly::SideAssembler;
//! use streetside::provider::AsyncReqwestClient;
//! use streetside::quadkey::{PanoramaId, Side};
//!
//! let assembler = SideAssembler::from_config(AsyncReqwestClient::new()?, &config);
//! let side = assembler.assemble_side(PanoramaId::new(12345), Side::Front, 2, &config).await?;
//! side.save("front.png")?;
//! ```

mod compose;
mod decode;
mod output;

pub use decode::{check_dimensions, DecodeError, ImageDecoder, TileDecoder, MIN_TILE_EDGE};
pub use output::{AssembledImage, AssemblyStats};

use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn, Instrument};

use crate::cache::TileCache;
use crate::config::{ConfigError, ServiceConfig};
use crate::provider::{AsyncHttpClient, ProviderError, TileFetcher};
use crate::quadkey::{PanoramaId, Side};
use crate::tile::{
    image_dimension, tile_grid, validate_detail, InvalidDetail, SideRequest, TileCoordinate,
};

use compose::place_core;

/// Fatal errors detected before any tile is requested.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    InvalidDetail(#[from] InvalidDetail),

    #[error("Invalid service configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Panorama id {0} does not fit in a tile address")]
    PanoramaIdOutOfRange(PanoramaId),
}

/// Why a single tile could not be placed.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] ProviderError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Decode task failed: {0}")]
    Task(String),
}

/// Assembles panorama sides from remote tiles.
///
/// Cheap to share behind an `Arc`; concurrent assemblies through the same
/// assembler share its request limit.
pub struct SideAssembler<C: AsyncHttpClient, D: TileDecoder = ImageDecoder> {
    fetcher: Arc<TileFetcher<C>>,
    decoder: Arc<D>,
}

impl<C: AsyncHttpClient + 'static> SideAssembler<C, ImageDecoder> {
    /// Creates an assembler with default request limit and decoder.
    ///
    /// The limit stays at the default whatever
    /// `ServiceConfig::max_concurrent_requests` later calls carry; use
    /// [`from_config`](Self::from_config) to honor it.
    pub fn new(http_client: C) -> Self {
        Self::with_fetcher(TileFetcher::new(http_client), ImageDecoder)
    }

    /// Creates an assembler whose request limit comes from `config`.
    ///
    /// The limit is fixed here and shared by every later assembly.
    pub fn from_config(http_client: C, config: &ServiceConfig) -> Self {
        Self::with_fetcher(TileFetcher::from_config(http_client, config), ImageDecoder)
    }
}

impl<C, D> SideAssembler<C, D>
where
    C: AsyncHttpClient + 'static,
    D: TileDecoder + 'static,
{
    /// Creates an assembler from a configured fetcher and decoder.
    pub fn with_fetcher(fetcher: TileFetcher<C>, decoder: D) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            decoder: Arc::new(decoder),
        }
    }

    /// The fetcher used for tile downloads.
    pub fn fetcher(&self) -> &TileFetcher<C> {
        &self.fetcher
    }

    /// The tile cache consulted by the fetcher, if any.
    pub fn cache(&self) -> Option<&TileCache> {
        self.fetcher.cache()
    }

    /// Assembles one side of a panorama at the given detail level.
    pub async fn assemble_side(
        &self,
        panorama: PanoramaId,
        side: Side,
        detail: u8,
        config: &ServiceConfig,
    ) -> Result<AssembledImage, AssemblyError> {
        self.assemble(&SideRequest::new(panorama, side, detail), config)
            .await
    }

    /// Assembles the side described by `request`.
    ///
    /// Returns once every tile task has settled. The result is complete,
    /// or partial with the failed coordinates listed in row-major order.
    #[instrument(
        skip(self, request, config),
        fields(
            panorama = %request.panorama(),
            side = %request.side(),
            detail = request.detail()
        )
    )]
    pub async fn assemble(
        &self,
        request: &SideRequest,
        config: &ServiceConfig,
    ) -> Result<AssembledImage, AssemblyError> {
        let detail = validate_detail(request.detail())?;
        config.validate()?;
        if !request.panorama().fits_address() {
            return Err(AssemblyError::PanoramaIdOutOfRange(request.panorama()));
        }

        let started = Instant::now();
        let grid = tile_grid(detail);
        let dimension = image_dimension(detail);
        debug!(tiles = grid.len(), dimension, "Assembling side");

        let config = Arc::new(config.clone());
        let mut tasks = JoinSet::new();
        for (slot, &coordinate) in grid.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let decoder = Arc::clone(&self.decoder);
            let config = Arc::clone(&config);
            let request = *request;
            tasks.spawn(
                async move {
                    let result =
                        load_tile(&fetcher, decoder, &request, coordinate, &config).await;
                    (slot, coordinate, result)
                }
                .in_current_span(),
            );
        }

        let mut canvas = RgbaImage::new(dimension, dimension);
        let mut placed = vec![false; grid.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, coordinate, Ok(tile))) => {
                    place_core(&mut canvas, &tile, coordinate);
                    placed[slot] = true;
                }
                Ok((_, coordinate, Err(e))) => {
                    warn!(tile = %coordinate, error = %e, "Tile unavailable, leaving region blank");
                }
                Err(e) => {
                    warn!(error = %e, "Tile task aborted, leaving region blank");
                }
            }
        }

        // Anything not placed is missing, including tasks that panicked
        // before reporting their coordinate.
        let missing: Vec<TileCoordinate> = grid
            .iter()
            .zip(&placed)
            .filter(|(_, done)| !**done)
            .map(|(&coordinate, _)| coordinate)
            .collect();

        let stats = AssemblyStats {
            requested: grid.len(),
            succeeded: grid.len() - missing.len(),
            failed: missing.len(),
            elapsed: started.elapsed(),
        };
        debug!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Side assembly complete"
        );

        Ok(AssembledImage::new(canvas, detail, missing, stats))
    }
}

/// Fetches and decodes one tile. Decoding runs on the blocking pool.
///
/// Only bytes that decode into a usable tile are offered to the cache, so a
/// bad response affects the current assembly alone.
async fn load_tile<C, D>(
    fetcher: &TileFetcher<C>,
    decoder: Arc<D>,
    request: &SideRequest,
    coordinate: TileCoordinate,
    config: &ServiceConfig,
) -> Result<RgbaImage, TileError>
where
    C: AsyncHttpClient,
    D: TileDecoder + 'static,
{
    let data = fetcher
        .fetch_tile(
            request.panorama(),
            request.side(),
            coordinate,
            request.detail(),
            config,
        )
        .await?;

    let (tile, data) = tokio::task::spawn_blocking(move || {
        let tile = decoder.decode(&data)?;
        check_dimensions(&tile)?;
        Ok::<_, DecodeError>((tile, data))
    })
    .await
    .map_err(|e| TileError::Task(e.to_string()))??;

    fetcher
        .store_tile(&request.address(coordinate), config, data)
        .await;
    Ok(tile)
}
