//! Tile URL construction and retrieval.
//!
//! Address construction ([`crate::quadkey::build_address`]) is pure and knows
//! nothing about URLs. This module performs the single templating step that
//! turns an address into a URL, then retrieves the bytes through an injected
//! [`AsyncHttpClient`].
//!
//! # Example
//!
//! ```
//! use streetside::config::ServiceConfig;
//! use streetside::provider::url_for;
//! use streetside::quadkey::{PanoramaId, Side};
//! use streetside::tile::TileCoordinate;
//!
//! let config = ServiceConfig::new("https://t{subdomain}.example.net/hs{quadkey}.jpg");
//! let url = url_for(PanoramaId::new(12345), Side::Front, TileCoordinate::new(2, 1), 2, &config);
//! assert_eq!(url, "https://t0.example.net/hs00000000030003210112.jpg");
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::trace;

use super::http::AsyncHttpClient;
use super::types::ProviderError;
use crate::cache::TileCache;
use crate::config::{
    ServiceConfig, DEFAULT_MAX_CONCURRENT_REQUESTS, GENERATION_PLACEHOLDER, QUADKEY_PLACEHOLDER,
    SUBDOMAIN_PLACEHOLDER,
};
use crate::quadkey::{build_address, PanoramaId, Side, TileAddress};
use crate::tile::TileCoordinate;

/// Substitutes an address into the configured URL template.
///
/// The subdomain is `address.index() mod subdomain_count`. Placeholders are
/// replaced in one left-to-right pass, so substituted values are never
/// themselves scanned for placeholders. Unknown `{...}` sequences are kept
/// verbatim.
pub fn render_url(address: &TileAddress, config: &ServiceConfig) -> String {
    let subdomain = (address.index() % u64::from(config.subdomain_count.max(1))).to_string();
    let generation = config.generation_id.as_deref().unwrap_or_default();
    let substitutions = [
        (QUADKEY_PLACEHOLDER, address.as_str()),
        (SUBDOMAIN_PLACEHOLDER, subdomain.as_str()),
        (GENERATION_PLACEHOLDER, generation),
    ];

    let template = config.tile_url_template.as_str();
    let mut url = String::with_capacity(template.len() + address.as_str().len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        url.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match substitutions
            .iter()
            .find(|(placeholder, _)| candidate.starts_with(placeholder))
        {
            Some((placeholder, value)) => {
                url.push_str(value);
                rest = &candidate[placeholder.len()..];
            }
            None => {
                url.push('{');
                rest = &candidate[1..];
            }
        }
    }
    url.push_str(rest);
    url
}

/// Builds the URL of one tile.
pub fn url_for(
    panorama: PanoramaId,
    side: Side,
    tile: TileCoordinate,
    detail: u8,
    config: &ServiceConfig,
) -> String {
    let address = build_address(panorama, side, tile.x, tile.y, detail);
    render_url(&address, config)
}

/// Retrieves raw tile bytes through an injected HTTP client.
///
/// Simultaneous requests are bounded by a semaphore shared by every tile
/// this fetcher serves. No retries are attempted; a failed request is
/// reported to the caller as is.
pub struct TileFetcher<C: AsyncHttpClient> {
    http_client: C,
    request_limiter: Arc<Semaphore>,
    max_concurrent_requests: usize,
    cache: Option<TileCache>,
}

impl<C: AsyncHttpClient> TileFetcher<C> {
    /// Creates a fetcher with the default concurrency limit and no cache.
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            request_limiter: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_REQUESTS)),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            cache: None,
        }
    }

    /// Creates a fetcher sized by the config's concurrency limit.
    pub fn from_config(http_client: C, config: &ServiceConfig) -> Self {
        Self::new(http_client).with_max_concurrent_requests(config.max_concurrent_requests)
    }

    /// Set the maximum number of simultaneous requests (at least 1).
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        let max = max.max(1);
        self.request_limiter = Arc::new(Semaphore::new(max));
        self.max_concurrent_requests = max;
        self
    }

    /// Serve tiles from the given cache and accept verified tiles into it.
    pub fn with_cache(mut self, cache: TileCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The underlying HTTP client.
    pub fn http_client(&self) -> &C {
        &self.http_client
    }

    /// Maximum number of simultaneous requests.
    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }

    /// The attached tile cache, if any.
    pub fn cache(&self) -> Option<&TileCache> {
        self.cache.as_ref()
    }

    /// Fetches a URL, failing if no response arrives within `deadline`.
    ///
    /// The deadline starts once a request slot has been acquired, so time
    /// spent queued behind other tiles does not count against it.
    pub async fn fetch(&self, url: &str, deadline: Duration) -> Result<Vec<u8>, ProviderError> {
        let _permit = self
            .request_limiter
            .acquire()
            .await
            .map_err(|_| ProviderError::LimiterClosed)?;

        tokio::time::timeout(deadline, self.http_client.get(url))
            .await
            .map_err(|_| ProviderError::Timeout(deadline))?
    }

    /// Fetches one tile of a panorama side.
    ///
    /// Consults the cache first when one is attached. Downloads are not
    /// cached here, since a 200 response may still carry something other
    /// than a tile; callers hand verified bytes to [`TileFetcher::store_tile`].
    pub async fn fetch_tile(
        &self,
        panorama: PanoramaId,
        side: Side,
        tile: TileCoordinate,
        detail: u8,
        config: &ServiceConfig,
    ) -> Result<Vec<u8>, ProviderError> {
        let address = build_address(panorama, side, tile.x, tile.y, detail);
        let generation = config.generation_id.as_deref();

        if let Some(cache) = &self.cache {
            if let Some(data) = cache.get(&address, generation).await {
                trace!(address = %address, "Serving tile from cache");
                return Ok(data);
            }
        }

        let url = render_url(&address, config);
        self.fetch(&url, config.tile_timeout()).await
    }

    /// Stores tile bytes that decoded successfully in the attached cache.
    ///
    /// Entries are keyed by address and the config's generation token. Does
    /// nothing when no cache is attached.
    pub async fn store_tile(&self, address: &TileAddress, config: &ServiceConfig, data: Vec<u8>) {
        if let Some(cache) = &self.cache {
            cache
                .insert(address, config.generation_id.as_deref(), data)
                .await;
        }
    }
}
