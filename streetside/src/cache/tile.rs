//! In-memory tile cache keyed by tile address and imagery generation.
//!
//! Wraps `moka::future::Cache` to provide an async-safe, size-bounded store
//! of raw tile bytes. Keys combine the canonical tile address, e.g.
//! `00000000030003210112`, with the service's generation token, so the same
//! physical tile is shared between repeated assemblies and prefetching
//! callers, while a token rotation never serves tiles of the old generation.
//!
//! Entries are weighted by their byte length; moka evicts least-recently
//! used entries once the configured byte budget is exceeded.

use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::quadkey::TileAddress;

/// Default memory budget for cached tiles (64 MB, roughly 2000 JPEG tiles).
pub const DEFAULT_TILE_CACHE_BYTES: u64 = 64 * 1024 * 1024;

/// Builds the cache key for a tile of one imagery generation.
fn cache_key(address: &TileAddress, generation: Option<&str>) -> String {
    match generation {
        Some(generation) => format!("{}@{}", address, generation),
        None => address.as_str().to_string(),
    }
}

/// Size-bounded cache of raw tile bytes.
///
/// Cloning is cheap and clones share the same storage.
#[derive(Clone)]
pub struct TileCache {
    cache: MokaCache<String, Vec<u8>>,
    max_size_bytes: u64,
}

impl TileCache {
    /// Create a tile cache.
    ///
    /// # Arguments
    ///
    /// * `max_size_bytes` - Maximum total size of cached tile bytes
    /// * `ttl` - Optional time-to-live for entries
    pub fn new(max_size_bytes: u64, ttl: Option<Duration>) -> Self {
        let mut builder = MokaCache::builder()
            .weigher(|_key: &String, value: &Vec<u8>| -> u32 {
                value.len().min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes);

        if let Some(ttl_duration) = ttl {
            builder = builder.time_to_live(ttl_duration);
        }

        Self {
            cache: builder.build(),
            max_size_bytes,
        }
    }

    /// Get the bytes of a tile if cached for this generation.
    pub async fn get(&self, address: &TileAddress, generation: Option<&str>) -> Option<Vec<u8>> {
        let hit = self.cache.get(&cache_key(address, generation)).await;
        trace!(address = %address, generation, hit = hit.is_some(), "Tile cache lookup");
        hit
    }

    /// Store the bytes of a tile.
    pub async fn insert(&self, address: &TileAddress, generation: Option<&str>, data: Vec<u8>) {
        self.cache.insert(cache_key(address, generation), data).await;
    }

    /// Check whether a tile is cached for this generation.
    pub fn contains(&self, address: &TileAddress, generation: Option<&str>) -> bool {
        self.cache.contains_key(&cache_key(address, generation))
    }

    /// Drop a single tile from the cache.
    pub async fn remove(&self, address: &TileAddress, generation: Option<&str>) {
        self.cache.remove(&cache_key(address, generation)).await;
    }

    /// Drop every cached tile.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of cached tiles.
    ///
    /// Pending maintenance is flushed lazily; call [`TileCache::sync`] first
    /// for an exact figure.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Approximate total size of cached bytes.
    pub fn size_bytes(&self) -> u64 {
        self.cache.weighted_size()
    }

    /// Configured byte budget.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Run pending eviction and bookkeeping.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_CACHE_BYTES, None)
    }
}
