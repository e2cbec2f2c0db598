//! Tile service configuration.
//!
//! The remote service describes where tiles live through a URL template plus
//! a handful of session values. `ServiceConfig` captures one point-in-time
//! snapshot of those values. It is passed by reference into every assembly
//! call and never mutated by this crate; when the service rotates its
//! generation token the caller builds a fresh config.
//!
//! # Template Placeholders
//!
//! | Placeholder   | Substituted with                                |
//! |---------------|-------------------------------------------------|
//! | `{quadkey}`   | Tile address (required)                         |
//! | `{subdomain}` | `quadtree index mod subdomain_count`            |
//! | `{hsgenid}`   | Imagery generation token (`generation_id`)      |
//!
//! # Example
//!
//! ```
//! use streetside::config::ServiceConfig;
//!
//! let config = ServiceConfig::new("https://t{subdomain}.example.net/tiles/hs{quadkey}.jpg?g={hsgenid}")
//!     .with_generation_id("1234")
//!     .with_subdomain_count(4);
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder replaced by the tile address.
pub const QUADKEY_PLACEHOLDER: &str = "{quadkey}";

/// Placeholder replaced by the selected subdomain number.
pub const SUBDOMAIN_PLACEHOLDER: &str = "{subdomain}";

/// Placeholder replaced by the imagery generation token.
pub const GENERATION_PLACEHOLDER: &str = "{hsgenid}";

/// Number of tile subdomains used when the service does not say otherwise.
///
/// Browsers only rotate across two even though more exist.
pub const DEFAULT_SUBDOMAIN_COUNT: u32 = 2;

/// Default per-tile deadline in seconds.
pub const DEFAULT_TILE_TIMEOUT_SECS: u64 = 30;

/// Default cap on simultaneous in-flight tile requests.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 16;

/// Errors raised while loading or validating a [`ServiceConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The tile URL template is empty.
    #[error("tile URL template is empty")]
    EmptyTemplate,

    /// The template lacks a required placeholder.
    #[error("tile URL template is missing the {placeholder} placeholder")]
    MissingPlaceholder { placeholder: &'static str },

    /// No subdomains to distribute requests over.
    #[error("subdomain count must be at least 1")]
    ZeroSubdomains,

    /// The template needs a generation token but none was supplied.
    #[error("tile URL template uses {{hsgenid}} but no generation id is configured")]
    MissingGenerationId,

    /// A zero deadline would fail every tile.
    #[error("tile timeout must be greater than zero")]
    ZeroTimeout,

    /// No request may ever be issued.
    #[error("concurrent request limit must be at least 1")]
    ZeroConcurrency,

    /// The serialized configuration could not be parsed.
    #[error("failed to parse service configuration: {0}")]
    Parse(String),
}

fn default_subdomain_count() -> u32 {
    DEFAULT_SUBDOMAIN_COUNT
}

fn default_tile_timeout_secs() -> u64 {
    DEFAULT_TILE_TIMEOUT_SECS
}

fn default_max_concurrent_requests() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

/// Point-in-time configuration of the remote tile service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// URL template containing at least `{quadkey}`.
    pub tile_url_template: String,

    /// Number of subdomains requests are spread across.
    #[serde(default = "default_subdomain_count")]
    pub subdomain_count: u32,

    /// Imagery generation token substituted for `{hsgenid}`.
    #[serde(default)]
    pub generation_id: Option<String>,

    /// Deadline for a single tile fetch, in seconds.
    #[serde(default = "default_tile_timeout_secs")]
    pub tile_timeout_secs: u64,

    /// Upper bound on tile requests in flight at once.
    ///
    /// Read when a fetcher is built with [`TileFetcher::from_config`] or
    /// [`SideAssembler::from_config`]. The config passed to each assembly
    /// call does not resize an existing fetcher's limit.
    ///
    /// [`TileFetcher::from_config`]: crate::provider::TileFetcher::from_config
    /// [`SideAssembler::from_config`]: crate::assembly::SideAssembler::from_config
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl ServiceConfig {
    /// Create a config for the given template with default session values.
    pub fn new(tile_url_template: impl Into<String>) -> Self {
        Self {
            tile_url_template: tile_url_template.into(),
            subdomain_count: DEFAULT_SUBDOMAIN_COUNT,
            generation_id: None,
            tile_timeout_secs: DEFAULT_TILE_TIMEOUT_SECS,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the subdomain count.
    pub fn with_subdomain_count(mut self, count: u32) -> Self {
        self.subdomain_count = count;
        self
    }

    /// Set the imagery generation token.
    pub fn with_generation_id(mut self, generation_id: impl Into<String>) -> Self {
        self.generation_id = Some(generation_id.into());
        self
    }

    /// Set the per-tile deadline.
    pub fn with_tile_timeout_secs(mut self, secs: u64) -> Self {
        self.tile_timeout_secs = secs;
        self
    }

    /// Set the concurrent request limit.
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    /// Per-tile deadline as a `Duration`.
    pub fn tile_timeout(&self) -> Duration {
        Duration::from_secs(self.tile_timeout_secs)
    }

    /// Check that tile URLs can be built from this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_url_template.trim().is_empty() {
            return Err(ConfigError::EmptyTemplate);
        }
        if !self.tile_url_template.contains(QUADKEY_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder {
                placeholder: QUADKEY_PLACEHOLDER,
            });
        }
        if self.subdomain_count == 0 {
            return Err(ConfigError::ZeroSubdomains);
        }
        let has_generation = self
            .generation_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        if self.tile_url_template.contains(GENERATION_PLACEHOLDER) && !has_generation {
            return Err(ConfigError::MissingGenerationId);
        }
        if self.tile_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}
