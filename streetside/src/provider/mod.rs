//! Tile retrieval from the panorama tile service
//!
//! This module turns tile addresses into URLs and downloads the tile bytes.
//! The HTTP transport is injected through [`AsyncHttpClient`], so tests and
//! embedders can substitute their own client; [`AsyncReqwestClient`] is the
//! production implementation.
//!
//! ```ignore
//! use streetside::provider::{AsyncReqwestClient, TileFetcher};
//!
//! let fetcher = TileFetcher::new(AsyncReqwestClient::new()?);
//! let bytes = fetcher.fetch(&url, config.tile_timeout()).await?;
//! ```

mod fetcher;
mod http;
mod types;

pub use fetcher::{render_url, url_for, TileFetcher};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_USER_AGENT};
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::{MockAsyncHttpClient, ScriptedHttpClient};
