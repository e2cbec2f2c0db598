//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::types::ProviderError;

/// Default User-Agent string for tile requests.
///
/// The tile service serves the same content to browsers, so requests present
/// themselves as one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/59.0.3071.115 Safari/537.36";

/// Default time allowed for establishing a connection.
///
/// The transport sets no overall request timeout. The per-tile deadline of
/// [`TileFetcher`](super::TileFetcher) bounds the whole exchange.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Idle connections kept per host, matching the tile fetch fan-out.
const POOL_MAX_IDLE_PER_HOST: usize = 16;

/// Trait for asynchronous HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests. Implementations own connection
/// pooling, keep-alive and user-agent policy.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes, or an error on network failure or a
    /// non-success status.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Async HTTP client implementation using reqwest.
///
/// Keeps connections alive across tile requests so a side's fan-out reuses
/// a small set of warm sockets.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
    connect_timeout: Duration,
}

impl AsyncReqwestClient {
    /// Creates a new AsyncReqwestClient with default configuration.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_connect_timeout(DEFAULT_CONNECT_TIMEOUT_SECS)
    }

    /// Creates a new AsyncReqwestClient with a custom connect timeout.
    ///
    /// Only connection setup is bounded here. A server that accepts the
    /// connection and then stalls is cut off by the caller's deadline.
    pub fn with_connect_timeout(connect_timeout_secs: u64) -> Result<Self, ProviderError> {
        let connect_timeout = Duration::from_secs(connect_timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create async HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            connect_timeout,
        })
    }

    /// Time allowed for establishing a connection.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                if e.is_timeout() {
                    return Err(ProviderError::Timeout(self.connect_timeout));
                }
                return Err(ProviderError::HttpError(format!("Request failed: {}", e)));
            }
        };

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ProviderError::HttpError(format!("Failed to read response: {}", e)))
    }
}
