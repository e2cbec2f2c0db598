//! Integration tests for side assembly.
//!
//! These tests drive the public API end to end with an in-process tile
//! server:
//! - URL construction from the service configuration
//! - Concurrent fetch bounded by the request limit
//! - Border trimming and placement of tile cores
//! - Partial results when tiles fail
//!
//! Run with: `cargo test --test side_assembly`

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};

use streetside::assembly::AssembledImage;
use streetside::cache::TileCache;
use streetside::provider::url_for;
use streetside::tile::tile_grid;
use streetside::{
    AssemblyError, AsyncHttpClient, PanoramaId, ProviderError, ServiceConfig, Side, SideAssembler,
    TileCoordinate, TileFetcher,
};

// ============================================================================
// Helper Functions
// ============================================================================

const TEMPLATE: &str = "https://t{subdomain}.tiles.example.net/hs{quadkey}.jpg?g={hsgenid}";
const FRAME: Rgba<u8> = Rgba([255, 0, 255, 255]);
const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn service_config() -> ServiceConfig {
    ServiceConfig::new(TEMPLATE)
        .with_generation_id("12577")
        .with_subdomain_count(4)
}

/// Core color of a tile, unique per coordinate.
fn core_color(side: Side, tile: TileCoordinate) -> Rgba<u8> {
    Rgba([tile.x as u8 * 30 + 10, tile.y as u8 * 30 + 10, side.code() * 40, 255])
}

/// Encodes a 256px tile whose outermost ring differs from its core.
fn tile_png(core: Rgba<u8>) -> Vec<u8> {
    let tile = RgbaImage::from_fn(256, 256, |x, y| {
        if x == 0 || y == 0 || x == 255 || y == 255 {
            FRAME
        } else {
            core
        }
    });
    let mut buffer = Vec::new();
    tile.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encode tile");
    buffer
}

/// In-process tile server keyed by URL.
///
/// Records every request and the peak number of requests in flight.
#[derive(Default)]
struct TileServer {
    tiles: HashMap<String, Vec<u8>>,
    latency: Option<Duration>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl TileServer {
    fn with_side(mut self, panorama: PanoramaId, side: Side, detail: u8) -> Self {
        for tile in tile_grid(detail) {
            let url = url_for(panorama, side, tile, detail, &service_config());
            self.tiles.insert(url, tile_png(core_color(side, tile)));
        }
        self
    }

    fn without(mut self, url: &str) -> Self {
        self.tiles.remove(url);
        self
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl AsyncHttpClient for TileServer {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.requests.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.tiles
            .get(url)
            .cloned()
            .ok_or_else(|| ProviderError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

fn assert_core(image: &AssembledImage, tile: TileCoordinate, expected: Rgba<u8>) {
    let (ox, oy) = tile.pixel_offset();
    for y in [oy, oy + 1, oy + 126, oy + 252, oy + 253] {
        for x in [ox, ox + 1, ox + 126, ox + 252, ox + 253] {
            assert_eq!(
                *image.image().get_pixel(x, y),
                expected,
                "pixel ({}, {}) of tile {}",
                x,
                y,
                tile
            );
        }
    }
}

// ============================================================================
// Addressing
// ============================================================================

#[test]
fn test_address_of_known_tile() {
    let address = streetside::build_address(PanoramaId::new(12345), Side::Front, 2, 1, 2);
    assert_eq!(streetside::tile_to_index(2, 1, 2), 6);
    assert_eq!(address.as_str(), "00000000030003210112");

    let url = url_for(
        PanoramaId::new(12345),
        Side::Front,
        TileCoordinate::new(2, 1),
        2,
        &service_config(),
    );
    assert_eq!(
        url,
        "https://t2.tiles.example.net/hs00000000030003210112.jpg?g=12577"
    );
}

// ============================================================================
// Assembly
// ============================================================================

#[tokio::test]
async fn test_single_tile_side() {
    let panorama = PanoramaId::new(12345);
    let assembler = SideAssembler::new(TileServer::default().with_side(panorama, Side::Top, 0));

    let side = assembler
        .assemble_side(panorama, Side::Top, 0, &service_config())
        .await
        .unwrap();

    assert_eq!(side.dimension(), 254);
    assert!(side.is_complete());
    assert_core(&side, TileCoordinate::new(0, 0), core_color(Side::Top, TileCoordinate::new(0, 0)));
    assert_eq!(
        assembler.fetcher().http_client().requests(),
        vec!["https://t0.tiles.example.net/hs000000000300032111.jpg?g=12577"]
    );
}

#[tokio::test]
async fn test_four_tile_side_has_no_seams() {
    let panorama = PanoramaId::new(98765);
    let assembler = SideAssembler::new(TileServer::default().with_side(panorama, Side::Left, 1));

    let side = assembler
        .assemble_side(panorama, Side::Left, 1, &service_config())
        .await
        .unwrap();

    assert_eq!(side.dimension(), 508);
    assert!(side.missing().is_empty());
    for tile in tile_grid(1) {
        assert_core(&side, tile, core_color(Side::Left, tile));
    }
    assert!(side.image().pixels().all(|p| *p != FRAME && *p != BLANK));
    assert_eq!(assembler.fetcher().http_client().requests().len(), 4);
}

#[tokio::test]
async fn test_partial_side_reports_missing_tile() {
    let panorama = PanoramaId::new(4242);
    let config = service_config();
    let lost = url_for(panorama, Side::Back, TileCoordinate::new(1, 0), 1, &config);
    let server = TileServer::default()
        .with_side(panorama, Side::Back, 1)
        .without(&lost);

    let side = SideAssembler::new(server)
        .assemble_side(panorama, Side::Back, 1, &config)
        .await
        .unwrap();

    assert_eq!(side.dimension(), 508);
    assert_eq!(side.missing(), &[TileCoordinate::new(1, 0)]);
    assert_core(&side, TileCoordinate::new(1, 0), BLANK);
    assert_core(&side, TileCoordinate::new(0, 1), core_color(Side::Back, TileCoordinate::new(0, 1)));
    assert_eq!(side.stats().failed, 1);
}

#[tokio::test]
async fn test_repeat_assembly_is_byte_identical() {
    let panorama = PanoramaId::new(777);
    let assemble = || async {
        SideAssembler::new(TileServer::default().with_side(panorama, Side::Right, 2))
            .assemble_side(panorama, Side::Right, 2, &service_config())
            .await
            .unwrap()
            .encode(ImageFormat::Png)
            .unwrap()
    };

    assert_eq!(assemble().await, assemble().await);
}

#[tokio::test]
async fn test_fatal_errors_issue_no_requests() {
    let assembler = SideAssembler::new(TileServer::default());

    let err = assembler
        .assemble_side(PanoramaId::new(1), Side::Front, 9, &service_config())
        .await
        .unwrap_err();
    assert!(matches!(err, AssemblyError::InvalidDetail(_)));

    let err = assembler
        .assemble_side(PanoramaId::new(1), Side::Front, 1, &service_config().with_subdomain_count(0))
        .await
        .unwrap_err();
    assert!(matches!(err, AssemblyError::Configuration(_)));

    assert!(assembler.fetcher().http_client().requests().is_empty());
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_request_limit_is_respected() {
    let panorama = PanoramaId::new(31337);
    let config = service_config().with_max_concurrent_requests(3);
    let server = TileServer::default()
        .with_side(panorama, Side::Bottom, 2)
        .with_latency(Duration::from_millis(20));
    let assembler = SideAssembler::from_config(server, &config);

    let side = assembler
        .assemble_side(panorama, Side::Bottom, 2, &config)
        .await
        .unwrap();

    assert!(side.is_complete());
    let server = assembler.fetcher().http_client();
    assert_eq!(server.requests().len(), 16);
    let peak = server.peak_in_flight.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 3, "peak in flight was {}", peak);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sides_share_assembler() {
    let panorama = PanoramaId::new(2024);
    let server = Side::ALL
        .iter()
        .fold(TileServer::default(), |server, &side| server.with_side(panorama, side, 1));
    let assembler = Arc::new(SideAssembler::new(server));
    let config = service_config();

    let sides = futures::future::join_all(Side::ALL.iter().map(|&side| {
        let assembler = Arc::clone(&assembler);
        let config = config.clone();
        async move {
            let image = assembler
                .assemble_side(panorama, side, 1, &config)
                .await
                .unwrap();
            (side, image)
        }
    }))
    .await;

    for (side, image) in sides {
        assert!(image.is_complete(), "side {} incomplete", side);
        assert_core(&image, TileCoordinate::new(1, 1), core_color(side, TileCoordinate::new(1, 1)));
    }
    assert_eq!(assembler.fetcher().http_client().requests().len(), 24);
}

#[tokio::test]
async fn test_cache_shared_between_assemblies() {
    let panorama = PanoramaId::new(55);
    let cache = TileCache::default();
    let fetcher = TileFetcher::new(TileServer::default().with_side(panorama, Side::Front, 1))
        .with_cache(cache.clone());
    let assembler = SideAssembler::with_fetcher(fetcher, streetside::assembly::ImageDecoder);

    let first = assembler
        .assemble_side(panorama, Side::Front, 1, &service_config())
        .await
        .unwrap();
    let second = assembler
        .assemble_side(panorama, Side::Front, 1, &service_config())
        .await
        .unwrap();

    assert_eq!(first.image().as_raw(), second.image().as_raw());
    assert_eq!(assembler.fetcher().http_client().requests().len(), 4);
    cache.sync().await;
    assert_eq!(cache.entry_count(), 4);
}
