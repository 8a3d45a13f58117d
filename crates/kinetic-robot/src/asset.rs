//! Sprite image provisioning and decoding.
//!
//! The image is fetched once into a local cache file and decoded at startup.
//! Every failure degrades to [`SpriteAsset::Unavailable`]; errors never leave
//! this module.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kinetic_engine::bitmap::{Bitmap, BitmapError};
use resvg::{tiny_skia, usvg};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server answered HTTP {0}")]
    Status(u16),
    #[error("server sent an empty body")]
    EmptyBody,
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to move download into place: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("failed to decode image: {0}")]
    Raster(#[from] image::ImageError),
    #[error("failed to parse SVG: {0}")]
    Svg(#[from] usvg::Error),
    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },
    #[error(transparent)]
    Bitmap(#[from] BitmapError),
}

impl AssetError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

// ── transport ─────────────────────────────────────────────────────────────

/// Parameters of a single download.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    pub user_agent: &'a str,
    pub timeout: Duration,
}

/// Source of remote bytes.
pub trait Transport {
    /// Performs one request and returns the full response body.
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Vec<u8>, AssetError>;
}

/// Blocking HTTP(S) transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, AssetError> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Vec<u8>, AssetError> {
        let response = self
            .client
            .get(request.url)
            .header(reqwest::header::USER_AGENT, request.user_agent)
            .timeout(request.timeout)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status(status.as_u16()));
        }

        Ok(response.bytes()?.to_vec())
    }
}

// ── provisioning ──────────────────────────────────────────────────────────

/// Makes sure `dest` exists, downloading it once if needed.
///
/// An existing file is trusted as-is and the transport is not touched.
/// Otherwise a single fetch is made and the body is written atomically.
/// Returns whether the file is available afterwards.
pub fn provision(transport: &dyn Transport, request: &FetchRequest<'_>, dest: &Path) -> bool {
    if dest.exists() {
        log::debug!("asset {} already cached", dest.display());
        return true;
    }

    match download(transport, request, dest) {
        Ok(len) => {
            log::info!("downloaded {} ({len} bytes) to {}", request.url, dest.display());
            true
        }
        Err(e) => {
            log::warn!("could not download {}: {e}", request.url);
            false
        }
    }
}

fn download(
    transport: &dyn Transport,
    request: &FetchRequest<'_>,
    dest: &Path,
) -> Result<usize, AssetError> {
    let body = transport.fetch(request)?;
    if body.is_empty() {
        return Err(AssetError::EmptyBody);
    }
    write_atomically(dest, &body)?;
    Ok(body.len())
}

/// Writes through a temporary file in the same directory, then renames it.
fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<(), AssetError> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| AssetError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| AssetError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| AssetError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| AssetError::io(tmp.path(), e))?;
    tmp.persist(dest)?;
    Ok(())
}

// ── decoding ──────────────────────────────────────────────────────────────

/// The sprite image, if one could be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum SpriteAsset {
    Loaded(Bitmap),
    Unavailable,
}

impl SpriteAsset {
    pub fn is_loaded(&self) -> bool {
        matches!(self, SpriteAsset::Loaded(_))
    }
}

/// Decodes the file at `path` scaled to `width × height`.
pub fn load_sprite(path: &Path, width: u32, height: u32) -> SpriteAsset {
    let result = std::fs::read(path)
        .map_err(|e| AssetError::io(path, e))
        .and_then(|bytes| decode_sprite(&bytes, is_svg_path(path), width, height));

    match result {
        Ok(bitmap) => {
            log::info!("loaded sprite {} as {width}x{height}", path.display());
            SpriteAsset::Loaded(bitmap)
        }
        Err(e) => {
            log::warn!("could not load sprite {}: {e}", path.display());
            SpriteAsset::Unavailable
        }
    }
}

/// Decodes raster or SVG bytes into a premultiplied bitmap of the given size.
pub fn decode_sprite(
    bytes: &[u8],
    svg_hint: bool,
    width: u32,
    height: u32,
) -> Result<Bitmap, AssetError> {
    if svg_hint || looks_like_svg(bytes) {
        render_svg(bytes, width, height)
    } else {
        decode_raster(bytes, width, height)
    }
}

fn decode_raster(bytes: &[u8], width: u32, height: u32) -> Result<Bitmap, AssetError> {
    let img = image::load_from_memory(bytes)?
        .resize_exact(width, height, image::imageops::FilterType::Triangle)
        .to_rgba8();
    Ok(Bitmap::from_straight_rgba(width, height, img.into_raw())?)
}

fn render_svg(bytes: &[u8], width: u32, height: u32) -> Result<Bitmap, AssetError> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())?;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(AssetError::Pixmap { width, height })?;

    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are premultiplied RGBA8 already.
    Ok(Bitmap::from_premultiplied_rgba(width, height, pixmap.take())?)
}

fn is_svg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg") || e.eq_ignore_ascii_case("svgz"))
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Instant;

    use super::*;

    const SQUARE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
        <rect width="10" height="10" fill="#ff0000"/>
    </svg>"##;

    struct StubTransport {
        calls: Cell<usize>,
        body: Result<Vec<u8>, u16>,
    }

    impl StubTransport {
        fn ok(body: &[u8]) -> Self {
            Self { calls: Cell::new(0), body: Ok(body.to_vec()) }
        }

        fn status(code: u16) -> Self {
            Self { calls: Cell::new(0), body: Err(code) }
        }
    }

    impl Transport for StubTransport {
        fn fetch(&self, _request: &FetchRequest<'_>) -> Result<Vec<u8>, AssetError> {
            self.calls.set(self.calls.get() + 1);
            self.body.clone().map_err(AssetError::Status)
        }
    }

    fn request() -> FetchRequest<'static> {
        request_to("https://example.invalid/robot.svg")
    }

    fn request_to(url: &str) -> FetchRequest<'_> {
        FetchRequest {
            url,
            user_agent: "kinetic-robot/test",
            timeout: Duration::from_secs(8),
        }
    }

    fn local_transport() -> HttpTransport {
        let client = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
        HttpTransport { client }
    }

    /// Answers one request on a loopback port with `reply`, returning the URL
    /// and a handle yielding the raw request head.
    fn serve_once(reply: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/robot.svg", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream.write_all(reply.as_bytes()).unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });

        (url, handle)
    }

    // ── provisioning ──────────────────────────────────────────────────────

    #[test]
    fn existing_file_skips_the_transport() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("robot.svg");
        std::fs::write(&dest, b"cached").unwrap();

        let transport = StubTransport::ok(b"fresh");
        assert!(provision(&transport, &request(), &dest));
        assert_eq!(transport.calls.get(), 0);
        assert_eq!(std::fs::read(&dest).unwrap(), b"cached");
    }

    #[test]
    fn missing_file_is_fetched_once_and_written() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("robot.svg");

        let transport = StubTransport::ok(b"<svg/>");
        assert!(provision(&transport, &request(), &dest));
        assert_eq!(transport.calls.get(), 1);
        assert_eq!(std::fs::read(&dest).unwrap(), b"<svg/>");

        assert!(provision(&transport, &request(), &dest));
        assert_eq!(transport.calls.get(), 1);
    }

    #[test]
    fn http_error_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("robot.svg");

        let transport = StubTransport::status(403);
        assert!(!provision(&transport, &request(), &dest));
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn empty_body_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("robot.svg");

        assert!(!provision(&StubTransport::ok(b""), &request(), &dest));
        assert!(!dest.exists());
    }

    // ── http transport ────────────────────────────────────────────────────

    #[test]
    fn http_download_sends_user_agent_and_saves_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 6\r\nConnection: close\r\n\r\n<svg/>",
        );
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("robot.svg");

        assert!(provision(&local_transport(), &request_to(&url), &dest));
        assert_eq!(std::fs::read(&dest).unwrap(), b"<svg/>");

        let head = server.join().unwrap().to_ascii_lowercase();
        assert!(head.starts_with("get /robot.svg "), "{head}");
        assert!(head.contains("user-agent: kinetic-robot/test\r\n"), "{head}");
    }

    #[test]
    fn http_forbidden_maps_to_status_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );

        let result = local_transport().fetch(&request_to(&url));
        assert!(matches!(result, Err(AssetError::Status(403))), "{result:?}");
        server.join().unwrap();
    }

    #[test]
    fn http_forbidden_leaves_no_file() {
        let (url, server) = serve_once(
            "HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("robot.svg");

        assert!(!provision(&local_transport(), &request_to(&url), &dest));
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        server.join().unwrap();
    }

    #[test]
    fn http_empty_body_leaves_no_file() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("robot.svg");

        assert!(!provision(&local_transport(), &request_to(&url), &dest));
        assert!(!dest.exists());
        server.join().unwrap();
    }

    #[test]
    fn silent_server_times_out_within_bound() {
        // Connections queue in the backlog but are never answered.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/robot.svg", listener.local_addr().unwrap());
        let request = FetchRequest { timeout: Duration::from_millis(200), ..request_to(&url) };

        let started = Instant::now();
        let result = local_transport().fetch(&request);
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(AssetError::Request(_))), "{result:?}");
        assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
        drop(listener);
    }

    // ── decoding ──────────────────────────────────────────────────────────

    #[test]
    fn svg_is_rendered_at_requested_size() {
        let bitmap = decode_sprite(SQUARE_SVG.as_bytes(), true, 64, 64).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (64, 64));
        let center = (32 * 64 + 32) * 4;
        assert_eq!(&bitmap.pixels()[center..center + 4], &[255, 0, 0, 255]);
    }

    #[test]
    fn svg_is_detected_without_hint() {
        assert!(decode_sprite(SQUARE_SVG.as_bytes(), false, 8, 8).is_ok());
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(decode_sprite(b"definitely not an image", false, 8, 8).is_err());
    }

    #[test]
    fn png_is_scaled_and_premultiplied() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 100, 0, 128]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let bitmap = decode_sprite(&png, false, 8, 8).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (8, 8));
        let expected = [100u8, 50, 0, 128];
        for (got, want) in bitmap.pixels()[..4].iter().zip(expected) {
            assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
        }
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let asset = load_sprite(&dir.path().join("absent.svg"), 64, 64);
        assert_eq!(asset, SpriteAsset::Unavailable);
    }

    #[test]
    fn cached_svg_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("robot.svg");
        std::fs::write(&path, SQUARE_SVG).unwrap();
        assert!(load_sprite(&path, 64, 64).is_loaded());
    }
}
