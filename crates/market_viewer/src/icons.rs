//! Background icon fetching and decoding.
//!
//! Every request runs on its own thread and reports back through a channel
//! that the render thread drains once per frame.

use image::{imageops::FilterType, RgbaImage};
use market_scene::{AssetLoadError, IconCompletion, IconLoader, IconRequest};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

/// Longest edge of a decoded icon, in pixels.
pub const MAX_ICON_EDGE: u32 = 128;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Where an icon reference points.
#[derive(Debug, PartialEq, Eq)]
pub enum IconSource {
    Http(String),
    File(PathBuf),
}

impl IconSource {
    /// `http(s)://` URLs, `file://` URLs and bare paths are supported; any
    /// other scheme is rejected.
    pub fn parse(uri: &str) -> Result<Self, AssetLoadError> {
        let uri = uri.trim();
        if uri.starts_with("http://") || uri.starts_with("https://") {
            Ok(IconSource::Http(uri.to_string()))
        } else if let Some(path) = uri.strip_prefix("file://") {
            Ok(IconSource::File(PathBuf::from(path)))
        } else if uri.contains("://") || uri.starts_with("data:") {
            Err(AssetLoadError::UnsupportedScheme(uri.to_string()))
        } else {
            Ok(IconSource::File(PathBuf::from(uri)))
        }
    }
}

pub struct ThreadedIconLoader {
    client: reqwest::blocking::Client,
    tx: mpsc::Sender<IconCompletion>,
    rx: mpsc::Receiver<IconCompletion>,
    in_flight: usize,
}

impl ThreadedIconLoader {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            client,
            tx,
            rx,
            in_flight: 0,
        })
    }
}

impl IconLoader for ThreadedIconLoader {
    fn request(&mut self, request: IconRequest) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;

        std::thread::spawn(move || {
            let result = load_icon(&client, &request.uri);
            if let Err(e) = &result {
                log::debug!("Icon '{}' failed: {}", request.uri, e);
            }
            // The loader may be gone by now; nothing to report to.
            let _ = tx.send(IconCompletion::for_request(&request, result));
        });
    }

    fn poll(&mut self) -> Vec<IconCompletion> {
        let done: Vec<IconCompletion> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }

    fn pending(&self) -> usize {
        self.in_flight
    }
}

/// Fetches, decodes and downscales one icon.
pub fn load_icon(
    client: &reqwest::blocking::Client,
    uri: &str,
) -> Result<RgbaImage, AssetLoadError> {
    let bytes = match IconSource::parse(uri)? {
        IconSource::Http(url) => fetch_http(client, &url)?,
        IconSource::File(path) => std::fs::read(path)?,
    };
    decode_icon(&bytes)
}

fn fetch_http(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, AssetLoadError> {
    let resp = client
        .get(url)
        .send()
        .map_err(|e| AssetLoadError::Http(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AssetLoadError::Http(format!("{url}: HTTP {status}")));
    }

    let bytes = resp
        .bytes()
        .map_err(|e| AssetLoadError::Http(e.to_string()))?;
    Ok(bytes.to_vec())
}

pub fn decode_icon(bytes: &[u8]) -> Result<RgbaImage, AssetLoadError> {
    let img = image::load_from_memory(bytes).map_err(|e| AssetLoadError::Decode(e.to_string()))?;
    Ok(downscale(img.to_rgba8(), MAX_ICON_EDGE))
}

/// Shrinks `rgba` so its longer edge is at most `max_edge`, keeping the
/// aspect ratio. Smaller images pass through untouched.
fn downscale(rgba: RgbaImage, max_edge: u32) -> RgbaImage {
    let (w, h) = rgba.dimensions();
    let longest = w.max(h);
    if longest <= max_edge {
        return rgba;
    }

    let ratio = max_edge as f32 / longest as f32;
    let new_w = ((w as f32 * ratio).round() as u32).max(1);
    let new_h = ((h as f32 * ratio).round() as u32).max(1);
    image::imageops::resize(&rgba, new_w, new_h, FilterType::Triangle)
}
