//! Asynchronous icon loading contract.
//!
//! Requests are fire-and-forget. Completions come back through
//! [`IconLoader::poll`] on the scene's thread, in any order, possibly after
//! the requesting generation has been disposed; the lifecycle discards
//! those by token.

use crate::error::AssetLoadError;
use crate::generation::GenerationToken;
use image::RgbaImage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRequest {
    pub token: GenerationToken,
    /// Index of the sphere the icon belongs to.
    pub sphere: usize,
    pub uri: String,
}

#[derive(Debug)]
pub struct IconCompletion {
    pub token: GenerationToken,
    pub sphere: usize,
    pub result: Result<RgbaImage, AssetLoadError>,
}

impl IconCompletion {
    pub fn for_request(request: &IconRequest, result: Result<RgbaImage, AssetLoadError>) -> Self {
        Self {
            token: request.token,
            sphere: request.sphere,
            result,
        }
    }
}

pub trait IconLoader {
    /// Starts loading an icon. Never blocks on the fetch itself.
    fn request(&mut self, request: IconRequest);

    /// Drains every completion that has arrived since the last poll.
    fn poll(&mut self) -> Vec<IconCompletion>;

    /// Number of requests still in flight.
    fn pending(&self) -> usize;
}
