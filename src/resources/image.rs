use rustc_hash::FxHashMap;

use crate::errors::{GyreError, Result};

/// Metadata of a successfully loaded image.
///
/// The projection core only needs intrinsic dimensions (for the aspect
/// ratio) and the identifier it was requested under; pixel data stays with
/// the render layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl LoadedImage {
    /// Zero-sized images are rejected at the boundary so the aspect ratio
    /// can never poison the projection math.
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Result<Self> {
        let url = url.into();
        if width == 0 || height == 0 {
            return Err(GyreError::ImageLoad {
                url,
                reason: format!("degenerate dimensions {width}x{height}"),
            });
        }
        Ok(Self { url, width, height })
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Image reader trait.
///
/// The bootstrap layer implements this over whatever transport it has
/// (filesystem, HTTP, browser cache). The projector only awaits the
/// result; all geometry mutation happens after the await point.
pub trait ImageSource {
    /// Resolves an image identifier to its loaded metadata.
    fn load(&self, url: &str) -> impl std::future::Future<Output = Result<LoadedImage>> + Send;
}

/// In-memory image source backed by a dimension table.
///
/// Used by tests and demos; also handy when the host has already decoded
/// its images and only needs the projection core.
#[derive(Debug, Default, Clone)]
pub struct MemoryImageSource {
    sizes: FxHashMap<String, (u32, u32)>,
}

impl MemoryImageSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, width: u32, height: u32) {
        self.sizes.insert(url.into(), (width, height));
    }
}

impl ImageSource for MemoryImageSource {
    async fn load(&self, url: &str) -> Result<LoadedImage> {
        match self.sizes.get(url) {
            Some(&(width, height)) => LoadedImage::new(url, width, height),
            None => Err(GyreError::ImageLoad {
                url: url.to_string(),
                reason: "not present in source".to_string(),
            }),
        }
    }
}
