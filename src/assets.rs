//! # Asset Loading
//!
//! Resolves raster and vector asset references to bytes. A locator may be a
//! filesystem path, a `data:` URI, or a raw base64 payload; the loader tries
//! them in that order of recognizability. Loaded bytes are cached by locator
//! so an asset repeated on every page is fetched and decoded once.
//!
//! Asset failures are not fatal to a render: callers log a warning and skip
//! the node.

use base64::Engine as _;
use image::GenericImageView;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode asset data: {0}")]
    Decode(String),
}

/// Where asset bytes come from. The layout engine only sees this trait, so
/// tests can substitute an in-memory source.
pub trait AssetSource {
    fn load(&mut self, locator: &str) -> Result<Arc<Vec<u8>>, AssetError>;
}

/// Pixel dimensions of a raster asset, used to derive intrinsic point sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterInfo {
    pub width: u32,
    pub height: u32,
}

/// Decode just enough of a raster payload to learn its dimensions. Returns
/// `None` when the bytes are not a decodable image.
pub fn probe_raster(bytes: &[u8]) -> Option<RasterInfo> {
    let img = image::load_from_memory(bytes).ok()?;
    let (width, height) = img.dimensions();
    Some(RasterInfo { width, height })
}

/// Filesystem-backed asset source with data-URI and base64 fallbacks.
#[derive(Default)]
pub struct FsAssetSource {
    base_dir: Option<PathBuf>,
    cache: HashMap<String, Arc<Vec<u8>>>,
}

impl FsAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against this directory instead of the
    /// process working directory.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
            cache: HashMap::new(),
        }
    }

    fn resolve_path(&self, locator: &str) -> PathBuf {
        let p = Path::new(locator);
        match (&self.base_dir, p.is_relative()) {
            (Some(base), true) => base.join(p),
            _ => p.to_path_buf(),
        }
    }

    fn fetch(&self, locator: &str) -> Result<Vec<u8>, AssetError> {
        if let Some(rest) = locator.strip_prefix("data:") {
            let payload = rest
                .split_once(',')
                .map(|(_, data)| data)
                .ok_or_else(|| AssetError::Decode("data URI has no payload".to_string()))?;
            return base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| AssetError::Decode(e.to_string()));
        }

        let path = self.resolve_path(locator);
        if path.exists() {
            return Ok(std::fs::read(path)?);
        }

        // Not a data URI, not a file: last resort, treat as raw base64.
        base64::engine::general_purpose::STANDARD
            .decode(locator.trim())
            .map_err(|_| {
                AssetError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("asset not found: {locator}"),
                ))
            })
    }
}

impl AssetSource for FsAssetSource {
    fn load(&mut self, locator: &str) -> Result<Arc<Vec<u8>>, AssetError> {
        if let Some(bytes) = self.cache.get(locator) {
            return Ok(Arc::clone(bytes));
        }
        let bytes = Arc::new(self.fetch(locator)?);
        self.cache.insert(locator.to_string(), Arc::clone(&bytes));
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageOutputFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_probe_raster_dimensions() {
        let png = tiny_png(4, 7);
        let info = probe_raster(&png).unwrap();
        assert_eq!(info, RasterInfo { width: 4, height: 7 });
    }

    #[test]
    fn test_probe_rejects_garbage() {
        assert!(probe_raster(b"not an image").is_none());
    }

    #[test]
    fn test_load_data_uri() {
        let png = tiny_png(2, 2);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
        let locator = format!("data:image/png;base64,{encoded}");
        let mut src = FsAssetSource::new();
        let bytes = src.load(&locator).unwrap();
        assert_eq!(*bytes, png);
    }

    #[test]
    fn test_load_raw_base64() {
        let png = tiny_png(2, 2);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
        let mut src = FsAssetSource::new();
        let bytes = src.load(&encoded).unwrap();
        assert_eq!(*bytes, png);
    }

    #[test]
    fn test_load_file_and_cache() {
        let dir = std::env::temp_dir().join("quire-asset-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dot.png");
        std::fs::write(&path, tiny_png(1, 1)).unwrap();

        let mut src = FsAssetSource::with_base_dir(&dir);
        let first = src.load("dot.png").unwrap();
        let second = src.load("dot.png").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_asset_is_io_error() {
        let mut src = FsAssetSource::new();
        let err = src.load("no/such/file.png!").unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
    }
}
