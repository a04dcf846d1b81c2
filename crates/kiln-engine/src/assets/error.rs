use std::path::PathBuf;

use thiserror::Error;

/// Failures of the texture cache and loader.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid texture: {width}x{height} with {len} bytes of RGBA8")]
    InvalidDimensions { width: u32, height: u32, len: usize },

    /// The insert would push resident bytes past the budget. Nothing was inserted.
    #[error("texture memory exceeded: {requested_total} bytes requested, limit is {limit}")]
    MemoryExceeded { requested_total: usize, limit: usize },

    #[error("invalid spritesheet: {0}")]
    InvalidSpritesheet(String),

    #[error("texture loader thread is no longer running")]
    LoaderClosed,
}
