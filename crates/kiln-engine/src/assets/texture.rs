use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique texture identifier.
///
/// Backends key their GPU-side copies by this id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct AssetId(u64);

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

impl AssetId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Decoded RGBA8 texture, shared by the cache and by every batch that samples it.
#[derive(Debug)]
pub struct TextureAsset {
    id: AssetId,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureAsset {
    pub(crate) fn new(id: AssetId, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);
        Self {
            id,
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn id(&self) -> AssetId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tightly packed RGBA8 rows, straight alpha.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes counted against the cache budget.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}
