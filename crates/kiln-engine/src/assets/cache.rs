use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{AssetError, AssetId, TextureAsset};

/// Read access to resident textures by id.
///
/// The batch assembler resolves drawables through this seam so it can be fed
/// by the cache or by a fixed set in tests.
pub trait TextureLookup {
    fn texture(&self, id: AssetId) -> Option<Arc<TextureAsset>>;
}

impl TextureLookup for HashMap<AssetId, Arc<TextureAsset>> {
    fn texture(&self, id: AssetId) -> Option<Arc<TextureAsset>> {
        self.get(&id).cloned()
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    assets: HashMap<AssetId, Arc<TextureAsset>>,
    by_path: HashMap<PathBuf, AssetId>,
    used: usize,
}

impl CacheInner {
    fn remove(&mut self, id: AssetId) -> bool {
        let Some(asset) = self.assets.remove(&id) else {
            return false;
        };
        self.used -= asset.byte_size();
        self.by_path.retain(|_, v| *v != id);
        log::debug!("texture cache: unloaded {id}, usage {}", self.used);
        true
    }
}

/// Bounded-memory store of decoded textures.
///
/// Invariants:
/// - resident bytes never exceed `limit`; an over-budget insert fails and nothing is evicted
/// - `memory_usage()` equals the sum of resident `byte_size()`s
///
/// All methods take `&self`, so the cache can be shared with a [`TextureLoader`].
///
/// [`TextureLoader`]: super::TextureLoader
#[derive(Debug)]
pub struct TextureCache {
    inner: Mutex<CacheInner>,
    limit: usize,
}

impl TextureCache {
    pub fn new(memory_limit: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            limit: memory_limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads and decodes an image file.
    ///
    /// The same file (by canonical path) is decoded once; later calls return
    /// the resident id without touching the budget.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<AssetId, AssetError> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(&id) = self.lock().by_path.get(&canonical) {
            log::debug!("texture cache: {} already resident as {id}", canonical.display());
            return Ok(id);
        }

        let bytes = std::fs::read(&canonical).map_err(|source| AssetError::Io {
            path: canonical.clone(),
            source,
        })?;
        let (width, height, pixels) = decode_rgba(&bytes)?;

        self.insert(width, height, pixels, Some(canonical))
    }

    /// Loads several files in order.
    ///
    /// Stops at the first failure; files loaded before it stay resident.
    pub fn load_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<AssetId>, AssetError> {
        let mut ids = Vec::with_capacity(paths.len());
        for path in paths {
            ids.push(self.load_path(path)?);
        }
        log::debug!("texture cache: bulk-loaded {} textures", ids.len());
        Ok(ids)
    }

    /// Decodes an in-memory encoded image (PNG, JPEG, BMP, GIF).
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<AssetId, AssetError> {
        let (width, height, pixels) = decode_rgba(bytes)?;
        self.insert(width, height, pixels, None)
    }

    /// Inserts raw RGBA8 pixels (straight alpha, tightly packed).
    pub fn insert_rgba(
        &self,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<AssetId, AssetError> {
        self.insert(width, height, pixels, None)
    }

    fn insert(
        &self,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        path: Option<PathBuf>,
    ) -> Result<AssetId, AssetError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if width == 0 || height == 0 || expected != Some(pixels.len()) {
            return Err(AssetError::InvalidDimensions {
                width,
                height,
                len: pixels.len(),
            });
        }

        let size = pixels.len();
        let mut inner = self.lock();

        // Another caller may have finished decoding the same file first.
        if let Some(id) = path.as_ref().and_then(|p| inner.by_path.get(p)) {
            return Ok(*id);
        }

        let requested_total = inner.used.saturating_add(size);
        if requested_total > self.limit {
            log::warn!(
                "texture cache: rejecting {width}x{height} ({size} bytes), {requested_total} > {}",
                self.limit
            );
            return Err(AssetError::MemoryExceeded {
                requested_total,
                limit: self.limit,
            });
        }

        let id = AssetId::next();
        inner
            .assets
            .insert(id, Arc::new(TextureAsset::new(id, width, height, pixels)));
        if let Some(path) = path {
            inner.by_path.insert(path, id);
        }
        inner.used = requested_total;

        log::debug!(
            "texture cache: inserted {id} {width}x{height}, usage {}/{}",
            inner.used,
            self.limit
        );
        Ok(id)
    }

    /// Removes a texture from the cache. Batches still holding it keep it
    /// alive until they are dropped.
    pub fn unload(&self, id: AssetId) -> bool {
        self.lock().remove(id)
    }

    /// Unloads every listed id under one lock. Returns how many were resident.
    pub fn unload_many(&self, ids: &[AssetId]) -> usize {
        let mut inner = self.lock();
        let removed = ids.iter().filter(|&&id| inner.remove(id)).count();
        log::debug!("texture cache: bulk-unloaded {removed}/{} textures", ids.len());
        removed
    }

    pub fn unload_all(&self) {
        let mut inner = self.lock();
        let n = inner.assets.len();
        inner.assets.clear();
        inner.by_path.clear();
        inner.used = 0;
        log::debug!("texture cache: unloaded {n} textures");
    }

    #[inline]
    pub fn get(&self, id: AssetId) -> Option<Arc<TextureAsset>> {
        self.lock().assets.get(&id).cloned()
    }

    #[inline]
    pub fn contains(&self, id: AssetId) -> bool {
        self.lock().assets.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lock().assets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn memory_usage(&self) -> usize {
        self.lock().used
    }

    #[inline]
    pub fn memory_limit(&self) -> usize {
        self.limit
    }

    pub fn memory_usage_percent(&self) -> f32 {
        if self.limit == 0 {
            return 0.0;
        }
        self.memory_usage() as f32 / self.limit as f32 * 100.0
    }
}

impl TextureLookup for TextureCache {
    fn texture(&self, id: AssetId) -> Option<Arc<TextureAsset>> {
        self.get(id)
    }
}

fn decode_rgba(bytes: &[u8]) -> Result<(u32, u32, Vec<u8>), AssetError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok((w, h, rgba.into_raw()))
}
