//! Background texture decoding.
//!
//! One worker thread receives load requests over a channel, decodes outside
//! the frame thread, and inserts through the cache's locked path. The frame
//! thread drains finished loads with [`TextureLoader::poll`].

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};

use super::{AssetError, AssetId, TextureCache};

/// Handle returned by a load request; matches the eventual [`LoadOutcome`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LoadTicket(u64);

#[derive(Debug)]
enum LoadSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug)]
struct LoadRequest {
    ticket: LoadTicket,
    source: LoadSource,
}

/// Result of one background load.
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub result: Result<AssetId, AssetError>,
}

pub struct TextureLoader {
    requests: Option<Sender<LoadRequest>>,
    outcomes: Receiver<LoadOutcome>,
    next_ticket: u64,
    in_flight: usize,
    thread_handle: Option<JoinHandle<()>>,
}

impl TextureLoader {
    /// Spawns the worker thread. It exits when the loader is dropped.
    pub fn spawn(cache: Arc<TextureCache>) -> Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<LoadRequest>();
        let (out_tx, out_rx) = mpsc::channel::<LoadOutcome>();

        let thread_handle = thread::Builder::new()
            .name("kiln-texture-loader".to_string())
            .spawn(move || {
                log::debug!("texture loader: started");
                for LoadRequest { ticket, source } in req_rx {
                    let result = match source {
                        LoadSource::Path(path) => cache.load_path(&path),
                        LoadSource::Bytes(bytes) => cache.load_bytes(&bytes),
                    };
                    if let Err(e) = &result {
                        log::warn!("texture loader: load {ticket:?} failed: {e}");
                    }
                    if out_tx.send(LoadOutcome { ticket, result }).is_err() {
                        break;
                    }
                }
                log::debug!("texture loader: exiting");
            })
            .context("failed to spawn texture loader thread")?;

        Ok(Self {
            requests: Some(req_tx),
            outcomes: out_rx,
            next_ticket: 0,
            in_flight: 0,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn load_path(&mut self, path: impl Into<PathBuf>) -> Result<LoadTicket, AssetError> {
        self.send(LoadSource::Path(path.into()))
    }

    pub fn load_bytes(&mut self, bytes: Vec<u8>) -> Result<LoadTicket, AssetError> {
        self.send(LoadSource::Bytes(bytes))
    }

    fn send(&mut self, source: LoadSource) -> Result<LoadTicket, AssetError> {
        let ticket = LoadTicket(self.next_ticket);
        let tx = self.requests.as_ref().ok_or(AssetError::LoaderClosed)?;
        tx.send(LoadRequest { ticket, source })
            .map_err(|_| AssetError::LoaderClosed)?;
        self.next_ticket += 1;
        self.in_flight += 1;
        Ok(ticket)
    }

    /// Drains finished loads without blocking.
    pub fn poll(&mut self) -> Vec<LoadOutcome> {
        let done: Vec<LoadOutcome> = self.outcomes.try_iter().collect();
        self.in_flight -= done.len();
        done
    }

    /// Blocks until the next load completes. `None` when nothing is in flight.
    pub fn wait_one(&mut self) -> Option<LoadOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let outcome = self.outcomes.recv().ok()?;
        self.in_flight -= 1;
        Some(outcome)
    }

    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::error!("texture loader thread panicked: {e:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn background_load_lands_in_cache() {
        let cache = Arc::new(TextureCache::new(1 << 20));
        let mut loader = TextureLoader::spawn(cache.clone()).unwrap();

        let ticket = loader.load_bytes(png(4, 4)).unwrap();
        assert_eq!(loader.in_flight(), 1);

        let outcome = loader.wait_one().unwrap();
        assert_eq!(outcome.ticket, ticket);
        let id = outcome.result.unwrap();
        assert!(cache.contains(id));
        assert_eq!(cache.memory_usage(), 64);
        assert_eq!(loader.in_flight(), 0);
        assert!(loader.wait_one().is_none());
    }

    #[test]
    fn failures_are_reported_per_ticket() {
        let cache = Arc::new(TextureCache::new(1 << 20));
        let mut loader = TextureLoader::spawn(cache.clone()).unwrap();

        let bad = loader.load_bytes(b"nope".to_vec()).unwrap();
        let good = loader.load_bytes(png(1, 1)).unwrap();

        let first = loader.wait_one().unwrap();
        let second = loader.wait_one().unwrap();
        assert_eq!(first.ticket, bad);
        assert!(matches!(first.result, Err(AssetError::Decode(_))));
        assert_eq!(second.ticket, good);
        assert!(second.result.is_ok());
        assert_eq!(cache.len(), 1);
    }
}
