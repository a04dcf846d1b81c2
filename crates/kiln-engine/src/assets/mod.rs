//! Texture assets.
//!
//! Decoded textures live in a budgeted [`TextureCache`] and are shared as
//! `Arc<TextureAsset>` with the batches that reference them.

mod cache;
mod error;
mod loader;
mod spritesheet;
mod texture;

pub use cache::{TextureCache, TextureLookup};
pub use error::AssetError;
pub use loader::{LoadOutcome, LoadTicket, TextureLoader};
pub use spritesheet::{FrameOrder, SpritesheetGrid};
pub use texture::{AssetId, TextureAsset};
