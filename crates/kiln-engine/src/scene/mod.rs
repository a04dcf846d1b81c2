//! Per-frame drawable stream.
//!
//! Responsibilities:
//! - describe sprites and shapes independently of any backend
//! - provide deterministic ordering (paint order + submission order)

mod drawable;
mod key;
mod list;
mod order;

pub use drawable::{Drawable, DrawableKind, Shape, Sprite, Transform};
pub use key::SortKey;
pub use list::{DrawItem, DrawList};
pub use order::PaintOrder;
