//! Coordinate and geometry types shared by the scene and the renderers.
//!
//! Canonical CPU space:
//! - surface pixels
//! - origin top-left
//! - +X right, +Y down
//!
//! Backends convert to NDC in shaders using a viewport uniform.

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
