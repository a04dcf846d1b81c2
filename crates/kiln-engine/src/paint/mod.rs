//! Paint model shared between the scene and the backends.
//!
//! Colors are linear and premultiplied; sprite tints multiply sampled texels.

mod color;

pub use color::Color;
