use crate::assets::AssetId;
use crate::coords::{Rect, Vec2};
use crate::paint::Color;

use super::PaintOrder;

/// Placement of a drawable on the surface.
///
/// `origin` is the pivot in local (unscaled) pixels: the point that lands on
/// `position` and around which `rotation` (radians, clockwise on screen) and
/// `scale` apply.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    pub origin: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            origin: Vec2::ZERO,
        }
    }
}

impl Transform {
    #[inline]
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Maps a local point to surface pixels.
    #[inline]
    pub fn apply(&self, local: Vec2) -> Vec2 {
        let (sin, cos) = self.rotation.sin_cos();
        (local - self.origin).hadamard(self.scale).rotated(sin, cos) + self.position
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.scale.x == 0.0 || self.scale.y == 0.0 || !self.scale.is_finite()
    }
}

/// Textured quad.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub texture: AssetId,
    /// Quad size in local pixels. `None` uses the texture's pixel size scaled by the UV rect.
    pub size: Option<Vec2>,
    /// Normalized sub-rect of the texture (atlas region).
    pub uv: Rect,
}

impl Sprite {
    #[inline]
    pub fn new(texture: AssetId) -> Self {
        Self {
            texture,
            size: None,
            uv: Rect::UNIT,
        }
    }
}

/// Untextured filled primitive. All coordinates are local pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle with its top-left at the local origin.
    Rect { size: Vec2 },
    /// Circle centered on the local origin, approximated by a triangle fan.
    Circle { radius: f32, segments: u16 },
    Triangle([Vec2; 3]),
    /// Segment rendered as a quad of the given thickness.
    Line { from: Vec2, to: Vec2, thickness: f32 },
    /// Convex polygon, triangulated as a fan from the first point.
    Polygon(Vec<Vec2>),
    /// Open path of thick segments with mitered joins.
    Polyline { points: Vec<Vec2>, thickness: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawableKind {
    Sprite(Sprite),
    Shape(Shape),
}

/// One frame's renderable unit before batching.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub kind: DrawableKind,
    pub transform: Transform,
    /// Fill color for shapes, tint for sprites.
    pub color: Color,
    pub order: PaintOrder,
}

impl Drawable {
    pub fn sprite(sprite: Sprite, position: Vec2) -> Self {
        Self {
            kind: DrawableKind::Sprite(sprite),
            transform: Transform::at(position),
            color: Color::WHITE,
            order: PaintOrder::default(),
        }
    }

    pub fn shape(shape: Shape, position: Vec2, color: Color) -> Self {
        Self {
            kind: DrawableKind::Shape(shape),
            transform: Transform::at(position),
            color,
            order: PaintOrder::default(),
        }
    }

    #[inline]
    pub fn with_order(mut self, order: impl Into<PaintOrder>) -> Self {
        self.order = order.into();
        self
    }

    #[inline]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.transform.scale = scale;
        self
    }

    #[inline]
    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.transform.rotation = radians;
        self
    }

    #[inline]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.transform.origin = origin;
        self
    }

    /// Texture identity used for batching; `None` for shapes.
    #[inline]
    pub fn texture(&self) -> Option<AssetId> {
        match &self.kind {
            DrawableKind::Sprite(s) => Some(s.texture),
            DrawableKind::Shape(_) => None,
        }
    }
}
