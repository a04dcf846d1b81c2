//! Drawable → vertex conversion.
//!
//! Output is in surface pixels (top-left origin, +Y down); backends map to
//! clip space. Shapes sample texel (0, 0) of a white texture, so one vertex
//! format and one pipeline serve both sprites and shapes.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Vec2};
use crate::scene::{Drawable, DrawableKind, Shape, Sprite};

/// Lower bound for circle tessellation.
pub const MIN_CIRCLE_SEGMENTS: u16 = 3;

/// Miter offsets longer than this many half-thicknesses fall back to a square join.
const MITER_LIMIT: f32 = 4.0;

/// Polyline points closer than this to their predecessor are dropped.
const POLYLINE_EPSILON: f32 = 1e-3;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    /// Premultiplied tint/fill.
    pub color: [f32; 4],
}

/// Triangle list for one drawable. Indices are local to `vertices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Splits into pieces of at most `max_vertices` vertices each, keeping
    /// triangle order. A vertex shared across a cut is repeated in every piece
    /// that uses it, so a fan restarts at its first point. Empty when
    /// `max_vertices` cannot hold a single triangle.
    pub fn split(&self, max_vertices: usize) -> Vec<Mesh> {
        if max_vertices < 3 {
            return Vec::new();
        }

        let mut pieces = Vec::new();
        let mut piece = Mesh::default();
        let mut remap: HashMap<u32, u32> = HashMap::new();

        for tri in self.indices.chunks_exact(3) {
            let fresh = tri.iter().filter(|i| !remap.contains_key(*i)).count();
            if piece.vertices.len() + fresh > max_vertices {
                pieces.push(std::mem::take(&mut piece));
                remap.clear();
            }
            for &i in tri {
                let local = *remap.entry(i).or_insert_with(|| {
                    piece.vertices.push(self.vertices[i as usize]);
                    (piece.vertices.len() - 1) as u32
                });
                piece.indices.push(local);
            }
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }

    /// Appends a thick strip from (left, right) edge pairs, one quad per step.
    fn push_strip(&mut self, edges: impl IntoIterator<Item = (Vec2, Vec2)>, color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        for (left, right) in edges {
            for pos in [left, right] {
                self.vertices.push(Vertex {
                    pos: pos.to_array(),
                    uv: [0.0, 0.0],
                    color,
                });
            }
        }
        let pairs = (self.vertices.len() as u32 - base) / 2;
        for i in 0..pairs.saturating_sub(1) {
            let (l0, r0) = (base + 2 * i, base + 2 * i + 1);
            let (l1, r1) = (l0 + 2, r0 + 2);
            self.indices.extend_from_slice(&[l0, l1, r1, r1, r0, l0]);
        }
    }

    /// Appends a convex outline as a triangle fan rooted at its first point.
    fn push_fan(&mut self, points: impl IntoIterator<Item = (Vec2, Vec2)>, color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(points.into_iter().map(|(pos, uv)| Vertex {
            pos: pos.to_array(),
            uv: uv.to_array(),
            color,
        }));
        let n = self.vertices.len() as u32 - base;
        for i in 1..n.saturating_sub(1) {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }
}

/// Builds the mesh for `drawable`.
///
/// `texture_size` is the pixel size of the sprite's texture and is only
/// consulted for sprites without an explicit size. Degenerate input yields an
/// empty mesh.
pub fn build(drawable: &Drawable, texture_size: Option<(u32, u32)>) -> Mesh {
    let mut mesh = Mesh::default();
    let t = &drawable.transform;
    if t.is_degenerate() || !t.position.is_finite() || !drawable.color.is_finite() {
        return mesh;
    }
    let color = drawable.color.to_array();

    match &drawable.kind {
        DrawableKind::Sprite(sprite) => {
            let Some(local) = sprite_rect(sprite, texture_size) else {
                return mesh;
            };
            let uv = sprite.uv.corners();
            let corners = local.corners();
            mesh.push_fan((0..4).map(|i| (t.apply(corners[i]), uv[i])), color);
        }
        DrawableKind::Shape(Shape::Polyline { points, thickness }) => {
            let Some(edges) = polyline_edges(points, *thickness) else {
                return mesh;
            };
            mesh.push_strip(edges.map(|(l, r)| (t.apply(l), t.apply(r))), color);
        }
        DrawableKind::Shape(shape) => {
            let Some(outline) = shape_outline(shape) else {
                return mesh;
            };
            mesh.push_fan(outline.into_iter().map(|p| (t.apply(p), Vec2::ZERO)), color);
        }
    }

    mesh
}

fn sprite_rect(sprite: &Sprite, texture_size: Option<(u32, u32)>) -> Option<Rect> {
    let size = match sprite.size {
        Some(size) => size,
        None => {
            let (w, h) = texture_size?;
            Vec2::new(w as f32, h as f32).hadamard(sprite.uv.size)
        }
    };
    let rect = Rect {
        origin: Vec2::ZERO,
        size,
    };
    (!rect.is_empty() && size.is_finite()).then_some(rect)
}

/// Local-space convex outline, or `None` when the shape covers no area.
fn shape_outline(shape: &Shape) -> Option<Vec<Vec2>> {
    match shape {
        Shape::Rect { size } => {
            let rect = Rect {
                origin: Vec2::ZERO,
                size: *size,
            }
            .normalized();
            (!rect.is_empty()).then(|| rect.corners().to_vec())
        }
        Shape::Circle { radius, segments } => {
            if !(*radius > 0.0) {
                return None;
            }
            let n = (*segments).max(MIN_CIRCLE_SEGMENTS);
            let step = core::f32::consts::TAU / n as f32;
            Some(
                (0..n)
                    .map(|i| {
                        let (s, c) = (step * i as f32).sin_cos();
                        Vec2::new(c * radius, s * radius)
                    })
                    .collect(),
            )
        }
        Shape::Triangle(points) => Some(points.to_vec()),
        Shape::Line {
            from,
            to,
            thickness,
        } => {
            let n = (*to - *from).perp_normalized() * (*thickness * 0.5);
            if !(*thickness > 0.0) || n == Vec2::ZERO {
                return None;
            }
            Some(vec![*from + n, *to + n, *to - n, *from - n])
        }
        Shape::Polygon(points) => (points.len() >= 3).then(|| points.clone()),
        // A strip, not an outline.
        Shape::Polyline { .. } => None,
    }
}

/// Left/right edge points of a mitered polyline, one pair per distinct point.
fn polyline_edges(points: &[Vec2], thickness: f32) -> Option<impl Iterator<Item = (Vec2, Vec2)>> {
    if !(thickness > 0.0) {
        return None;
    }

    let mut path: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if p.is_finite() && path.last().is_none_or(|&last| (p - last).length() > POLYLINE_EPSILON) {
            path.push(p);
        }
    }
    if path.len() < 2 {
        return None;
    }

    let half = thickness * 0.5;
    let normals: Vec<Vec2> = path.windows(2).map(|w| (w[1] - w[0]).perp_normalized()).collect();
    let last = normals.len() - 1;

    Some(path.into_iter().enumerate().map(move |(i, p)| {
        let offset = miter(normals[i.saturating_sub(1)], normals[i.min(last)], half);
        (p + offset, p - offset)
    }))
}

/// Offset from a joint to its left edge, given the unit normals of the
/// segments before and after it.
fn miter(prev: Vec2, next: Vec2, half: f32) -> Vec2 {
    let sum = prev + next;
    let len = sum.length();
    if len <= POLYLINE_EPSILON {
        // Path doubles back on itself.
        return next * half;
    }
    let dir = sum * (1.0 / len);
    let offset = dir * (half / dir.dot(next));
    if offset.length() > half * MITER_LIMIT {
        next * half
    } else {
        offset
    }
}
