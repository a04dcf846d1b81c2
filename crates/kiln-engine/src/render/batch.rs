//! Draw-call reduction.
//!
//! Drawables are walked in paint order and merged into runs that share a
//! texture. A run ends when the texture changes or the vertex budget would be
//! exceeded, so batch order is paint order and nothing is reordered across
//! textures.

use std::collections::HashSet;
use std::sync::Arc;

use crate::assets::{AssetId, TextureAsset, TextureLookup};
use crate::scene::{DrawList, PaintOrder};

use super::geometry::{self, Vertex};

/// A contiguous, same-texture run of drawables submitted as one draw call.
#[derive(Debug, Clone)]
pub struct Batch {
    /// `None` for untextured shapes.
    pub texture: Option<Arc<TextureAsset>>,
    pub vertices: Vec<Vertex>,
    /// Indices into this batch's `vertices`.
    pub indices: Vec<u32>,
    pub first_order: PaintOrder,
    pub last_order: PaintOrder,
    /// Drawables with geometry in this batch. A split drawable counts in each.
    pub drawable_count: usize,
}

impl Batch {
    #[inline]
    pub fn texture_id(&self) -> Option<AssetId> {
        self.texture.as_ref().map(|t| t.id())
    }
}

#[derive(Debug)]
pub struct BatchAssembler {
    max_batch_vertices: usize,
    warned_missing: HashSet<AssetId>,
}

impl BatchAssembler {
    pub fn new(max_batch_vertices: usize) -> Self {
        Self {
            max_batch_vertices,
            warned_missing: HashSet::new(),
        }
    }

    #[inline]
    pub fn max_batch_vertices(&self) -> usize {
        self.max_batch_vertices
    }

    /// Groups the frame's drawables into ordered batches.
    ///
    /// Drawables that cannot be drawn (missing texture or degenerate geometry)
    /// are skipped; the rest keep their relative order. A mesh larger than the
    /// vertex budget is split across consecutive same-texture batches.
    pub fn assemble(&mut self, list: &mut DrawList, textures: &impl TextureLookup) -> Vec<Batch> {
        let mut batches: Vec<Batch> = Vec::new();

        for item in list.iter_in_paint_order() {
            let drawable = &item.drawable;

            let texture = match drawable.texture() {
                None => None,
                Some(id) => match textures.texture(id) {
                    Some(t) => Some(t),
                    None => {
                        if self.warned_missing.insert(id) {
                            log::warn!("texture {id} is not resident; dropping its drawables");
                        } else {
                            log::debug!("texture {id} still missing; drawable dropped");
                        }
                        continue;
                    }
                },
            };

            let mesh = geometry::build(drawable, texture.as_ref().map(|t| (t.width(), t.height())));
            if mesh.is_empty() {
                continue;
            }
            let pieces = if mesh.vertices.len() > self.max_batch_vertices {
                let pieces = mesh.split(self.max_batch_vertices);
                if pieces.is_empty() {
                    log::warn!(
                        "drawable with {} vertices cannot be split under the batch limit of {}; dropped",
                        mesh.vertices.len(),
                        self.max_batch_vertices
                    );
                    continue;
                }
                log::debug!("drawable with {} vertices split into {} pieces", mesh.vertices.len(), pieces.len());
                pieces
            } else {
                vec![mesh]
            };

            let texture_id = texture.as_ref().map(|t| t.id());
            for piece in pieces {
                let fits = batches.last().is_some_and(|b| {
                    b.texture_id() == texture_id
                        && b.vertices.len() + piece.vertices.len() <= self.max_batch_vertices
                });
                if !fits {
                    batches.push(Batch {
                        texture: texture.clone(),
                        vertices: Vec::new(),
                        indices: Vec::new(),
                        first_order: drawable.order,
                        last_order: drawable.order,
                        drawable_count: 0,
                    });
                }

                // Non-empty: pushed above when nothing fit.
                let Some(batch) = batches.last_mut() else {
                    continue;
                };
                let base = batch.vertices.len() as u32;
                batch.vertices.extend_from_slice(&piece.vertices);
                batch.indices.extend(piece.indices.iter().map(|i| base + i));
                batch.last_order = drawable.order;
                batch.drawable_count += 1;
            }
        }

        batches
    }
}
