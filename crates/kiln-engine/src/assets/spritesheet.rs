//! Grid spritesheets.
//!
//! A sheet is one texture cut into equally sized frames. [`SpritesheetGrid`]
//! turns the grid layout into normalized UV rects for [`Sprite::uv`], so every
//! frame of a sheet batches with the others.
//!
//! [`Sprite::uv`]: crate::scene::Sprite::uv

use crate::coords::Rect;

use super::{AssetError, TextureAsset};

/// Order in which frames are numbered.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FrameOrder {
    /// Rows top to bottom, each left to right.
    #[default]
    RowMajor,
    /// Rows top to bottom, each right to left.
    RowMajorReversed,
    /// Rows bottom to top, each left to right.
    BottomUp,
    /// Rows top to bottom, alternating direction starting left to right.
    Zigzag,
    /// Columns left to right, each top to bottom.
    ColumnMajor,
}

/// Layout of a grid sheet in pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SpritesheetGrid {
    pub columns: u32,
    pub rows: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Gap between neighboring frames.
    pub spacing: u32,
    /// Border around the whole grid.
    pub margin: u32,
    pub order: FrameOrder,
}

impl SpritesheetGrid {
    /// Tightly packed grid with no spacing or margin.
    pub fn new(columns: u32, rows: u32, frame_width: u32, frame_height: u32) -> Self {
        Self {
            columns,
            rows,
            frame_width,
            frame_height,
            spacing: 0,
            margin: 0,
            order: FrameOrder::RowMajor,
        }
    }

    #[inline]
    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    #[inline]
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    #[inline]
    pub fn with_order(mut self, order: FrameOrder) -> Self {
        self.order = order;
        self
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Pixel extent the grid covers, margins included.
    pub fn required_size(&self) -> Option<(u32, u32)> {
        let extent = |cells: u32, cell: u32| -> Option<u32> {
            let gaps = cells.saturating_sub(1).checked_mul(self.spacing)?;
            cells
                .checked_mul(cell)?
                .checked_add(gaps)?
                .checked_add(self.margin.checked_mul(2)?)
        };
        Some((
            extent(self.columns, self.frame_width)?,
            extent(self.rows, self.frame_height)?,
        ))
    }

    /// (column, row) of every frame in numbering order.
    pub fn cells(&self) -> Vec<(u32, u32)> {
        let (cols, rows) = (self.columns, self.rows);
        let mut cells = Vec::with_capacity(self.frame_count());
        match self.order {
            FrameOrder::RowMajor => {
                for row in 0..rows {
                    cells.extend((0..cols).map(|col| (col, row)));
                }
            }
            FrameOrder::RowMajorReversed => {
                for row in 0..rows {
                    cells.extend((0..cols).rev().map(|col| (col, row)));
                }
            }
            FrameOrder::BottomUp => {
                for row in (0..rows).rev() {
                    cells.extend((0..cols).map(|col| (col, row)));
                }
            }
            FrameOrder::Zigzag => {
                for row in 0..rows {
                    if row % 2 == 0 {
                        cells.extend((0..cols).map(|col| (col, row)));
                    } else {
                        cells.extend((0..cols).rev().map(|col| (col, row)));
                    }
                }
            }
            FrameOrder::ColumnMajor => {
                for col in 0..cols {
                    cells.extend((0..rows).map(|row| (col, row)));
                }
            }
        }
        cells
    }

    /// Normalized UV rect of every frame, in numbering order, for a texture of
    /// `width` x `height` pixels.
    pub fn uv_rects(&self, width: u32, height: u32) -> Result<Vec<Rect>, AssetError> {
        let invalid = AssetError::InvalidSpritesheet;

        if self.frame_count() == 0 || self.frame_width == 0 || self.frame_height == 0 {
            return Err(invalid(format!(
                "{}x{} grid of {}x{} frames is empty",
                self.columns, self.rows, self.frame_width, self.frame_height
            )));
        }
        let (need_w, need_h) = self
            .required_size()
            .ok_or_else(|| invalid("grid extent overflows".to_string()))?;
        if need_w > width || need_h > height {
            return Err(invalid(format!(
                "grid needs {need_w}x{need_h} px but the texture is {width}x{height}"
            )));
        }

        let (w, h) = (width as f32, height as f32);
        let stride_x = self.frame_width + self.spacing;
        let stride_y = self.frame_height + self.spacing;
        Ok(self
            .cells()
            .into_iter()
            .map(|(col, row)| {
                let x = self.margin + col * stride_x;
                let y = self.margin + row * stride_y;
                Rect::new(
                    x as f32 / w,
                    y as f32 / h,
                    self.frame_width as f32 / w,
                    self.frame_height as f32 / h,
                )
            })
            .collect())
    }

    /// [`uv_rects`](Self::uv_rects) for a resident texture.
    pub fn frames_of(&self, texture: &TextureAsset) -> Result<Vec<Rect>, AssetError> {
        self.uv_rects(texture.width(), texture.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── ordering ──

    #[test]
    fn orders_number_cells_as_documented() {
        let grid = SpritesheetGrid::new(3, 2, 8, 8);
        let with = |order| grid.with_order(order).cells();

        assert_eq!(with(FrameOrder::RowMajor), vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
        assert_eq!(
            with(FrameOrder::RowMajorReversed),
            vec![(2, 0), (1, 0), (0, 0), (2, 1), (1, 1), (0, 1)]
        );
        assert_eq!(with(FrameOrder::BottomUp), vec![(0, 1), (1, 1), (2, 1), (0, 0), (1, 0), (2, 0)]);
        assert_eq!(with(FrameOrder::Zigzag), vec![(0, 0), (1, 0), (2, 0), (2, 1), (1, 1), (0, 1)]);
        assert_eq!(
            with(FrameOrder::ColumnMajor),
            vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]
        );
    }

    // ── uv rects ──

    #[test]
    fn packed_grid_tiles_the_texture() {
        let rects = SpritesheetGrid::new(2, 2, 16, 16).uv_rects(32, 32).unwrap();
        assert_eq!(rects[0], Rect::new(0.0, 0.0, 0.5, 0.5));
        assert_eq!(rects[1], Rect::new(0.5, 0.0, 0.5, 0.5));
        assert_eq!(rects[3], Rect::new(0.5, 0.5, 0.5, 0.5));
    }

    #[test]
    fn spacing_and_margin_offset_frames() {
        // 2 + 10 + 4 + 10 + 2 = 28 px wide.
        let grid = SpritesheetGrid::new(2, 1, 10, 10).with_spacing(4).with_margin(2);
        assert_eq!(grid.required_size(), Some((28, 14)));

        let rects = grid.uv_rects(28, 14).unwrap();
        assert_eq!(rects[0].origin.x, 2.0 / 28.0);
        assert_eq!(rects[1].origin.x, 16.0 / 28.0);
        assert_eq!(rects[1].origin.y, 2.0 / 14.0);
        assert_eq!(rects[1].size.x, 10.0 / 28.0);
    }

    #[test]
    fn grid_larger_than_texture_is_rejected() {
        let err = SpritesheetGrid::new(4, 4, 16, 16).uv_rects(48, 64).unwrap_err();
        assert!(matches!(err, AssetError::InvalidSpritesheet(ref m) if m.contains("64x64")));
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert!(SpritesheetGrid::new(0, 3, 8, 8).uv_rects(64, 64).is_err());
        assert!(SpritesheetGrid::new(2, 2, 0, 8).uv_rects(64, 64).is_err());
    }

    #[test]
    fn frames_of_uses_texture_size() {
        let tex = TextureAsset::new(crate::assets::AssetId::next(), 8, 4, vec![0; 8 * 4 * 4]);
        let rects = SpritesheetGrid::new(2, 1, 4, 4).frames_of(&tex).unwrap();
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 0.5, 1.0), Rect::new(0.5, 0.0, 0.5, 1.0)]);
    }
}
