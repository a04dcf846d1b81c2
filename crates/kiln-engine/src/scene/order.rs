use core::cmp::Ordering;

/// Paint-order key for drawables.
///
/// Higher values are drawn later (on top of lower values).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct PaintOrder(pub i32);

impl PaintOrder {
    pub const BACKGROUND: PaintOrder = PaintOrder(i32::MIN);

    #[inline]
    pub const fn new(v: i32) -> Self {
        Self(v)
    }
}

impl From<i32> for PaintOrder {
    #[inline]
    fn from(v: i32) -> Self {
        Self(v)
    }
}

impl Ord for PaintOrder {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for PaintOrder {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
