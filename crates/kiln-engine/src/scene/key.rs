use core::cmp::Ordering;

use super::PaintOrder;

/// Stable sort key for drawables.
///
/// Ordering rules:
/// 1) `order`: ascending (back-to-front)
/// 2) `seq`: ascending (submission order for equal paint order)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SortKey {
    /// Paint order. Lower values are drawn first.
    pub order: PaintOrder,
    /// Submission index within the frame, ensuring stable ordering.
    pub seq: u32,
}

impl SortKey {
    #[inline]
    pub const fn new(order: PaintOrder, seq: u32) -> Self {
        Self { order, seq }
    }
}

impl Ord for SortKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match self.order.cmp(&other.order) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            o => o,
        }
    }
}

impl PartialOrd for SortKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_order_dominates_sequence() {
        let a = SortKey::new(PaintOrder(1), 0);
        let b = SortKey::new(PaintOrder(0), 7);
        assert!(b < a);
    }

    #[test]
    fn sequence_breaks_ties() {
        let a = SortKey::new(PaintOrder(3), 1);
        let b = SortKey::new(PaintOrder(3), 2);
        assert!(a < b);
    }
}
