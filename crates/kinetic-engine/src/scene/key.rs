use super::ZIndex;

/// Stable sort key for draw items.
///
/// Field order matters for the derived `Ord`: `z` first (back-to-front), then
/// `order` (insertion order within a layer).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SortKey {
    pub z: ZIndex,
    pub order: u32,
}

impl SortKey {
    #[inline]
    pub const fn new(z: ZIndex, order: u32) -> Self {
        Self { z, order }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_dominates_insertion_order() {
        assert!(SortKey::new(ZIndex(0), 9) < SortKey::new(ZIndex(1), 0));
        assert!(SortKey::new(ZIndex(1), 0) < SortKey::new(ZIndex(1), 1));
    }

    #[test]
    fn above_is_one_higher() {
        assert_eq!(ZIndex::WORLD.above(), ZIndex(1));
    }
}
