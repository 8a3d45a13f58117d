use super::{DrawCmd, SortKey, ZIndex};

/// A single draw item: sort key + command.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: DrawCmd,
}

/// Recorded draw stream for a frame.
///
/// `push()` is O(1); paint-order iteration reuses an internal index buffer, so
/// a list cleared and refilled every frame stops allocating once warmed.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,

    sorted_indices: Vec<usize>,
    sorted_dirty: bool,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.sorted_dirty = true;
        self.sorted_indices.clear();
    }

    /// Returns items in insertion order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes a draw command with the given z-index.
    #[inline]
    pub fn push(&mut self, z: ZIndex, cmd: DrawCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        self.items.push(DrawItem {
            key: SortKey::new(z, order),
            cmd,
        });

        self.sorted_dirty = true;
    }

    /// Iterates items in paint order (back-to-front) without cloning commands.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if self.sorted_dirty {
            self.rebuild_sorted_indices();
        }

        self.sorted_indices.iter().map(|&i| &self.items[i])
    }

    fn rebuild_sorted_indices(&mut self) {
        self.sorted_indices.clear();
        self.sorted_indices.extend(0..self.items.len());

        // SortKey includes insertion order, so this is stable.
        self.sorted_indices
            .sort_by(|&a, &b| self.items[a].key.cmp(&self.items[b].key));

        self.sorted_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::paint::Color;
    use crate::scene::shapes::CircleCmd;

    fn radius_order(list: &mut DrawList) -> Vec<f32> {
        list.iter_in_paint_order()
            .filter_map(|item| match &item.cmd {
                DrawCmd::Circle(c) => Some(c.radius),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn paint_order_sorts_by_z_then_insertion() {
        let mut list = DrawList::new();
        list.push_circle(ZIndex(1), Vec2::zero(), 1.0, Color::BLACK);
        list.push_circle(ZIndex(0), Vec2::zero(), 2.0, Color::BLACK);
        list.push_circle(ZIndex(1), Vec2::zero(), 3.0, Color::BLACK);
        list.push_circle(ZIndex(0), Vec2::zero(), 4.0, Color::BLACK);

        assert_eq!(radius_order(&mut list), vec![2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn clear_resets_items_and_order() {
        let mut list = DrawList::new();
        list.push_circle(ZIndex(0), Vec2::zero(), 1.0, Color::BLACK);
        list.clear();
        assert!(list.is_empty());

        list.push_circle(ZIndex(0), Vec2::zero(), 5.0, Color::BLACK);
        assert_eq!(list.items()[0].key.order, 0);
        assert_eq!(radius_order(&mut list), vec![5.0]);
    }

    #[test]
    fn push_circle_records_a_solid_fill() {
        let mut list = DrawList::new();
        let color = Color::rgb8(100, 120, 200);
        list.push_circle(ZIndex::WORLD, Vec2::new(320.0, 240.0), 32.0, color);

        let DrawCmd::Circle(cmd) = &list.items()[0].cmd else {
            panic!("expected a circle");
        };
        assert_eq!(*cmd, CircleCmd { center: Vec2::new(320.0, 240.0), radius: 32.0, color });
    }
}
