/// Z-ordering key for draw items. Higher values paint on top.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct ZIndex(pub i32);

impl ZIndex {
    /// Scene content (sprites, shapes).
    pub const WORLD: ZIndex = ZIndex(0);
    /// Decorations layered on world content.
    pub const DETAIL: ZIndex = ZIndex(10);
    /// Text and HUD elements.
    pub const OVERLAY: ZIndex = ZIndex(100);

    /// The layer directly above this one.
    #[inline]
    pub const fn above(self) -> Self {
        Self(self.0 + 1)
    }
}
