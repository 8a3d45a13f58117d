use crate::bitmap::Bitmap;
use crate::coords::Rect;
use crate::scene::{DrawCmd, DrawList, ZIndex};

/// Textured quad payload: `bitmap` stretched over `dst`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteCmd {
    pub bitmap: Bitmap,
    /// Destination rectangle in logical pixels.
    pub dst: Rect,
}

impl DrawList {
    /// Records a bitmap drawn into `dst`.
    #[inline]
    pub fn push_sprite(&mut self, z: ZIndex, bitmap: &Bitmap, dst: Rect) {
        self.push(z, DrawCmd::Sprite(SpriteCmd { bitmap: bitmap.clone(), dst }));
    }
}
