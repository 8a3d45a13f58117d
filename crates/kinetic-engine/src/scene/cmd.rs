use crate::scene::shapes::circle::CircleCmd;
use crate::scene::shapes::sprite::SpriteCmd;
use crate::scene::shapes::text::TextCmd;

/// Renderer-agnostic draw command stream.
///
/// Each variant has a push helper under `scene::shapes::*` and a matching
/// renderer under `render::shapes::*`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Circle(CircleCmd),
    Sprite(SpriteCmd),
    Text(TextCmd),
}
