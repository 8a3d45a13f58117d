//! Shape renderers.

mod common;

pub mod circle;
pub mod sprite;
pub mod text;
