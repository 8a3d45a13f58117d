//! Input subsystem.
//!
//! The public API does not expose winit types; the `window` module translates
//! platform events into `InputEvent`s.

mod state;
mod types;

pub use state::InputState;
pub use types::{InputEvent, Key, KeyState};
