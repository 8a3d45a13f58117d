//! Time subsystem.
//!
//! Frame timing without coupling to the platform loop:
//! - one `FrameClock` per loop
//! - call `tick_paced(fps)` (or `tick()` when the swapchain paces) once per frame

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
