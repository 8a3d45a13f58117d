//! Core engine-facing contracts.
//!
//! Defines the seam between the platform (window, GPU, input) and the code
//! driving the frame loop. Applications own the loop and talk to the platform
//! only through [`Display`], so a headless implementation can stand in for it.

mod display;

pub use display::{AppControl, Display, PlatformEvent};
