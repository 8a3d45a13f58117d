//! Window + platform.
//!
//! Owns the `winit` event loop and window, wires them to the GPU layer and
//! exposes both through [`crate::core::Display`]. The caller drives the loop;
//! events are pumped on demand instead of handing control to winit.

mod platform;
mod translate;

pub use platform::{Platform, PlatformConfig};
pub use winit::dpi::LogicalSize;
