//! Kinetic engine crate.
//!
//! Window, keyboard input, frame timing and a small wgpu 2D renderer for
//! sprite demos. The application owns the frame loop and drives the platform
//! through [`core::Display`].

pub mod core;
pub mod device;
pub mod input;
pub mod time;
pub mod window;

pub mod bitmap;
pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod text;
