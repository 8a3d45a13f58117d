//! Robot sprite demo.
//!
//! A robot follows WASD (or arrow keys) around a fixed canvas and stays fully
//! visible. Escape or closing the window ends the program.

pub mod app;
pub mod asset;
pub mod config;
pub mod motion;
pub mod overlay;
