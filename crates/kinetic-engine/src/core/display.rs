use anyhow::Result;

use crate::input::InputState;
use crate::paint::Color;
use crate::scene::DrawList;
use crate::text::FontSystem;

/// Control directive returned by per-frame application steps.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Platform notification collected by [`Display::poll_events`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PlatformEvent {
    /// The user or the OS asked the window to close.
    Quit,
    /// The drawable area changed, in physical pixels.
    Resized { width: u32, height: u32 },
    /// Keyboard focus gained or lost.
    FocusChanged(bool),
}

/// Output device plus its input source, driven by an explicit loop.
///
/// One iteration is: [`poll_events`](Self::poll_events), read
/// [`input`](Self::input), then [`present`](Self::present) once.
pub trait Display {
    /// Processes pending platform events without blocking and returns the
    /// notifications gathered since the previous call.
    fn poll_events(&mut self) -> Vec<PlatformEvent>;

    /// Keyboard state as of the last poll.
    fn input(&self) -> &InputState;

    /// Clears the frame to `clear`, draws `draw_list` and presents it.
    ///
    /// Transient surface problems skip the frame and return `Ok`; an error
    /// means the device can no longer present.
    fn present(&mut self, clear: Color, draw_list: &mut DrawList, fonts: &FontSystem) -> Result<()>;
}
