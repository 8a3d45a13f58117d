//! The frame loop.

use anyhow::Result;
use kinetic_engine::coords::Vec2;
use kinetic_engine::core::{AppControl, Display, PlatformEvent};
use kinetic_engine::text::{FontId, FontSystem};
use kinetic_engine::time::FrameClock;

use crate::asset::SpriteAsset;
use crate::config::RobotConfig;
use crate::motion::{InputSampler, MotionIntegrator};
use crate::overlay::{status_lines, Renderer};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunState {
    Running,
    /// Terminal; the loop never resumes.
    Stopped,
}

/// Owns the robot's state and drives one frame per [`step`](Self::step).
///
/// Each frame: pace and measure, poll the platform, sample keys, stop on
/// quit or cancel, otherwise move the robot and draw it.
pub struct AppLoop {
    state: RunState,
    target_fps: u32,
    position: Vec2,
    sprite: SpriteAsset,

    clock: FrameClock,
    sampler: InputSampler,
    integrator: MotionIntegrator,
    renderer: Renderer,
    fonts: FontSystem,
}

impl AppLoop {
    pub fn new(config: &RobotConfig, sprite: SpriteAsset, fonts: FontSystem, font: Option<FontId>) -> Self {
        Self {
            state: RunState::Running,
            target_fps: config.target_fps,
            position: config.start_position(),
            sprite,
            clock: FrameClock::new(),
            sampler: InputSampler::default(),
            integrator: MotionIntegrator::new(config.speed, config.bounds()),
            renderer: Renderer::new(config.sprite_width, config.sprite_height, font),
            fonts,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Runs until stopped, then releases `display`.
    ///
    /// The display is dropped on every exit path, including errors.
    pub fn run<D: Display>(&mut self, mut display: D) -> Result<()> {
        self.clock.reset();
        let result = self.drive(&mut display);
        drop(display);
        result
    }

    /// Steps until the loop stops.
    pub fn drive(&mut self, display: &mut impl Display) -> Result<()> {
        while self.step(display)? == AppControl::Continue {}
        Ok(())
    }

    /// Runs a single frame.
    ///
    /// Returns `Exit` once stopped; later calls do nothing. A present failure
    /// stops the loop and is returned.
    pub fn step(&mut self, display: &mut impl Display) -> Result<AppControl> {
        if self.state == RunState::Stopped {
            return Ok(AppControl::Exit);
        }

        let ft = self.clock.tick_paced(self.target_fps);

        let mut quit = false;
        for event in display.poll_events() {
            match event {
                PlatformEvent::Quit => quit = true,
                PlatformEvent::Resized { width, height } => {
                    log::debug!("window resized to {width}x{height}");
                }
                PlatformEvent::FocusChanged(focused) => {
                    log::debug!("window focus: {focused}");
                }
            }
        }

        let sample = self.sampler.sample(display.input());
        if quit || sample.cancel {
            self.stop(if quit { "window closed" } else { "cancel key" });
            return Ok(AppControl::Exit);
        }

        self.position = self.integrator.step(self.position, sample.intent, ft.dt);

        let lines = status_lines(self.position, self.clock.fps());
        if let Err(e) = self
            .renderer
            .draw(display, &self.fonts, self.position, &self.sprite, &lines)
        {
            self.stop("display failure");
            return Err(e);
        }

        Ok(AppControl::Continue)
    }

    fn stop(&mut self, reason: &str) {
        self.state = RunState::Stopped;
        log::info!("stopping after {} frames: {reason}", self.clock.frame_index());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use anyhow::bail;
    use kinetic_engine::input::{InputState, Key};
    use kinetic_engine::paint::Color;
    use kinetic_engine::scene::DrawList;

    use super::*;

    /// What the stub does on one poll.
    #[derive(Default)]
    struct Frame {
        events: Vec<PlatformEvent>,
        press: Vec<Key>,
        release: Vec<Key>,
    }

    /// Headless display replaying scripted frames, then reporting `Quit`.
    #[derive(Default)]
    struct StubDisplay {
        script: VecDeque<Frame>,
        input: InputState,
        polls: usize,
        presents: usize,
        fail_present: bool,
        dropped: Option<Rc<Cell<bool>>>,
    }

    impl StubDisplay {
        fn scripted(frames: Vec<Frame>) -> Self {
            let mut display = Self::default();
            display.script = frames.into();
            display
        }
    }

    impl Display for StubDisplay {
        fn poll_events(&mut self) -> Vec<PlatformEvent> {
            self.polls += 1;
            let Some(frame) = self.script.pop_front() else {
                return vec![PlatformEvent::Quit];
            };
            for k in frame.press {
                self.input.press(k);
            }
            for k in frame.release {
                self.input.release(k);
            }
            frame.events
        }

        fn input(&self) -> &InputState {
            &self.input
        }

        fn present(&mut self, _clear: Color, _list: &mut DrawList, _fonts: &FontSystem) -> Result<()> {
            if self.fail_present {
                bail!("device lost");
            }
            self.presents += 1;
            Ok(())
        }
    }

    impl Drop for StubDisplay {
        fn drop(&mut self) {
            if let Some(flag) = &self.dropped {
                flag.set(true);
            }
        }
    }

    fn app() -> AppLoop {
        let config = RobotConfig { target_fps: 1000, ..Default::default() };
        AppLoop::new(&config, SpriteAsset::Unavailable, FontSystem::new(), None)
    }

    fn idle(n: usize) -> Vec<Frame> {
        (0..n).map(|_| Frame::default()).collect()
    }

    // ── stopping ──────────────────────────────────────────────────────────

    #[test]
    fn quit_on_first_poll_draws_nothing() {
        let mut app = app();
        let mut display = StubDisplay::scripted(vec![Frame {
            events: vec![PlatformEvent::Quit],
            ..Default::default()
        }]);

        app.drive(&mut display).unwrap();
        assert_eq!(app.state(), RunState::Stopped);
        assert_eq!(display.presents, 0);
        assert_eq!(app.position(), Vec2::new(320.0, 240.0));
    }

    #[test]
    fn cancel_stops_before_moving_or_drawing() {
        let mut app = app();
        let mut script = idle(2);
        script.push(Frame { press: vec![Key::D, Key::Escape], ..Default::default() });
        let mut display = StubDisplay::scripted(script);

        app.drive(&mut display).unwrap();
        assert_eq!(display.presents, 2);
        assert_eq!(display.polls, 3);
        assert_eq!(app.position(), Vec2::new(320.0, 240.0));
    }

    #[test]
    fn stopped_loop_does_not_resume() {
        let mut app = app();
        let mut display = StubDisplay::scripted(vec![Frame {
            press: vec![Key::Escape],
            ..Default::default()
        }]);

        assert_eq!(app.step(&mut display).unwrap(), AppControl::Exit);
        display.input.release(Key::Escape);
        display.input.press(Key::D);

        assert_eq!(app.step(&mut display).unwrap(), AppControl::Exit);
        assert_eq!(display.polls, 1);
        assert_eq!(display.presents, 0);
        assert_eq!(app.position(), Vec2::new(320.0, 240.0));
    }

    #[test]
    fn resize_and_focus_do_not_stop() {
        let mut app = app();
        let mut display = StubDisplay::scripted(vec![
            Frame {
                events: vec![PlatformEvent::Resized { width: 640, height: 480 }],
                ..Default::default()
            },
            Frame {
                events: vec![PlatformEvent::FocusChanged(false)],
                ..Default::default()
            },
        ]);

        assert_eq!(app.step(&mut display).unwrap(), AppControl::Continue);
        assert_eq!(app.step(&mut display).unwrap(), AppControl::Continue);
        assert_eq!(app.state(), RunState::Running);
    }

    // ── motion ────────────────────────────────────────────────────────────

    #[test]
    fn holding_d_moves_right_within_bounds() {
        let mut app = app();
        let mut script = vec![Frame { press: vec![Key::D], ..Default::default() }];
        script.extend(idle(4));
        let mut display = StubDisplay::scripted(script);

        app.drive(&mut display).unwrap();
        let p = app.position();
        assert!(p.x > 320.0, "x was {}", p.x);
        assert!(p.x <= 608.0);
        assert_eq!(p.y, 240.0);
        assert_eq!(display.presents, 5);
    }

    #[test]
    fn released_key_stops_motion() {
        let mut app = app();
        let mut display = StubDisplay::scripted(vec![
            Frame { press: vec![Key::W], ..Default::default() },
            Frame { release: vec![Key::W], ..Default::default() },
            Frame::default(),
        ]);

        app.step(&mut display).unwrap();
        app.step(&mut display).unwrap();
        let after_release = app.position();
        app.step(&mut display).unwrap();
        assert_eq!(app.position(), after_release);
        assert!(after_release.y < 240.0);
    }

    // ── failures and teardown ─────────────────────────────────────────────

    #[test]
    fn present_failure_stops_with_error() {
        let mut app = app();
        let mut display = StubDisplay::scripted(idle(3));
        display.fail_present = true;

        assert!(app.drive(&mut display).is_err());
        assert_eq!(app.state(), RunState::Stopped);
        assert_eq!(app.step(&mut display).unwrap(), AppControl::Exit);
    }

    #[test]
    fn run_releases_the_display() {
        let dropped = Rc::new(Cell::new(false));
        let mut display = StubDisplay::scripted(idle(1));
        display.dropped = Some(Rc::clone(&dropped));

        app().run(display).unwrap();
        assert!(dropped.get());
    }

    #[test]
    fn run_releases_the_display_on_error() {
        let dropped = Rc::new(Cell::new(false));
        let mut display = StubDisplay::scripted(idle(1));
        display.dropped = Some(Rc::clone(&dropped));
        display.fail_present = true;

        assert!(app().run(display).is_err());
        assert!(dropped.get());
    }
}
