//! Keyboard intent and sprite motion.
//!
//! [`InputSampler`] turns held keys into a direction; [`MotionIntegrator`]
//! turns a direction into movement clamped to the canvas.

use kinetic_engine::coords::{Rect, Vec2};
use kinetic_engine::input::{InputState, Key};

// ── intent ────────────────────────────────────────────────────────────────

/// Requested direction for one frame; each axis is -1, 0 or 1.
///
/// `+x` is right and `+y` is down, matching screen coordinates.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Intent {
    pub x: i8,
    pub y: i8,
}

impl Intent {
    pub const NONE: Intent = Intent { x: 0, y: 0 };

    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(f32::from(self.x), f32::from(self.y))
    }
}

/// One reading of the keyboard.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct InputSample {
    pub intent: Intent,
    /// The cancel key is held.
    pub cancel: bool,
}

// ── sampling ──────────────────────────────────────────────────────────────

/// Keys bound to each direction and to cancel.
///
/// A direction counts as pressed when any of its keys is held.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub up: Vec<Key>,
    pub down: Vec<Key>,
    pub left: Vec<Key>,
    pub right: Vec<Key>,
    pub cancel: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: vec![Key::W, Key::ArrowUp],
            down: vec![Key::S, Key::ArrowDown],
            left: vec![Key::A, Key::ArrowLeft],
            right: vec![Key::D, Key::ArrowRight],
            cancel: vec![Key::Escape],
        }
    }
}

/// Reads direction and cancel state from the held-key set.
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    bindings: KeyBindings,
}

impl InputSampler {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn sample(&self, input: &InputState) -> InputSample {
        let held = |keys: &[Key]| i8::from(input.any_down(keys));
        let b = &self.bindings;

        InputSample {
            intent: Intent::new(
                held(&b.right) - held(&b.left),
                held(&b.down) - held(&b.up),
            ),
            cancel: input.any_down(&b.cancel),
        }
    }
}

// ── integration ───────────────────────────────────────────────────────────

/// Closed range the sprite center may occupy.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Keeps a sprite of `sprite` size fully inside a `canvas`-sized area.
    pub fn new(canvas: Vec2, sprite: Vec2) -> Self {
        let allowed = Rect::from_origin_size(Vec2::zero(), canvas).inset(sprite / 2.0);
        debug_assert!(
            allowed.size.x >= 0.0 && allowed.size.y >= 0.0,
            "sprite larger than canvas"
        );
        Self { min: allowed.min(), max: allowed.max() }
    }

    pub fn clamp(self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    pub fn contains(self, p: Vec2) -> bool {
        Rect::from_origin_size(self.min, self.max - self.min).contains_closed(p)
    }
}

/// Velocity for `intent` at `speed` pixels per second.
///
/// Diagonals are normalized so every non-zero intent moves at exactly `speed`.
pub fn velocity(intent: Intent, speed: f32) -> Vec2 {
    if intent.is_none() {
        return Vec2::zero();
    }
    intent.to_vec2().normalized() * speed
}

/// Advances a position by the velocity of an intent, then clamps it.
///
/// Motion has no momentum: velocity is derived from the intent every step.
#[derive(Debug, Copy, Clone)]
pub struct MotionIntegrator {
    speed: f32,
    bounds: Bounds,
}

impl MotionIntegrator {
    pub fn new(speed: f32, bounds: Bounds) -> Self {
        Self { speed, bounds }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn step(&self, position: Vec2, intent: Intent, dt: f32) -> Vec2 {
        let next = position + velocity(intent, self.speed) * dt;
        self.bounds.clamp(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn integrator() -> MotionIntegrator {
        MotionIntegrator::new(200.0, Bounds::new(Vec2::new(640.0, 480.0), Vec2::new(64.0, 64.0)))
    }

    fn held(keys: &[Key]) -> InputState {
        let mut state = InputState::default();
        for k in keys {
            state.press(*k);
        }
        state
    }

    // ── sampling ──────────────────────────────────────────────────────────

    #[test]
    fn no_keys_is_no_intent() {
        let s = InputSampler::default().sample(&InputState::default());
        assert_eq!(s, InputSample::default());
    }

    #[test]
    fn wasd_maps_to_screen_directions() {
        let sampler = InputSampler::default();
        assert_eq!(sampler.sample(&held(&[Key::D])).intent, Intent::new(1, 0));
        assert_eq!(sampler.sample(&held(&[Key::A])).intent, Intent::new(-1, 0));
        assert_eq!(sampler.sample(&held(&[Key::W])).intent, Intent::new(0, -1));
        assert_eq!(sampler.sample(&held(&[Key::S])).intent, Intent::new(0, 1));
    }

    #[test]
    fn opposite_keys_cancel_out() {
        let s = InputSampler::default().sample(&held(&[Key::A, Key::D, Key::W]));
        assert_eq!(s.intent, Intent::new(0, -1));
    }

    #[test]
    fn arrow_and_letter_for_same_direction_count_once() {
        let s = InputSampler::default().sample(&held(&[Key::D, Key::ArrowRight]));
        assert_eq!(s.intent, Intent::new(1, 0));
    }

    #[test]
    fn escape_sets_cancel_independently_of_motion() {
        let s = InputSampler::default().sample(&held(&[Key::Escape, Key::S]));
        assert!(s.cancel);
        assert_eq!(s.intent, Intent::new(0, 1));
    }

    #[test]
    fn custom_bindings_replace_defaults() {
        let sampler = InputSampler::new(KeyBindings {
            left: vec![Key::ArrowLeft],
            cancel: vec![Key::A],
            ..KeyBindings::default()
        });
        assert!(!sampler.sample(&held(&[Key::Escape])).cancel);

        let s = sampler.sample(&held(&[Key::A]));
        assert!(s.cancel);
        assert!(s.intent.is_none());
    }

    // ── velocity ──────────────────────────────────────────────────────────

    #[test]
    fn zero_intent_has_zero_velocity() {
        assert_eq!(velocity(Intent::NONE, 200.0), Vec2::zero());
    }

    #[test]
    fn diagonal_speed_matches_axis_speed() {
        let v = velocity(Intent::new(1, 1), 200.0);
        assert!((v.length() - 200.0).abs() < EPS);
        assert!((v.x - 141.421).abs() < EPS);
        assert!((v.y - 141.421).abs() < EPS);
    }

    #[test]
    fn every_nonzero_intent_moves_at_speed() {
        for x in -1..=1 {
            for y in -1..=1 {
                let intent = Intent::new(x, y);
                if intent.is_none() {
                    continue;
                }
                let len = velocity(intent, 200.0).length();
                assert!((len - 200.0).abs() < EPS, "{intent:?} gave {len}");
            }
        }
    }

    // ── stepping ──────────────────────────────────────────────────────────

    #[test]
    fn half_second_right_moves_100px() {
        let p = integrator().step(Vec2::new(320.0, 240.0), Intent::new(1, 0), 0.5);
        assert_eq!(p, Vec2::new(420.0, 240.0));
    }

    #[test]
    fn movement_stops_at_right_edge() {
        let p = integrator().step(Vec2::new(600.0, 240.0), Intent::new(1, 0), 1.0);
        assert_eq!(p, Vec2::new(608.0, 240.0));
    }

    #[test]
    fn idle_position_is_unchanged_for_any_dt() {
        let m = integrator();
        let start = Vec2::new(123.5, 321.25);
        for dt in [0.0, 0.016, 0.25, 10.0] {
            assert_eq!(m.step(start, Intent::NONE, dt), start);
        }
    }

    #[test]
    fn split_step_matches_single_step() {
        let m = integrator();
        let start = Vec2::new(200.0, 200.0);
        let intent = Intent::new(1, -1);
        let once = m.step(start, intent, 0.2);
        let twice = m.step(m.step(start, intent, 0.1), intent, 0.1);
        assert!((once - twice).length() < EPS);
    }

    #[test]
    fn position_stays_in_bounds_from_every_corner() {
        let m = integrator();
        let corners = [
            Vec2::new(32.0, 32.0),
            Vec2::new(608.0, 32.0),
            Vec2::new(32.0, 448.0),
            Vec2::new(608.0, 448.0),
        ];
        for start in corners {
            for x in -1..=1 {
                for y in -1..=1 {
                    let p = m.step(start, Intent::new(x, y), 5.0);
                    assert!(m.bounds().contains(p), "{p:?} escaped");
                }
            }
        }
    }

    #[test]
    fn bounds_are_half_sprite_from_each_edge() {
        let b = Bounds::new(Vec2::new(640.0, 480.0), Vec2::new(64.0, 64.0));
        assert_eq!(b.min, Vec2::new(32.0, 32.0));
        assert_eq!(b.max, Vec2::new(608.0, 448.0));
    }
}
