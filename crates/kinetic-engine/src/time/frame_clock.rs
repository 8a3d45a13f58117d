use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of frame intervals averaged by [`FrameClock::fps`].
const FPS_WINDOW: usize = 10;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// `dt` is always the measured interval since the previous tick, not the target
/// interval, so motion stays correct when the loop runs slower than requested.
///
/// Delta time is clamped to avoid pathological values when the process is paused
/// by the debugger, minimized, or stalls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
    intervals: VecDeque<Duration>,
}

impl FrameClock {
    /// Creates a new clock with default clamps (100 µs .. 250 ms).
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
            intervals: VecDeque::with_capacity(FPS_WINDOW),
        }
    }

    /// Resets the clock baseline and forgets the FPS history.
    pub fn reset(&mut self) {
        self.last = Instant::now();
        self.intervals.clear();
    }

    /// Advances the clock without pacing and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        self.advance(now)
    }

    /// Sleeps until at least `1 / target_fps` has passed since the previous tick,
    /// then advances the clock.
    ///
    /// A `target_fps` of zero disables pacing. When the caller is already late,
    /// no sleep happens and the overrun shows up in `dt`.
    pub fn tick_paced(&mut self, target_fps: u32) -> FrameTime {
        if let Some(wait) = self.remaining_budget(target_fps, Instant::now()) {
            std::thread::sleep(wait);
        }
        self.tick()
    }

    /// Rolling average frames per second over the last few intervals.
    ///
    /// Returns `0.0` until at least one interval has been measured.
    pub fn fps(&self) -> f32 {
        if self.intervals.is_empty() {
            return 0.0;
        }
        let total: Duration = self.intervals.iter().sum();
        let secs = total.as_secs_f32();
        if secs <= 0.0 {
            return 0.0;
        }
        self.intervals.len() as f32 / secs
    }

    /// Number of ticks taken so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn remaining_budget(&self, target_fps: u32, now: Instant) -> Option<Duration> {
        if target_fps == 0 {
            return None;
        }
        let budget = Duration::from_nanos(1_000_000_000 / u64::from(target_fps));
        let spent = now.saturating_duration_since(self.last);
        budget.checked_sub(spent).filter(|d| !d.is_zero())
    }

    fn advance(&mut self, now: Instant) -> FrameTime {
        let raw = now.saturating_duration_since(self.last);
        let dt = raw.clamp(self.dt_min, self.dt_max);

        if self.intervals.len() == FPS_WINDOW {
            self.intervals.pop_front();
        }
        self.intervals.push_back(raw);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        log::trace!("frame {} dt={:.4}s", ft.frame_index, ft.dt);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── pacing ────────────────────────────────────────────────────────────

    #[test]
    fn paced_tick_waits_for_target_interval() {
        let mut clock = FrameClock::new();
        clock.tick();
        let ft = clock.tick_paced(20); // 50 ms budget
        assert!(ft.dt >= 0.045, "dt was {}", ft.dt);
    }

    #[test]
    fn zero_target_disables_pacing() {
        let clock = FrameClock::new();
        assert!(clock.remaining_budget(0, Instant::now()).is_none());
    }

    #[test]
    fn late_frame_has_no_budget_left() {
        let clock = FrameClock::new();
        let later = clock.last + Duration::from_millis(40);
        assert!(clock.remaining_budget(60, later).is_none());
    }

    #[test]
    fn early_frame_waits_for_the_rest() {
        let clock = FrameClock::new();
        let later = clock.last + Duration::from_millis(10);
        let wait = clock.remaining_budget(50, later).unwrap();
        assert_eq!(wait, Duration::from_millis(10));
    }

    // ── measurement ───────────────────────────────────────────────────────

    #[test]
    fn dt_reports_measured_interval_not_target() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let ft = clock.advance(start + Duration::from_millis(40));
        assert!((ft.dt - 0.040).abs() < 1e-6);
    }

    #[test]
    fn dt_is_clamped_after_a_stall() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let ft = clock.advance(start + Duration::from_secs(5));
        assert!((ft.dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn dt_has_a_floor() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let ft = clock.advance(start);
        assert!(ft.dt > 0.0);
    }

    #[test]
    fn frame_index_increments() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.frame_index(), 2);
    }

    // ── fps ───────────────────────────────────────────────────────────────

    #[test]
    fn fps_is_zero_before_first_interval() {
        assert_eq!(FrameClock::new().fps(), 0.0);
    }

    #[test]
    fn fps_averages_recent_intervals() {
        let mut clock = FrameClock::new();
        let mut t = clock.last;
        for _ in 0..5 {
            t += Duration::from_millis(20);
            clock.advance(t);
        }
        assert!((clock.fps() - 50.0).abs() < 0.01, "fps was {}", clock.fps());
    }

    #[test]
    fn fps_window_forgets_old_intervals() {
        let mut clock = FrameClock::new();
        let mut t = clock.last;
        t += Duration::from_millis(200);
        clock.advance(t);
        for _ in 0..FPS_WINDOW {
            t += Duration::from_millis(10);
            clock.advance(t);
        }
        assert!((clock.fps() - 100.0).abs() < 0.01, "fps was {}", clock.fps());
    }
}
