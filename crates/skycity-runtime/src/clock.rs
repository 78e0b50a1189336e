//! Frame clock: wall-clock ticking or manual fixed stepping

use std::time::Instant;

/// Longest frame the scene will integrate in one step.
const MAX_FRAME_DELTA: f64 = 0.25;

/// Time values handed to every subsystem for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame
    pub delta: f64,
    /// Seconds since the scene started
    pub total: f64,
}

/// Tracks scene time
pub struct FrameClock {
    /// Total elapsed scene time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    last_instant: Instant,
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance from the wall clock. Call once per frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return self.frame();
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.step(elapsed.min(MAX_FRAME_DELTA));
        self.frame()
    }

    /// Advance by a fixed amount, independent of the wall clock.
    pub fn advance(&mut self, dt: f64) -> FrameTime {
        self.first_tick = false;
        self.step(dt.max(0.0));
        self.frame()
    }

    pub fn frame(&self) -> FrameTime {
        FrameTime {
            delta: self.delta_time,
            total: self.total_time,
        }
    }

    fn step(&mut self, dt: f64) {
        self.delta_time = dt;
        self.total_time += dt;
    }
}
