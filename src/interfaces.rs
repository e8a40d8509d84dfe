//! Collaborators the simulation talks to: something to draw on, something
//! that schedules the next frame, a clock, a random source, and an optional
//! cue fired on collisions and absorptions.
//!
//! Each has a real implementation used by the windowed app and a
//! deterministic one used by headless runs and tests.

use glam::{Vec2, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

// --- Drawing ---

pub trait Canvas {
    fn clear(&mut self, width: f32, height: f32);
    fn fill_background(&mut self, color: Vec4);
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec4);
}

/// Discards everything drawn on it, keeping only a count of circles per frame.
#[derive(Debug, Default)]
pub struct NullCanvas {
    pub circles_drawn: usize,
}

impl Canvas for NullCanvas {
    fn clear(&mut self, _width: f32, _height: f32) {
        self.circles_drawn = 0;
    }

    fn fill_background(&mut self, _color: Vec4) {}

    fn draw_circle(&mut self, _center: Vec2, _radius: f32, _color: Vec4) {
        self.circles_drawn += 1;
    }
}

// --- Frame scheduling ---

pub trait FrameScheduler {
    fn request_next_frame(&self);
}

impl FrameScheduler for winit::window::Window {
    fn request_next_frame(&self) {
        self.request_redraw();
    }
}

/// Records whether a frame was requested; the driver polls it with [`take_request`].
///
/// [`take_request`]: ManualScheduler::take_request
#[derive(Debug, Default)]
pub struct ManualScheduler {
    requested: Cell<bool>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` (and resets the flag) if a frame was requested since the last call.
    pub fn take_request(&self) -> bool {
        self.requested.replace(false)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_next_frame(&self) {
        self.requested.set(true);
    }
}

// --- Time ---

/// Monotonic time source. Timestamps are measured from the clock's own epoch.
pub trait Clock {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: Duration) -> Self {
        let clock = Self::new();
        clock.set(start);
        clock
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        // Never run backwards.
        if to > self.now.get() {
            self.now.set(to);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

// --- Randomness ---

pub trait RandomSource {
    /// Uniform sample in `[-1, 1)`.
    fn uniform(&mut self) -> f32;
    /// Uniform sample in `[0, 1)`.
    fn unit(&mut self) -> f32;

    fn reseed(&mut self, _seed: Option<u64>) {}
}

pub type SimRng = StdRng;

pub struct SeededRandom {
    rng: SimRng,
}

impl SeededRandom {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: Self::make_rng(seed),
        }
    }

    fn make_rng(seed: Option<u64>) -> SimRng {
        match seed {
            Some(seed) => SimRng::seed_from_u64(seed),
            None => SimRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }

    fn unit(&mut self) -> f32 {
        self.rng.gen_range(0.0..1.0)
    }

    fn reseed(&mut self, seed: Option<u64>) {
        self.rng = Self::make_rng(seed);
    }
}

// --- Cues ---

/// Side channel for effects such as sounds. Implementations must not fail loudly:
/// the simulation ignores whatever they do.
pub trait CollisionCue {
    fn on_collision(&mut self, _position: Vec2, _radius: f32) {}
    fn on_absorbed(&mut self, _position: Vec2, _radius: f32) {}
}

pub struct SilentCue;

impl CollisionCue for SilentCue {}

pub struct LogCue;

impl CollisionCue for LogCue {
    fn on_collision(&mut self, position: Vec2, radius: f32) {
        log::debug!(
            "Collision at ({:.1}, {:.1}), radius {:.2}",
            position.x,
            position.y,
            radius
        );
    }

    fn on_absorbed(&mut self, position: Vec2, radius: f32) {
        log::debug!(
            "Absorbed at ({:.1}, {:.1}), radius {:.2}",
            position.x,
            position.y,
            radius
        );
    }
}
