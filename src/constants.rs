// --- File: constants.rs ---
use glam::Vec4;
use std::time::Duration;

// --- Window ---
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;
pub const FPS_UPDATE_INTERVAL_SECS: f64 = 0.5;
// Frame length used when a headless run advances its manual clock.
pub const HEADLESS_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

// --- Star & Planets ---
// Base values are multiplied by the scale factor (see `SimulationConfig::scaled`).
pub const DEFAULT_SCALE_FACTOR: f32 = 0.5;
pub const BASE_STAR_RADIUS: f32 = 50.0;
pub const BASE_PLANET_RADIUS: f32 = 10.0;
pub const BASE_GRAVITY: f32 = 250.0;
// Fraction of the star radius used as its mass in the force law.
pub const STAR_MASS_FACTOR: f32 = 0.1;
pub const INITIAL_PLANET_COUNT: usize = 100;
// Initial and post-split velocities are drawn from [-range, range) per axis.
pub const VELOCITY_RANGE: f32 = 1.0;

// Distances below this are clamped before the inverse-square division.
pub const MIN_GRAVITY_DISTANCE: f32 = 1.0e-3;

// --- Collisions & Splitting ---
pub const COLLISION_DELAY: Duration = Duration::from_millis(500);
pub const FRAGMENTS_PER_SPLIT: usize = 4;
pub const SPLIT_RADIUS_RATIO: f32 = 0.5;
// Fragments at or below this radius are dropped.
pub const MIN_SPLIT_RADIUS: f32 = 0.5;

// --- Colors ---
pub const BACKGROUND_COLOR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
pub const STAR_COLOR: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);
pub const PLANET_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

// --- End of File: constants.rs ---
