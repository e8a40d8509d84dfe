use crate::interfaces::RandomSource;
use glam::Vec2;

// --- Helper Functions ---

// random_velocity: each axis uniform in [-range, range)
pub fn random_velocity<R: RandomSource + ?Sized>(random: &mut R, range: f32) -> Vec2 {
    let dx = random.uniform() * range;
    let dy = random.uniform() * range;
    Vec2::new(dx, dy)
}

// Unlike f32::clamp this never panics when lo > hi (a body wider than the
// viewport); lo wins in that case.
#[inline]
pub fn clamp_lenient(value: f32, lo: f32, hi: f32) -> f32 {
    value.min(hi).max(lo)
}
