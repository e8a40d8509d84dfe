// --- File: config.rs ---
use crate::constants::*;
use glam::{Vec2, Vec4};
use std::fmt;
use std::time::Duration;

/// Reasons a [`SimulationConfig`] cannot drive a simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A length that must be strictly positive and finite is not.
    NonPositive { field: &'static str, value: f32 },
    /// Gravity is negative or not finite.
    InvalidGravity(f32),
    /// The split ratio must lie strictly between 0 and 1.
    InvalidSplitRatio(f32),
    /// A split may produce at most [`FRAGMENTS_PER_SPLIT`] bodies.
    TooManyFragments(usize),
    /// Velocity range is negative or not finite.
    InvalidVelocityRange(f32),
    /// The viewport cannot hold a single initial planet.
    ViewportTooSmall { width: f32, height: f32, radius: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive { field, value } => {
                write!(f, "`{}` must be positive and finite, got {}", field, value)
            }
            ConfigError::InvalidGravity(g) => {
                write!(f, "gravity must be finite and non-negative, got {}", g)
            }
            ConfigError::InvalidSplitRatio(r) => {
                write!(f, "split ratio must be in (0, 1), got {}", r)
            }
            ConfigError::TooManyFragments(n) => write!(
                f,
                "a split yields at most {} fragments, got {}",
                FRAGMENTS_PER_SPLIT, n
            ),
            ConfigError::InvalidVelocityRange(v) => {
                write!(f, "velocity range must be finite and non-negative, got {}", v)
            }
            ConfigError::ViewportTooSmall {
                width,
                height,
                radius,
            } => write!(
                f,
                "viewport {}x{} cannot hold a planet of radius {}",
                width, height, radius
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub width: f32,
    pub height: f32,
    pub star_radius: f32,
    pub initial_planet_radius: f32,
    pub gravity: f32,
    pub star_mass_factor: f32,
    pub collision_delay: Duration,
    pub initial_population: usize,
    pub min_split_radius: f32,
    pub split_ratio: f32,
    pub fragments_per_split: usize,
    pub velocity_range: f32,
    pub background_color: Vec4,
    pub star_color: Vec4,
    pub planet_color: Vec4,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::scaled(
            WINDOW_WIDTH as f32,
            WINDOW_HEIGHT as f32,
            DEFAULT_SCALE_FACTOR,
        )
    }
}

impl SimulationConfig {
    /// Builds a configuration for a `width` x `height` viewport.
    ///
    /// `scale_factor` multiplies the star radius, the initial planet radius and
    /// gravity. A factor of 0.5 gives the compact layout, 1.0 the full-size one.
    pub fn scaled(width: f32, height: f32, scale_factor: f32) -> Self {
        Self {
            width,
            height,
            star_radius: BASE_STAR_RADIUS * scale_factor,
            initial_planet_radius: BASE_PLANET_RADIUS * scale_factor,
            gravity: BASE_GRAVITY * scale_factor,
            star_mass_factor: STAR_MASS_FACTOR,
            collision_delay: COLLISION_DELAY,
            initial_population: INITIAL_PLANET_COUNT,
            min_split_radius: MIN_SPLIT_RADIUS,
            split_ratio: SPLIT_RADIUS_RATIO,
            fragments_per_split: FRAGMENTS_PER_SPLIT,
            velocity_range: VELOCITY_RANGE,
            background_color: BACKGROUND_COLOR,
            star_color: STAR_COLOR,
            planet_color: PLANET_COLOR,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.bounds() * 0.5
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("star_radius", self.star_radius),
            ("initial_planet_radius", self.initial_planet_radius),
            ("star_mass_factor", self.star_mass_factor),
            ("min_split_radius", self.min_split_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err(ConfigError::InvalidGravity(self.gravity));
        }
        if !(self.split_ratio > 0.0 && self.split_ratio < 1.0) {
            return Err(ConfigError::InvalidSplitRatio(self.split_ratio));
        }
        if self.fragments_per_split > FRAGMENTS_PER_SPLIT {
            return Err(ConfigError::TooManyFragments(self.fragments_per_split));
        }
        if !(self.velocity_range.is_finite() && self.velocity_range >= 0.0) {
            return Err(ConfigError::InvalidVelocityRange(self.velocity_range));
        }
        let diameter = self.initial_planet_radius * 2.0;
        if self.width < diameter || self.height < diameter {
            return Err(ConfigError::ViewportTooSmall {
                width: self.width,
                height: self.height,
                radius: self.initial_planet_radius,
            });
        }
        Ok(())
    }
}

// --- End of File: config.rs ---
