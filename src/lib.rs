pub mod config;
pub mod constants;
pub mod interfaces;
pub mod renderer;
pub mod simulation;
pub mod utils;

pub use config::{ConfigError, SimulationConfig};
pub use interfaces::{
    Canvas, Clock, CollisionCue, FrameScheduler, LogCue, ManualClock, ManualScheduler, NullCanvas,
    RandomSource, SeededRandom, SilentCue, SystemClock,
};
pub use renderer::{Renderer, RendererError};
pub use simulation::{Body, SimStats, SimulationState, SplitRule, Star, UpdateOutcome, split_body};
