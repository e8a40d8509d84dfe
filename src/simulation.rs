// --- File: simulation.rs ---
use crate::config::{ConfigError, SimulationConfig};
use crate::constants::MIN_GRAVITY_DISTANCE;
use crate::interfaces::{Canvas, Clock, CollisionCue, FrameScheduler, RandomSource, SilentCue};
use crate::utils::{clamp_lenient, random_velocity};
use glam::Vec2;
use std::time::Duration;

// --- Core Data Structures ---

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub last_collision: Duration,
}

/// The fixed attractor at the middle of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub center: Vec2,
    pub radius: f32,
    // Stand-in for mass in the force law: a fixed fraction of the radius.
    pub mass: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Absorbed,
    Survived,
}

impl Star {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            center: config.center(),
            radius: config.star_radius,
            mass: config.star_mass_factor * config.star_radius,
        }
    }
}

impl Body {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, created_at: Duration) -> Self {
        Self {
            position,
            velocity,
            radius,
            last_collision: created_at,
        }
    }

    /// Advances the body by one frame: pull toward the star, move, then either
    /// report absorption or bounce off the viewport edges.
    ///
    /// Absorption is decided by the distance measured before the move, so a
    /// body that crosses into the star is removed on the following frame.
    /// One call is one frame; there is no delta-time scaling.
    pub fn update(&mut self, star: &Star, gravity: f32, bounds: Vec2) -> UpdateOutcome {
        let to_star = star.center - self.position;
        let distance = to_star.length();

        // At the exact center the direction is undefined; the body is inside
        // the star anyway and is absorbed below.
        if distance > 0.0 {
            let clamped = distance.max(MIN_GRAVITY_DISTANCE);
            let force = gravity * star.mass / (clamped * clamped);
            self.velocity += (to_star / distance) * force;
        }

        self.position += self.velocity;

        if distance < star.radius + self.radius {
            return UpdateOutcome::Absorbed;
        }

        let r = self.radius;
        if self.position.x - r < 0.0 || self.position.x + r > bounds.x {
            self.velocity.x = -self.velocity.x;
            self.position.x = clamp_lenient(self.position.x, r, bounds.x - r);
        }
        if self.position.y - r < 0.0 || self.position.y + r > bounds.y {
            self.velocity.y = -self.velocity.y;
            self.position.y = clamp_lenient(self.position.y, r, bounds.y - r);
        }

        UpdateOutcome::Survived
    }

    #[inline]
    pub fn overlaps(&self, other: &Body) -> bool {
        self.position.distance(other.position) < self.radius + other.radius
    }

    /// `true` once strictly more than `delay` has passed since the last collision.
    #[inline]
    pub fn is_cooled_down(&self, now: Duration, delay: Duration) -> bool {
        now.saturating_sub(self.last_collision) > delay
    }

    /// Collision eligibility between two bodies, ignoring distance.
    pub fn can_collide_with(&self, other: &Body, now: Duration, delay: Duration) -> bool {
        self.is_cooled_down(now, delay)
            && other.is_cooled_down(now, delay)
            && self.radius == other.radius
    }

    fn mark_collided(&mut self, now: Duration) {
        self.last_collision = self.last_collision.max(now);
    }
}

// --- Splitting ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRule {
    pub fragments: usize,
    pub ratio: f32,
    pub min_radius: f32,
    pub velocity_range: f32,
}

impl SplitRule {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            fragments: config.fragments_per_split,
            ratio: config.split_ratio,
            min_radius: config.min_split_radius,
            velocity_range: config.velocity_range,
        }
    }

    #[inline]
    pub fn fragment_radius(&self, parent: &Body) -> f32 {
        parent.radius * self.ratio
    }
}

/// Breaks `parent` into fragments at its position, each with a fresh random
/// velocity. Returns nothing when the fragments would be at or below the
/// minimum radius.
pub fn split_body(
    parent: &Body,
    rule: &SplitRule,
    random: &mut dyn RandomSource,
    now: Duration,
) -> Vec<Body> {
    let radius = rule.fragment_radius(parent);
    if radius <= rule.min_radius {
        return Vec::new();
    }
    (0..rule.fragments)
        .map(|_| {
            let velocity = random_velocity(&mut *random, rule.velocity_range);
            Body::new(parent.position, velocity, radius, now)
        })
        .collect()
}

// --- Statistics ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub frames: u64,
    pub absorbed: u64,
    pub collisions: u64,
    pub fragments_spawned: u64,
    pub peak_population: usize,
}

// --- Engine ---

pub struct SimulationState {
    bodies: Vec<Body>,
    config: SimulationConfig,
    star: Star,
    split_rule: SplitRule,
    clock: Box<dyn Clock>,
    random: Box<dyn RandomSource>,
    cue: Box<dyn CollisionCue>,
    is_paused: bool,
    stats: SimStats,
    // Reused every frame
    alive_buffer: Vec<bool>,
    spawned_buffer: Vec<Body>,
}

impl SimulationState {
    /// Creates an engine and spawns the initial population.
    pub fn new(
        config: SimulationConfig,
        clock: Box<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        let mut state = Self::with_bodies(config, clock, random, Vec::new())?;
        state.initialize_bodies();
        Ok(state)
    }

    /// Creates an engine over an explicit population instead of a random one.
    pub fn with_bodies(
        config: SimulationConfig,
        clock: Box<dyn Clock>,
        random: Box<dyn RandomSource>,
        bodies: Vec<Body>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let star = Star::from_config(&config);
        let split_rule = SplitRule::from_config(&config);
        let peak_population = bodies.len();
        Ok(Self {
            bodies,
            config,
            star,
            split_rule,
            clock,
            random,
            cue: Box::new(SilentCue),
            is_paused: false,
            stats: SimStats {
                peak_population,
                ..SimStats::default()
            },
            alive_buffer: Vec::new(),
            spawned_buffer: Vec::new(),
        })
    }

    pub fn with_cue(mut self, cue: Box<dyn CollisionCue>) -> Self {
        self.cue = cue;
        self
    }

    fn initialize_bodies(&mut self) {
        let now = self.clock.now();
        let radius = self.config.initial_planet_radius;
        // Spawn strictly inside the reflective box so the boundary invariant
        // holds from the first frame.
        let span = self.config.bounds() - Vec2::splat(radius * 2.0);
        self.bodies.clear();
        self.bodies.reserve(self.config.initial_population);
        for _ in 0..self.config.initial_population {
            let position = Vec2::new(
                radius + self.random.unit() * span.x,
                radius + self.random.unit() * span.y,
            );
            let velocity = random_velocity(self.random.as_mut(), self.config.velocity_range);
            self.bodies.push(Body::new(position, velocity, radius, now));
        }
        self.stats = SimStats {
            peak_population: self.bodies.len(),
            ..SimStats::default()
        };
    }

    /// Runs one frame: draws the backdrop and star, advances every body,
    /// resolves absorptions and collisions, draws the survivors and asks the
    /// scheduler for the next frame.
    pub fn step(&mut self, canvas: &mut dyn Canvas, scheduler: &dyn FrameScheduler) {
        canvas.clear(self.config.width, self.config.height);
        canvas.fill_background(self.config.background_color);
        canvas.draw_circle(self.star.center, self.star.radius, self.config.star_color);

        if self.is_paused {
            for body in &self.bodies {
                canvas.draw_circle(body.position, body.radius, self.config.planet_color);
            }
        } else {
            let now = self.clock.now();
            self.advance(now, canvas);
        }

        scheduler.request_next_frame();
    }

    fn advance(&mut self, now: Duration, canvas: &mut dyn Canvas) {
        let count = self.bodies.len();
        let bounds = self.config.bounds();
        let gravity = self.config.gravity;
        let delay = self.config.collision_delay;

        self.alive_buffer.clear();
        self.alive_buffer.resize(count, true);
        self.spawned_buffer.clear();

        // Highest index first; a body only looks for partners below itself.
        for i in (0..count).rev() {
            // Already consumed as the partner of a later body.
            if !self.alive_buffer[i] {
                continue;
            }

            let outcome = self.bodies[i].update(&self.star, gravity, bounds);
            if outcome == UpdateOutcome::Absorbed {
                self.alive_buffer[i] = false;
                self.stats.absorbed += 1;
                let body = &self.bodies[i];
                self.cue.on_absorbed(body.position, body.radius);
                continue;
            }

            if let Some(j) = self.find_partner(i, now, delay) {
                self.alive_buffer[i] = false;
                self.alive_buffer[j] = false;
                self.bodies[i].mark_collided(now);
                self.bodies[j].mark_collided(now);

                let before = self.spawned_buffer.len();
                for parent in [i, j] {
                    self.spawned_buffer.extend(split_body(
                        &self.bodies[parent],
                        &self.split_rule,
                        self.random.as_mut(),
                        now,
                    ));
                }
                self.stats.collisions += 1;
                self.stats.fragments_spawned += (self.spawned_buffer.len() - before) as u64;

                let body = &self.bodies[i];
                self.cue.on_collision(body.position, body.radius);
                continue;
            }

            let body = &self.bodies[i];
            canvas.draw_circle(body.position, body.radius, self.config.planet_color);
        }

        // --- Compact survivors, then append this frame's fragments ---
        let alive = &self.alive_buffer;
        let mut index = 0;
        self.bodies.retain(|_| {
            let keep = alive[index];
            index += 1;
            keep
        });
        self.bodies.append(&mut self.spawned_buffer);

        self.stats.frames += 1;
        self.stats.peak_population = self.stats.peak_population.max(self.bodies.len());
        log::trace!(
            "Frame {}: {} bodies",
            self.stats.frames,
            self.bodies.len()
        );
    }

    /// First live body below `i` that body `i` collides with, scanning downward.
    fn find_partner(&self, i: usize, now: Duration, delay: Duration) -> Option<usize> {
        let body = &self.bodies[i];
        if !body.is_cooled_down(now, delay) {
            return None;
        }
        (0..i).rev().find(|&j| {
            let other = &self.bodies[j];
            self.alive_buffer[j] && body.can_collide_with(other, now, delay) && body.overlaps(other)
        })
    }

    pub fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
        log::info!(
            "Simulation {}",
            if self.is_paused { "Paused" } else { "Resumed" }
        );
    }

    /// Re-seeds the random source (entropy when `seed` is `None`) and respawns
    /// the initial population.
    pub fn restart(&mut self, seed: Option<u64>) {
        log::info!("Restarting simulation (seed: {:?})", seed);
        self.random.reseed(seed);
        self.initialize_bodies();
        self.is_paused = false;
    }

    #[inline]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[inline]
    pub fn population(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn star(&self) -> &Star {
        &self.star
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> SimStats {
        self.stats
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{ManualClock, ManualScheduler, NullCanvas};
    use glam::Vec4;
    use std::cell::RefCell;
    use std::rc::Rc;

    // Cycles through a fixed list of samples for both `uniform` and `unit`.
    struct ScriptedRandom {
        values: Vec<f32>,
        next: usize,
    }

    impl ScriptedRandom {
        fn new(values: &[f32]) -> Self {
            Self {
                values: values.to_vec(),
                next: 0,
            }
        }

        fn take(&mut self) -> f32 {
            let value = self.values[self.next % self.values.len()];
            self.next += 1;
            value
        }
    }

    impl RandomSource for ScriptedRandom {
        fn uniform(&mut self) -> f32 {
            self.take()
        }

        fn unit(&mut self) -> f32 {
            self.take().abs()
        }
    }

    #[derive(Default)]
    struct RecordingCanvas {
        circles: Vec<(Vec2, f32, Vec4)>,
        background: Option<Vec4>,
    }

    impl Canvas for RecordingCanvas {
        fn clear(&mut self, _width: f32, _height: f32) {
            self.circles.clear();
            self.background = None;
        }

        fn fill_background(&mut self, color: Vec4) {
            self.background = Some(color);
        }

        fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
            self.circles.push((center, radius, color));
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum CueEvent {
        Collision(Vec2, f32),
        Absorbed(Vec2, f32),
    }

    // Shares its log with the test through an `Rc` since the engine owns the cue.
    #[derive(Default, Clone)]
    struct RecordingCue {
        events: Rc<RefCell<Vec<CueEvent>>>,
    }

    impl CollisionCue for RecordingCue {
        fn on_collision(&mut self, position: Vec2, radius: f32) {
            self.events.borrow_mut().push(CueEvent::Collision(position, radius));
        }

        fn on_absorbed(&mut self, position: Vec2, radius: f32) {
            self.events.borrow_mut().push(CueEvent::Absorbed(position, radius));
        }
    }

    fn star_at(center: Vec2, radius: f32) -> Star {
        Star {
            center,
            radius,
            mass: 0.1 * radius,
        }
    }

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::scaled(1000.0, 1000.0, 0.5);
        config.gravity = 0.0;
        config
    }

    fn engine(config: SimulationConfig, clock: &ManualClock, bodies: Vec<Body>) -> SimulationState {
        SimulationState::with_bodies(
            config,
            Box::new(clock.clone()),
            Box::new(ScriptedRandom::new(&[0.5, -0.25, 0.75, -1.0])),
            bodies,
        )
        .expect("valid config")
    }

    const LATER: Duration = Duration::from_secs(10);

    // --- Body::update ---

    #[test]
    fn gravity_pulls_toward_star_with_inverse_square_magnitude() {
        let star = star_at(Vec2::new(500.0, 500.0), 25.0);
        let mut body = Body::new(Vec2::new(600.0, 500.0), Vec2::ZERO, 5.0, Duration::ZERO);
        let outcome = body.update(&star, 125.0, Vec2::new(1000.0, 1000.0));

        assert_eq!(outcome, UpdateOutcome::Survived);
        let expected = 125.0 * 2.5 / (100.0 * 100.0);
        assert!(
            (body.velocity.x + expected).abs() < 1e-6,
            "velocity {:?}",
            body.velocity
        );
        assert!(body.velocity.y.abs() < 1e-6);
        assert!(body.position.x < 600.0);
    }

    #[test]
    fn zero_gravity_is_pure_translation() {
        let star = star_at(Vec2::new(500.0, 500.0), 25.0);
        let mut body = Body::new(Vec2::new(100.0, 100.0), Vec2::new(1.5, -0.5), 5.0, Duration::ZERO);
        for frame in 1..=20 {
            assert_eq!(body.update(&star, 0.0, Vec2::splat(1000.0)), UpdateOutcome::Survived);
            let expected = Vec2::new(100.0 + 1.5 * frame as f32, 100.0 - 0.5 * frame as f32);
            assert!((body.position - expected).length() < 1e-3, "frame {}", frame);
            assert_eq!(body.velocity, Vec2::new(1.5, -0.5));
        }
    }

    #[test]
    fn absorption_uses_pre_move_distance() {
        let star = star_at(Vec2::new(500.0, 500.0), 25.0);
        let bounds = Vec2::splat(1000.0);
        // Starts outside the combined radius (30) and moves inside it: the
        // frame it crosses it survives, the next frame it is absorbed.
        let mut body = Body::new(Vec2::new(531.0, 500.0), Vec2::new(-2.0, 0.0), 5.0, Duration::ZERO);
        assert_eq!(body.update(&star, 0.0, bounds), UpdateOutcome::Survived);
        assert_eq!(body.position, Vec2::new(529.0, 500.0));
        assert_eq!(body.update(&star, 0.0, bounds), UpdateOutcome::Absorbed);

        // Starts inside and moves out: absorbed anyway.
        let mut body = Body::new(Vec2::new(529.5, 500.0), Vec2::new(2.0, 0.0), 5.0, Duration::ZERO);
        assert_eq!(body.update(&star, 0.0, bounds), UpdateOutcome::Absorbed);
    }

    #[test]
    fn body_at_star_center_stays_finite() {
        let star = star_at(Vec2::new(500.0, 500.0), 25.0);
        let mut body = Body::new(Vec2::new(500.0, 500.0), Vec2::ZERO, 5.0, Duration::ZERO);
        assert_eq!(body.update(&star, 125.0, Vec2::splat(1000.0)), UpdateOutcome::Absorbed);
        assert!(body.velocity.is_finite());
        assert!(body.position.is_finite());

        let mut body = Body::new(Vec2::new(500.0 + 1e-6, 500.0), Vec2::ZERO, 5.0, Duration::ZERO);
        body.update(&star, 125.0, Vec2::splat(1000.0));
        assert!(body.velocity.is_finite(), "velocity {:?}", body.velocity);
    }

    #[test]
    fn edges_reflect_and_clamp() {
        let star = star_at(Vec2::new(500.0, 500.0), 25.0);
        let bounds = Vec2::new(1000.0, 800.0);
        let cases = [
            (Vec2::new(6.0, 400.0), Vec2::new(-3.0, 0.0)),
            (Vec2::new(994.0, 400.0), Vec2::new(3.0, 0.0)),
            (Vec2::new(300.0, 6.0), Vec2::new(0.0, -3.0)),
            (Vec2::new(300.0, 794.0), Vec2::new(0.0, 3.0)),
            (Vec2::new(2.0, 2.0), Vec2::new(-4.0, -4.0)),
        ];
        for (position, velocity) in cases {
            let mut body = Body::new(position, velocity, 5.0, Duration::ZERO);
            assert_eq!(body.update(&star, 0.0, bounds), UpdateOutcome::Survived);
            assert!(
                body.position.x >= 5.0 && body.position.x <= 995.0,
                "x out of bounds: {:?}",
                body.position
            );
            assert!(
                body.position.y >= 5.0 && body.position.y <= 795.0,
                "y out of bounds: {:?}",
                body.position
            );
            assert_eq!(body.velocity, -velocity, "velocity not reflected for {:?}", position);
        }
    }

    // --- Collision eligibility ---

    #[test]
    fn cooldown_is_strict() {
        let delay = Duration::from_millis(500);
        let body = Body::new(Vec2::ZERO, Vec2::ZERO, 5.0, Duration::from_millis(1000));
        assert!(!body.is_cooled_down(Duration::from_millis(1500), delay));
        assert!(body.is_cooled_down(Duration::from_millis(1501), delay));
        // A clock reading behind the timestamp never underflows.
        assert!(!body.is_cooled_down(Duration::ZERO, delay));
    }

    #[test]
    fn only_equal_radii_can_collide() {
        let delay = Duration::from_millis(500);
        let a = Body::new(Vec2::ZERO, Vec2::ZERO, 5.0, Duration::ZERO);
        let b = Body::new(Vec2::ZERO, Vec2::ZERO, 2.5, Duration::ZERO);
        let c = Body::new(Vec2::ZERO, Vec2::ZERO, 5.0, Duration::ZERO);
        assert!(!a.can_collide_with(&b, LATER, delay));
        assert!(a.can_collide_with(&c, LATER, delay));
    }

    // --- split_body ---

    #[test]
    fn split_yields_four_half_size_fragments() {
        let rule = SplitRule::from_config(&SimulationConfig::default());
        let parent = Body::new(Vec2::new(40.0, 60.0), Vec2::new(9.0, 9.0), 5.0, Duration::ZERO);
        let mut random = ScriptedRandom::new(&[0.5, -0.5, 0.25, -0.25]);
        let now = Duration::from_secs(3);
        let fragments = split_body(&parent, &rule, &mut random, now);

        assert_eq!(fragments.len(), 4);
        for fragment in &fragments {
            assert_eq!(fragment.radius, 2.5);
            assert_eq!(fragment.position, parent.position);
            assert_eq!(fragment.last_collision, now);
            assert!(fragment.velocity.abs().max_element() <= 1.0);
        }
        assert_eq!(fragments[0].velocity, Vec2::new(0.5, -0.5));
        assert_eq!(fragments[1].velocity, Vec2::new(0.25, -0.25));
    }

    #[test]
    fn split_respects_minimum_radius() {
        let rule = SplitRule::from_config(&SimulationConfig::default());
        let mut random = ScriptedRandom::new(&[0.1]);
        let at_floor = Body::new(Vec2::ZERO, Vec2::ZERO, 1.0, Duration::ZERO);
        assert!(split_body(&at_floor, &rule, &mut random, Duration::ZERO).is_empty());

        let above = Body::new(Vec2::ZERO, Vec2::ZERO, 1.25, Duration::ZERO);
        assert_eq!(split_body(&above, &rule, &mut random, Duration::ZERO).len(), 4);
    }

    // --- SimulationState::step ---

    #[test]
    fn overlapping_equal_pair_splits_into_fragments() {
        let clock = ManualClock::starting_at(LATER);
        let bodies = vec![
            Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
            Body::new(Vec2::new(104.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
        ];
        let mut sim = engine(quiet_config(), &clock, bodies);
        let mut canvas = RecordingCanvas::default();
        sim.step(&mut canvas, &ManualScheduler::new());

        assert_eq!(sim.population(), 8);
        assert!(sim.bodies().iter().all(|b| b.radius == 2.5));
        assert!(sim.bodies().iter().all(|b| b.last_collision == LATER));
        // First four from the higher-index parent.
        assert!(sim.bodies()[..4].iter().all(|b| b.position == Vec2::new(104.0, 100.0)));
        assert!(sim.bodies()[4..].iter().all(|b| b.position == Vec2::new(100.0, 100.0)));
        // Only the star was drawn.
        assert_eq!(canvas.circles.len(), 1);

        let stats = sim.stats();
        assert_eq!(stats.collisions, 1);
        assert_eq!(stats.fragments_spawned, 8);
        assert_eq!(stats.peak_population, 8);
    }

    #[test]
    fn different_radii_pass_through_each_other() {
        let clock = ManualClock::starting_at(LATER);
        let bodies = vec![
            Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
            Body::new(Vec2::new(101.0, 100.0), Vec2::ZERO, 2.5, Duration::ZERO),
        ];
        let mut sim = engine(quiet_config(), &clock, bodies.clone());
        sim.step(&mut NullCanvas::default(), &ManualScheduler::new());
        assert_eq!(sim.bodies(), &bodies[..]);
    }

    #[test]
    fn recent_collision_blocks_another() {
        let clock = ManualClock::starting_at(Duration::from_millis(1000));
        let bodies = vec![
            Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
            Body::new(Vec2::new(104.0, 100.0), Vec2::ZERO, 5.0, Duration::from_millis(700)),
        ];
        let mut sim = engine(quiet_config(), &clock, bodies);
        let scheduler = ManualScheduler::new();

        sim.step(&mut NullCanvas::default(), &scheduler);
        assert_eq!(sim.population(), 2, "collided inside the cooldown");

        clock.set(Duration::from_millis(1200));
        sim.step(&mut NullCanvas::default(), &scheduler);
        assert_eq!(sim.population(), 2, "exactly at the cooldown edge");

        clock.set(Duration::from_millis(1201));
        sim.step(&mut NullCanvas::default(), &scheduler);
        assert_eq!(sim.population(), 8);
    }

    #[test]
    fn fresh_fragments_do_not_collide_immediately() {
        let clock = ManualClock::starting_at(LATER);
        let bodies = vec![
            Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
            Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
        ];
        let mut sim = engine(quiet_config(), &clock, bodies);
        let scheduler = ManualScheduler::new();
        sim.step(&mut NullCanvas::default(), &scheduler);
        assert_eq!(sim.population(), 8);

        clock.advance(Duration::from_millis(100));
        sim.step(&mut NullCanvas::default(), &scheduler);
        assert_eq!(sim.population(), 8);
        assert_eq!(sim.stats().collisions, 1);
    }

    #[test]
    fn first_partner_found_wins() {
        let clock = ManualClock::starting_at(LATER);
        let bodies = vec![
            Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
            Body::new(Vec2::new(103.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
            Body::new(Vec2::new(106.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
        ];
        let mut sim = engine(quiet_config(), &clock, bodies);
        let mut canvas = RecordingCanvas::default();
        sim.step(&mut canvas, &ManualScheduler::new());

        // Bodies 2 and 1 pair up; body 0 survives untouched and is drawn.
        assert_eq!(sim.population(), 9);
        assert_eq!(sim.bodies()[0].position, Vec2::new(100.0, 100.0));
        assert_eq!(sim.bodies()[0].radius, 5.0);
        assert_eq!(canvas.circles.len(), 2);
        assert_eq!(sim.stats().collisions, 1);
    }

    #[test]
    fn absorbed_bodies_are_removed_and_not_drawn() {
        let clock = ManualClock::starting_at(LATER);
        let config = quiet_config();
        let center = config.center();
        let bodies = vec![
            Body::new(center + Vec2::new(10.0, 0.0), Vec2::ZERO, 5.0, Duration::ZERO),
            Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
        ];
        let mut sim = engine(config, &clock, bodies);
        let mut canvas = RecordingCanvas::default();
        sim.step(&mut canvas, &ManualScheduler::new());

        assert_eq!(sim.population(), 1);
        assert_eq!(sim.stats().absorbed, 1);
        assert_eq!(canvas.circles.len(), 2);
        assert_eq!(canvas.background, Some(sim.config().background_color));
        assert_eq!(canvas.circles[0], (center, 25.0, sim.config().star_color));
    }

    #[test]
    fn cue_fires_once_per_split_and_per_absorption() {
        let clock = ManualClock::starting_at(LATER);
        let config = quiet_config();
        let center = config.center();
        let bodies = vec![
            Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
            Body::new(Vec2::new(104.0, 100.0), Vec2::ZERO, 5.0, Duration::ZERO),
            Body::new(center + Vec2::new(10.0, 0.0), Vec2::ZERO, 5.0, Duration::ZERO),
            Body::new(Vec2::new(800.0, 800.0), Vec2::ZERO, 5.0, Duration::ZERO),
        ];
        let cue = RecordingCue::default();
        let mut sim = engine(config, &clock, bodies).with_cue(Box::new(cue.clone()));
        sim.step(&mut NullCanvas::default(), &ManualScheduler::new());

        // Scan runs from the highest index: the absorbed body first, then the pair.
        assert_eq!(
            *cue.events.borrow(),
            vec![
                CueEvent::Absorbed(center + Vec2::new(10.0, 0.0), 5.0),
                CueEvent::Collision(Vec2::new(104.0, 100.0), 5.0),
            ]
        );

        // Fragments are still cooling down and nothing else is near the star.
        clock.advance(Duration::from_millis(100));
        sim.step(&mut NullCanvas::default(), &ManualScheduler::new());
        assert_eq!(cue.events.borrow().len(), 2);
    }

    #[test]
    fn every_step_requests_the_next_frame() {
        let clock = ManualClock::starting_at(LATER);
        let mut sim = engine(quiet_config(), &clock, Vec::new());
        let scheduler = ManualScheduler::new();
        sim.step(&mut NullCanvas::default(), &scheduler);
        assert!(scheduler.take_request());
        sim.toggle_pause();
        sim.step(&mut NullCanvas::default(), &scheduler);
        assert!(scheduler.take_request());
    }

    #[test]
    fn paused_engine_redraws_without_moving() {
        let clock = ManualClock::starting_at(LATER);
        let bodies = vec![Body::new(Vec2::new(100.0, 100.0), Vec2::new(1.0, 1.0), 5.0, Duration::ZERO)];
        let mut sim = engine(quiet_config(), &clock, bodies.clone());
        sim.toggle_pause();
        assert!(sim.is_paused());

        let mut canvas = RecordingCanvas::default();
        sim.step(&mut canvas, &ManualScheduler::new());
        assert_eq!(sim.bodies(), &bodies[..]);
        assert_eq!(canvas.circles.len(), 2);
        assert_eq!(sim.stats().frames, 0);
    }

    #[test]
    fn initial_population_spawns_inside_bounds() {
        let clock = ManualClock::starting_at(Duration::from_millis(5));
        let config = SimulationConfig::scaled(400.0, 300.0, 0.5);
        let sim = SimulationState::new(
            config,
            Box::new(clock.clone()),
            Box::new(crate::interfaces::SeededRandom::new(Some(1))),
        )
        .expect("valid config");

        assert_eq!(sim.population(), 100);
        for body in sim.bodies() {
            assert_eq!(body.radius, 5.0);
            assert_eq!(body.last_collision, Duration::from_millis(5));
            assert!(body.position.x >= 5.0 && body.position.x <= 395.0);
            assert!(body.position.y >= 5.0 && body.position.y <= 295.0);
            assert!(body.velocity.abs().max_element() <= 1.0);
        }
    }

    #[test]
    fn restart_with_same_seed_reproduces_population() {
        let clock = ManualClock::starting_at(LATER);
        let mut sim = SimulationState::new(
            SimulationConfig::default(),
            Box::new(clock.clone()),
            Box::new(crate::interfaces::SeededRandom::new(Some(42))),
        )
        .expect("valid config");
        let original = sim.bodies().to_vec();

        for _ in 0..10 {
            sim.step(&mut NullCanvas::default(), &ManualScheduler::new());
        }
        sim.toggle_pause();
        sim.restart(Some(42));

        assert!(!sim.is_paused());
        assert_eq!(sim.bodies(), &original[..]);
        assert_eq!(sim.stats().frames, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = quiet_config();
        config.initial_planet_radius = -1.0;
        let result = SimulationState::new(
            config,
            Box::new(ManualClock::new()),
            Box::new(ScriptedRandom::new(&[0.0])),
        );
        assert!(matches!(result, Err(ConfigError::NonPositive { .. })));
    }
}
// --- End of File: simulation.rs ---
