//! Emission helpers: one-shot radial bursts and continuous trails

use crate::particle::ParticleSpawn;
use crate::system::ParticleSystem;
use serde::Deserialize;
use skycity_core::{Color, SceneRng, Vec3};

/// Radial one-shot burst, used for the missile explosion.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    pub enabled: bool,
    pub particle_count: u32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_lifetime: f32,
    pub max_lifetime: f32,
    pub start_size: f32,
    pub end_size: f32,
    /// Downward acceleration, units per second squared
    pub gravity: f32,
    pub colors: Vec<Color>,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            particle_count: 420,
            min_speed: 550.0,
            max_speed: 1400.0,
            min_lifetime: 6.1,
            max_lifetime: 8.6,
            start_size: 280.0,
            end_size: 30.0,
            gravity: 220.0,
            colors: vec![
                Color::new(1.0, 0.35, 0.35, 1.0),
                Color::new(1.0, 0.7, 0.2, 1.0),
                Color::new(0.95, 0.95, 0.25, 1.0),
                Color::new(0.4, 0.9, 0.5, 1.0),
                Color::new(0.35, 0.6, 1.0, 1.0),
                Color::new(0.75, 0.4, 1.0, 1.0),
            ],
        }
    }
}

/// Emit a radial burst centered on `origin`. Returns how many particles the
/// pool accepted.
pub fn emit_burst(
    system: &mut ParticleSystem,
    rng: &mut SceneRng,
    config: &BurstConfig,
    origin: Vec3,
) -> usize {
    let gravity = Vec3::new(0.0, -config.gravity, 0.0);
    let mut accepted = 0;
    for _ in 0..config.particle_count {
        let direction = rng.unit_direction();
        let speed = rng.range(config.min_speed, config.max_speed);
        let color = rng.pick(&config.colors).copied().unwrap_or(Color::WHITE);
        let spawn = ParticleSpawn {
            position: origin,
            velocity: direction * speed,
            acceleration: gravity,
            color,
            start_size: config.start_size,
            end_size: config.end_size,
            lifetime: rng.range(config.min_lifetime, config.max_lifetime),
        };
        if !system.emit(&spawn) {
            log::debug!(
                "[particles] pool full, burst truncated at {}/{}",
                accepted,
                config.particle_count
            );
            break;
        }
        accepted += 1;
    }
    accepted
}

/// Continuous contrail shed behind a moving emitter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub enabled: bool,
    /// Particles per second per emitter
    pub spawn_rate: f32,
    pub particle_lifetime: f32,
    pub start_size: f32,
    pub end_size: f32,
    pub initial_speed: f32,
    pub speed_variance: f32,
    /// Distance behind the emitter where particles appear
    pub emission_offset: f32,
    pub horizontal_jitter: f32,
    pub vertical_jitter: f32,
    pub lateral_drift: f32,
    pub vertical_drift: f32,
    pub gravity: f32,
    pub max_particles: usize,
    pub colors: Vec<Color>,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_rate: 40.0,
            particle_lifetime: 3.2,
            start_size: 60.0,
            end_size: 40.0,
            initial_speed: 450.0,
            speed_variance: 120.0,
            emission_offset: 250.0,
            horizontal_jitter: 60.0,
            vertical_jitter: 40.0,
            lateral_drift: 80.0,
            vertical_drift: 40.0,
            gravity: 150.0,
            max_particles: 3000,
            colors: vec![
                Color::new(1.0, 0.25, 0.25, 0.92),
                Color::new(1.0, 0.6, 0.1, 0.9),
                Color::new(1.0, 0.95, 0.25, 0.9),
                Color::new(0.3, 0.9, 0.4, 0.88),
                Color::new(0.25, 0.45, 1.0, 0.9),
            ],
        }
    }
}

/// World-space frame of a trail emitter for one frame.
#[derive(Debug, Clone, Copy)]
pub struct TrailAnchor {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Per-emitter fractional spawn accumulator.
#[derive(Debug, Clone, Default)]
pub struct TrailEmitter {
    accumulator: f32,
}

impl TrailEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Shed this frame's share of particles. Returns the number accepted.
    pub fn emit(
        &mut self,
        system: &mut ParticleSystem,
        rng: &mut SceneRng,
        config: &TrailConfig,
        anchor: &TrailAnchor,
        color: Color,
        dt: f32,
    ) -> usize {
        if config.spawn_rate <= 0.0 || dt <= 0.0 {
            return 0;
        }
        self.accumulator += config.spawn_rate * dt;
        let count = self.accumulator.floor();
        self.accumulator -= count;

        let back = -anchor.forward;
        let gravity = Vec3::new(0.0, -config.gravity, 0.0);
        let mut accepted = 0;
        for _ in 0..count as u32 {
            let position = anchor.position
                + back * config.emission_offset
                + anchor.right * rng.symmetric(config.horizontal_jitter)
                + anchor.up * rng.symmetric(config.vertical_jitter);
            let speed = config.initial_speed + rng.symmetric(config.speed_variance);
            let velocity = back * speed
                + anchor.right * rng.symmetric(config.lateral_drift)
                + anchor.up * rng.symmetric(config.vertical_drift);
            let spawn = ParticleSpawn {
                position,
                velocity,
                acceleration: gravity,
                color,
                start_size: config.start_size,
                end_size: config.end_size,
                lifetime: config.particle_lifetime,
            };
            if system.emit(&spawn) {
                accepted += 1;
            }
        }
        accepted
    }
}
