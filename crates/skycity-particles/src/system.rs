//! The scene's shared particle pool and its per-frame update

use crate::particle::{Particle, ParticleInstance, ParticlePool, ParticleSpawn};

pub const DEFAULT_CAPACITY: usize = 2000;

/// Alive count above which integration is split across two workers.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1200;

/// Instances below these are invisible and left out of the snapshot.
const MIN_VISIBLE_ALPHA: f32 = 0.001;

/// Consumer of the per-frame particle snapshot. Never mutates particles.
pub trait ParticleRenderer {
    fn draw_particles(&mut self, instances: &[ParticleInstance]);
}

/// Capped particle pool with integration, expiry and snapshot packing.
pub struct ParticleSystem {
    pool: ParticlePool,
    parallel_threshold: usize,
    /// Pre-allocated buffer for packing visible particles
    instance_buffer: Vec<ParticleInstance>,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ParticleSystem {
    pub fn new(capacity: usize) -> Self {
        Self::with_parallel_threshold(capacity, DEFAULT_PARALLEL_THRESHOLD)
    }

    pub fn with_parallel_threshold(capacity: usize, parallel_threshold: usize) -> Self {
        Self {
            pool: ParticlePool::new(capacity),
            parallel_threshold,
            instance_buffer: Vec::with_capacity(capacity),
        }
    }

    /// Add a particle. Dropped without error once the pool is full.
    pub fn emit(&mut self, spawn: &ParticleSpawn) -> bool {
        self.pool.spawn(Particle::from_spawn(spawn))
    }

    pub fn active_particle_count(&self) -> usize {
        self.pool.alive_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn particles(&self) -> &[Particle] {
        self.pool.alive_slice()
    }

    pub fn clear(&mut self) {
        self.pool.clear();
        self.instance_buffer.clear();
    }

    /// Integrate every live particle, drop expired ones and repack the snapshot.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        let alive = self.pool.alive_slice_mut();

        if alive.len() > self.parallel_threshold {
            let mid = alive.len() / 2;
            let (front, back) = alive.split_at_mut(mid);
            rayon::join(|| integrate(front, dt), || integrate(back, dt));
        } else {
            integrate(alive, dt);
        }

        self.pool.compact();
        self.pack_instances();
    }

    /// Visible particles as of the last update.
    pub fn snapshot(&self) -> &[ParticleInstance] {
        &self.instance_buffer
    }

    fn pack_instances(&mut self) {
        self.instance_buffer.clear();
        for p in self.pool.alive_slice() {
            if p.render_color.a <= MIN_VISIBLE_ALPHA || p.render_size <= 0.0 {
                continue;
            }
            self.instance_buffer.push(ParticleInstance::from_particle(p));
        }
    }
}

fn integrate(particles: &mut [Particle], dt: f32) {
    for p in particles {
        p.integrate(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycity_core::{Color, SceneRng, Vec3};

    fn random_spawn(rng: &mut SceneRng) -> ParticleSpawn {
        ParticleSpawn {
            position: Vec3::new(rng.symmetric(100.0), rng.range(0.0, 50.0), rng.symmetric(100.0)),
            velocity: rng.unit_direction() * rng.range(550.0, 1400.0),
            acceleration: Vec3::new(0.0, -220.0, 0.0),
            color: Color::new(rng.next_f32(), rng.next_f32(), rng.next_f32(), 1.0),
            start_size: 280.0,
            end_size: 30.0,
            lifetime: rng.range(0.05, 3.0),
        }
    }

    #[test]
    fn emit_never_exceeds_capacity() {
        let mut system = ParticleSystem::new(16);
        let mut rng = SceneRng::new(1);
        let mut accepted = 0;
        for _ in 0..100 {
            if system.emit(&random_spawn(&mut rng)) {
                accepted += 1;
            }
            assert!(system.active_particle_count() <= system.capacity());
        }
        assert_eq!(accepted, 16);
        assert_eq!(system.active_particle_count(), 16);
    }

    #[test]
    fn expired_particles_are_removed() {
        let mut system = ParticleSystem::new(8);
        let mut spawn = random_spawn(&mut SceneRng::new(2));
        spawn.lifetime = 0.5;
        system.emit(&spawn);
        spawn.lifetime = 2.0;
        system.emit(&spawn);

        system.update(0.5);
        assert_eq!(system.active_particle_count(), 1);
        system.update(1.5);
        assert_eq!(system.active_particle_count(), 0);
        assert!(system.snapshot().is_empty());
    }

    #[test]
    fn negative_dt_is_clamped() {
        let mut system = ParticleSystem::new(4);
        let spawn = random_spawn(&mut SceneRng::new(3));
        system.emit(&spawn);
        system.update(-1.0);
        let p = &system.particles()[0];
        assert_eq!(p.age, 0.0);
        assert_eq!(p.position, spawn.position);
    }

    #[test]
    fn split_update_is_bit_identical() {
        let mut rng = SceneRng::new(99);
        let spawns: Vec<ParticleSpawn> = (0..1500).map(|_| random_spawn(&mut rng)).collect();

        let mut split = ParticleSystem::with_parallel_threshold(2000, 0);
        let mut serial = ParticleSystem::with_parallel_threshold(2000, usize::MAX);
        for s in &spawns {
            split.emit(s);
            serial.emit(s);
        }

        for _ in 0..40 {
            split.update(1.0 / 60.0);
            serial.update(1.0 / 60.0);
        }

        let a: &[u8] = bytemuck::cast_slice(split.snapshot());
        let b: &[u8] = bytemuck::cast_slice(serial.snapshot());
        assert!(!a.is_empty());
        assert_eq!(a, b);
        assert_eq!(split.active_particle_count(), serial.active_particle_count());
    }

    #[test]
    fn snapshot_skips_invisible_particles() {
        let mut system = ParticleSystem::new(4);
        let mut spawn = random_spawn(&mut SceneRng::new(4));
        spawn.end_size = 0.0;
        spawn.start_size = 0.0;
        system.emit(&spawn);
        system.update(0.01);
        assert_eq!(system.active_particle_count(), 1);
        assert!(system.snapshot().is_empty());
    }
}
