//! Particle types: CPU simulation state and draw instance data

use crate::curves::{fade_alpha, lerp_f32};
use bytemuck::{Pod, Zeroable};
use skycity_core::{Color, Vec3};

/// Shortest lifetime a particle may be emitted with.
pub const MIN_LIFETIME: f32 = 0.01;

/// Initial state for one emitted particle.
#[derive(Clone, Copy, Debug)]
pub struct ParticleSpawn {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub color: Color,
    pub start_size: f32,
    pub end_size: f32,
    pub lifetime: f32,
}

/// CPU-side particle state
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub base_color: Color,
    pub start_size: f32,
    pub end_size: f32,
    pub lifetime: f32,
    pub age: f32,
    pub render_color: Color,
    pub render_size: f32,
}

impl Particle {
    pub fn from_spawn(spawn: &ParticleSpawn) -> Self {
        Self {
            position: spawn.position,
            velocity: spawn.velocity,
            acceleration: spawn.acceleration,
            base_color: spawn.color,
            start_size: spawn.start_size,
            end_size: spawn.end_size,
            lifetime: spawn.lifetime.max(MIN_LIFETIME),
            age: 0.0,
            render_color: spawn.color,
            render_size: spawn.start_size,
        }
    }

    /// Normalized age in [0, 1]
    pub fn age_ratio(&self) -> f32 {
        (self.age / self.lifetime).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }

    /// Advance one step. Touches nothing but this particle.
    pub fn integrate(&mut self, dt: f32) {
        self.age += dt;
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;

        let ratio = self.age_ratio();
        self.render_color = fade_alpha(self.base_color, ratio);
        self.render_size = lerp_f32(self.start_size, self.end_size, ratio);
    }
}

/// Draw instance data, 32 bytes (2 rows of vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub pos_size: [f32; 4], // xyz = position, w = size
    pub color: [f32; 4],    // rgba
}

impl ParticleInstance {
    pub fn from_particle(p: &Particle) -> Self {
        Self {
            pos_size: [p.position.x, p.position.y, p.position.z, p.render_size],
            color: p.render_color.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.pos_size[0], self.pos_size[1], self.pos_size[2])
    }

    pub fn size(&self) -> f32 {
        self.pos_size[3]
    }
}

/// Swap-remove pool for O(1) particle kill and contiguous alive iteration.
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn alive_count(&self) -> usize {
        self.particles.len()
    }

    /// Add one particle. Returns false, dropping it, if the pool is full.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.capacity {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Remove expired particles via swap-remove.
    pub fn compact(&mut self) {
        let mut i = 0;
        while i < self.particles.len() {
            if self.particles[i].is_expired() {
                // The swapped-in particle still needs checking
                self.particles.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn alive_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn alive_slice_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_at(x: f32, lifetime: f32) -> Particle {
        Particle::from_spawn(&ParticleSpawn {
            position: Vec3::new(x, 0.0, 0.0),
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            color: Color::WHITE,
            start_size: 1.0,
            end_size: 0.0,
            lifetime,
        })
    }

    #[test]
    fn pool_spawn_and_kill() {
        let mut pool = ParticlePool::new(4);
        for i in 0..3 {
            assert!(pool.spawn(spawn_at(i as f32, 1.0)));
        }
        assert_eq!(pool.alive_count(), 3);

        pool.alive_slice_mut()[1].age = 2.0;
        pool.compact();
        assert_eq!(pool.alive_count(), 2);

        assert!(pool.spawn(spawn_at(5.0, 1.0)));
        assert!(pool.spawn(spawn_at(6.0, 1.0)));
        assert!(!pool.spawn(spawn_at(7.0, 1.0)));
        assert_eq!(pool.alive_count(), 4);
    }

    #[test]
    fn lifetime_is_clamped() {
        let p = spawn_at(0.0, 0.0);
        assert_eq!(p.lifetime, MIN_LIFETIME);
    }

    #[test]
    fn integrate_applies_acceleration_before_position() {
        let mut p = Particle::from_spawn(&ParticleSpawn {
            position: Vec3::ZERO,
            velocity: Vec3::new(10.0, 0.0, 0.0),
            acceleration: Vec3::new(0.0, -220.0, 0.0),
            color: Color::new(1.0, 0.7, 0.2, 1.0),
            start_size: 280.0,
            end_size: 30.0,
            lifetime: 2.0,
        });
        p.integrate(0.5);
        assert!((p.velocity.y + 110.0).abs() < 1e-4);
        assert!((p.position.y + 55.0).abs() < 1e-4);
        assert!((p.position.x - 5.0).abs() < 1e-5);
        assert!((p.render_color.a - 0.75).abs() < 1e-6);
        assert!((p.render_size - 217.5).abs() < 1e-3);
    }

    #[test]
    fn particle_instance_layout() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);
        assert_eq!(std::mem::align_of::<ParticleInstance>(), 4);
    }
}
