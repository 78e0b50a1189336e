//! SkyCity Particles - pooled point particles
//!
//! Provides one shared particle pool for the scene with:
//! - Fixed capacity; emission past the cap is silently dropped
//! - Per-particle velocity/position integration, optionally split in two halves
//! - Alpha and size interpolated over normalized age
//! - Instance packing for the particle draw collaborator
//! - Radial burst and trail emission helpers

pub mod curves;
pub mod emitter;
pub mod particle;
pub mod system;

pub use emitter::{emit_burst, BurstConfig, TrailAnchor, TrailConfig, TrailEmitter};
pub use particle::{Particle, ParticleInstance, ParticlePool, ParticleSpawn};
pub use system::{ParticleRenderer, ParticleSystem, DEFAULT_CAPACITY, DEFAULT_PARALLEL_THRESHOLD};
