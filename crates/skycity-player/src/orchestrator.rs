//! Per-frame driver of the whole scene
//!
//! The orchestrator owns every subsystem and advances them in a fixed order
//! each frame:
//!
//! 1. airplane and formation
//! 2. missile
//! 3. scene events (explosion burst, resume signal)
//! 4. entity transforms
//! 5. camera choreography and camera push
//! 6. lanterns and the light list
//! 7. flag worker poll/schedule
//! 8. trails, particle integration and the particle snapshot

use crate::config::SceneConfig;
use skycity_choreo::{CameraChoreographer, ChoreoSignals, ChoreographyPhase};
use skycity_core::{Result, SceneRng, Vec3};
use skycity_entities::{Airplane, Formation, FormationTrails, LanternPool, Missile};
use skycity_flag::AsyncFlagUpdater;
use skycity_particles::{emit_burst, ParticleRenderer, ParticleSystem};
use skycity_runtime::{EventBus, EventTally, FrameTime, RenderBridge, SceneEvent, SceneRenderer};
use std::fmt;

const LANTERN_STREAM: u64 = 1;
const EXPLOSION_STREAM: u64 = 2;
const TRAIL_STREAM: u64 = 3;

struct SceneRngs {
    lanterns: SceneRng,
    explosion: SceneRng,
    trails: SceneRng,
}

impl SceneRngs {
    fn new(seed: u64) -> Self {
        Self {
            lanterns: SceneRng::derive(seed, LANTERN_STREAM),
            explosion: SceneRng::derive(seed, EXPLOSION_STREAM),
            trails: SceneRng::derive(seed, TRAIL_STREAM),
        }
    }
}

pub struct Orchestrator {
    config: SceneConfig,
    airplane: Airplane,
    formation: Formation,
    missile: Missile,
    trails: FormationTrails,
    lanterns: LanternPool,
    flag: Option<AsyncFlagUpdater>,
    particles: ParticleSystem,
    choreographer: CameraChoreographer,
    events: EventBus,
    bridge: RenderBridge,
    rngs: SceneRngs,
    impact: Option<Vec3>,
    time: FrameTime,
    frames: u64,
}

impl Orchestrator {
    pub fn new(config: SceneConfig) -> Result<Self> {
        config.validate()?;

        let choreographer = CameraChoreographer::new(config.camera.clone())?;
        let flag = if config.flag.enabled {
            Some(AsyncFlagUpdater::new(config.flag.clone())?)
        } else {
            None
        };
        let particles = ParticleSystem::with_parallel_threshold(
            config.particle_capacity(),
            config.particles.parallel_threshold,
        );
        log::info!(
            "[scene] seed {}, particle capacity {}, {} lanterns",
            config.seed,
            particles.capacity(),
            config.lanterns.pool_size
        );

        Ok(Self {
            airplane: Airplane::new(config.airplane.clone()),
            formation: Formation::new(config.formation.clone()),
            missile: Missile::new(config.missile.clone()),
            trails: FormationTrails::new(),
            lanterns: LanternPool::new(config.lanterns.clone()),
            flag,
            particles,
            choreographer,
            events: EventBus::new(),
            bridge: RenderBridge::new(),
            rngs: SceneRngs::new(config.seed),
            impact: None,
            time: FrameTime::default(),
            frames: 0,
            config,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn airplane(&self) -> &Airplane {
        &self.airplane
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn missile(&self) -> &Missile {
        &self.missile
    }

    pub fn lanterns(&self) -> &LanternPool {
        &self.lanterns
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn flag(&self) -> Option<&AsyncFlagUpdater> {
        self.flag.as_ref()
    }

    pub fn choreographer(&self) -> &CameraChoreographer {
        &self.choreographer
    }

    pub fn bridge(&self) -> &RenderBridge {
        &self.bridge
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Lifecycle events raised so far, by kind.
    pub fn event_tally(&self) -> EventTally {
        self.events.tally()
    }

    /// Run one frame against `renderer`.
    pub fn frame<R>(&mut self, time: FrameTime, renderer: &mut R)
    where
        R: SceneRenderer + ParticleRenderer,
    {
        self.time = time;
        let dt = time.delta.max(0.0);

        self.airplane.update(&time, &mut self.events);
        self.formation.update(&self.airplane);

        self.missile.update(&time, &self.airplane, &mut self.events);

        self.handle_events();

        self.push_entity_transforms(renderer);

        let signals = self.choreo_signals();
        self.choreographer.update(&signals);
        renderer.set_camera(&self.choreographer.matrices());

        self.lanterns
            .update(dt, time.total, &mut self.rngs.lanterns, &mut self.events);
        self.lanterns.push_transforms(renderer, &mut self.bridge);
        renderer.set_lantern_lights(self.lanterns.lights());

        if let Some(flag) = self.flag.as_mut() {
            flag.update(dt as f32, renderer, &mut self.bridge);
        }

        self.trails.emit(
            &mut self.particles,
            &mut self.rngs.trails,
            &self.config.trails,
            &self.airplane,
            &self.formation,
            dt as f32,
        );
        self.particles.update(dt as f32);
        renderer.draw_particles(self.particles.snapshot());

        self.frames += 1;
    }

    fn handle_events(&mut self) {
        for event in self.events.drain() {
            match event {
                SceneEvent::MissileImpact { position, time } => {
                    self.impact = Some(position);
                    if self.config.explosion.enabled {
                        let accepted = emit_burst(
                            &mut self.particles,
                            &mut self.rngs.explosion,
                            &self.config.explosion,
                            position,
                        );
                        log::info!("[scene] explosion at {:.2}s, {} particles", time, accepted);
                    }
                }
                SceneEvent::AirplaneDespawned { time } => {
                    self.trails.reset();
                    if self.impact.is_some() {
                        log::info!("[scene] airplane gone after impact, resuming at {:.2}s", time);
                    }
                }
                other => log::debug!("[scene] {:?}", other),
            }
        }
    }

    fn push_entity_transforms(&mut self, renderer: &mut dyn SceneRenderer) {
        let airplane = self.airplane.transform();
        self.bridge
            .set_transform(renderer, &self.config.airplane.mesh_name, &airplane);
        for (name, matrix) in self.formation.transforms(&self.airplane) {
            self.bridge.set_transform(renderer, name, &matrix);
        }
        let missile = self.missile.transform();
        self.bridge
            .set_transform(renderer, &self.config.missile.mesh_name, &missile);
    }

    fn choreo_signals(&self) -> ChoreoSignals {
        let now = self.time.total;
        let tracker = self
            .missile
            .camera_request(now)
            .or_else(|| self.airplane.camera_request());
        ChoreoSignals {
            total_time: now,
            airplane_active: self.airplane.is_active(),
            missile_active: self.missile.is_falling(),
            missile_exploded: self.impact,
            resuming: self.impact.is_some() && self.airplane.is_gone(),
            tracker,
            entities_exhausted: self.airplane.is_gone() && !self.missile.is_falling(),
        }
    }

    pub fn summary(&self) -> SceneSummary {
        let pose = self.choreographer.pose();
        SceneSummary {
            time: self.time.total,
            phase: *self.choreographer.phase(),
            camera_position: pose.position,
            fov: pose.fov,
            airplane_active: self.airplane.is_active(),
            missile_falling: self.missile.is_falling(),
            exploded: self.impact.is_some(),
            lanterns: self.lanterns.active_count(),
            particles: self.particles.active_particle_count(),
        }
    }
}

/// Snapshot of the scene state for periodic logging.
#[derive(Debug, Clone, Copy)]
pub struct SceneSummary {
    pub time: f64,
    pub phase: ChoreographyPhase,
    pub camera_position: Vec3,
    pub fov: f32,
    pub airplane_active: bool,
    pub missile_falling: bool,
    pub exploded: bool,
    pub lanterns: usize,
    pub particles: usize,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            ChoreographyPhase::Scripted { segment } => format!("scripted[{segment}]"),
            other => other.name().to_string(),
        };
        write!(
            f,
            "[scene] t={:6.2}s camera={} pos=({:.0}, {:.0}, {:.0}) fov={:.1} airplane={} missile={} lanterns={} particles={}",
            self.time,
            phase,
            self.camera_position.x,
            self.camera_position.y,
            self.camera_position.z,
            self.fov,
            if self.airplane_active { "flying" } else { "-" },
            if self.exploded {
                "exploded"
            } else if self.missile_falling {
                "falling"
            } else {
                "-"
            },
            self.lanterns,
            self.particles
        )
    }
}
