//! Sky lanterns rising along randomized Bezier paths
//!
//! A fixed pool of lantern meshes is recycled: every spawn interval a random
//! batch of inactive slots is launched, each along its own cubic curve from a
//! ground point up to a target height. Active lanterns also contribute one
//! point light each.

use serde::Deserialize;
use skycity_core::bezier::{cubic_bezier, cubic_bezier_tangent};
use skycity_core::{Mat4, SceneRng, Transform, Vec3};
use skycity_runtime::{EventBus, LanternLight, RenderBridge, SceneEvent, SceneRenderer};

/// Target height jitter around `speed * lifetime`.
const TARGET_JITTER: f32 = 0.3;
/// Minimum rise between consecutive control points after repair.
const REPAIR_STEP: f32 = 1.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanternConfig {
    pub enabled: bool,
    pub pool_size: usize,
    pub spawn_center: Vec3,
    pub spawn_half_extents: Vec3,
    pub spawn_interval: f64,
    pub spawn_start_time: f64,
    /// Inclusive `[min, max]` lanterns per batch
    pub spawn_count_range: [u32; 2],
    pub min_lifetime: f32,
    pub max_lifetime: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub target_height_min: f32,
    pub target_height_max: f32,
    pub horizontal_drift: f32,
    pub scale: f32,
    pub light_color: Vec3,
    pub light_intensity: f32,
    pub light_radius: f32,
    pub mesh_prefix: String,
}

impl Default for LanternConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pool_size: 120,
            spawn_center: Vec3::new(0.0, 0.0, -5000.0),
            spawn_half_extents: Vec3::new(5000.0, 0.0, 5000.0),
            spawn_interval: 1.1,
            spawn_start_time: 25.0,
            spawn_count_range: [5, 8],
            min_lifetime: 20.0,
            max_lifetime: 50.0,
            min_speed: 50.0,
            max_speed: 150.0,
            target_height_min: 4000.0,
            target_height_max: 99000.0,
            horizontal_drift: 600.0,
            scale: 0.25,
            light_color: Vec3::new(1.0, 0.7, 0.4),
            light_intensity: 25.0,
            light_radius: 1500.0,
            mesh_prefix: "lantern_".to_string(),
        }
    }
}

impl LanternConfig {
    pub fn mesh_name(&self, index: usize) -> String {
        format!("{}{}", self.mesh_prefix, index)
    }
}

#[derive(Debug, Clone)]
pub struct LanternInstance {
    pub active: bool,
    pub age: f32,
    pub duration: f32,
    pub speed: f32,
    /// Control points `p0..p3`; `p0` sits on the ground
    pub control: [Vec3; 4],
    pub position: Vec3,
    /// Degrees about `+y`
    pub yaw: f32,
    pub mesh_name: String,
    /// A zero-scale transform still has to reach the renderer
    needs_hide: bool,
    /// Launched during the current update; starts aging next frame
    fresh: bool,
}

impl LanternInstance {
    fn new(mesh_name: String) -> Self {
        Self {
            active: false,
            age: 0.0,
            duration: 0.0,
            speed: 0.0,
            control: [Vec3::ZERO; 4],
            position: Vec3::ZERO,
            yaw: 0.0,
            mesh_name,
            needs_hide: true,
            fresh: false,
        }
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.age = 0.0;
        self.duration = 0.0;
        self.needs_hide = true;
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        self.age / self.duration
    }

    fn sample(&mut self, t: f32) {
        let [p0, p1, p2, p3] = self.control;
        self.position = cubic_bezier(p0, p1, p2, p3, t);
        let heading = cubic_bezier_tangent(p0, p1, p2, p3, t).horizontal();
        if heading.length() > 1e-4 {
            self.yaw = heading.x.atan2(heading.z).to_degrees();
        }
    }

    pub fn transform(&self, scale: f32) -> Mat4 {
        if !self.active {
            return Transform::hidden().to_matrix();
        }
        Transform::from_position(self.position)
            .with_yaw(self.yaw)
            .with_uniform_scale(scale)
            .to_matrix()
    }
}

fn drifted(rng: &mut SceneRng, ground: Vec3, drift: f32, height: f32) -> Vec3 {
    ground + Vec3::new(rng.symmetric(drift), height, rng.symmetric(drift))
}

/// Raise each control point to at least `previous + REPAIR_STEP` when it
/// dips below its predecessor, so the path never descends between them.
pub fn repair_control_points(control: &mut [Vec3; 4]) {
    for i in 1..control.len() {
        let floor = control[i - 1].y;
        if control[i].y < floor {
            control[i].y = floor + REPAIR_STEP;
        }
    }
}

pub struct LanternPool {
    config: LanternConfig,
    instances: Vec<LanternInstance>,
    spawn_timer: f64,
    lights: Vec<LanternLight>,
    total_spawned: usize,
}

impl LanternPool {
    pub fn new(config: LanternConfig) -> Self {
        let instances = (0..config.pool_size)
            .map(|i| LanternInstance::new(config.mesh_name(i)))
            .collect();
        Self {
            config,
            instances,
            spawn_timer: 0.0,
            lights: Vec::new(),
            total_spawned: 0,
        }
    }

    pub fn config(&self) -> &LanternConfig {
        &self.config
    }

    pub fn instances(&self) -> &[LanternInstance] {
        &self.instances
    }

    pub fn active_count(&self) -> usize {
        self.instances.iter().filter(|l| l.active).count()
    }

    pub fn total_spawned(&self) -> usize {
        self.total_spawned
    }

    /// Light list for this frame; empty when disabled or none are aloft.
    pub fn lights(&self) -> &[LanternLight] {
        &self.lights
    }

    /// Advance spawning and every active lantern by `dt` at scene time `now`.
    pub fn update(&mut self, dt: f64, now: f64, rng: &mut SceneRng, events: &mut EventBus) {
        self.lights.clear();
        if !self.config.enabled {
            return;
        }

        if now >= self.config.spawn_start_time && self.config.spawn_interval > 0.0 {
            self.spawn_timer += dt.max(0.0);
            while self.spawn_timer >= self.config.spawn_interval {
                self.spawn_timer -= self.config.spawn_interval;
                let count = self.spawn_batch(rng);
                if count > 0 {
                    log::debug!("[lanterns] launched {} at {:.2}s", count, now);
                    events.push(SceneEvent::LanternsSpawned { count });
                }
            }
        }

        let dt = dt.max(0.0) as f32;
        for lantern in self.instances.iter_mut().filter(|l| l.active) {
            if lantern.fresh {
                lantern.fresh = false;
            } else {
                lantern.age += dt;
            }
            let t = lantern.progress();
            if t >= 1.0 {
                lantern.deactivate();
                continue;
            }
            lantern.sample(t);
            self.lights.push(LanternLight {
                position: lantern.position,
                color: self.config.light_color,
                intensity: self.config.light_intensity,
                radius: self.config.light_radius,
            });
        }
    }

    fn spawn_batch(&mut self, rng: &mut SceneRng) -> usize {
        let [min, max] = self.config.spawn_count_range;
        let wanted = rng.range_inclusive(min, max) as usize;
        let free = self.instances.len() - self.active_count();
        let count = wanted.min(free);

        let mut launched = 0;
        for index in 0..self.instances.len() {
            if launched == count {
                break;
            }
            if self.instances[index].active {
                continue;
            }
            self.launch(index, rng);
            launched += 1;
        }
        self.total_spawned += launched;
        launched
    }

    fn launch(&mut self, index: usize, rng: &mut SceneRng) {
        let c = &self.config;
        let speed = rng.range(c.min_speed, c.max_speed);
        let duration = rng.range(c.min_lifetime, c.max_lifetime).max(0.01);

        let ground = c.spawn_center
            + Vec3::new(
                rng.symmetric(c.spawn_half_extents.x),
                0.0,
                rng.symmetric(c.spawn_half_extents.z),
            );
        let jitter = 1.0 + rng.symmetric(TARGET_JITTER);
        let target = (speed * duration * jitter).clamp(c.target_height_min, c.target_height_max);

        let drift = c.horizontal_drift;
        let f1 = rng.range(0.15, 0.6);
        let p1 = drifted(rng, ground, drift, target * f1);
        let f2 = rng.range(0.4, 0.9);
        let p2 = drifted(rng, ground, drift, target * f2);
        let p3 = drifted(rng, ground, drift, target);

        let mut control = [ground, p1, p2, p3];
        repair_control_points(&mut control);

        let lantern = &mut self.instances[index];
        lantern.active = true;
        lantern.needs_hide = false;
        lantern.fresh = true;
        lantern.age = 0.0;
        lantern.duration = duration;
        lantern.speed = speed;
        lantern.control = control;
        lantern.sample(0.0);
    }

    /// Push transforms for active lanterns and hide newly retired ones.
    pub fn push_transforms(&mut self, renderer: &mut dyn SceneRenderer, bridge: &mut RenderBridge) {
        let scale = self.config.scale;
        for lantern in &mut self.instances {
            if lantern.active {
                bridge.set_transform(renderer, &lantern.mesh_name, &lantern.transform(scale));
            } else if lantern.needs_hide {
                bridge.set_transform(renderer, &lantern.mesh_name, &lantern.transform(scale));
                lantern.needs_hide = false;
            }
        }
    }
}
