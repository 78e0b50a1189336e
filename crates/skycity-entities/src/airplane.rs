//! Airplane flyover lifecycle

use crate::Basis;
use serde::Deserialize;
use skycity_choreo::CameraRequest;
use skycity_core::{Mat4, Transform, Vec3};
use skycity_runtime::{EventBus, FrameTime, SceneEvent};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AirplaneConfig {
    /// Absolute scene time of the spawn; `<= 0` spawns on the first frame
    pub spawn_time: f64,
    /// Seconds of flight before despawn; 0 keeps it flying forever
    pub lifetime: f64,
    pub height: f32,
    pub speed: f32,
    pub direction: Vec3,
    pub start_position: Vec3,
    pub scale: f32,
    pub camera_tracking: bool,
    pub camera_distance: f32,
    pub camera_height: f32,
    /// Chase from behind instead of turning the camera in place
    pub camera_follow_position: bool,
    pub mesh_name: String,
}

impl Default for AirplaneConfig {
    fn default() -> Self {
        Self {
            spawn_time: 16.0,
            lifetime: 15.0,
            height: 8000.0,
            speed: 3000.0,
            direction: Vec3::RIGHT,
            start_position: Vec3::new(-20000.0, 0.0, -8000.0),
            scale: 30.0,
            camera_tracking: true,
            camera_distance: 2000.0,
            camera_height: 600.0,
            camera_follow_position: false,
            mesh_name: "airplane".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AirplanePhase {
    Pending,
    Active { spawned_at: f64 },
    Gone { spawned_at: f64, despawned_at: f64 },
}

pub struct Airplane {
    config: AirplaneConfig,
    phase: AirplanePhase,
    position: Vec3,
    basis: Basis,
}

impl Airplane {
    pub fn new(config: AirplaneConfig) -> Self {
        let heading = config.direction.horizontal();
        let basis = Basis::looking_along(heading.normalized_or(Vec3::RIGHT, 1e-6));
        let position = config.start_position + Vec3::new(0.0, config.height, 0.0);
        Self {
            config,
            phase: AirplanePhase::Pending,
            position,
            basis,
        }
    }

    pub fn config(&self) -> &AirplaneConfig {
        &self.config
    }

    pub fn phase(&self) -> AirplanePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, AirplanePhase::Active { .. })
    }

    pub fn is_gone(&self) -> bool {
        matches!(self.phase, AirplanePhase::Gone { .. })
    }

    pub fn spawned_at(&self) -> Option<f64> {
        match self.phase {
            AirplanePhase::Pending => None,
            AirplanePhase::Active { spawned_at } | AirplanePhase::Gone { spawned_at, .. } => {
                Some(spawned_at)
            }
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// Heading in degrees about `+y`, zero when flying along `+z`.
    pub fn yaw(&self) -> f32 {
        self.basis.forward.x.atan2(self.basis.forward.z).to_degrees()
    }

    pub fn update(&mut self, time: &FrameTime, events: &mut EventBus) {
        let now = time.total;
        match self.phase {
            AirplanePhase::Pending => {
                if self.config.spawn_time <= 0.0 || now >= self.config.spawn_time {
                    self.phase = AirplanePhase::Active { spawned_at: now };
                    self.position = self.base_position();
                    log::info!("[airplane] spawned at {:.2}s", now);
                    events.push(SceneEvent::AirplaneSpawned { time: now });
                }
            }
            AirplanePhase::Active { spawned_at } => {
                let flown = now - spawned_at;
                if self.config.lifetime > 0.0 && flown >= self.config.lifetime {
                    self.phase = AirplanePhase::Gone {
                        spawned_at,
                        despawned_at: now,
                    };
                    log::info!("[airplane] despawned at {:.2}s", now);
                    events.push(SceneEvent::AirplaneDespawned { time: now });
                    return;
                }
                let travelled = flown as f32 * self.config.speed;
                self.position = self.base_position() + self.basis.forward * travelled;
            }
            AirplanePhase::Gone { .. } => {}
        }
    }

    fn base_position(&self) -> Vec3 {
        self.config.start_position + Vec3::new(0.0, self.config.height, 0.0)
    }

    /// Model matrix for this frame; zero scale unless flying.
    pub fn transform(&self) -> Mat4 {
        if !self.is_active() {
            return Transform::hidden().to_matrix();
        }
        Transform::from_position(self.position)
            .with_yaw(self.yaw())
            .with_uniform_scale(self.config.scale)
            .to_matrix()
    }

    pub fn camera_request(&self) -> Option<CameraRequest> {
        if !self.is_active() || !self.config.camera_tracking {
            return None;
        }
        if self.config.camera_follow_position {
            let position = self.position - self.basis.forward * self.config.camera_distance
                + Vec3::new(0.0, self.config.camera_height, 0.0);
            Some(CameraRequest::Chase {
                position,
                target: self.position,
            })
        } else {
            Some(CameraRequest::LookAt {
                target: self.position,
            })
        }
    }
}
