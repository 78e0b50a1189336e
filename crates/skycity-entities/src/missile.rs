//! Missile drop, fall and impact

use crate::airplane::Airplane;
use crate::Basis;
use serde::Deserialize;
use skycity_choreo::CameraRequest;
use skycity_core::bezier::rotate_around_axis;
use skycity_core::{basis_matrix, Mat4, Transform, Vec3};
use skycity_runtime::{EventBus, FrameTime, SceneEvent};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MissileConfig {
    /// Seconds after the airplane spawns; `<= 0` drops on the spawn frame
    pub drop_time: f64,
    pub fall_speed: f32,
    /// Dive angle below the horizon, degrees
    pub fall_angle: f32,
    /// Spin about the flight axis, degrees per second
    pub rotation_speed: f32,
    pub ground_height: f32,
    pub scale: f32,
    pub camera_tracking: bool,
    /// Seconds of falling before the missile takes the camera
    pub camera_track_delay: f64,
    pub camera_distance: f32,
    pub camera_height: f32,
    pub camera_look_ahead: f32,
    pub mesh_name: String,
}

impl Default for MissileConfig {
    fn default() -> Self {
        Self {
            drop_time: 6.0,
            fall_speed: 700.0,
            fall_angle: 60.0,
            rotation_speed: 180.0,
            ground_height: 6000.0,
            scale: 0.08,
            camera_tracking: true,
            camera_track_delay: 2.0,
            camera_distance: 200.0,
            camera_height: 50.0,
            camera_look_ahead: 50.0,
            mesh_name: "missile".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissilePhase {
    Pending,
    Falling { dropped_at: f64 },
    Exploded { impact: Vec3, time: f64 },
}

pub struct Missile {
    config: MissileConfig,
    phase: MissilePhase,
    position: Vec3,
    velocity: Vec3,
    /// Degrees in `[0, 360)`
    spin: f32,
}

impl Missile {
    pub fn new(config: MissileConfig) -> Self {
        Self {
            config,
            phase: MissilePhase::Pending,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            spin: 0.0,
        }
    }

    pub fn config(&self) -> &MissileConfig {
        &self.config
    }

    pub fn phase(&self) -> MissilePhase {
        self.phase
    }

    pub fn is_falling(&self) -> bool {
        matches!(self.phase, MissilePhase::Falling { .. })
    }

    pub fn impact(&self) -> Option<Vec3> {
        match self.phase {
            MissilePhase::Exploded { impact, .. } => Some(impact),
            _ => None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn spin(&self) -> f32 {
        self.spin
    }

    /// Initial velocity: `horizontal * speed * cos(angle)` plus
    /// `-speed * sin(angle)` straight down.
    pub fn launch_velocity(&self, heading: Vec3) -> Vec3 {
        let horizontal = heading.horizontal().normalized_or(Vec3::RIGHT, 1e-6);
        let angle = self.config.fall_angle.to_radians();
        horizontal * (self.config.fall_speed * angle.cos())
            + Vec3::new(0.0, -self.config.fall_speed * angle.sin(), 0.0)
    }

    pub fn update(&mut self, time: &FrameTime, airplane: &Airplane, events: &mut EventBus) {
        let now = time.total;
        match self.phase {
            MissilePhase::Pending => {
                let Some(spawned_at) = airplane.spawned_at() else {
                    return;
                };
                let due = self.config.drop_time <= 0.0 || now >= spawned_at + self.config.drop_time;
                if !airplane.is_active() || !due {
                    return;
                }
                self.position = airplane.position();
                self.velocity = self.launch_velocity(airplane.basis().forward);
                self.spin = 0.0;
                self.phase = MissilePhase::Falling { dropped_at: now };
                log::info!(
                    "[missile] dropped at {:.2}s from ({:.0}, {:.0}, {:.0})",
                    now,
                    self.position.x,
                    self.position.y,
                    self.position.z
                );
                events.push(SceneEvent::MissileDropped {
                    position: self.position,
                    time: now,
                });
                self.check_impact(now, events);
            }
            MissilePhase::Falling { .. } => {
                let dt = time.delta.max(0.0) as f32;
                self.position += self.velocity * dt;
                self.spin = (self.spin + self.config.rotation_speed * dt).rem_euclid(360.0);
                // rem_euclid rounds tiny negative sums up to exactly 360
                if self.spin >= 360.0 {
                    self.spin -= 360.0;
                }
                self.check_impact(now, events);
            }
            MissilePhase::Exploded { .. } => {}
        }
    }

    fn check_impact(&mut self, now: f64, events: &mut EventBus) {
        if self.position.y > self.config.ground_height {
            return;
        }
        self.phase = MissilePhase::Exploded {
            impact: self.position,
            time: now,
        };
        log::info!(
            "[missile] impact at {:.2}s at ({:.0}, {:.0}, {:.0})",
            now,
            self.position.x,
            self.position.y,
            self.position.z
        );
        events.push(SceneEvent::MissileImpact {
            position: self.position,
            time: now,
        });
    }

    /// Model matrix: nose along the velocity, rolled by the spin angle.
    pub fn transform(&self) -> Mat4 {
        if !self.is_falling() {
            return Transform::hidden().to_matrix();
        }
        let basis = Basis::looking_along(self.velocity);
        let roll = self.spin.to_radians();
        let right = rotate_around_axis(basis.right, basis.forward, roll);
        let up = rotate_around_axis(basis.up, basis.forward, roll);
        basis_matrix(self.position, right, up, basis.forward, self.config.scale)
    }

    pub fn camera_request(&self, now: f64) -> Option<CameraRequest> {
        let MissilePhase::Falling { dropped_at } = self.phase else {
            return None;
        };
        if !self.config.camera_tracking || now - dropped_at < self.config.camera_track_delay {
            return None;
        }
        let heading = self.velocity.normalized_or(Vec3::new(0.0, -1.0, 0.0), 1e-6);
        Some(CameraRequest::Chase {
            position: self.position - heading * self.config.camera_distance
                + Vec3::new(0.0, self.config.camera_height, 0.0),
            target: self.position + heading * self.config.camera_look_ahead,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airplane::AirplaneConfig;
    use skycity_runtime::FrameClock;

    fn launched_airplane() -> Airplane {
        let mut airplane = Airplane::new(AirplaneConfig {
            spawn_time: 0.0,
            lifetime: 0.0,
            ..Default::default()
        });
        airplane.update(&FrameTime::default(), &mut EventBus::new());
        airplane
    }

    #[test]
    fn launch_velocity_decomposition() {
        let missile = Missile::new(MissileConfig::default());
        let v = missile.launch_velocity(Vec3::RIGHT);
        assert!((v.y + 606.2178).abs() < 1e-3, "vertical = {}", v.y);
        assert!((v.horizontal().length() - 350.0).abs() < 1e-3);
        assert!(v.x > 0.0);
    }

    #[test]
    fn waits_for_airplane_and_drop_delay() {
        let mut airplane = Airplane::new(AirplaneConfig::default());
        let mut missile = Missile::new(MissileConfig::default());
        let mut events = EventBus::new();

        missile.update(&FrameTime { delta: 0.1, total: 30.0 }, &airplane, &mut events);
        assert_eq!(missile.phase(), MissilePhase::Pending);

        airplane.update(&FrameTime { delta: 0.1, total: 16.0 }, &mut events);
        missile.update(&FrameTime { delta: 0.1, total: 21.9 }, &airplane, &mut events);
        assert_eq!(missile.phase(), MissilePhase::Pending);

        airplane.update(&FrameTime { delta: 0.1, total: 22.0 }, &mut events);
        missile.update(&FrameTime { delta: 0.1, total: 22.0 }, &airplane, &mut events);
        assert_eq!(missile.phase(), MissilePhase::Falling { dropped_at: 22.0 });
        assert_eq!(missile.position(), airplane.position());
    }

    #[test]
    fn falls_monotonically_and_impacts_once() {
        let airplane = launched_airplane();
        let mut missile = Missile::new(MissileConfig {
            drop_time: 0.0,
            ..Default::default()
        });
        let mut events = EventBus::new();
        let mut clock = FrameClock::new();
        let mut last_y = f32::INFINITY;

        for _ in 0..600 {
            let time = clock.advance(1.0 / 60.0);
            missile.update(&time, &airplane, &mut events);
            if missile.is_falling() {
                assert!(missile.position().y <= last_y);
                last_y = missile.position().y;
                assert!((0.0..360.0).contains(&missile.spin()));
            }
        }

        let impacts: Vec<_> = events
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                SceneEvent::MissileImpact { position, .. } => Some(position),
                _ => None,
            })
            .collect();
        assert_eq!(impacts.len(), 1);
        assert!(impacts[0].y <= 6000.0);
        // First frame at or below ground: the previous frame was still above
        assert!(impacts[0].y > 6000.0 - 606.3 / 60.0);
        assert_eq!(missile.impact(), Some(impacts[0]));
        assert_eq!(missile.transform()[0][0], 0.0);
    }

    #[test]
    fn reverse_spin_stays_in_range() {
        let airplane = launched_airplane();
        let mut events = EventBus::new();
        for rotation_speed in [-1.0e-4, -180.0, -725.0] {
            let mut missile = Missile::new(MissileConfig {
                drop_time: 0.0,
                rotation_speed,
                ..Default::default()
            });
            missile.update(&FrameTime { delta: 0.0, total: 0.0 }, &airplane, &mut events);
            assert_eq!(missile.spin(), 0.0);

            let mut clock = FrameClock::new();
            for _ in 0..120 {
                let time = clock.advance(1.0 / 60.0);
                missile.update(&time, &airplane, &mut events);
                let spin = missile.spin();
                assert!((0.0..360.0).contains(&spin), "speed {rotation_speed}: spin = {spin}");
            }
        }
    }

    #[test]
    fn config_parses_partial_toml() {
        let config: MissileConfig = toml::from_str(
            r#"
            fall_angle = 45.0
            rotation_speed = -90.0
            mesh_name = "bomb"
            "#,
        )
        .unwrap();
        assert_eq!(config.fall_angle, 45.0);
        assert_eq!(config.rotation_speed, -90.0);
        assert_eq!(config.mesh_name, "bomb");
        assert_eq!(config.fall_speed, 700.0);
        assert_eq!(config.ground_height, 6000.0);
        assert!(config.camera_tracking);
    }

    #[test]
    fn takes_camera_after_delay() {
        let airplane = launched_airplane();
        let mut missile = Missile::new(MissileConfig {
            drop_time: 0.0,
            ..Default::default()
        });
        let mut events = EventBus::new();
        missile.update(&FrameTime { delta: 0.0, total: 0.0 }, &airplane, &mut events);
        assert!(missile.camera_request(1.0).is_none());
        match missile.camera_request(2.0) {
            Some(CameraRequest::Chase { position, target }) => {
                assert!(position.y > missile.position().y);
                assert!(target.y < missile.position().y);
            }
            other => panic!("expected chase, got {other:?}"),
        }
    }

    #[test]
    fn transform_keeps_scale_under_spin() {
        let airplane = launched_airplane();
        let mut missile = Missile::new(MissileConfig {
            drop_time: 0.0,
            ..Default::default()
        });
        let mut events = EventBus::new();
        missile.update(&FrameTime { delta: 0.0, total: 0.0 }, &airplane, &mut events);
        missile.update(&FrameTime { delta: 0.3, total: 0.3 }, &airplane, &mut events);
        let m = missile.transform();
        for col in &m[..3] {
            let len = (col[0] * col[0] + col[1] * col[1] + col[2] * col[2]).sqrt();
            assert!((len - 0.08).abs() < 1e-4);
        }
        assert_eq!(m[3][1], missile.position().y);
    }
}
