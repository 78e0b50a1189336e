//! SkyCity Entities - Timed lifecycles for the scene's moving objects
//!
//! Every lifecycle is an explicit state machine advanced once per frame by
//! the orchestrator. Lifecycles raise [`SceneEvent`](skycity_runtime::SceneEvent)s
//! on the bus and may ask for the camera through a
//! [`CameraRequest`](skycity_choreo::CameraRequest); they never write the pose.

mod airplane;
mod formation;
mod lantern;
mod missile;
mod trail;

pub use airplane::{Airplane, AirplaneConfig, AirplanePhase};
pub use formation::{Formation, FormationConfig, WINGMAN_COUNT};
pub use lantern::{LanternConfig, LanternInstance, LanternPool};
pub use missile::{Missile, MissileConfig, MissilePhase};
pub use trail::FormationTrails;

use skycity_core::Vec3;

/// Right/up/forward frame of an oriented entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl Basis {
    /// Frame whose `forward` follows `direction`, with `up` as close to world
    /// up as possible. Matches the model convention of facing local `+z`.
    pub fn looking_along(direction: Vec3) -> Self {
        let forward = direction.normalized_or(Vec3::FORWARD, 1e-6);
        let right = Vec3::UP.cross(&forward).normalized_or(Vec3::RIGHT, 1e-6);
        let up = forward.cross(&right).normalized();
        Self { right, up, forward }
    }

    /// Express a local offset (`x` right, `y` up, `z` forward) in world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.right * local.x + self.up * local.y + self.forward * local.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_is_orthonormal() {
        let basis = Basis::looking_along(Vec3::new(0.3, -0.8, 0.5));
        assert!((basis.forward.length() - 1.0).abs() < 1e-5);
        assert!(basis.right.dot(&basis.forward).abs() < 1e-5);
        assert!(basis.up.dot(&basis.forward).abs() < 1e-5);
        assert!(basis.right.dot(&basis.up).abs() < 1e-5);
        assert!(basis.up.y > 0.0);
    }

    #[test]
    fn basis_matches_model_axes() {
        let basis = Basis::looking_along(Vec3::FORWARD);
        assert_eq!(basis.right, Vec3::RIGHT);
        assert_eq!(basis.up, Vec3::UP);
        assert_eq!(basis.to_world(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn vertical_direction_still_has_a_frame() {
        let basis = Basis::looking_along(Vec3::new(0.0, -1.0, 0.0));
        assert!((basis.right.length() - 1.0).abs() < 1e-5);
        assert!(basis.right.dot(&basis.forward).abs() < 1e-5);
    }
}
