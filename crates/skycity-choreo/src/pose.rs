//! Camera pose, authored keyframes and view/projection matrices

use serde::Deserialize;
use skycity_core::{Mat4, Vec3};
use skycity_runtime::CameraMatrices;

const MAX_PITCH: f32 = 89.0;
const MIN_FOV: f32 = 10.0;
const MAX_FOV: f32 = 120.0;

/// Authored camera stop: position plus yaw/pitch in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CameraKeyframe {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraKeyframe {
    pub const fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    pub fn pose(&self, fov: f32) -> CameraPose {
        CameraPose {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch,
            fov,
        }
    }
}

/// Projection parameters that do not change during the show.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Lens {
    /// Width / height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            aspect: 1920.0 / 1080.0,
            near: 0.1,
            far: 30000.0,
        }
    }
}

/// The camera's state for one frame. Angles in degrees.
///
/// Yaw is measured in the XZ plane from `+x` toward `+z`; pitch is elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
}

impl CameraPose {
    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalized()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(&Vec3::UP).normalized()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(&self.forward()).normalized()
    }

    /// Turn toward `target`, keeping position. A target on top of the camera
    /// leaves the orientation unchanged.
    pub fn look_at(&mut self, target: Vec3) {
        let to_target = target - self.position;
        if to_target.length() < 1e-4 {
            return;
        }
        let dir = to_target.normalized();
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw = dir.z.atan2(dir.x).to_degrees();
    }

    pub fn looking_at(position: Vec3, target: Vec3, fov: f32) -> Self {
        let mut pose = Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov,
        };
        pose.look_at(target);
        pose
    }

    /// Get the view matrix (4x4, column-major)
    pub fn view_matrix(&self) -> Mat4 {
        let f = self.forward();
        let s = f.cross(&Vec3::UP).normalized();
        let u = s.cross(&f);

        [
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [
                -s.dot(&self.position),
                -u.dot(&self.position),
                f.dot(&self.position),
                1.0,
            ],
        ]
    }

    /// Get the perspective projection matrix (4x4, column-major)
    pub fn projection_matrix(&self, lens: &Lens) -> Mat4 {
        let fov_rad = self.fov.clamp(MIN_FOV, MAX_FOV).to_radians();
        let f = 1.0 / (fov_rad / 2.0).tan();
        let depth = lens.far - lens.near;

        [
            [f / lens.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, -(lens.far + lens.near) / depth, -1.0],
            [0.0, 0.0, -(2.0 * lens.far * lens.near) / depth, 0.0],
        ]
    }

    pub fn matrices(&self, lens: &Lens) -> CameraMatrices {
        CameraMatrices {
            position: self.position,
            view: self.view_matrix(),
            projection: self.projection_matrix(lens),
            fov: self.fov,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn forward_follows_yaw_convention() {
        let pose = CameraKeyframe::new(Vec3::ZERO, 90.0, 0.0).pose(45.0);
        assert!(approx(pose.forward(), Vec3::new(0.0, 0.0, 1.0)));
        let pose = CameraKeyframe::new(Vec3::ZERO, 0.0, 90.0).pose(45.0);
        assert!(approx(pose.forward(), Vec3::UP));
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let target = Vec3::new(500.0, 6000.0, -300.0);
        let pose = CameraPose::looking_at(Vec3::new(37.3, 78.0, 1148.3), target, 45.0);
        let expected = (target - pose.position).normalized();
        assert!(approx(pose.forward(), expected));
    }

    #[test]
    fn look_at_clamps_pitch() {
        let pose = CameraPose::looking_at(Vec3::ZERO, Vec3::new(0.0, 100.0, 0.0), 45.0);
        assert_eq!(pose.pitch, 89.0);
    }

    #[test]
    fn look_at_degenerate_target_keeps_orientation() {
        let mut pose = CameraKeyframe::new(Vec3::ONE, -44.2, 4.3).pose(45.0);
        pose.look_at(Vec3::ONE);
        assert_eq!(pose.yaw, -44.2);
        assert_eq!(pose.pitch, 4.3);
    }

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let pose = CameraKeyframe::new(Vec3::new(10.0, 20.0, 30.0), -91.4, -25.6).pose(45.0);
        let v = pose.view_matrix();
        let p = pose.position;
        // Transform the eye position; it must land on the view-space origin
        for row in 0..3 {
            let value = v[0][row] * p.x + v[1][row] * p.y + v[2][row] * p.z + v[3][row];
            assert!(value.abs() < 1e-2, "row {row}: {value}");
        }
    }

    #[test]
    fn projection_clamps_fov() {
        let lens = Lens::default();
        let wide = CameraKeyframe::new(Vec3::ZERO, 0.0, 0.0).pose(500.0);
        let max = CameraKeyframe::new(Vec3::ZERO, 0.0, 0.0).pose(120.0);
        assert_eq!(wide.projection_matrix(&lens), max.projection_matrix(&lens));
    }
}
