//! Wingmen flying in formation around the lead airplane

use crate::airplane::Airplane;
use serde::Deserialize;
use skycity_core::{Mat4, Transform, Vec3};

pub const WINGMAN_COUNT: usize = 4;

/// Local offsets are `x` right, `y` up, `z` forward of the lead.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    pub left1: Vec3,
    pub left2: Vec3,
    pub right1: Vec3,
    pub right2: Vec3,
    pub scale: f32,
    pub mesh_names: [String; WINGMAN_COUNT],
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            left1: Vec3::new(-600.0, 0.0, -600.0),
            left2: Vec3::new(-1200.0, 0.0, -1200.0),
            right1: Vec3::new(600.0, 0.0, -600.0),
            right2: Vec3::new(1200.0, 0.0, -1200.0),
            scale: 30.0,
            mesh_names: [
                "wingman_left1".to_string(),
                "wingman_left2".to_string(),
                "wingman_right1".to_string(),
                "wingman_right2".to_string(),
            ],
        }
    }
}

impl FormationConfig {
    pub fn offsets(&self) -> [Vec3; WINGMAN_COUNT] {
        [self.left1, self.left2, self.right1, self.right2]
    }
}

pub struct Formation {
    config: FormationConfig,
    positions: [Vec3; WINGMAN_COUNT],
}

impl Formation {
    pub fn new(config: FormationConfig) -> Self {
        Self {
            config,
            positions: [Vec3::ZERO; WINGMAN_COUNT],
        }
    }

    pub fn config(&self) -> &FormationConfig {
        &self.config
    }

    pub fn positions(&self) -> &[Vec3; WINGMAN_COUNT] {
        &self.positions
    }

    /// Re-derive wingman positions from the lead's current frame.
    pub fn update(&mut self, lead: &Airplane) {
        let basis = lead.basis();
        for (slot, offset) in self.positions.iter_mut().zip(self.config.offsets()) {
            *slot = lead.position() + basis.to_world(offset);
        }
    }

    /// Mesh name and model matrix per wingman. Hidden whenever the lead is.
    pub fn transforms<'a>(&'a self, lead: &Airplane) -> impl Iterator<Item = (&'a str, Mat4)> + 'a {
        let visible = lead.is_active();
        let yaw = lead.yaw();
        let scale = self.config.scale;
        self.config
            .mesh_names
            .iter()
            .zip(self.positions)
            .map(move |(name, position)| {
                let matrix = if visible {
                    Transform::from_position(position)
                        .with_yaw(yaw)
                        .with_uniform_scale(scale)
                        .to_matrix()
                } else {
                    Transform::hidden().to_matrix()
                };
                (name.as_str(), matrix)
            })
    }
}
