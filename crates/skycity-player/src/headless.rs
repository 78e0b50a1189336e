//! In-memory renderer for running the scene without a window.

use crate::config::SceneConfig;
use skycity_core::{Mat4, MeshData, Transform, Vertex};
use skycity_particles::{ParticleInstance, ParticleRenderer};
use skycity_runtime::{CameraMatrices, LanternLight, SceneRenderer};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct HeadlessMesh {
    pub transform: Mat4,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub vertex_updates: u64,
}

/// Stores whatever the scene pushes so it can be inspected or summarized.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    meshes: HashMap<String, HeadlessMesh>,
    lights: Vec<LanternLight>,
    camera: Option<CameraMatrices>,
    particle_count: usize,
    frames_drawn: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every mesh name the scene will address.
    pub fn for_scene(config: &SceneConfig) -> Self {
        let mut renderer = Self::new();
        renderer.register_mesh(&config.airplane.mesh_name, MeshData::default());
        for name in &config.formation.mesh_names {
            renderer.register_mesh(name, MeshData::default());
        }
        renderer.register_mesh(&config.missile.mesh_name, MeshData::default());
        for i in 0..config.lanterns.pool_size {
            renderer.register_mesh(&config.lanterns.mesh_name(i), MeshData::default());
        }
        if config.flag.enabled {
            renderer.register_mesh(&config.flag.mesh_name, config.flag.initial_mesh());
            if config.flag.debug_control_points {
                renderer.register_mesh(
                    &config.flag.marker_mesh_name,
                    config.flag.initial_marker_mesh(),
                );
            }
        }
        log::info!("[headless] registered {} meshes", renderer.meshes.len());
        renderer
    }

    pub fn register_mesh(&mut self, name: &str, mesh: MeshData) {
        self.meshes.insert(
            name.to_string(),
            HeadlessMesh {
                transform: Transform::IDENTITY.to_matrix(),
                vertices: mesh.vertices,
                indices: mesh.indices,
                vertex_updates: 0,
            },
        );
    }

    pub fn mesh(&self, name: &str) -> Option<&HeadlessMesh> {
        self.meshes.get(name)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn lights(&self) -> &[LanternLight] {
        &self.lights
    }

    pub fn camera(&self) -> Option<&CameraMatrices> {
        self.camera.as_ref()
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn set_mesh_transform_by_name(&mut self, name: &str, transform: &Mat4) -> bool {
        match self.meshes.get_mut(name) {
            Some(mesh) => {
                mesh.transform = *transform;
                true
            }
            None => false,
        }
    }

    fn update_mesh_vertices_by_name(&mut self, name: &str, vertices: &[Vertex]) -> bool {
        match self.meshes.get_mut(name) {
            Some(mesh) => {
                mesh.vertices.clear();
                mesh.vertices.extend_from_slice(vertices);
                mesh.vertex_updates += 1;
                true
            }
            None => false,
        }
    }

    fn set_lantern_lights(&mut self, lights: &[LanternLight]) {
        self.lights.clear();
        self.lights.extend_from_slice(lights);
    }

    fn set_camera(&mut self, camera: &CameraMatrices) {
        self.camera = Some(*camera);
    }
}

impl ParticleRenderer for HeadlessRenderer {
    fn draw_particles(&mut self, instances: &[ParticleInstance]) {
        self.particle_count = instances.len();
        self.frames_drawn += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_scene_meshes() {
        let config = SceneConfig::default();
        let renderer = HeadlessRenderer::for_scene(&config);
        // airplane + 4 wingmen + missile + lanterns + flag
        assert_eq!(renderer.mesh_count(), 6 + 120 + 1);
        let flag = renderer.mesh("flag").unwrap();
        assert_eq!(flag.vertices.len(), config.flag.params.vertex_count());
        assert!(!flag.indices.is_empty());
        assert!(renderer.mesh("flag_control_points").is_none());
    }

    #[test]
    fn keeps_last_camera_and_particle_draw() {
        let mut renderer = HeadlessRenderer::new();
        assert!(renderer.camera().is_none());
        assert_eq!(renderer.frames_drawn(), 0);

        let camera = CameraMatrices {
            position: skycity_core::Vec3::new(0.0, 100.0, 0.0),
            view: Transform::IDENTITY.to_matrix(),
            projection: Transform::IDENTITY.to_matrix(),
            fov: 45.0,
        };
        renderer.set_camera(&camera);
        let instance = ParticleInstance {
            pos_size: [0.0, 0.0, 0.0, 10.0],
            color: [1.0; 4],
        };
        renderer.draw_particles(&[instance; 3]);
        renderer.draw_particles(&[]);

        assert_eq!(renderer.camera().map(|c| c.fov), Some(45.0));
        assert_eq!(renderer.frames_drawn(), 2);
        assert_eq!(renderer.particle_count(), 0);
    }

    #[test]
    fn unknown_names_are_reported() {
        let mut renderer = HeadlessRenderer::new();
        renderer.register_mesh("a", MeshData::default());
        let m = Transform::hidden().to_matrix();
        assert!(renderer.set_mesh_transform_by_name("a", &m));
        assert!(!renderer.set_mesh_transform_by_name("b", &m));
        assert!(!renderer.update_mesh_vertices_by_name("b", &[]));
        assert_eq!(renderer.mesh("a").unwrap().transform, m);
    }
}
