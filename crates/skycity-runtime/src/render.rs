//! Renderer collaborator boundary.
//!
//! The scene never owns GPU resources. It addresses meshes by name through
//! [`SceneRenderer`] and routes every call through a [`RenderBridge`], which
//! turns lookup misses into a single warning per mesh name.

use skycity_core::{Mat4, Vec3, Vertex};
use std::collections::HashSet;

/// One point light contributed by an active lantern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LanternLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
}

/// Camera matrices for the frame, column-major.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMatrices {
    pub position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    pub fov: f32,
}

/// Mesh-level operations the scene needs from the renderer.
pub trait SceneRenderer {
    /// Returns `false` when no mesh with `name` exists.
    fn set_mesh_transform_by_name(&mut self, name: &str, transform: &Mat4) -> bool;

    /// Replace a mesh's vertex buffer. Returns `false` when the mesh is absent.
    fn update_mesh_vertices_by_name(&mut self, name: &str, vertices: &[Vertex]) -> bool;

    /// Replace the full lantern light list. An empty slice clears it.
    fn set_lantern_lights(&mut self, lights: &[LanternLight]);

    fn set_camera(&mut self, camera: &CameraMatrices);
}

/// Wraps renderer calls and remembers which mesh names were missing.
#[derive(Default)]
pub struct RenderBridge {
    missing: HashSet<String>,
}

impl RenderBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_transform(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        name: &str,
        transform: &Mat4,
    ) -> bool {
        let found = renderer.set_mesh_transform_by_name(name, transform);
        if !found {
            self.report_missing(name);
        }
        found
    }

    pub fn update_vertices(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        name: &str,
        vertices: &[Vertex],
    ) -> bool {
        let found = renderer.update_mesh_vertices_by_name(name, vertices);
        if !found {
            self.report_missing(name);
        }
        found
    }

    /// Names reported missing so far.
    pub fn missing_meshes(&self) -> impl Iterator<Item = &str> {
        self.missing.iter().map(String::as_str)
    }

    fn report_missing(&mut self, name: &str) {
        if !self.missing.contains(name) {
            log::warn!("[render] mesh '{}' not found, updates will be skipped", name);
            self.missing.insert(name.to_string());
        }
    }
}
