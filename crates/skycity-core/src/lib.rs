//! SkyCity Core - Foundational types for the SkyCity scene
//!
//! This crate provides the types every other SkyCity crate depends on:
//! - `Vec3`, `Color`, `Transform`, `Mat4` - Spatial types
//! - `Vertex`, `MeshData` - Raw geometry handed to the renderer
//! - `SceneRng` - Seedable per-subsystem randomness
//! - Bezier and Bernstein curve math
//! - Error types and Result alias

pub mod bezier;
mod error;
mod mesh;
mod rng;
mod types;

pub use error::{Result, SkyError};
pub use mesh::{MeshData, Vertex};
pub use rng::SceneRng;
pub use types::{basis_matrix, mat4_mul, Color, Mat4, Transform, Vec3};
