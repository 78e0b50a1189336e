//! Animated Bezier-surface flag evaluation.
//!
//! Everything here is a pure function of its arguments. Per-point jitter comes
//! from a sine hash of the grid indices, never from the clock, so the same
//! `(params, time)` always yields bit-identical vertices.

use serde::Deserialize;
use skycity_core::bezier::{bernstein, bernstein_derivative};
use skycity_core::{MeshData, Vec3, Vertex};
use std::f32::consts::{PI, TAU};

/// Normal used where the surface tangents degenerate.
const FALLBACK_NORMAL: Vec3 = Vec3::new(0.0, 0.0, 1.0);
const DEGENERATE_NORMAL_EPS: f32 = 0.001;

/// Shape and motion parameters of the flag cloth.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlagParams {
    pub width: f32,
    pub height: f32,
    pub control_points_u: usize,
    pub control_points_v: usize,
    pub segments_u: usize,
    pub segments_v: usize,
    pub wave_amplitude: f32,
    /// Wave cycles per second
    pub wave_frequency: f32,
}

impl Default for FlagParams {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 80.0,
            control_points_u: 8,
            control_points_v: 6,
            segments_u: 20,
            segments_v: 15,
            wave_amplitude: 20.0,
            wave_frequency: 1.5,
        }
    }
}

impl FlagParams {
    /// Control grid size, each axis clamped to at least 2.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.control_points_u.max(2), self.control_points_v.max(2))
    }

    /// Surface sampling resolution, each axis clamped to at least 1.
    pub fn segments(&self) -> (usize, usize) {
        (self.segments_u.max(1), self.segments_v.max(1))
    }

    pub fn vertex_count(&self) -> usize {
        let (su, sv) = self.segments();
        (su + 1) * (sv + 1)
    }
}

/// Output of one evaluation.
#[derive(Debug, Clone, Default)]
pub struct FlagSurfaceResult {
    /// Row-major by `v`, `(segments_u + 1) * (segments_v + 1)` entries
    pub vertices: Vec<Vertex>,
    /// Displaced control grid, indexed `i * control_points_v + j`
    pub control_points: Vec<Vec3>,
    /// Animation time the result was computed for
    pub time: f32,
}

/// Evaluate the waving flag surface at `time` seconds.
pub fn evaluate(params: &FlagParams, time: f32) -> FlagSurfaceResult {
    let control_points = control_grid(params, time);
    let vertices = surface_vertices(params, &control_points);
    FlagSurfaceResult {
        vertices,
        control_points,
        time,
    }
}

/// Rest-pose flag mesh with triangle indices, for initial upload.
pub fn generate_flag_mesh(params: &FlagParams) -> MeshData {
    let grid = flat_grid(params);
    let (su, sv) = params.segments();
    MeshData {
        vertices: surface_vertices(params, &grid),
        indices: grid_indices(su, sv),
    }
}

/// Undisplaced control grid on the `z = 0` plane.
pub fn flat_grid(params: &FlagParams) -> Vec<Vec3> {
    let (cu, cv) = params.grid_size();
    let mut grid = Vec::with_capacity(cu * cv);
    for i in 0..cu {
        for j in 0..cv {
            grid.push(base_position(params, i, j));
        }
    }
    grid
}

/// Displaced control grid at `time`.
pub fn control_grid(params: &FlagParams, time: f32) -> Vec<Vec3> {
    let (cu, cv) = params.grid_size();
    let amplitude = params.wave_amplitude;
    let wave_phase = time * params.wave_frequency * TAU;

    let mut grid = Vec::with_capacity(cu * cv);
    for i in 0..cu {
        let u = i as f32 / (cu - 1) as f32;
        // Pole edge stays put; the free edge swings hardest
        let falloff = if i == 0 { 0.0 } else { mix(0.25, 1.0, u * u) };

        for j in 0..cv {
            let v = j as f32 / (cv - 1) as f32;

            let phase_jitter = grid_hash(i, j, 0.0) * TAU;
            let amp_scale = mix(0.7, 1.4, grid_hash(i, j, 1.0));
            let freq_scale = mix(0.8, 1.6, grid_hash(i, j, 2.0));
            let drift = grid_hash(i, j, 3.0);

            let base_wave = v * TAU + wave_phase * freq_scale + u * 2.0 + phase_jitter;
            let lateral = (wave_phase * 0.35 + drift * TAU).sin();
            let vertical = (wave_phase * 0.55 + drift * PI).cos();
            let strength = amplitude * amp_scale * falloff;

            let offset = Vec3::new(
                (base_wave.sin() + lateral * 0.35) * strength * 1.1,
                (v * PI * 3.0 + wave_phase * 1.3 + u * 1.5 + phase_jitter * 0.5).sin()
                    * strength
                    * 0.35,
                (base_wave.cos() + vertical * 0.3) * strength * 0.95,
            );
            grid.push(base_position(params, i, j) + offset);
        }
    }
    grid
}

/// Tensor-product Bezier surface through `grid`, sampled on the segment lattice.
pub fn surface_vertices(params: &FlagParams, grid: &[Vec3]) -> Vec<Vertex> {
    let (cu, cv) = params.grid_size();
    let (su, sv) = params.segments();
    let (nu, nv) = (cu - 1, cv - 1);

    // Basis values per sample column/row, reused across the lattice
    let basis_u: Vec<(Vec<f32>, Vec<f32>)> = (0..=su)
        .map(|s| basis_row(nu, s as f32 / su as f32))
        .collect();
    let basis_v: Vec<(Vec<f32>, Vec<f32>)> = (0..=sv)
        .map(|s| basis_row(nv, s as f32 / sv as f32))
        .collect();

    let mut vertices = Vec::with_capacity((su + 1) * (sv + 1));
    for (sj, (bv, dbv)) in basis_v.iter().enumerate() {
        let v_param = sj as f32 / sv as f32;
        for (si, (bu, dbu)) in basis_u.iter().enumerate() {
            let u_param = si as f32 / su as f32;

            let mut position = Vec3::ZERO;
            let mut tangent_u = Vec3::ZERO;
            let mut tangent_v = Vec3::ZERO;
            for i in 0..cu {
                for j in 0..cv {
                    let p = grid[i * cv + j];
                    position += p * (bu[i] * bv[j]);
                    tangent_u += p * (dbu[i] * bv[j]);
                    tangent_v += p * (bu[i] * dbv[j]);
                }
            }

            let normal = tangent_u
                .cross(&tangent_v)
                .normalized_or(FALLBACK_NORMAL, DEGENERATE_NORMAL_EPS);

            vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: [u_param, 1.0 - v_param],
                color: [1.0, 1.0, 1.0, 1.0],
            });
        }
    }
    vertices
}

/// Two triangles per lattice cell, matching the vertex order of
/// [`surface_vertices`].
pub fn grid_indices(segments_u: usize, segments_v: usize) -> Vec<u32> {
    let row = segments_u as u32 + 1;
    let mut indices = Vec::with_capacity(segments_u * segments_v * 6);
    for v in 0..segments_v as u32 {
        for u in 0..segments_u as u32 {
            let top_left = v * row + u;
            let top_right = top_left + 1;
            let bottom_left = (v + 1) * row + u;
            let bottom_right = bottom_left + 1;
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }
    indices
}

/// Deterministic value in [0, 1) from grid indices and a channel seed.
pub fn grid_hash(i: usize, j: usize, seed: f32) -> f32 {
    let dot = i as f32 * 12.9898 + j as f32 * 78.233 + seed * 37.719;
    let s = dot.sin() * 43758.5453;
    s - s.floor()
}

fn base_position(params: &FlagParams, i: usize, j: usize) -> Vec3 {
    let (cu, cv) = params.grid_size();
    let u = i as f32 / (cu - 1) as f32;
    let v = j as f32 / (cv - 1) as f32;
    let (hw, hh) = (params.width * 0.5, params.height * 0.5);
    Vec3::new(mix(-hw, hw, u), mix(-hh, hh, v), 0.0)
}

fn basis_row(degree: usize, t: f32) -> (Vec<f32>, Vec<f32>) {
    let values = (0..=degree).map(|i| bernstein(degree, i, t)).collect();
    let derivatives = (0..=degree).map(|i| bernstein_derivative(degree, i, t)).collect();
    (values, derivatives)
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
