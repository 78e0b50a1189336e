//! Off-thread flag animation with at most one job in flight.
//!
//! A single worker thread evaluates the surface. The frame thread schedules a
//! job only when the previous one has been collected, polls without blocking,
//! and swaps the finished vertex buffer in with one renderer call. A frame
//! that finds the worker busy simply skips scheduling.

use crate::markers::marker_vertices;
use crate::surface::{evaluate, generate_flag_mesh, FlagParams, FlagSurfaceResult};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError, TrySendError};
use serde::Deserialize;
use skycity_core::{MeshData, Result, SkyError, Vec3};
use skycity_runtime::{RenderBridge, SceneRenderer};
use std::thread::JoinHandle;

/// Flag section of the scene configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlagConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub params: FlagParams,
    /// Draw an octahedron at every control point
    pub debug_control_points: bool,
    pub marker_size: f32,
    pub marker_color: Vec3,
    pub mesh_name: String,
    pub marker_mesh_name: String,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            params: FlagParams::default(),
            debug_control_points: false,
            marker_size: 8.0,
            marker_color: Vec3::new(1.0, 0.9, 0.2),
            mesh_name: "flag".to_string(),
            marker_mesh_name: "flag_control_points".to_string(),
        }
    }
}

impl FlagConfig {
    /// Rest-pose cloth mesh to register with the renderer.
    pub fn initial_mesh(&self) -> MeshData {
        generate_flag_mesh(&self.params)
    }

    /// Rest-pose marker mesh to register with the renderer.
    pub fn initial_marker_mesh(&self) -> MeshData {
        crate::markers::marker_mesh(
            &crate::surface::flat_grid(&self.params),
            self.marker_size,
            self.marker_color,
        )
    }
}

/// Surface evaluation run on the worker thread.
pub type Evaluator = Box<dyn Fn(&FlagParams, f32) -> FlagSurfaceResult + Send + 'static>;

struct FlagJob {
    params: FlagParams,
    time: f32,
}

/// The one-slot in-flight handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JobSlot {
    Idle,
    InFlight { time: f32 },
    /// The worker is gone; the last applied vertices stay on screen
    Stopped,
}

struct FlagWorker {
    jobs: Option<Sender<FlagJob>>,
    results: Receiver<FlagSurfaceResult>,
    handle: Option<JoinHandle<()>>,
}

impl FlagWorker {
    fn spawn(evaluator: Evaluator) -> Result<Self> {
        let (job_tx, job_rx) = channel::bounded::<FlagJob>(1);
        let (result_tx, result_rx) = channel::bounded::<FlagSurfaceResult>(1);

        let handle = std::thread::Builder::new()
            .name("flag-surface".to_string())
            .spawn(move || {
                for job in job_rx.iter() {
                    let result = evaluator(&job.params, job.time);
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| SkyError::Worker(format!("failed to start flag worker: {e}")))?;

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }
}

impl Drop for FlagWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("[flag] worker thread panicked");
            }
        }
    }
}

/// Drives the flag animation from the frame loop.
pub struct AsyncFlagUpdater {
    config: FlagConfig,
    worker: FlagWorker,
    slot: JobSlot,
    animation_time: f32,
    last_result: Option<FlagSurfaceResult>,
    applied: u64,
    skipped: u64,
}

impl AsyncFlagUpdater {
    pub fn new(config: FlagConfig) -> Result<Self> {
        Self::with_evaluator(config, Box::new(evaluate))
    }

    pub fn with_evaluator(config: FlagConfig, evaluator: Evaluator) -> Result<Self> {
        let worker = FlagWorker::spawn(evaluator)?;
        log::info!(
            "[flag] worker started ({}x{} control points, {}x{} segments)",
            config.params.control_points_u,
            config.params.control_points_v,
            config.params.segments_u,
            config.params.segments_v
        );
        Ok(Self {
            config,
            worker,
            slot: JobSlot::Idle,
            animation_time: 0.0,
            last_result: None,
            applied: 0,
            skipped: 0,
        })
    }

    pub fn config(&self) -> &FlagConfig {
        &self.config
    }

    pub fn slot(&self) -> JobSlot {
        self.slot
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.slot, JobSlot::InFlight { .. })
    }

    pub fn animation_time(&self) -> f32 {
        self.animation_time
    }

    /// Results applied to the renderer so far.
    pub fn applied_results(&self) -> u64 {
        self.applied
    }

    /// Frames that wanted a new job while one was still running.
    pub fn skipped_schedules(&self) -> u64 {
        self.skipped
    }

    pub fn last_result(&self) -> Option<&FlagSurfaceResult> {
        self.last_result.as_ref()
    }

    /// Per-frame step: advance time, collect a finished job, schedule the next.
    pub fn update(&mut self, dt: f32, renderer: &mut dyn SceneRenderer, bridge: &mut RenderBridge) {
        if !self.config.enabled {
            return;
        }
        self.animation_time += dt.max(0.0);
        self.poll(renderer, bridge);
        self.schedule();
    }

    /// Non-blocking check for a finished job. Returns true if one was applied.
    pub fn poll(&mut self, renderer: &mut dyn SceneRenderer, bridge: &mut RenderBridge) -> bool {
        if !self.is_in_flight() {
            return false;
        }
        match self.worker.results.try_recv() {
            Ok(result) => {
                self.slot = JobSlot::Idle;
                self.apply(result, renderer, bridge);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                log::warn!("[flag] worker disconnected, flag animation stopped");
                self.slot = JobSlot::Stopped;
                false
            }
        }
    }

    fn schedule(&mut self) {
        match self.slot {
            JobSlot::Idle => {}
            JobSlot::InFlight { .. } => {
                self.skipped += 1;
                return;
            }
            JobSlot::Stopped => return,
        }
        let Some(jobs) = self.worker.jobs.as_ref() else {
            self.slot = JobSlot::Stopped;
            return;
        };

        let job = FlagJob {
            params: self.config.params.clone(),
            time: self.animation_time,
        };
        match jobs.try_send(job) {
            Ok(()) => self.slot = JobSlot::InFlight { time: self.animation_time },
            Err(TrySendError::Full(_)) => self.skipped += 1,
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("[flag] worker disconnected, flag animation stopped");
                self.slot = JobSlot::Stopped;
            }
        }
    }

    fn apply(
        &mut self,
        result: FlagSurfaceResult,
        renderer: &mut dyn SceneRenderer,
        bridge: &mut RenderBridge,
    ) {
        bridge.update_vertices(renderer, &self.config.mesh_name, &result.vertices);
        if self.config.debug_control_points {
            let markers = marker_vertices(
                &result.control_points,
                self.config.marker_size,
                self.config.marker_color,
            );
            bridge.update_vertices(renderer, &self.config.marker_mesh_name, &markers);
        }
        log::trace!("[flag] applied surface for t={:.3}", result.time);
        self.applied += 1;
        self.last_result = Some(result);
    }
}
