//! SkyCity Flag - procedural waving cloth
//!
//! Evaluates a tensor-product Bezier surface whose control grid is displaced
//! by a time-driven wave, and keeps that evaluation off the frame thread.
//! Does not touch GPU state; outputs raw vertices for the renderer to consume.

pub mod markers;
pub mod surface;
pub mod updater;

pub use surface::{evaluate, generate_flag_mesh, FlagParams, FlagSurfaceResult};
pub use updater::{AsyncFlagUpdater, FlagConfig, JobSlot};
