//! SkyCity Player - Scene configuration, frame orchestration and a headless
//! renderer for running the show without a GPU.

pub mod config;
pub mod headless;
pub mod orchestrator;

pub use config::{ParticleSettings, SceneConfig};
pub use headless::HeadlessRenderer;
pub use orchestrator::{Orchestrator, SceneSummary};
