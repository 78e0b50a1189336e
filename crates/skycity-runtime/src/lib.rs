//! SkyCity Runtime - Frame loop infrastructure
//!
//! Provides the building blocks the orchestrator drives every frame:
//! - `FrameClock` / `FrameTime` - per-frame delta and cumulative elapsed time
//! - `SceneEvent` / `EventBus` - typed event queue between lifecycles
//! - `SceneRenderer` / `RenderBridge` - the renderer collaborator boundary

mod clock;
mod event;
mod event_bus;
mod render;

pub use clock::{FrameClock, FrameTime};
pub use event::SceneEvent;
pub use event_bus::{EventBus, EventTally};
pub use render::{CameraMatrices, LanternLight, RenderBridge, SceneRenderer};
