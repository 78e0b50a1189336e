//! Camera choreography for SkyCity
//!
//! The choreographer is the only writer of the camera pose. Each frame it
//! picks a phase from the scripted timeline and the entity signals, then
//! writes exactly one pose:
//! - **Scripted**: smoothstep interpolation between authored keyframes
//! - **Tracking**: framing requested by the airplane or missile lifecycle
//! - **Gaze / Resume / Final**: the post-explosion sequence

pub mod choreographer;
pub mod pose;
pub mod sampler;

pub use choreographer::{
    CameraChoreographer, CameraConfig, CameraRequest, ChoreoSignals, ChoreographyPhase,
};
pub use pose::{CameraKeyframe, CameraPose, Lens};
pub use sampler::{interpolate_pose, lerp_angle_deg, normalize_angle_deg, smoothstep, Timeline};
