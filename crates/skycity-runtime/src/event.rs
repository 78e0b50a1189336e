//! Scene event types

use skycity_core::Vec3;

/// Events raised by entity lifecycles and consumed by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    AirplaneSpawned { time: f64 },
    AirplaneDespawned { time: f64 },
    MissileDropped { position: Vec3, time: f64 },
    /// The missile reached the ground; fires once per run
    MissileImpact { position: Vec3, time: f64 },
    LanternsSpawned { count: usize },
}
