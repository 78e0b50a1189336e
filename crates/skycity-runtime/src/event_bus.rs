//! Per-frame scene event queue with a running tally per event kind

use crate::event::SceneEvent;
use skycity_core::Vec3;

/// Counts of every event pushed since the bus was created. Survives drains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventTally {
    pub airplane_spawns: u32,
    pub airplane_despawns: u32,
    pub missile_drops: u32,
    pub missile_impacts: u32,
    pub lantern_batches: u32,
    pub lanterns_launched: usize,
}

impl EventTally {
    fn record(&mut self, event: &SceneEvent) {
        match event {
            SceneEvent::AirplaneSpawned { .. } => self.airplane_spawns += 1,
            SceneEvent::AirplaneDespawned { .. } => self.airplane_despawns += 1,
            SceneEvent::MissileDropped { .. } => self.missile_drops += 1,
            SceneEvent::MissileImpact { .. } => self.missile_impacts += 1,
            SceneEvent::LanternsSpawned { count } => {
                self.lantern_batches += 1;
                self.lanterns_launched += count;
            }
        }
    }
}

/// Lifecycles push during the frame; the orchestrator drains once per frame.
#[derive(Debug, Default)]
pub struct EventBus {
    pending: Vec<SceneEvent>,
    tally: EventTally,
    last_impact: Option<(Vec3, f64)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SceneEvent) {
        self.tally.record(&event);
        if let SceneEvent::MissileImpact { position, time } = event {
            self.last_impact = Some((position, time));
        }
        self.pending.push(event);
    }

    /// This frame's events in push order.
    pub fn drain(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn tally(&self) -> EventTally {
        self.tally
    }

    /// Position and time of the most recent impact, drained or not.
    pub fn last_impact(&self) -> Option<(Vec3, f64)> {
        self.last_impact
    }
}
