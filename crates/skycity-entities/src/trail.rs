//! Rainbow contrails behind the airplane and its wingmen

use crate::airplane::Airplane;
use crate::formation::{Formation, WINGMAN_COUNT};
use skycity_core::SceneRng;
use skycity_particles::{ParticleSystem, TrailAnchor, TrailConfig, TrailEmitter};

const EMITTERS: usize = WINGMAN_COUNT + 1;

/// One emitter for the lead followed by one per wingman.
#[derive(Debug, Default)]
pub struct FormationTrails {
    emitters: [TrailEmitter; EMITTERS],
}

impl FormationTrails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        for emitter in &mut self.emitters {
            emitter.reset();
        }
    }

    /// Shed this frame's trail particles. Returns the number accepted.
    pub fn emit(
        &mut self,
        system: &mut ParticleSystem,
        rng: &mut SceneRng,
        config: &TrailConfig,
        lead: &Airplane,
        formation: &Formation,
        dt: f32,
    ) -> usize {
        if !config.enabled || !lead.is_active() || config.colors.is_empty() {
            return 0;
        }
        let basis = lead.basis();
        let positions = std::iter::once(lead.position()).chain(formation.positions().iter().copied());

        let mut accepted = 0;
        for (i, (emitter, position)) in self.emitters.iter_mut().zip(positions).enumerate() {
            let anchor = TrailAnchor {
                position,
                forward: basis.forward,
                right: basis.right,
                up: basis.up,
            };
            let color = config.colors[i % config.colors.len()];
            accepted += emitter.emit(system, rng, config, &anchor, color, dt);
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airplane::AirplaneConfig;
    use crate::formation::FormationConfig;
    use skycity_runtime::{EventBus, FrameTime};

    #[test]
    fn five_emitters_with_distinct_colors() {
        let mut lead = Airplane::new(AirplaneConfig {
            spawn_time: 0.0,
            ..Default::default()
        });
        lead.update(&FrameTime::default(), &mut EventBus::new());
        let mut formation = Formation::new(FormationConfig::default());
        formation.update(&lead);

        let mut system = ParticleSystem::new(3000);
        let mut rng = SceneRng::new(11);
        let config = TrailConfig::default();
        let mut trails = FormationTrails::new();

        let accepted = trails.emit(&mut system, &mut rng, &config, &lead, &formation, 0.5);
        assert_eq!(accepted, 5 * 20);
        assert_eq!(system.active_particle_count(), 100);

        let mut colors: Vec<_> = system.particles().iter().map(|p| p.base_color).collect();
        colors.dedup();
        assert_eq!(colors.len(), 5);
    }

    #[test]
    fn silent_before_spawn() {
        let lead = Airplane::new(AirplaneConfig::default());
        let formation = Formation::new(FormationConfig::default());
        let mut system = ParticleSystem::new(100);
        let mut trails = FormationTrails::new();
        let accepted = trails.emit(
            &mut system,
            &mut SceneRng::new(1),
            &TrailConfig::default(),
            &lead,
            &formation,
            1.0,
        );
        assert_eq!(accepted, 0);
    }
}
