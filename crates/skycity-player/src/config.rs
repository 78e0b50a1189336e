//! Scene configuration loaded from TOML

use serde::Deserialize;
use skycity_choreo::CameraConfig;
use skycity_core::{Result, SkyError};
use skycity_entities::{AirplaneConfig, FormationConfig, LanternConfig, MissileConfig};
use skycity_flag::FlagConfig;
use skycity_particles::{BurstConfig, TrailConfig, DEFAULT_PARALLEL_THRESHOLD};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    /// Pool size; defaults to the trail budget plus one explosion
    pub capacity: Option<usize>,
    pub parallel_threshold: usize,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            capacity: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Every tunable of the scene. Each section falls back to defaults, so a
/// file only needs the values it changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Base seed; each randomized subsystem derives its own stream
    pub seed: u64,
    pub camera: CameraConfig,
    pub airplane: AirplaneConfig,
    pub formation: FormationConfig,
    pub missile: MissileConfig,
    pub explosion: BurstConfig,
    pub lanterns: LanternConfig,
    pub trails: TrailConfig,
    pub flag: FlagConfig,
    pub particles: ParticleSettings,
}

impl SceneConfig {
    /// Load from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SceneConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn particle_capacity(&self) -> usize {
        self.particles
            .capacity
            .unwrap_or(self.trails.max_particles + self.explosion.particle_count as usize)
    }

    /// Check structural rules; reports the first violation.
    pub fn validate(&self) -> Result<()> {
        self.camera.validate()?;

        let m = &self.missile;
        if !(m.fall_angle > 0.0 && m.fall_angle <= 90.0) {
            return Err(SkyError::ValueOutOfRange {
                field: "missile.fall_angle".into(),
                min: 0.0,
                max: 90.0,
                value: m.fall_angle as f64,
            });
        }
        if m.fall_speed <= 0.0 {
            return Err(SkyError::Config(format!(
                "missile.fall_speed must be positive, got {}",
                m.fall_speed
            )));
        }

        let l = &self.lanterns;
        ordered("lanterns.lifetime", l.min_lifetime, l.max_lifetime)?;
        ordered("lanterns.speed", l.min_speed, l.max_speed)?;
        ordered("lanterns.target_height", l.target_height_min, l.target_height_max)?;
        ordered(
            "lanterns.spawn_count_range",
            l.spawn_count_range[0],
            l.spawn_count_range[1],
        )?;
        if l.spawn_interval <= 0.0 {
            return Err(SkyError::Config(format!(
                "lanterns.spawn_interval must be positive, got {}",
                l.spawn_interval
            )));
        }

        let e = &self.explosion;
        ordered("explosion.speed", e.min_speed, e.max_speed)?;
        ordered("explosion.lifetime", e.min_lifetime, e.max_lifetime)?;

        let f = &self.flag.params;
        if f.segments_u == 0 || f.segments_v == 0 {
            return Err(SkyError::Config("flag segments must be at least 1".into()));
        }
        if f.control_points_u < 2 || f.control_points_v < 2 {
            return Err(SkyError::Config(
                "flag needs at least 2 control points per axis".into(),
            ));
        }

        if self.particle_capacity() == 0 {
            return Err(SkyError::Config("particles.capacity must be positive".into()));
        }
        Ok(())
    }
}

fn ordered<T: PartialOrd + std::fmt::Display>(field: &str, min: T, max: T) -> Result<()> {
    if min > max {
        return Err(SkyError::Config(format!(
            "{field}: min ({min}) is greater than max ({max})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_capacity(), 3000 + 420);
        assert_eq!(config.airplane.spawn_time, 16.0);
        assert_eq!(config.missile.ground_height, 6000.0);
        assert_eq!(config.lanterns.pool_size, 120);
    }

    #[test]
    fn partial_file_overrides_only_named_values() {
        let config = SceneConfig::from_toml_str(
            r#"
            seed = 7

            [airplane]
            spawn_time = 2.0

            [missile]
            fall_angle = 45.0

            [lanterns]
            spawn_count_range = [1, 2]

            [flag]
            control_points_u = 4
            debug_control_points = true

            [particles]
            capacity = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.airplane.spawn_time, 2.0);
        assert_eq!(config.airplane.speed, 3000.0);
        assert_eq!(config.missile.fall_angle, 45.0);
        assert_eq!(config.lanterns.spawn_count_range, [1, 2]);
        assert_eq!(config.flag.params.control_points_u, 4);
        assert_eq!(config.flag.params.control_points_v, 6);
        assert!(config.flag.debug_control_points);
        assert_eq!(config.particle_capacity(), 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_fall_angle() {
        let mut config = SceneConfig::default();
        config.missile.fall_angle = 95.0;
        assert!(matches!(
            config.validate(),
            Err(SkyError::ValueOutOfRange { .. })
        ));
        config.missile.fall_angle = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_ranges() {
        let mut config = SceneConfig::default();
        config.lanterns.min_speed = 200.0;
        assert!(matches!(config.validate(), Err(SkyError::Config(_))));

        let mut config = SceneConfig::default();
        config.lanterns.spawn_count_range = [9, 3];
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.explosion.min_lifetime = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_camera_and_flag() {
        let mut config = SceneConfig::default();
        config.camera.transition_times.push(1.0);
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.flag.params.segments_v = 0;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.particles.capacity = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SceneConfig::from_toml_str("[airplane\nspawn_time = 1").unwrap_err();
        assert!(matches!(err, SkyError::TomlParseError(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SceneConfig::load("/nonexistent/skycity.toml").unwrap_err();
        assert!(matches!(err, SkyError::IoError(_)));
    }
}
