//! The camera phase machine

use crate::pose::{CameraKeyframe, CameraPose, Lens};
use crate::sampler::{interpolate_pose, Timeline};
use serde::Deserialize;
use skycity_core::{Result, SkyError, Vec3};
use skycity_runtime::CameraMatrices;

/// Camera section of the scene configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// When false the script is frozen on keyframe 0; entity phases still run
    pub enable_motion: bool,
    pub keyframes: Vec<CameraKeyframe>,
    /// Seconds per segment; one fewer than keyframes
    pub transition_times: Vec<f64>,
    pub default_fov: f32,
    /// Field of view reached at the end of the resume segment
    pub final_fov: f32,
    /// Keyframe the explosion gaze cuts to. Defaults to the hold keyframe.
    pub gaze_keyframe: Option<usize>,
    #[serde(flatten)]
    pub lens: Lens,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            enable_motion: true,
            keyframes: vec![
                CameraKeyframe::new(Vec3::new(40.3, 1731.3, 6482.7), -91.4, -25.6),
                CameraKeyframe::new(Vec3::new(-189.2, 155.6, 5171.6), -93.0, 2.6),
                CameraKeyframe::new(Vec3::new(-241.2, 142.7, 3635.2), -121.2, 5.5),
                CameraKeyframe::new(Vec3::new(-106.8, 148.5, 2867.0), -44.2, 4.3),
                CameraKeyframe::new(Vec3::new(37.3, 78.0, 1148.3), -100.6, 14.4),
                CameraKeyframe::new(Vec3::new(-13.2, 152.4, 398.7), -102.2, 33.7),
            ],
            transition_times: vec![5.0, 2.0, 5.0, 3.0, 8.0],
            default_fov: 45.0,
            final_fov: 75.0,
            gaze_keyframe: None,
            lens: Lens::default(),
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<()> {
        let n = self.keyframes.len();
        if n < 3 {
            return Err(SkyError::Config(format!(
                "camera needs at least 3 keyframes, got {n}"
            )));
        }
        if self.transition_times.len() + 1 != n {
            return Err(SkyError::Config(format!(
                "camera has {n} keyframes but {} transition times (expected {})",
                self.transition_times.len(),
                n - 1
            )));
        }
        if let Some((i, t)) = self
            .transition_times
            .iter()
            .enumerate()
            .find(|(_, t)| **t <= 0.0)
        {
            return Err(SkyError::Config(format!(
                "camera transition {i} must be positive, got {t}"
            )));
        }
        if let Some(gaze) = self.gaze_keyframe {
            if gaze >= n {
                return Err(SkyError::Config(format!(
                    "camera gaze_keyframe {gaze} out of range for {n} keyframes"
                )));
            }
        }
        if self.lens.aspect <= 0.0 || self.lens.near <= 0.0 || self.lens.far <= self.lens.near {
            return Err(SkyError::Config(
                "camera lens needs aspect > 0 and 0 < near < far".into(),
            ));
        }
        Ok(())
    }
}

/// Framing an entity lifecycle asks for while it owns the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraRequest {
    /// Turn toward `target` from wherever the camera is
    LookAt { target: Vec3 },
    /// Move to `position` and look at `target`
    Chase { position: Vec3, target: Vec3 },
}

/// Everything the choreographer reads each frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoreoSignals {
    pub total_time: f64,
    pub airplane_active: bool,
    pub missile_active: bool,
    /// Impact point once the missile has exploded
    pub missile_exploded: Option<Vec3>,
    /// The airplane left the scene after the explosion
    pub resuming: bool,
    /// Request of whichever lifecycle currently owns the camera
    pub tracker: Option<CameraRequest>,
    /// No lifecycle will claim the camera again
    pub entities_exhausted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChoreographyPhase {
    Scripted { segment: usize },
    Handoff,
    TrackingEntity,
    ExplosionGaze { impact: Vec3 },
    ResumeTransition {
        started_at: f64,
        from: CameraPose,
        replayed: bool,
    },
    Final,
}

impl ChoreographyPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scripted { .. } => "scripted",
            Self::Handoff => "handoff",
            Self::TrackingEntity => "tracking",
            Self::ExplosionGaze { .. } => "explosion-gaze",
            Self::ResumeTransition { .. } => "resume",
            Self::Final => "final",
        }
    }

    fn same_kind(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scripted { segment: a }, Self::Scripted { segment: b }) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

/// Sole writer of the camera pose.
pub struct CameraChoreographer {
    config: CameraConfig,
    timeline: Timeline,
    phase: ChoreographyPhase,
    pose: CameraPose,
}

impl CameraChoreographer {
    /// Build from a validated config.
    pub fn new(config: CameraConfig) -> Result<Self> {
        config.validate()?;
        let timeline = Timeline::new(config.keyframes.clone(), config.transition_times.clone());
        let pose = config.keyframes[0].pose(config.default_fov);
        Ok(Self {
            config,
            timeline,
            phase: ChoreographyPhase::Scripted { segment: 0 },
            pose,
        })
    }

    pub fn phase(&self) -> &ChoreographyPhase {
        &self.phase
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn matrices(&self) -> CameraMatrices {
        self.pose.matrices(&self.config.lens)
    }

    pub fn is_final(&self) -> bool {
        matches!(self.phase, ChoreographyPhase::Final)
    }

    /// Advance the phase machine and write this frame's pose.
    pub fn update(&mut self, signals: &ChoreoSignals) -> &CameraPose {
        let next = self.next_phase(signals);
        if !next.same_kind(&self.phase) {
            match next {
                ChoreographyPhase::Scripted { segment } => log::info!(
                    "[camera] {} -> scripted segment {} at {:.2}s",
                    self.phase.name(),
                    segment,
                    signals.total_time
                ),
                _ => log::info!(
                    "[camera] {} -> {} at {:.2}s",
                    self.phase.name(),
                    next.name(),
                    signals.total_time
                ),
            }
        }
        self.phase = next;
        self.pose = self.pose_for(signals);
        &self.pose
    }

    fn next_phase(&self, signals: &ChoreoSignals) -> ChoreographyPhase {
        let now = signals.total_time;
        match self.phase {
            ChoreographyPhase::Final => ChoreographyPhase::Final,
            ChoreographyPhase::ResumeTransition { started_at, .. } => {
                if self.resume_t(started_at, now) >= 1.0 {
                    ChoreographyPhase::Final
                } else {
                    self.phase
                }
            }
            ChoreographyPhase::ExplosionGaze { .. } if signals.resuming => {
                self.begin_resume(now)
            }
            ChoreographyPhase::ExplosionGaze { .. } => self.phase,
            ChoreographyPhase::Scripted { .. }
            | ChoreographyPhase::Handoff
            | ChoreographyPhase::TrackingEntity => {
                if let Some(impact) = signals.missile_exploded {
                    return ChoreographyPhase::ExplosionGaze { impact };
                }
                if signals.tracker.is_some() {
                    return ChoreographyPhase::TrackingEntity;
                }
                let scripted = self.scripted_phase_at(now);
                let idle = !signals.airplane_active && !signals.missile_active;
                if scripted == ChoreographyPhase::Handoff
                    && signals.entities_exhausted
                    && idle
                    && now >= self.timeline.total_duration()
                {
                    return self.begin_resume(now);
                }
                scripted
            }
        }
    }

    fn scripted_phase_at(&self, now: f64) -> ChoreographyPhase {
        if !self.config.enable_motion {
            return ChoreographyPhase::Handoff;
        }
        match self.timeline.segment_at(now) {
            Some(segment) => ChoreographyPhase::Scripted { segment },
            None => ChoreographyPhase::Handoff,
        }
    }

    fn begin_resume(&self, now: f64) -> ChoreographyPhase {
        ChoreographyPhase::ResumeTransition {
            started_at: now,
            from: self.pose,
            replayed: false,
        }
    }

    fn resume_t(&self, started_at: f64, now: f64) -> f32 {
        let duration = self.timeline.duration_of(self.final_index() - 1);
        if duration <= 0.0 {
            return 1.0;
        }
        ((now - started_at) / duration) as f32
    }

    fn final_index(&self) -> usize {
        self.timeline.keyframes().len() - 1
    }

    fn hold_index(&self) -> usize {
        if self.config.enable_motion {
            self.timeline.keyframes().len() - 2
        } else {
            0
        }
    }

    fn keyframe_pose(&self, index: usize, fov: f32) -> CameraPose {
        self.timeline
            .keyframe(index)
            .map(|kf| kf.pose(fov))
            .unwrap_or(self.pose)
    }

    fn final_pose(&self) -> CameraPose {
        self.keyframe_pose(self.final_index(), self.config.final_fov)
    }

    fn pose_for(&mut self, signals: &ChoreoSignals) -> CameraPose {
        let fov = self.config.default_fov;
        let phase = self.phase;
        match phase {
            ChoreographyPhase::Scripted { segment } => self
                .timeline
                .sample_segment(segment, signals.total_time, fov)
                .unwrap_or(self.pose),
            ChoreographyPhase::Handoff => self.keyframe_pose(self.hold_index(), fov),
            ChoreographyPhase::TrackingEntity => match signals.tracker {
                Some(CameraRequest::LookAt { target }) => {
                    let mut pose = self.pose;
                    pose.fov = fov;
                    pose.look_at(target);
                    pose
                }
                Some(CameraRequest::Chase { position, target }) => {
                    CameraPose::looking_at(position, target, fov)
                }
                None => self.pose,
            },
            ChoreographyPhase::ExplosionGaze { impact } => {
                let gaze = self
                    .config
                    .gaze_keyframe
                    .unwrap_or(self.timeline.keyframes().len() - 2);
                let mut pose = self.keyframe_pose(gaze, fov);
                pose.look_at(impact);
                pose
            }
            ChoreographyPhase::ResumeTransition {
                started_at,
                from,
                replayed,
            } => {
                if !replayed {
                    self.phase = ChoreographyPhase::ResumeTransition {
                        started_at,
                        from,
                        replayed: true,
                    };
                    return from;
                }
                let mut to = self.final_pose();
                let t = self.resume_t(started_at, signals.total_time);
                let mut from = from;
                from.fov = fov;
                to.fov = self.config.final_fov;
                interpolate_pose(&from, &to, t)
            }
            ChoreographyPhase::Final => self.final_pose(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choreographer() -> CameraChoreographer {
        CameraChoreographer::new(CameraConfig::default()).unwrap()
    }

    fn at(time: f64) -> ChoreoSignals {
        ChoreoSignals {
            total_time: time,
            ..Default::default()
        }
    }

    fn kf(c: &CameraChoreographer, i: usize) -> CameraPose {
        c.config().keyframes[i].pose(c.config().default_fov)
    }

    fn strictly_between(a: f32, b: f32, x: f32) -> bool {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        x > lo && x < hi
    }

    #[test]
    fn default_config_is_valid() {
        let config = CameraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.keyframes.len(), 6);
    }

    #[test]
    fn validate_rejects_mismatched_transitions() {
        let mut config = CameraConfig::default();
        config.transition_times.pop();
        assert!(matches!(config.validate(), Err(SkyError::Config(_))));

        let mut config = CameraConfig::default();
        config.transition_times[2] = 0.0;
        assert!(config.validate().is_err());

        let mut config = CameraConfig::default();
        config.keyframes.truncate(2);
        config.transition_times.truncate(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn starts_on_first_keyframe() {
        let mut c = choreographer();
        let pose = *c.update(&at(0.0));
        assert_eq!(pose, kf(&c, 0));
        assert_eq!(*c.phase(), ChoreographyPhase::Scripted { segment: 0 });
    }

    #[test]
    fn pose_between_keyframes_one_and_two() {
        let mut c = choreographer();
        let pose = *c.update(&at(6.0));
        assert_eq!(*c.phase(), ChoreographyPhase::Scripted { segment: 1 });
        let (a, b) = (kf(&c, 1), kf(&c, 2));
        assert!(strictly_between(a.position.z, b.position.z, pose.position.z));
        assert!(strictly_between(a.yaw, b.yaw, pose.yaw));
    }

    // A time exactly on a segment boundary belongs to the following segment,
    // so 5.0, 7.0 and 12.0 are the arrival times of keyframes 1, 2 and 3.
    // "Between keyframes 1 and 2" is checked strictly inside the segment.
    #[test]
    fn segment_boundaries_land_on_keyframes() {
        let mut c = choreographer();
        assert_eq!({ *c.update(&at(5.0)) }, kf(&c, 1));
        assert_eq!({ *c.update(&at(7.0)) }, kf(&c, 2));
        assert_eq!({ *c.update(&at(12.0)) }, kf(&c, 3));
        assert_eq!(*c.phase(), ChoreographyPhase::Scripted { segment: 3 });
    }

    #[test]
    fn handoff_holds_penultimate_keyframe() {
        let mut c = choreographer();
        assert_eq!({ *c.update(&at(15.0)) }, kf(&c, 4));
        assert_eq!(*c.phase(), ChoreographyPhase::Handoff);
        assert_eq!({ *c.update(&at(40.0)) }, kf(&c, 4));
    }

    #[test]
    fn tracker_claims_and_releases_camera() {
        let mut c = choreographer();
        c.update(&at(15.5));
        let target = Vec3::new(0.0, 8000.0, -8000.0);
        let signals = ChoreoSignals {
            total_time: 16.0,
            airplane_active: true,
            tracker: Some(CameraRequest::LookAt { target }),
            ..Default::default()
        };
        let pose = *c.update(&signals);
        assert_eq!(*c.phase(), ChoreographyPhase::TrackingEntity);
        assert_eq!(pose.position, kf(&c, 4).position);
        let expected = (target - pose.position).normalized();
        assert!((pose.forward() - expected).length() < 1e-4);

        let chase = ChoreoSignals {
            tracker: Some(CameraRequest::Chase {
                position: Vec3::new(0.0, 7000.0, 0.0),
                target,
            }),
            ..signals
        };
        assert_eq!(c.update(&chase).position, Vec3::new(0.0, 7000.0, 0.0));

        c.update(&at(17.0));
        assert_eq!(*c.phase(), ChoreographyPhase::Handoff);
    }

    #[test]
    fn script_resumes_by_wall_time_after_early_claim() {
        let mut c = choreographer();
        let claim = ChoreoSignals {
            total_time: 2.0,
            tracker: Some(CameraRequest::LookAt {
                target: Vec3::ZERO,
            }),
            ..Default::default()
        };
        c.update(&claim);
        assert_eq!(*c.phase(), ChoreographyPhase::TrackingEntity);
        assert_eq!({ *c.update(&at(7.0)) }, kf(&c, 2));
        assert_eq!(*c.phase(), ChoreographyPhase::Scripted { segment: 2 });
    }

    #[test]
    fn explosion_resume_and_final() {
        let mut c = choreographer();
        c.update(&at(20.0));
        let impact = Vec3::new(500.0, 6000.0, -3000.0);

        let gaze = *c.update(&ChoreoSignals {
            total_time: 30.0,
            airplane_active: true,
            missile_exploded: Some(impact),
            ..Default::default()
        });
        assert!(matches!(c.phase(), ChoreographyPhase::ExplosionGaze { .. }));
        assert_eq!(gaze.position, kf(&c, 4).position);
        let expected = (impact - gaze.position).normalized();
        assert!((gaze.forward() - expected).length() < 1e-4);

        // Still gazing while the airplane flies on
        let held = *c.update(&ChoreoSignals {
            total_time: 30.5,
            airplane_active: true,
            missile_exploded: Some(impact),
            ..Default::default()
        });
        assert_eq!(held, gaze);

        let resuming = ChoreoSignals {
            missile_exploded: Some(impact),
            resuming: true,
            entities_exhausted: true,
            ..Default::default()
        };
        let first = *c.update(&ChoreoSignals {
            total_time: 31.0,
            ..resuming
        });
        assert!(matches!(c.phase(), ChoreographyPhase::ResumeTransition { .. }));
        assert_eq!(first, gaze);

        let mid = *c.update(&ChoreoSignals {
            total_time: 35.0,
            ..resuming
        });
        assert!(mid.fov > 45.0 && mid.fov < 75.0);

        let end = *c.update(&ChoreoSignals {
            total_time: 39.0,
            ..resuming
        });
        assert!(c.is_final());
        let last = c.config().keyframes[5].pose(75.0);
        assert_eq!(end, last);
        assert_eq!(*c.update(&at(500.0)), last);
    }

    #[test]
    fn exhausted_entities_fall_back_to_final() {
        let mut c = choreographer();
        let exhausted = |t: f64| ChoreoSignals {
            total_time: t,
            entities_exhausted: true,
            ..Default::default()
        };
        c.update(&exhausted(20.0));
        assert_eq!(*c.phase(), ChoreographyPhase::Handoff);
        let first = *c.update(&exhausted(23.0));
        assert!(matches!(c.phase(), ChoreographyPhase::ResumeTransition { .. }));
        assert_eq!(first, kf(&c, 4));
        c.update(&exhausted(31.0));
        assert!(c.is_final());
        assert_eq!(c.pose().fov, 75.0);
    }

    #[test]
    fn disabled_motion_holds_first_keyframe() {
        let config = CameraConfig {
            enable_motion: false,
            ..Default::default()
        };
        let mut c = CameraChoreographer::new(config).unwrap();
        assert_eq!({ *c.update(&at(6.0)) }, kf(&c, 0));
        assert_eq!({ *c.update(&at(12.0)) }, kf(&c, 0));
    }

    #[test]
    fn camera_section_parses_from_toml() {
        let config: CameraConfig = toml::from_str(
            r#"
            default_fov = 50.0
            transition_times = [1.0, 1.0]
            keyframes = [
                { position = { x = 0.0, y = 0.0, z = 0.0 }, yaw = 0.0, pitch = 0.0 },
                { position = { x = 1.0, y = 0.0, z = 0.0 }, yaw = 10.0, pitch = 0.0 },
                { position = { x = 2.0, y = 0.0, z = 0.0 }, yaw = 20.0, pitch = 0.0 },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(config.default_fov, 50.0);
        assert_eq!(config.keyframes.len(), 3);
        assert!(config.validate().is_ok());
    }
}
