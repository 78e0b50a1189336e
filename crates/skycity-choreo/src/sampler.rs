//! Keyframe timeline sampling

use crate::pose::{CameraKeyframe, CameraPose};
use skycity_core::Vec3;

/// Hermite ease `t² (3 - 2t)` on `t` clamped to `[0, 1]`.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Wrap an angle in degrees into `[-180, 180)`.
pub fn normalize_angle_deg(angle: f32) -> f32 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

/// Interpolate between two headings along the shorter arc.
pub fn lerp_angle_deg(a: f32, b: f32, t: f32) -> f32 {
    a + normalize_angle_deg(b - a) * t
}

fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Blend two poses with smoothstep easing on `t`.
///
/// The endpoints are returned verbatim (`t <= 0` gives `from`, `t >= 1`
/// gives `to`) so a finished segment lands exactly on its keyframe.
pub fn interpolate_pose(from: &CameraPose, to: &CameraPose, t: f32) -> CameraPose {
    if t <= 0.0 {
        return *from;
    }
    if t >= 1.0 {
        return *to;
    }

    let s = smoothstep(t);
    CameraPose {
        position: Vec3::lerp(from.position, to.position, s),
        yaw: lerp_angle_deg(from.yaw, to.yaw, s),
        pitch: lerp_f32(from.pitch, to.pitch, s),
        fov: lerp_f32(from.fov, to.fov, s),
    }
}

/// Authored keyframes with cumulative segment start times.
///
/// Segment `i` runs from keyframe `i` to `i + 1` over `transition_times[i]`.
/// The last segment is reserved for the post-explosion resume, so the script
/// itself plays the first `N - 2` segments.
#[derive(Debug, Clone)]
pub struct Timeline {
    keyframes: Vec<CameraKeyframe>,
    durations: Vec<f64>,
    starts: Vec<f64>,
}

impl Timeline {
    /// Caller guarantees `durations.len() + 1 == keyframes.len()` and
    /// `keyframes.len() >= 2`; `CameraConfig::validate` checks both.
    pub fn new(keyframes: Vec<CameraKeyframe>, durations: Vec<f64>) -> Self {
        let mut starts = Vec::with_capacity(keyframes.len());
        let mut acc = 0.0;
        starts.push(acc);
        for d in &durations {
            acc += d.max(0.0);
            starts.push(acc);
        }
        Self {
            keyframes,
            durations,
            starts,
        }
    }

    pub fn keyframes(&self) -> &[CameraKeyframe] {
        &self.keyframes
    }

    pub fn keyframe(&self, index: usize) -> Option<&CameraKeyframe> {
        self.keyframes.get(index)
    }

    /// Start of segment `i` (equivalently, arrival time at keyframe `i`).
    pub fn start_of(&self, index: usize) -> f64 {
        self.starts.get(index).copied().unwrap_or(0.0)
    }

    pub fn duration_of(&self, segment: usize) -> f64 {
        self.durations.get(segment).copied().unwrap_or(0.0)
    }

    /// Number of segments the script plays on its own.
    pub fn scripted_segments(&self) -> usize {
        self.keyframes.len().saturating_sub(2)
    }

    /// Time at which the script reaches its hold keyframe.
    pub fn scripted_end(&self) -> f64 {
        self.start_of(self.scripted_segments())
    }

    /// Sum of every transition, the resume segment included.
    pub fn total_duration(&self) -> f64 {
        self.starts.last().copied().unwrap_or(0.0)
    }

    /// Scripted segment active at `time`, or `None` once the script is done.
    /// A time exactly on a boundary belongs to the following segment.
    pub fn segment_at(&self, time: f64) -> Option<usize> {
        if time >= self.scripted_end() {
            return None;
        }
        (0..self.scripted_segments()).find(|&i| time < self.starts[i + 1])
    }

    /// Local progress through `segment` at `time`, unclamped.
    pub fn local_t(&self, segment: usize, time: f64) -> f32 {
        let duration = self.duration_of(segment);
        if duration <= 0.0 {
            return 1.0;
        }
        ((time - self.start_of(segment)) / duration) as f32
    }

    /// Pose along `segment` at `time`, both ends at `fov`.
    pub fn sample_segment(&self, segment: usize, time: f64, fov: f32) -> Option<CameraPose> {
        let from = self.keyframes.get(segment)?.pose(fov);
        let to = self.keyframes.get(segment + 1)?.pose(fov);
        Some(interpolate_pose(&from, &to, self.local_t(segment, time)))
    }
}
