//! Simple value-over-lifetime interpolation (start → end linear)

use skycity_core::Color;

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fade a base color's alpha out over normalized age.
pub fn fade_alpha(base: Color, age_ratio: f32) -> Color {
    base.with_alpha(base.a * (1.0 - age_ratio))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_f32_endpoints() {
        assert!((lerp_f32(0.0, 10.0, 0.0) - 0.0).abs() < 1e-6);
        assert!((lerp_f32(0.0, 10.0, 1.0) - 10.0).abs() < 1e-6);
        assert!((lerp_f32(280.0, 30.0, 0.5) - 155.0).abs() < 1e-4);
    }

    #[test]
    fn fade_keeps_rgb() {
        let c = fade_alpha(Color::new(1.0, 0.35, 0.35, 0.8), 0.5);
        assert_eq!((c.r, c.g, c.b), (1.0, 0.35, 0.35));
        assert!((c.a - 0.4).abs() < 1e-6);
    }
}
