//! Pure curve math: cubic Bezier paths and Bernstein bases.
//!
//! Lantern ascent paths sample the cubic form directly; the flag surface
//! evaluates arbitrary-degree Bernstein polynomials in both directions.

use crate::Vec3;

/// Point on a cubic Bezier curve at parameter `t` in [0, 1].
pub fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;
    p0 * b0 + p1 * b1 + p2 * b2 + p3 * b3
}

/// First derivative of the cubic Bezier curve with respect to `t`.
pub fn cubic_bezier_tangent(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    (p1 - p0) * (3.0 * u * u) + (p2 - p1) * (6.0 * u * t) + (p3 - p2) * (3.0 * t * t)
}

/// Binomial coefficient `n choose k` as a float.
pub fn binomial(n: usize, k: usize) -> f32 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0_f64;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result as f32
}

/// Bernstein basis polynomial `B_{i,n}(t)`.
pub fn bernstein(n: usize, i: usize, t: f32) -> f32 {
    if i > n {
        return 0.0;
    }
    binomial(n, i) * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32)
}

/// Derivative of `B_{i,n}` with respect to `t`: `n (B_{i-1,n-1} - B_{i,n-1})`.
pub fn bernstein_derivative(n: usize, i: usize, t: f32) -> f32 {
    if n == 0 {
        return 0.0;
    }
    let left = if i > 0 { bernstein(n - 1, i - 1, t) } else { 0.0 };
    let right = if i < n { bernstein(n - 1, i, t) } else { 0.0 };
    n as f32 * (left - right)
}

/// Rotate a vector around an axis by an angle in radians (Rodrigues' formula).
pub fn rotate_around_axis(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    let cos_a = angle.cos();
    let sin_a = angle.sin();
    let dot = v.dot(&axis);
    let cross = axis.cross(&v);
    v * cos_a + cross * sin_a + axis * (dot * (1.0 - cos_a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn cubic_hits_endpoints() {
        let p0 = Vec3::new(0.0, 0.0, 0.0);
        let p1 = Vec3::new(1.0, 2.0, 0.0);
        let p2 = Vec3::new(3.0, 4.0, 1.0);
        let p3 = Vec3::new(4.0, 8.0, 2.0);
        assert!(approx(cubic_bezier(p0, p1, p2, p3, 0.0), p0));
        assert!(approx(cubic_bezier(p0, p1, p2, p3, 1.0), p3));
    }

    #[test]
    fn tangent_matches_finite_difference() {
        let p0 = Vec3::new(0.0, 0.0, 0.0);
        let p1 = Vec3::new(10.0, 20.0, 0.0);
        let p2 = Vec3::new(30.0, 40.0, 10.0);
        let p3 = Vec3::new(40.0, 80.0, 20.0);
        let t = 0.4;
        let h = 1e-3;
        let fd = (cubic_bezier(p0, p1, p2, p3, t + h) - cubic_bezier(p0, p1, p2, p3, t - h))
            * (1.0 / (2.0 * h));
        let analytic = cubic_bezier_tangent(p0, p1, p2, p3, t);
        assert!((fd - analytic).length() < 0.5);
    }

    #[test]
    fn bernstein_partition_of_unity() {
        for n in 1..8 {
            for step in 0..=10 {
                let t = step as f32 / 10.0;
                let sum: f32 = (0..=n).map(|i| bernstein(n, i, t)).sum();
                assert!((sum - 1.0).abs() < 1e-5, "n={n} t={t} sum={sum}");
            }
        }
    }

    #[test]
    fn bernstein_derivatives_sum_to_zero() {
        for n in 1..8 {
            let sum: f32 = (0..=n).map(|i| bernstein_derivative(n, i, 0.37)).sum();
            assert!(sum.abs() < 1e-4);
        }
    }

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(7, 0), 1.0);
        assert_eq!(binomial(7, 3), 35.0);
        assert_eq!(binomial(5, 6), 0.0);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = rotate_around_axis(Vec3::RIGHT, Vec3::UP, std::f32::consts::FRAC_PI_2);
        assert!(approx(v, Vec3::new(0.0, 0.0, -1.0)));
    }
}
