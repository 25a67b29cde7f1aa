//! Scalar interpolation helpers used by every carving and shaping stage.

/// Spans or denominators smaller than this are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Linear interpolation between `a` and `b`, `t` clamped to [0, 1].
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Position of `v` between `a` and `b`, clamped to [0, 1].
///
/// Returns 0 when the span is degenerate instead of dividing by ~zero.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    let span = b - a;
    if span.abs() < EPSILON {
        return 0.0;
    }
    ((v - a) / span).clamp(0.0, 1.0)
}

/// Cubic Hermite smoothstep of an already-normalized `t`.
#[inline]
pub fn smoothstep01(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Smoothstep of `x` over the edge interval `[edge0, edge1]`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    smoothstep01(inverse_lerp(edge0, edge1, x))
}
