//! Waypaths: ordered control points in grid space, with quadratic Bezier
//! smoothing and resampling helpers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::EPSILON;

/// An ordered polyline of control points, open or closed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWaypath", into = "RawWaypath")]
pub struct Waypath {
    points: Vec<Vec2>,
    closed: bool,
}

#[derive(Clone, Serialize, Deserialize)]
struct RawWaypath {
    points: Vec<Vec2>,
    #[serde(default)]
    closed: bool,
}

impl Waypath {
    /// Open paths need at least 2 points, closed loops at least 3.
    pub fn new(points: Vec<Vec2>, closed: bool) -> Result<Self> {
        let required = if closed { 3 } else { 2 };
        if points.len() < required || points.iter().any(|p| !p.is_finite()) {
            return Err(Error::DegenerateWaypath { points: points.len(), closed });
        }
        Ok(Self { points, closed })
    }

    pub fn open(points: Vec<Vec2>) -> Result<Self> {
        Self::new(points, false)
    }

    pub fn closed(points: Vec<Vec2>) -> Result<Self> {
        Self::new(points, true)
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Control points in traversal order; closed loops repeat the first point.
    pub fn control_polyline(&self) -> Vec<Vec2> {
        let mut pts = self.points.clone();
        if self.closed {
            pts.push(self.points[0]);
        }
        pts
    }

    /// Centerline samples.
    ///
    /// With `smoothness > 0` and at least three control points, each
    /// overlapping triple `[0,1,2], [2,3,4], ...` becomes a quadratic Bezier
    /// sampled `smoothness + 1` times. On open paths a trailing point that
    /// does not complete a triple is not visited; closed loops always end
    /// back on the first point. Otherwise the control points are returned.
    pub fn sample(&self, smoothness: u32) -> Vec<Vec2> {
        let pts = self.control_polyline();
        if smoothness == 0 || pts.len() < 3 {
            return pts;
        }
        let mut samples = smooth_bezier(&pts, smoothness);
        if self.closed && samples.last() != Some(&self.points[0]) {
            samples.push(self.points[0]);
        }
        samples
    }
}

impl TryFrom<RawWaypath> for Waypath {
    type Error = Error;

    fn try_from(raw: RawWaypath) -> Result<Self> {
        Waypath::new(raw.points, raw.closed)
    }
}

impl From<Waypath> for RawWaypath {
    fn from(path: Waypath) -> Self {
        RawWaypath { points: path.points, closed: path.closed }
    }
}

/// Quadratic Bezier through overlapping control triples.
pub fn smooth_bezier(points: &[Vec2], smoothness: u32) -> Vec<Vec2> {
    let steps = smoothness.max(1);
    let mut out = Vec::with_capacity((points.len() / 2 + 1) * (steps as usize + 1));

    let mut i = 0;
    while i + 2 < points.len() {
        let (p0, p1, p2) = (points[i], points[i + 1], points[i + 2]);
        for s in 0..=steps {
            let u = s as f32 / steps as f32;
            let v = 1.0 - u;
            out.push(p0 * (v * v) + p1 * (2.0 * v * u) + p2 * (u * u));
        }
        i += 2;
    }
    out
}

/// Insert points so no two consecutive samples are more than `max_spacing` apart.
pub fn densify(samples: &[Vec2], max_spacing: f32) -> Vec<Vec2> {
    if samples.len() < 2 || max_spacing <= EPSILON {
        return samples.to_vec();
    }

    let mut out = Vec::with_capacity(samples.len());
    out.push(samples[0]);
    for pair in samples.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let steps = (a.distance(b) / max_spacing).ceil().max(1.0) as usize;
        for s in 1..=steps {
            out.push(a.lerp(b, s as f32 / steps as f32));
        }
    }
    out
}

/// Clip the segment `a`–`b` to the axis-aligned box `[min, max]`
/// (Liang-Barsky). `None` when no part of it lies inside.
pub fn clip_segment(a: Vec2, b: Vec2, min: Vec2, max: Vec2) -> Option<(Vec2, Vec2)> {
    if !a.is_finite() || !b.is_finite() {
        return None;
    }
    let d = b - a;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((a + d * t0, a + d * t1))
}

/// Distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Distance from `p` to the nearest segment of a sampled polyline.
pub fn distance_to_polyline(p: Vec2, samples: &[Vec2]) -> f32 {
    match samples {
        [] => f32::INFINITY,
        [only] => p.distance(*only),
        _ => samples
            .windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .fold(f32::INFINITY, f32::min),
    }
}
