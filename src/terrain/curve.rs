//! Height response curves mapping [0, 1] → [0, 1].
//!
//! Each curve is a short list of Hermite keyframes, so shaped curves such as
//! `Sine` have flat tops rather than sharp corners.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::Error;

/// Named response curve applied to normalized heights and texture weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HeightCurve {
    #[default]
    Linear,
    Constant,
    EaseInOut,
    EaseOut,
    Sine,
    BezierLike,
}

/// Hermite keyframe: time, value, incoming and outgoing tangent.
#[derive(Clone, Copy, Debug)]
struct Key {
    t: f32,
    v: f32,
    tin: f32,
    tout: f32,
}

const fn key(t: f32, v: f32, tin: f32, tout: f32) -> Key {
    Key { t, v, tin, tout }
}

const LINEAR: [Key; 2] = [key(0.0, 0.0, 1.0, 1.0), key(1.0, 1.0, 1.0, 1.0)];
const CONSTANT: [Key; 2] = [key(0.0, 1.0, 0.0, 0.0), key(1.0, 1.0, 0.0, 0.0)];
const EASE_IN_OUT: [Key; 2] = [key(0.0, 0.0, 0.0, 0.0), key(1.0, 1.0, 0.0, 0.0)];
const EASE_OUT: [Key; 2] = [key(0.0, 1.0, 0.0, 0.0), key(1.0, 0.0, 0.0, 0.0)];
const SINE: [Key; 3] = [
    key(0.0, 0.0, 0.0, 0.0),
    key(0.5, 1.0, 0.0, 0.0),
    key(1.0, 0.0, 0.0, 0.0),
];
const BEZIER_LIKE: [Key; 3] = [
    key(0.0, 0.0, 1.0, 1.0),
    key(0.5, 1.0, 0.0, 0.0),
    key(1.0, 0.0, -1.0, -1.0),
];

impl HeightCurve {
    pub const ALL: [HeightCurve; 6] = [
        HeightCurve::Linear,
        HeightCurve::Constant,
        HeightCurve::EaseInOut,
        HeightCurve::EaseOut,
        HeightCurve::Sine,
        HeightCurve::BezierLike,
    ];

    /// Evaluate at `t` (clamped to [0, 1]); the result is clamped to [0, 1].
    pub fn evaluate(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        hermite(self.keys(), t).clamp(0.0, 1.0)
    }

    pub fn name(self) -> &'static str {
        match self {
            HeightCurve::Linear => "linear",
            HeightCurve::Constant => "constant",
            HeightCurve::EaseInOut => "easeinout",
            HeightCurve::EaseOut => "easeout",
            HeightCurve::Sine => "sine",
            HeightCurve::BezierLike => "bezier",
        }
    }

    fn keys(self) -> &'static [Key] {
        match self {
            HeightCurve::Linear => &LINEAR,
            HeightCurve::Constant => &CONSTANT,
            HeightCurve::EaseInOut => &EASE_IN_OUT,
            HeightCurve::EaseOut => &EASE_OUT,
            HeightCurve::Sine => &SINE,
            HeightCurve::BezierLike => &BEZIER_LIKE,
        }
    }
}

fn hermite(keys: &[Key], t: f32) -> f32 {
    let seg = keys
        .windows(2)
        .find(|w| t <= w[1].t)
        .unwrap_or(&keys[keys.len() - 2..]);
    let (k0, k1) = (seg[0], seg[1]);

    let dt = k1.t - k0.t;
    let s = (t - k0.t) / dt;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * k0.v + h10 * dt * k0.tout + h01 * k1.v + h11 * dt * k1.tin
}

impl FromStr for HeightCurve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(HeightCurve::Linear),
            "constant" => Ok(HeightCurve::Constant),
            "easein" | "easeinout" => Ok(HeightCurve::EaseInOut),
            "easeout" => Ok(HeightCurve::EaseOut),
            "sine" => Ok(HeightCurve::Sine),
            "bezier" | "bezierlike" => Ok(HeightCurve::BezierLike),
            _ => Err(Error::UnknownCurve(s.to_string())),
        }
    }
}

impl TryFrom<String> for HeightCurve {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HeightCurve> for String {
    fn from(curve: HeightCurve) -> String {
        curve.name().to_string()
    }
}

impl fmt::Display for HeightCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::smoothstep01;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_linear_is_identity() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!(close(HeightCurve::Linear.evaluate(t), t));
        }
    }

    #[test]
    fn test_shapes() {
        assert_eq!(HeightCurve::Constant.evaluate(0.3), 1.0);
        assert!(close(HeightCurve::EaseInOut.evaluate(0.25), smoothstep01(0.25)));
        assert!(close(HeightCurve::EaseOut.evaluate(0.25), 1.0 - smoothstep01(0.25)));
        assert!(close(HeightCurve::Sine.evaluate(0.5), 1.0));
        assert!(close(HeightCurve::Sine.evaluate(0.0), 0.0));
        assert!(close(HeightCurve::Sine.evaluate(1.0), 0.0));
        assert!(close(HeightCurve::BezierLike.evaluate(0.5), 1.0));
    }

    #[test]
    fn test_output_clamped() {
        for curve in HeightCurve::ALL {
            for i in -5..=25 {
                let v = curve.evaluate(i as f32 / 20.0);
                assert!((0.0..=1.0).contains(&v), "{curve} at {i}: {v}");
            }
            assert!(curve.evaluate(f32::NAN).is_finite());
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("EaseIn".parse::<HeightCurve>().unwrap(), HeightCurve::EaseInOut);
        assert_eq!("bezier".parse::<HeightCurve>().unwrap(), HeightCurve::BezierLike);
        assert_eq!(" SINE ".parse::<HeightCurve>().unwrap(), HeightCurve::Sine);
        for curve in HeightCurve::ALL {
            assert_eq!(curve.name().parse::<HeightCurve>().unwrap(), curve);
        }
    }

    #[test]
    fn test_unknown_name_is_error() {
        assert!(matches!("wobbly".parse::<HeightCurve>(), Err(Error::UnknownCurve(name)) if name == "wobbly"));
        assert!(serde_json::from_str::<HeightCurve>("\"wobbly\"").is_err());
        assert_eq!(serde_json::from_str::<HeightCurve>("\"Linear\"").unwrap(), HeightCurve::Linear);
    }
}
