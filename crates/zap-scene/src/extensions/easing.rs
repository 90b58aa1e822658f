// extensions/easing.rs
//
// Animation curves and interpolation helpers.
// Pure math; no scene access.

use std::f32::consts::{FRAC_PI_2, PI};
use glam::{Vec2, Vec3, Vec4};

/// Animation curve mapping normalized time to progress.
#[derive(Debug, Clone, Copy, Default)]
pub enum Easing {
    /// Constant velocity (no easing).
    #[default]
    Linear,
    /// Slow start.
    QuadIn,
    /// Slow end.
    QuadOut,
    /// Slow start and end.
    QuadInOut,
    /// Stronger slow start.
    CubicIn,
    /// Stronger slow end.
    CubicOut,
    /// Stronger slow start and end.
    CubicInOut,
    /// Very strong slow start.
    QuartIn,
    /// Very strong slow end.
    QuartOut,
    /// Very strong slow start and end.
    QuartInOut,
    /// Sine wave easing (smooth).
    SineIn,
    SineOut,
    SineInOut,
    /// Exponential easing (dramatic).
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    /// Overshoot then settle.
    BackIn,
    BackOut,
    BackInOut,
    /// Bouncy start.
    BounceIn,
    /// Bouncy finish.
    BounceOut,
    /// Elastic spring.
    ElasticIn,
    ElasticOut,
    /// Caller-supplied curve. Input is clamped to [0, 1] before the call.
    Custom(fn(f32) -> f32),
}

impl Easing {
    /// Look up a curve by name, e.g. `"linear"`, `"in_expo"`, `"out_bounce"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let curve = match name {
            "linear" => Easing::Linear,
            "in_quad" => Easing::QuadIn,
            "out_quad" => Easing::QuadOut,
            "in_out_quad" => Easing::QuadInOut,
            "in_cubic" => Easing::CubicIn,
            "out_cubic" => Easing::CubicOut,
            "in_out_cubic" => Easing::CubicInOut,
            "in_quart" => Easing::QuartIn,
            "out_quart" => Easing::QuartOut,
            "in_out_quart" => Easing::QuartInOut,
            "in_sine" => Easing::SineIn,
            "out_sine" => Easing::SineOut,
            "in_out_sine" => Easing::SineInOut,
            "in_expo" => Easing::ExpoIn,
            "out_expo" => Easing::ExpoOut,
            "in_out_expo" => Easing::ExpoInOut,
            "in_back" => Easing::BackIn,
            "out_back" => Easing::BackOut,
            "in_out_back" => Easing::BackInOut,
            "in_bounce" => Easing::BounceIn,
            "out_bounce" => Easing::BounceOut,
            "in_elastic" => Easing::ElasticIn,
            "out_elastic" => Easing::ElasticOut,
            _ => return None,
        };
        Some(curve)
    }

    /// Map normalized time `t` (clamped to [0, 1]) to progress.
    /// Back and Elastic curves overshoot the [0, 1] range.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,

            Easing::QuadIn => t.powi(2),
            Easing::QuadOut => mirror(t, |t| t.powi(2)),
            Easing::QuadInOut => in_out(t, |t| t.powi(2)),
            Easing::CubicIn => t.powi(3),
            Easing::CubicOut => mirror(t, |t| t.powi(3)),
            Easing::CubicInOut => in_out(t, |t| t.powi(3)),
            Easing::QuartIn => t.powi(4),
            Easing::QuartOut => mirror(t, |t| t.powi(4)),
            Easing::QuartInOut => in_out(t, |t| t.powi(4)),

            Easing::SineIn => 1.0 - (t * FRAC_PI_2).cos(),
            Easing::SineOut => (t * FRAC_PI_2).sin(),
            Easing::SineInOut => (1.0 - (PI * t).cos()) / 2.0,

            Easing::ExpoIn => expo_in(t),
            Easing::ExpoOut => mirror(t, expo_in),
            Easing::ExpoInOut => in_out(t, expo_in),

            Easing::BackIn => back_in(t),
            Easing::BackOut => mirror(t, back_in),
            Easing::BackInOut => {
                let c = BACK_OVERSHOOT * 1.525;
                let half = |t: f32| t * t * ((c + 1.0) * t - c);
                if t < 0.5 {
                    half(2.0 * t) / 2.0
                } else {
                    1.0 - half(2.0 - 2.0 * t) / 2.0
                }
            }

            Easing::BounceIn => mirror(t, bounce_out),
            Easing::BounceOut => bounce_out(t),

            Easing::ElasticIn => elastic(t, |t| {
                -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_PERIOD).sin()
            }),
            Easing::ElasticOut => elastic(t, |t| {
                2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_PERIOD).sin() + 1.0
            }),

            Easing::Custom(f) => f(t),
        }
    }
}

const BACK_OVERSHOOT: f32 = 1.70158;
const ELASTIC_PERIOD: f32 = (2.0 * PI) / 3.0;

/// The "out" form of an "in" curve.
#[inline]
fn mirror(t: f32, curve: impl Fn(f32) -> f32) -> f32 {
    1.0 - curve(1.0 - t)
}

/// First half follows `curve`, second half its mirror.
#[inline]
fn in_out(t: f32, curve: impl Fn(f32) -> f32) -> f32 {
    if t < 0.5 {
        curve(2.0 * t) / 2.0
    } else {
        1.0 - curve(2.0 - 2.0 * t) / 2.0
    }
}

#[inline]
fn expo_in(t: f32) -> f32 {
    if t <= 0.0 { 0.0 } else { 2.0_f32.powf(10.0 * t - 10.0) }
}

#[inline]
fn back_in(t: f32) -> f32 {
    (BACK_OVERSHOOT + 1.0) * t.powi(3) - BACK_OVERSHOOT * t * t
}

/// Elastic curves are pinned to exact endpoints.
#[inline]
fn elastic(t: f32, curve: impl Fn(f32) -> f32) -> f32 {
    if t <= 0.0 || t >= 1.0 { t } else { curve(t) }
}

#[inline]
fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    let (shift, floor) = if t < 1.0 / D {
        (0.0, 0.0)
    } else if t < 2.0 / D {
        (1.5 / D, 0.75)
    } else if t < 2.5 / D {
        (2.25 / D, 0.9375)
    } else {
        (2.625 / D, 0.984375)
    };
    let t = t - shift;
    N * t * t + floor
}

// -- Interpolation helpers --

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec4(a: Vec4, b: Vec4, t: f32) -> Vec4 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease(a: f32, b: f32, t: f32, easing: Easing) -> f32 {
    lerp(a, b, easing.apply(t))
}
