//! Easing curves for tweens.
//!
//! An easing maps normalized progress `t` in `[0, 1]` to eased progress.
//! Every built-in curve satisfies `f(0) = 0` and `f(1) = 1`. The functions
//! hold no state, so any number of in-flight tweens can share them.
//!
//! ## Built-in Curves
//!
//! - [`Easing::Linear`] - Constant speed
//! - [`Easing::EaseIn`] / [`Easing::EaseOut`] / [`Easing::EaseInOut`] - Quadratic
//! - [`Easing::EaseInCubic`] / [`Easing::EaseOutCubic`] / [`Easing::EaseInOutCubic`]
//! - [`Easing::EaseInQuart`] / [`Easing::EaseOutQuart`] / [`Easing::EaseInOutQuart`]
//! - [`Easing::Bounce`] - Four-segment bounce settling at 1
//!
//! ## Advanced Options
//!
//! - [`Easing::CubicBezier`] - CSS-style cubic bezier curve
//! - [`Easing::Custom`] - User-defined function
//!
//! ## Example
//!
//! ```
//! use trellis::Easing;
//!
//! let easing: Easing = "easeOutCubic".parse().unwrap();
//! assert_eq!(easing.apply(1.0), 1.0);
//! ```

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Easing curve applied to tween progress
#[derive(Clone, Default)]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Quadratic, starts slow
    EaseIn,
    /// Quadratic, ends slow
    EaseOut,
    /// Quadratic, slow at both ends
    EaseInOut,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    /// Bounces against the end value before settling
    Bounce,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
    /// Custom easing function
    Custom(Rc<dyn Fn(f32) -> f32>),
}

impl Easing {
    /// Evaluate the curve at progress `t`. Input is clamped to `[0, 1]`.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => ease_in(t),
            Easing::EaseOut => ease_out(t),
            Easing::EaseInOut => ease_in_out(t),
            Easing::EaseInCubic => ease_in_cubic(t),
            Easing::EaseOutCubic => ease_out_cubic(t),
            Easing::EaseInOutCubic => ease_in_out_cubic(t),
            Easing::EaseInQuart => ease_in_quart(t),
            Easing::EaseOutQuart => ease_out_quart(t),
            Easing::EaseInOutQuart => ease_in_out_quart(t),
            Easing::Bounce => bounce(t),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
            Easing::Custom(f) => f(t),
        }
    }

    /// Create a custom easing from a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f32) -> f32 + 'static,
    {
        Easing::Custom(Rc::new(f))
    }

    /// Canonical name of a built-in curve, `None` for bezier and custom curves
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "easeIn",
            Easing::EaseOut => "easeOut",
            Easing::EaseInOut => "easeInOut",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::EaseInQuart => "easeInQuart",
            Easing::EaseOutQuart => "easeOutQuart",
            Easing::EaseInOutQuart => "easeInOutQuart",
            Easing::Bounce => "bounce",
            Easing::CubicBezier(..) | Easing::Custom(_) => return None,
        })
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "CubicBezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            Easing::Custom(_) => write!(f, "Custom"),
            other => write!(f, "{}", other.name().unwrap_or("?")),
        }
    }
}

/// Returned when an easing name is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEasing(pub String);

impl fmt::Display for UnknownEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown easing `{}`", self.0)
    }
}

impl std::error::Error for UnknownEasing {}

impl FromStr for Easing {
    type Err = UnknownEasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "linear" => Easing::Linear,
            "easeIn" => Easing::EaseIn,
            "easeOut" => Easing::EaseOut,
            "easeInOut" => Easing::EaseInOut,
            "easeInCubic" => Easing::EaseInCubic,
            "easeOutCubic" => Easing::EaseOutCubic,
            "easeInOutCubic" => Easing::EaseInOutCubic,
            "easeInQuart" => Easing::EaseInQuart,
            "easeOutQuart" => Easing::EaseOutQuart,
            "easeInOutQuart" => Easing::EaseInOutQuart,
            "bounce" => Easing::Bounce,
            other => return Err(UnknownEasing(other.to_string())),
        })
    }
}

fn ease_in(t: f32) -> f32 {
    t * t
}

fn ease_out(t: f32) -> f32 {
    t * (2.0 - t)
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

fn ease_out_cubic(t: f32) -> f32 {
    let t = t - 1.0;
    t * t * t + 1.0
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let t = t - 1.0;
        1.0 + 4.0 * t * t * t
    }
}

fn ease_in_quart(t: f32) -> f32 {
    t * t * t * t
}

fn ease_out_quart(t: f32) -> f32 {
    let t = t - 1.0;
    1.0 - t * t * t * t
}

fn ease_in_out_quart(t: f32) -> f32 {
    if t < 0.5 {
        8.0 * t * t * t * t
    } else {
        let t = t - 1.0;
        1.0 - 8.0 * t * t * t * t
    }
}

const BOUNCE_N: f32 = 7.5625;
const BOUNCE_D: f32 = 2.75;

fn bounce(t: f32) -> f32 {
    if t < 1.0 / BOUNCE_D {
        BOUNCE_N * t * t
    } else if t < 2.0 / BOUNCE_D {
        let t = t - 1.5 / BOUNCE_D;
        BOUNCE_N * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D {
        let t = t - 2.25 / BOUNCE_D;
        BOUNCE_N * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D;
        BOUNCE_N * t * t + 0.984375
    }
}

/// Cubic bezier curve evaluation
/// Simplified implementation assuming x1, x2 are in [0, 1]
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Newton-Raphson for the curve parameter whose x equals t
    let mut current_t = t;
    for _ in 0..8 {
        let current_x = cubic_bezier_x(current_t, x1, x2);
        let current_slope = cubic_bezier_slope(current_t, x1, x2);
        if current_slope.abs() < 1e-6 {
            break;
        }
        current_t -= (current_x - t) / current_slope;
    }
    cubic_bezier_y(current_t, y1, y2)
}

fn cubic_bezier_x(t: f32, x1: f32, x2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * x1 + 3.0 * mt * t * t * x2 + t * t * t
}

fn cubic_bezier_y(t: f32, y1: f32, y2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * y1 + 3.0 * mt * t * t * y2 + t * t * t
}

fn cubic_bezier_slope(t: f32, x1: f32, x2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtins() -> Vec<Easing> {
        vec![
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
            Easing::EaseInCubic,
            Easing::EaseOutCubic,
            Easing::EaseInOutCubic,
            Easing::EaseInQuart,
            Easing::EaseOutQuart,
            Easing::EaseInOutQuart,
            Easing::Bounce,
        ]
    }

    #[test]
    fn test_endpoints() {
        for easing in builtins() {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_linear() {
        assert_eq!(Easing::Linear.apply(0.25), 0.25);
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
    }

    #[test]
    fn test_ease_in_is_slow_at_start() {
        assert!(Easing::EaseIn.apply(0.5) < 0.5);
        assert!(Easing::EaseInCubic.apply(0.5) < Easing::EaseIn.apply(0.5));
        assert!(Easing::EaseInQuart.apply(0.5) < Easing::EaseInCubic.apply(0.5));
    }

    #[test]
    fn test_ease_out_is_fast_at_start() {
        assert!(Easing::EaseOut.apply(0.5) > 0.5);
        assert!(Easing::EaseOutCubic.apply(0.5) > Easing::EaseOut.apply(0.5));
        assert!(Easing::EaseOutQuart.apply(0.5) > Easing::EaseOutCubic.apply(0.5));
    }

    #[test]
    fn test_in_out_is_symmetric_at_midpoint() {
        for easing in [
            Easing::EaseInOut,
            Easing::EaseInOutCubic,
            Easing::EaseInOutQuart,
        ] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-6, "{:?}", easing);
        }
    }

    #[test]
    fn test_bounce_segments_are_continuous() {
        let boundaries = [1.0 / BOUNCE_D, 2.0 / BOUNCE_D, 2.5 / BOUNCE_D];
        for b in boundaries {
            let before = Easing::Bounce.apply(b - 1e-4);
            let after = Easing::Bounce.apply(b + 1e-4);
            assert!((before - after).abs() < 1e-2, "jump at {}", b);
        }
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn test_cubic_bezier_linear_control_points() {
        let easing = Easing::CubicBezier(0.25, 0.25, 0.75, 0.75);
        assert!((easing.apply(0.3) - 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_custom() {
        let easing = Easing::custom(|t| t.sqrt());
        assert_eq!(easing.apply(0.25), 0.5);
    }

    #[test]
    fn test_parse_names() {
        for easing in builtins() {
            let name = easing.name().unwrap();
            let parsed: Easing = name.parse().unwrap();
            assert_eq!(parsed.name(), Some(name));
        }
        assert_eq!(
            "wobble".parse::<Easing>().unwrap_err(),
            UnknownEasing("wobble".into())
        );
    }
}
