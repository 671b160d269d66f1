//! Easing curves and angle interpolation.

use serde::{Deserialize, Serialize};

/// Maps linear progress in `[0, 1]` onto eased progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Slow start and slow finish (zero-tangent Hermite curve).
    #[default]
    EaseInOut,
}

impl Easing {
    /// Evaluates the curve at `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn evaluate(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Signed shortest rotation in degrees from `from` to `to`, in `(-180, 180]`.
#[must_use]
pub fn delta_angle(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Interpolates between two angles in degrees along the shortest arc.
#[must_use]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    from + delta_angle(from, to) * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_ease_in_out_is_symmetric_and_pinned_at_ends() {
        assert!(approx(Easing::EaseInOut.evaluate(0.0), 0.0));
        assert!(approx(Easing::EaseInOut.evaluate(0.5), 0.5));
        assert!(approx(Easing::EaseInOut.evaluate(1.0), 1.0));
        assert!(Easing::EaseInOut.evaluate(0.25) < 0.25);
        assert!(approx(Easing::EaseInOut.evaluate(2.0), 1.0));
    }

    #[test]
    fn test_lerp_angle_takes_the_shortest_arc() {
        // 180 -> 60 turns back through 120, not forward through 270.
        assert!(approx(lerp_angle(180.0, 60.0, 0.5), 120.0));
        // 350 -> 10 wraps forward through 360.
        assert!(approx(lerp_angle(350.0, 10.0, 0.5), 360.0));
    }
}
