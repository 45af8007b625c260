use std::f64::consts::{FRAC_PI_2, TAU};

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;

/// Lower bound for angular steps used as divisors.
pub const ANGLE_EPSILON: f64 = 1e-6;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

/// The point at `radius` from `center` in direction `angle` (radians, y axis pointing down).
pub fn polar(center: Point, radius: f64, angle: f64) -> Point {
    center + vector(radius * angle.cos(), radius * angle.sin())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePoint {
    pub point: Point,
    pub angle: f64,
    /// Angular distance to the next point on the same circle.
    pub step: f64,
}

/// `n` points evenly spaced on a circle, the first one at `start_angle`.
pub fn points_on_circle(n: usize, center: Point, radius: f64, start_angle: f64) -> Vec<CirclePoint> {
    if n == 0 {
        return Vec::new();
    }
    let step = TAU / n as f64;
    (0..n)
        .map(|i| {
            let angle = start_angle + i as f64 * step;
            CirclePoint {
                point: polar(center, radius, angle),
                angle,
                step,
            }
        })
        .collect()
}

/// Radius at which points `angular_step` apart are `required` apart along the arc.
///
/// Uses the arc length, which slightly underestimates the radius for wide steps compared to the
/// straight-line distance.
pub fn min_radius_for_arc(angular_step: f64, required: f64) -> f64 {
    required / angular_step.max(ANGLE_EPSILON)
}

/// Radius at which points `angular_step` apart are `required` apart in a straight line.
///
/// Half the step is capped at a quarter turn, so a circle holding one or two points needs
/// `required / 2`.
pub fn min_radius_for_chord(angular_step: f64, required: f64) -> f64 {
    let half = (angular_step.max(ANGLE_EPSILON) / 2.0).min(FRAC_PI_2);
    required / (2.0 * half.sin())
}

/// Smallest angular step keeping points on a circle of `radius` `required` apart along the arc.
pub fn min_step_for_arc(radius: f64, required: f64) -> f64 {
    required / radius
}

/// Smallest angular step keeping points on a circle of `radius` `required` apart in a straight
/// line. A circle too small to fit that distance at all needs a half turn.
pub fn min_step_for_chord(radius: f64, required: f64) -> f64 {
    2.0 * (required / (2.0 * radius)).min(1.0).asin()
}
