//! Animatable value types
//!
//! Linear interpolation for the values a sheet animation blends between.

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

/// Inverse of lerp: where `value` sits between `from` and `to`, unclamped
pub fn inverse_lerp(from: f32, to: f32, value: f32) -> f32 {
    let span = to - from;
    if span.abs() < f32::EPSILON {
        return 0.0;
    }
    (value - from) / span
}

/// A value blended between two endpoints by an animator's progress
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition<T> {
    pub from: T,
    pub to: T,
}

impl<T: Interpolate + Copy> Transition<T> {
    pub fn new(from: T, to: T) -> Self {
        Self { from, to }
    }

    pub fn at(&self, fraction: f32) -> T {
        self.from.lerp(&self.to, fraction)
    }
}
