//! Spring timing curves
//!
//! Designers describe springs by how bouncy they are (damping ratio) and how
//! long they take to settle (response). [`SpringTimingParameters`] converts
//! that description into the physical mass/stiffness/damping triple the
//! integrator needs, and carries the initial velocity the animation should
//! start with.

use std::f32::consts::PI;

use tide_core::Vec2;

use crate::spring::SpringConfig;

/// Physical parameters of a spring timing curve
///
/// The curve does no interpolation itself. An animator reads the parameters
/// and integrates them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringTimingParameters {
    pub mass: f32,
    pub stiffness: f32,
    pub damping: f32,
    /// Velocity relative to the animated distance (fraction per second)
    pub initial_velocity: Vec2,
}

impl SpringTimingParameters {
    /// Build a curve from a damping ratio (0..=1) and a response time in seconds
    ///
    /// `stiffness = (2π / response)²` and `damping = 4π · damping_ratio / response`
    /// with unit mass. Zero or negative inputs give degenerate values; they
    /// never panic.
    pub fn new(damping_ratio: f32, response: f32, initial_velocity: Vec2) -> Self {
        let stiffness = (2.0 * PI / response).powi(2);
        let damping = 4.0 * PI * damping_ratio / response;
        Self {
            mass: 1.0,
            stiffness,
            damping,
            initial_velocity,
        }
    }

    /// Curve at rest
    pub fn at_rest(damping_ratio: f32, response: f32) -> Self {
        Self::new(damping_ratio, response, Vec2::ZERO)
    }

    /// Integrator configuration for this curve
    pub fn spring_config(&self) -> SpringConfig {
        SpringConfig::new(self.stiffness, self.damping, self.mass)
    }
}

/// Velocity of a moving property expressed relative to its remaining travel
///
/// A property at `current` heading to `target` while moving at `velocity`
/// units/second has relative velocity `velocity / (target - current)`. A
/// spring started with it continues the motion without a visible kink.
/// Distances shorter than `min_distance` yield zero.
pub fn relative_velocity(velocity: f32, current: f32, target: f32, min_distance: f32) -> f32 {
    let distance = target - current;
    if distance.abs() < min_distance || !velocity.is_finite() {
        return 0.0;
    }
    velocity / distance
}
