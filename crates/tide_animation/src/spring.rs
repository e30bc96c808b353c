//! Spring physics animation
//!
//! RK4-integrated spring physics for smooth, natural animations.
//! Supports preset configurations and custom spring parameters.

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    /// Create a new spring configuration
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// A stiff, snappy spring (good for buttons)
    pub fn stiff() -> Self {
        Self {
            stiffness: 400.0,
            damping: 30.0,
            mass: 1.0,
        }
    }

    /// Very stiff spring just past critical damping, for elastic edge snap-back
    pub fn edge_bounce() -> Self {
        Self {
            stiffness: 3000.0,
            damping: 110.0,
            mass: 1.0,
        }
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Ratio of actual to critical damping
    pub fn damping_ratio(&self) -> f32 {
        let critical = self.critical_damping();
        if critical > 0.0 {
            self.damping / critical
        } else {
            0.0
        }
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }

    /// Check if the spring is critically damped (no oscillation, fastest settling)
    pub fn is_critically_damped(&self) -> bool {
        (self.damping - self.critical_damping()).abs() < 0.01
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::stiff()
    }
}

/// A spring-based animator
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
    epsilon: f32,
    velocity_epsilon: f32,
}

impl Spring {
    // Being within 0.5px and having velocity under 5px/s is imperceptible
    const DEFAULT_EPSILON: f32 = 0.5;
    const DEFAULT_VELOCITY_EPSILON: f32 = 5.0;

    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
            epsilon: Self::DEFAULT_EPSILON,
            velocity_epsilon: Self::DEFAULT_VELOCITY_EPSILON,
        }
    }

    /// Start with an initial velocity (units per second)
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }

    /// Override the settle thresholds, for springs driving small ranges like 0..1
    pub fn with_rest_threshold(mut self, epsilon: f32, velocity_epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self.velocity_epsilon = velocity_epsilon;
        self
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Check if the spring has settled (within epsilon of target with minimal velocity)
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < self.epsilon
            && self.velocity.abs() < self.velocity_epsilon
    }

    /// Step the spring simulation using RK4 integration
    pub fn step(&mut self, dt: f32) {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        let k1_v = self.acceleration(self.value, self.velocity);
        let k1_x = self.velocity;

        let k2_v = self.acceleration(
            self.value + k1_x * dt * 0.5,
            self.velocity + k1_v * dt * 0.5,
        );
        let k2_x = self.velocity + k1_v * dt * 0.5;

        let k3_v = self.acceleration(
            self.value + k2_x * dt * 0.5,
            self.velocity + k2_v * dt * 0.5,
        );
        let k3_x = self.velocity + k2_v * dt * 0.5;

        let k4_v = self.acceleration(self.value + k3_x * dt, self.velocity + k3_v * dt);
        let k4_x = self.velocity + k3_v * dt;

        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0;
        self.value += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0;

        // Degenerate configs (zero mass, NaN stiffness) must not poison callers
        if !self.value.is_finite() || !self.velocity.is_finite() {
            tracing::warn!(
                "spring diverged (stiffness={}, damping={}, mass={}), snapping to target",
                self.config.stiffness,
                self.config.damping,
                self.config.mass
            );
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    /// Step with substeps no longer than `max_step`, for large frame deltas
    pub fn step_substepped(&mut self, dt: f32, max_step: f32) {
        let mut remaining = dt;
        while remaining > 0.0 && !self.is_settled() {
            let step = remaining.min(max_step);
            self.step(step);
            remaining -= step;
        }
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass
    }
}
