//! Interruptible property animator
//!
//! A [`PropertyAnimator`] advances a unit progress value from 0 to 1 along a
//! spring timing curve. Callers interpolate their own properties with
//! [`PropertyAnimator::fraction_complete`], so one animator drives several
//! properties in lockstep from the same sample.

use crate::spring::Spring;
use crate::timing::SpringTimingParameters;

/// Longest integration step; larger frame deltas are substepped
const MAX_STEP: f32 = 1.0 / 120.0;

/// Result of advancing an animator by one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorStatus {
    /// Still moving toward completion
    Running,
    /// Reached the end on this tick
    Finished,
    /// Not running (never started, stopped, or already finished)
    Inactive,
}

/// Spring-driven animator over a unit progress range
#[derive(Clone, Debug)]
pub struct PropertyAnimator {
    spring: Spring,
    timing: SpringTimingParameters,
    running: bool,
}

impl PropertyAnimator {
    pub fn new(timing: SpringTimingParameters) -> Self {
        let mut spring = Spring::new(timing.spring_config(), 0.0)
            .with_velocity(timing.initial_velocity.y)
            .with_rest_threshold(0.001, 0.01);
        spring.set_target(1.0);

        Self {
            spring,
            timing,
            running: false,
        }
    }

    /// Start the animation from fraction 0
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Create and start in one step
    pub fn started(timing: SpringTimingParameters) -> Self {
        let mut animator = Self::new(timing);
        animator.start();
        animator
    }

    pub fn timing(&self) -> &SpringTimingParameters {
        &self.timing
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current progress; may exceed 1.0 briefly for underdamped curves
    pub fn fraction_complete(&self) -> f32 {
        self.spring.value()
    }

    /// Stop where the animation currently is
    ///
    /// Properties keep whatever values the last tick produced; no completion
    /// is reported.
    pub fn stop(&mut self) {
        if self.running {
            tracing::trace!("animator stopped at fraction {:.3}", self.spring.value());
        }
        self.running = false;
    }

    /// Advance the animation by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> AnimatorStatus {
        if !self.running {
            return AnimatorStatus::Inactive;
        }

        self.spring.step_substepped(dt, MAX_STEP);

        if self.spring.is_settled() {
            self.running = false;
            AnimatorStatus::Finished
        } else {
            AnimatorStatus::Running
        }
    }
}
