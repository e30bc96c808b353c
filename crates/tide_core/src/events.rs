//! Pointer and pan gesture events
//!
//! Hosts either feed [`PanSample`]s directly (when the platform already runs a
//! pan recognizer) or push raw pointer positions through a [`PanTracker`],
//! which derives translation and a smoothed release velocity.

use crate::geometry::{Point, Vec2};

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    pub const POINTER_DOWN: EventType = 1;
    pub const POINTER_UP: EventType = 2;
    /// Pan recognized (pointer moved past slop while down)
    pub const PAN_BEGAN: EventType = 10;
    pub const PAN_CHANGED: EventType = 11;
    /// Pan released normally
    pub const PAN_ENDED: EventType = 12;
    /// Pan interrupted by the system
    pub const PAN_CANCELLED: EventType = 13;
    pub const PAN_FAILED: EventType = 14;
    pub const SCROLL: EventType = 30;
    /// Scroll gesture ended (for deceleration/momentum)
    pub const SCROLL_END: EventType = 31;
}

/// Phase of a continuous pan gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

impl GesturePhase {
    /// Whether this phase terminates the gesture
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GesturePhase::Ended | GesturePhase::Cancelled | GesturePhase::Failed
        )
    }

    pub fn event_type(&self) -> EventType {
        use event_types::*;
        match self {
            GesturePhase::Began => PAN_BEGAN,
            GesturePhase::Changed => PAN_CHANGED,
            GesturePhase::Ended => PAN_ENDED,
            GesturePhase::Cancelled => PAN_CANCELLED,
            GesturePhase::Failed => PAN_FAILED,
        }
    }
}

/// One callback from a pan gesture recognizer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanSample {
    pub phase: GesturePhase,
    /// Current pointer location in screen coordinates
    pub location: Point,
    /// Cumulative translation since the gesture began
    pub translation: Vec2,
    /// Pointer velocity in points per second (positive `y` is downward)
    pub velocity: Vec2,
}

impl PanSample {
    pub fn new(phase: GesturePhase, translation: Vec2, velocity: Vec2) -> Self {
        Self {
            phase,
            location: Point::ZERO,
            translation,
            velocity,
        }
    }

    pub fn began() -> Self {
        Self::new(GesturePhase::Began, Vec2::ZERO, Vec2::ZERO)
    }

    pub fn changed(translation: Vec2, velocity: Vec2) -> Self {
        Self::new(GesturePhase::Changed, translation, velocity)
    }

    pub fn ended(translation: Vec2, velocity: Vec2) -> Self {
        Self::new(GesturePhase::Ended, translation, velocity)
    }

    pub fn with_location(mut self, location: Point) -> Self {
        self.location = location;
        self
    }
}

/// Minimum travel before a pointer drag is recognized as a pan
pub const DEFAULT_PAN_SLOP: f32 = 8.0;

/// Converts raw pointer events into [`PanSample`]s
///
/// Velocity uses an exponential moving average of instantaneous velocities,
/// which keeps a single jittery frame from dominating the release velocity.
#[derive(Clone, Debug)]
pub struct PanTracker {
    slop: f32,
    origin: Option<Point>,
    last: Point,
    last_time_ms: f64,
    velocity: Vec2,
    recognized: bool,
}

impl Default for PanTracker {
    fn default() -> Self {
        Self::new(DEFAULT_PAN_SLOP)
    }
}

impl PanTracker {
    /// Smoothing factor for the velocity moving average
    const SMOOTHING: f32 = 0.3;

    pub fn new(slop: f32) -> Self {
        Self {
            slop,
            origin: None,
            last: Point::ZERO,
            last_time_ms: 0.0,
            velocity: Vec2::ZERO,
            recognized: false,
        }
    }

    /// Whether a pointer is currently down
    pub fn is_tracking(&self) -> bool {
        self.origin.is_some()
    }

    pub fn pointer_down(&mut self, location: Point, time_ms: f64) {
        self.origin = Some(location);
        self.last = location;
        self.last_time_ms = time_ms;
        self.velocity = Vec2::ZERO;
        self.recognized = false;
    }

    /// Feed a pointer move; returns a sample once the pan is recognized
    pub fn pointer_move(&mut self, location: Point, time_ms: f64) -> Option<PanSample> {
        let origin = self.origin?;

        let dt = ((time_ms - self.last_time_ms) / 1000.0) as f32;
        if dt > 0.0 && dt < 0.5 {
            let instant_x = (location.x - self.last.x) / dt;
            let instant_y = (location.y - self.last.y) / dt;
            self.velocity = Vec2::new(
                self.velocity.x * (1.0 - Self::SMOOTHING) + instant_x * Self::SMOOTHING,
                self.velocity.y * (1.0 - Self::SMOOTHING) + instant_y * Self::SMOOTHING,
            );
        }
        self.last = location;
        self.last_time_ms = time_ms;

        let translation = Vec2::new(location.x - origin.x, location.y - origin.y);
        if !self.recognized {
            if translation.length() < self.slop {
                return None;
            }
            self.recognized = true;
            return Some(PanSample::began().with_location(location));
        }

        Some(PanSample::changed(translation, self.velocity).with_location(location))
    }

    /// Pointer lifted; returns `Ended` if a pan was in progress
    pub fn pointer_up(&mut self, location: Point) -> Option<PanSample> {
        self.finish(GesturePhase::Ended, location)
    }

    /// Pointer stream interrupted; returns `Cancelled` if a pan was in progress
    pub fn pointer_cancel(&mut self) -> Option<PanSample> {
        let location = self.last;
        self.finish(GesturePhase::Cancelled, location)
    }

    fn finish(&mut self, phase: GesturePhase, location: Point) -> Option<PanSample> {
        let origin = self.origin.take()?;
        let was_recognized = std::mem::replace(&mut self.recognized, false);
        if !was_recognized {
            return None;
        }
        let translation = Vec2::new(location.x - origin.x, location.y - origin.y);
        Some(PanSample::new(phase, translation, self.velocity).with_location(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_waits_for_slop() {
        let mut tracker = PanTracker::new(10.0);
        tracker.pointer_down(Point::new(100.0, 500.0), 0.0);

        assert!(tracker.pointer_move(Point::new(100.0, 505.0), 16.0).is_none());

        let began = tracker.pointer_move(Point::new(100.0, 520.0), 32.0).unwrap();
        assert_eq!(began.phase, GesturePhase::Began);

        let changed = tracker.pointer_move(Point::new(100.0, 540.0), 48.0).unwrap();
        assert_eq!(changed.phase, GesturePhase::Changed);
        assert_eq!(changed.translation, Vec2::new(0.0, 40.0));
        assert!(changed.velocity.y > 0.0);
    }

    #[test]
    fn test_tap_does_not_produce_end() {
        let mut tracker = PanTracker::default();
        tracker.pointer_down(Point::new(10.0, 10.0), 0.0);
        assert!(tracker.pointer_up(Point::new(11.0, 10.0)).is_none());
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_upward_release_velocity_is_negative() {
        let mut tracker = PanTracker::new(1.0);
        tracker.pointer_down(Point::new(0.0, 800.0), 0.0);
        let mut y = 800.0;
        let mut t = 0.0;
        for _ in 0..10 {
            y -= 20.0;
            t += 10.0;
            tracker.pointer_move(Point::new(0.0, y), t);
        }
        let ended = tracker.pointer_up(Point::new(0.0, y)).unwrap();
        assert_eq!(ended.phase, GesturePhase::Ended);
        assert!(ended.velocity.y < -1000.0);
        assert_eq!(ended.translation.y, -200.0);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(GesturePhase::Ended.is_terminal());
        assert!(GesturePhase::Failed.is_terminal());
        assert!(!GesturePhase::Changed.is_terminal());
        assert_eq!(GesturePhase::Began.event_type(), event_types::PAN_BEGAN);
    }

    #[test]
    fn test_cancel_mid_pan_reports_cancelled() {
        let mut tracker = PanTracker::new(5.0);
        tracker.pointer_down(Point::new(50.0, 400.0), 0.0);
        assert!(tracker.pointer_move(Point::new(50.0, 390.0), 16.0).is_some());
        tracker.pointer_move(Point::new(50.0, 370.0), 32.0);

        let cancelled = tracker.pointer_cancel().unwrap();
        assert_eq!(cancelled.phase, GesturePhase::Cancelled);
        assert_eq!(cancelled.translation, Vec2::new(0.0, -30.0));
        assert!(!tracker.is_tracking());
        assert!(tracker.pointer_cancel().is_none());
    }
}
